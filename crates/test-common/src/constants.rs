//! Common test constants used across multiple test files.

/// Name of the vendor directory inside a test workspace
pub const VENDOR_DIR_NAME: &str = "vendor";

/// Name of the registry file inside the vendor directory
pub const REGISTRY_FILE_NAME: &str = "installed.json";

/// Package used by most single-package tests
pub const TWIG: &str = "twig/twig";

/// Second package for multi-package tests
pub const PSR_LOG: &str = "psr/log";

/// Environment variable pointing the binary at a config directory
pub const CONFIG_DIR_ENV: &str = "DEPLOY_CLEAN_CONFIG_DIR";

/// Environment variable controlling the binary's log output
pub const LOG_ENV: &str = "DEPLOY_CLEAN_LOG";
