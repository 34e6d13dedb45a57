//! Common test utilities shared across the deployclean crates.
//!
//! Vendor tree fixtures, config files, recording port implementations and event stream helpers.

pub mod config;
pub mod constants;
pub mod events;
pub mod fixtures;
pub mod recording;

pub use config::{ConfigFile, test_config, test_config_with_rules};
pub use constants::*;
pub use events::{
    assert_failed_run, assert_no_errors, assert_successful_run, collect_events,
    count_events_of_type, get_error_messages, get_summary, get_verbose_messages,
    get_warning_messages,
};
pub use fixtures::{VendorTree, snapshot};
pub use recording::{RecordingFileSystem, RecordingReporter, RemovalCall};

// Re-export commonly used external dependencies for convenience
pub use deployclean::config::AppConfigBuilder;
pub use tempfile::TempDir;
