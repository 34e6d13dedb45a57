//! deployclean - whitelist-driven pruning of installed packages for deployment
//!
//! Dependency managers install whole packages: sources, but also tests, docs, build files and
//! fixtures nobody needs in production. `deployclean` keeps only what a package's deployment
//! rules name and removes everything else, without ever touching anything outside the vendor
//! directory.
//!
//! # Architecture
//!
//! The library follows the Hexagonal Architecture pattern (also known as Ports and Adapters). The
//! pruning engine and the clean service only talk to the outside world through ports: the
//! [`fs::FileSystem`], the [`reporter::Reporter`] for user-facing narration and the
//! [`registry::PackageRegistry`] of installed packages.
//!
//! # Main Components
//!
//! - [`prune`] - The pruning engine and its containment guarantees
//! - [`resolve`] - Turning package-relative rules into absolute wanted patterns
//! - [`clean`] - The clean service, streaming events while it prunes packages
//! - [`registry`] - The installed-package registry
//! - [`config`] - Application configuration loading and validation
//! - [`fs`] - File system abstractions
//! - [`validation`] - Validation types and utilities
//!
//! # Examples
//!
//! ```no_run
//! use deployclean::{
//!     clean::{CleanService, CleanServiceImpl, CleanTargets},
//!     config::AppConfigBuilder,
//!     fs::real::RealFileSystem,
//!     registry::JsonRegistry,
//! };
//! use futures::StreamExt;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfigBuilder::default()
//!     .vendor_dir("/srv/app/vendor")
//!     .rule("twig/twig", &["src", "LICENSE"])
//!     .dry_run(true)
//!     .build();
//! let registry = JsonRegistry::load(RealFileSystem, config.registry_file(), config.vendor_dir())?;
//! let service = CleanServiceImpl::new(RealFileSystem, registry, config);
//!
//! let mut events = service.clean(CleanTargets::All).await;
//! while let Some(event) = events.next().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod clean;
pub mod config;
pub mod fs;
pub mod prune;
pub mod registry;
pub mod reporter;
pub mod resolve;
pub mod validation;
