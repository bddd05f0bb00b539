//! # dx-scan
//!
//! Evaluates engineering practices against a repository and normalizes
//! pull requests, commits and issues from GitLab, GitHub and Bitbucket.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dx_scan::inspectors::{CachedFileInspector, VirtualFileSystem};
//! use dx_scan::model::{PracticeEvaluationResult, ProgrammingLanguage, ProjectComponent};
//! use dx_scan::practices::{PracticeContext, PracticeRunner};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fs = VirtualFileSystem::from_files([("log4j2.yaml", "Configuration:\n  status: warn\n")]);
//! let inspector = Arc::new(CachedFileInspector::new(Arc::new(fs)));
//! let component = ProjectComponent::new(ProgrammingLanguage::Java, ".");
//! let ctx = PracticeContext::new(inspector, component);
//!
//! let report = PracticeRunner::with_builtin_practices().run(&ctx).await;
//! assert_eq!(
//!     report.result("Java.Log4JConfigured"),
//!     Some(PracticeEvaluationResult::Practicing)
//! );
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod detectors;
pub mod inspectors;
pub mod model;
pub mod practices;
pub mod services;

pub use crate::cli::Cli;

/// The current version of dx-scan.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
