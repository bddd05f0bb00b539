//! Practice evaluation engine.
//!
//! A [`Practice`] is a unit of policy: it declares which projects it applies
//! to and evaluates a [`PracticeContext`] to a
//! [`PracticeEvaluationResult`](crate::model::PracticeEvaluationResult).
//! The [`PracticeRunner`] evaluates every registered, applicable practice in
//! isolation and collects a [`PracticeReport`].

pub mod config_formats;
pub mod context;
pub mod java;
pub mod practice;
pub mod runner;

pub use context::PracticeContext;
pub use java::JavaLog4JConfiguredPractice;
pub use practice::Practice;
pub use runner::{PracticeDiagnostic, PracticeReport, PracticeRunner};

use thiserror::Error;

/// Failures that practices recover from locally.
///
/// These never escape the runner: a missing collaborator becomes `unknown`,
/// a malformed configuration makes its candidate file count as absent.
#[derive(Error, Debug)]
pub enum PracticeError {
    /// A required context collaborator is absent.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A matched configuration file failed structural validation.
    #[error("Malformed configuration in {path}: {reason}")]
    MalformedConfiguration {
        /// Path of the rejected file.
        path: String,
        /// Why validation failed.
        reason: String,
    },
}

/// Every practice shipped with the crate, in reporting order.
pub fn builtin_practices() -> Vec<std::sync::Arc<dyn Practice>> {
    vec![std::sync::Arc::new(JavaLog4JConfiguredPractice::new())]
}
