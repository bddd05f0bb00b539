//! The practice extension point.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use super::PracticeContext;
use crate::model::{PracticeEvaluationResult, PracticeMetadata, ProgrammingLanguage};

/// A checkable engineering convention.
///
/// Implementations hold no mutable state; everything an evaluation needs
/// comes from the [`PracticeContext`]. Built-in practices never return an
/// error; the `Result` exists for external practices, whose failures the
/// runner turns into `unknown` plus a diagnostic.
pub trait Practice: Send + Sync {
    /// Static description, including the unique key.
    fn metadata(&self) -> &PracticeMetadata;

    /// Returns whether the practice applies to the project in `ctx`.
    fn is_applicable(&self, ctx: &PracticeContext) -> bool;

    /// Evaluates the practice.
    fn evaluate<'a>(
        &'a self,
        ctx: &'a PracticeContext,
    ) -> Pin<Box<dyn Future<Output = Result<PracticeEvaluationResult>> + Send + 'a>>;

    /// Unique practice key.
    fn key(&self) -> &str {
        &self.metadata().key
    }
}

/// Applicability helper for language-scoped practices.
pub fn language_in(ctx: &PracticeContext, languages: &[ProgrammingLanguage]) -> bool {
    languages.contains(&ctx.project_component.language)
}
