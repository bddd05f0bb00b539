//! Read-only bundle handed to every practice evaluation.

use std::fmt;
use std::sync::Arc;

use crate::inspectors::FileInspector;
use crate::model::ProjectComponent;
use crate::services::VcsService;

/// Collaborators available to a practice during one analysis run.
///
/// Every collaborator except the project component is optional; practices
/// check for what they need and answer `unknown` when it is missing.
#[derive(Clone, Default)]
pub struct PracticeContext {
    /// Inspector over the repository's files.
    pub file_inspector: Option<Arc<dyn FileInspector>>,
    /// Detected project facts.
    pub project_component: ProjectComponent,
    /// Hosted VCS provider for the repository, if configured.
    pub vcs: Option<Arc<dyn VcsService>>,
}

impl PracticeContext {
    /// Creates a context with an inspector and no provider services.
    pub fn new(
        file_inspector: Arc<dyn FileInspector>,
        project_component: ProjectComponent,
    ) -> Self {
        Self {
            file_inspector: Some(file_inspector),
            project_component,
            vcs: None,
        }
    }

    /// Returns a copy with the given VCS service attached.
    #[must_use]
    pub fn with_vcs(mut self, vcs: Arc<dyn VcsService>) -> Self {
        self.vcs = Some(vcs);
        self
    }

    /// Returns a copy without a file inspector.
    #[must_use]
    pub fn without_file_inspector(mut self) -> Self {
        self.file_inspector = None;
        self
    }
}

impl fmt::Debug for PracticeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticeContext")
            .field("file_inspector", &self.file_inspector.is_some())
            .field("project_component", &self.project_component)
            .field("vcs", &self.vcs.as_ref().map(|v| v.provider_name()))
            .finish()
    }
}
