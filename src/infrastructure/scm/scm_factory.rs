use super::git_scm::GitScm;
use super::scm_interface::{GitOperations, SvnOperations};
use super::svn_scm::SvnScm;
use crate::infrastructure::process::{CommandRunner, ProcessRunner};
use std::path::Path;
use std::sync::Arc;

/// Hands out backend instances bound to a directory.
///
/// The orchestrator only sees this trait, so tests can swap in in-memory backends.
pub trait ScmProvider: Send + Sync {
    /// Git backend for the work tree at `root`
    fn git(&self, root: &Path) -> Arc<dyn GitOperations>;

    /// Subversion backend for the working copy at `root`
    fn svn(&self, root: &Path) -> Arc<dyn SvnOperations>;
}

/// Factory for the process-backed SCM implementations
pub struct ScmFactory {
    runner: Arc<dyn CommandRunner>,
}

impl Default for ScmFactory {
    fn default() -> Self {
        Self::new(Arc::new(ProcessRunner::new()))
    }
}

impl ScmFactory {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl ScmProvider for ScmFactory {
    fn git(&self, root: &Path) -> Arc<dyn GitOperations> {
        Arc::new(GitScm::new(root, self.runner.clone()))
    }

    fn svn(&self, root: &Path) -> Arc<dyn SvnOperations> {
        Arc::new(SvnScm::new(root, self.runner.clone()))
    }
}
