use async_trait::async_trait;
use std::path::Path;

use crate::domain::value_objects::branch_name::is_remote_qualified;

/// A local branch and the remote-tracking branch it follows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedBranch {
    pub local: String,
    /// Short upstream name such as `origin/master`
    pub upstream: Option<String>,
    /// Whether this branch is checked out
    pub is_head: bool,
}

/// Commit counts between HEAD and a remote-tracking branch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Divergence {
    pub ahead: usize,
    pub behind: usize,
}

impl Divergence {
    pub fn is_diverged(&self) -> bool {
        self.ahead > 0 && self.behind > 0
    }

    pub fn is_even(&self) -> bool {
        self.ahead == 0 && self.behind == 0
    }
}

/// Result of a merge or rebase onto a remote-tracking branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    UpToDate,
    /// The backend stopped with conflicts; the text is its own report
    Conflict(String),
}

/// Result of a push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    UpToDate,
    /// The remote refused the update (non fast-forward, hook, ...)
    Rejected(String),
}

/// `remote.origin.url` and `remote.origin.pushurl`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub pushurl: Option<String>,
}

/// Cleanliness of a Git working tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeState {
    pub clean: bool,
    /// HEAD does not point at a branch
    pub detached: bool,
    /// Short status listing shown to the operator
    pub summary: String,
}

/// One line of `svn status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnStatusEntry {
    pub code: char,
    pub path: String,
}

impl SvnStatusEntry {
    pub fn is_unversioned(&self) -> bool {
        self.code == '?'
    }
}

/// URL and revision reported by `svn info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnInfo {
    pub url: String,
    pub revision: String,
}

/// Query and mutate operations on one Git repository.
///
/// Implementations are bound to a single directory (the container or one component).
#[async_trait]
pub trait GitOperations: Send + Sync {
    /// Directory of the work tree
    fn root(&self) -> &Path;

    /// Whether the directory holds a Git repository
    fn is_repository(&self) -> bool;

    /// Clone `url` into the work tree directory.
    async fn clone_from(&self, url: &str) -> Result<(), ScmError>;

    /// `git config --get <key>`; `None` when the key is unset.
    async fn config_value(&self, key: &str) -> Result<Option<String>, ScmError>;

    async fn local_branches(&self) -> Result<Vec<TrackedBranch>, ScmError>;

    /// Remote-tracking branches in short form (`origin/x`), symbolic `HEAD` refs excluded
    async fn remote_branches(&self) -> Result<Vec<String>, ScmError>;

    async fn tags(&self) -> Result<Vec<String>, ScmError>;

    /// Tags whose commit contains HEAD
    async fn tags_containing_head(&self) -> Result<Vec<String>, ScmError>;

    /// Tags pointing exactly at HEAD
    async fn tags_at_head(&self) -> Result<Vec<String>, ScmError>;

    /// Annotation message of `tag`
    async fn tag_annotation(&self, tag: &str) -> Result<String, ScmError>;

    async fn fetch(&self) -> Result<(), ScmError>;

    async fn checkout_branch(&self, branch: &str) -> Result<(), ScmError>;

    async fn checkout_tag(&self, tag: &str) -> Result<(), ScmError>;

    async fn merge(&self, remote: &str) -> Result<UpdateOutcome, ScmError>;

    async fn rebase(&self, remote: &str) -> Result<UpdateOutcome, ScmError>;

    /// Push HEAD to `branch` on origin
    async fn push_branch(&self, branch: &str) -> Result<PushOutcome, ScmError>;

    async fn push_tag(&self, tag: &str) -> Result<PushOutcome, ScmError>;

    /// Create `local` tracking `remote`
    async fn create_branch(&self, local: &str, remote: &str) -> Result<(), ScmError>;

    /// Lightweight tag at HEAD
    async fn create_tag(&self, tag: &str) -> Result<(), ScmError>;

    /// Annotated tag at HEAD whose message is read from `message_file`
    async fn create_annotated_tag(&self, tag: &str, message_file: &Path) -> Result<(), ScmError>;

    async fn working_tree(&self) -> Result<WorkingTreeState, ScmError>;

    async fn divergence(&self, remote: &str) -> Result<Divergence, ScmError>;

    async fn remote_config(&self) -> Result<RemoteConfig, ScmError>;

    /// Point origin at `config.url`, with the standard fetch refspec and the push URL
    async fn set_remote_config(&self, config: &RemoteConfig) -> Result<(), ScmError>;

    /// Stage everything and commit with the operator's editor. `false` when the commit did not happen.
    async fn commit_all(&self) -> Result<bool, ScmError>;

    /// Hard reset to HEAD and remove untracked files
    async fn reset_and_clean(&self) -> Result<(), ScmError>;

    /// The checked-out branch and its upstream. `None` when HEAD is detached.
    async fn current_pair(&self) -> Result<Option<(String, Option<String>)>, ScmError> {
        Ok(self
            .local_branches()
            .await?
            .into_iter()
            .find(|b| b.is_head)
            .map(|b| (b.local, b.upstream)))
    }

    async fn current_branch(&self) -> Result<Option<String>, ScmError> {
        Ok(self.current_pair().await?.map(|(local, _)| local))
    }

    /// Upstream of a local branch. Outer `None` when the branch does not exist.
    async fn upstream_of(&self, local: &str) -> Result<Option<Option<String>>, ScmError> {
        Ok(self
            .local_branches()
            .await?
            .into_iter()
            .find(|b| b.local == local)
            .map(|b| b.upstream))
    }

    /// Local branches whose upstream is `remote`
    async fn locals_tracking(&self, remote: &str) -> Result<Vec<TrackedBranch>, ScmError> {
        Ok(self
            .local_branches()
            .await?
            .into_iter()
            .filter(|b| b.upstream.as_deref() == Some(remote))
            .collect())
    }

    async fn is_local_branch(&self, name: &str) -> Result<bool, ScmError> {
        if is_remote_qualified(name) {
            return Ok(false);
        }
        Ok(self.local_branches().await?.iter().any(|b| b.local == name))
    }

    async fn is_remote_branch(&self, name: &str) -> Result<bool, ScmError> {
        Ok(self.remote_branches().await?.iter().any(|b| b == name))
    }

    async fn is_tag(&self, name: &str) -> Result<bool, ScmError> {
        Ok(self.tags().await?.iter().any(|t| t == name))
    }

    async fn is_on_tag(&self, tag: &str) -> Result<bool, ScmError> {
        Ok(self.tags_at_head().await?.iter().any(|t| t == tag))
    }
}

/// Query and mutate operations on one Subversion working copy.
#[async_trait]
pub trait SvnOperations: Send + Sync {
    fn root(&self) -> &Path;

    fn is_working_copy(&self) -> bool;

    /// Check `url` out into the working copy directory, optionally at `revision`.
    async fn checkout(&self, url: &str, revision: Option<&str>) -> Result<(), ScmError>;

    /// Modified, added, deleted and unversioned entries
    async fn status(&self) -> Result<Vec<SvnStatusEntry>, ScmError>;

    async fn info(&self) -> Result<SvnInfo, ScmError>;

    /// Latest revision of `url` on the server
    async fn remote_revision(&self, url: &str) -> Result<String, ScmError>;

    /// Switch to `url` at `revision` (or the tip). May prompt for conflict resolution.
    async fn switch(&self, url: &str, revision: Option<&str>) -> Result<(), ScmError>;

    /// Bring the working copy to the tip of its URL
    async fn update(&self) -> Result<(), ScmError>;

    async fn add(&self, paths: &[String]) -> Result<(), ScmError>;

    /// Commit with the operator's editor. `false` when the commit did not happen.
    async fn commit(&self) -> Result<bool, ScmError>;

    /// Server-side copy of `from@revision` to `to`
    async fn copy(&self, from: &str, revision: &str, to: &str, message: &str) -> Result<(), ScmError>;
}

/// Errors raised while driving a version-control backend
#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("Repository not found at path: {path}")]
    RepositoryNotFound { path: String },

    #[error("Clone operation failed: {message}")]
    CloneFailed { message: String },

    #[error("SCM executable not found: {executable}")]
    ExecutableNotFound { executable: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Command execution failed: {command}, exit code: {exit_code}, stderr: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Unexpected output from {command}: {output}")]
    UnexpectedOutput { command: String, output: String },
}

impl ScmError {
    pub fn repository_not_found(path: &Path) -> Self {
        Self::RepositoryNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn clone_failed(message: impl Into<String>) -> Self {
        Self::CloneFailed {
            message: message.into(),
        }
    }

    pub fn executable_not_found(executable: impl Into<String>) -> Self {
        Self::ExecutableNotFound {
            executable: executable.into(),
        }
    }

    pub fn command_failed(
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn unexpected_output(command: impl Into<String>, output: impl Into<String>) -> Self {
        Self::UnexpectedOutput {
            command: command.into(),
            output: output.into(),
        }
    }
}
