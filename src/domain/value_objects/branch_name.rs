use std::fmt;

/// Name of the only remote the container and its Git components talk to.
pub const DEFAULT_REMOTE: &str = "origin";

const REMOTES_PREFIX: &str = "remotes/";

/// A remote-tracking branch such as `origin/master`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteBranch {
    remote: String,
    branch: String,
}

impl RemoteBranch {
    pub fn new(remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    /// Remote-tracking branch of `origin` with the given base name
    pub fn origin(branch: impl Into<String>) -> Self {
        Self::new(DEFAULT_REMOTE, branch)
    }

    /// Parse `origin/x` or `remotes/origin/x`. Anything else is not a remote-tracking name.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.strip_prefix(REMOTES_PREFIX).unwrap_or(name);
        let branch = name.strip_prefix(DEFAULT_REMOTE)?.strip_prefix('/')?;
        if branch.is_empty() {
            return None;
        }
        Some(Self::origin(branch))
    }

    /// Base name on the remote side, e.g. `master` for `origin/master`
    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }
}

impl fmt::Display for RemoteBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remote, self.branch)
    }
}

/// Whether `name` is spelled as a remote-tracking branch and therefore can never be a local one.
pub fn is_remote_qualified(name: &str) -> bool {
    name.starts_with(REMOTES_PREFIX) || name.starts_with(&format!("{}/", DEFAULT_REMOTE))
}

/// Replace path separators so a branch name can be used as a file-name suffix.
pub fn sanitize_for_file_name(branch: &str) -> String {
    branch.replace(['/', '\\'], "_")
}
