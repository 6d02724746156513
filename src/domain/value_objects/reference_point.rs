/// How a point string was classified by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCategory {
    /// Empty point: the checked-out branch and the branch it tracks
    CurrentBranch,
    /// An existing local branch
    LocalBranch,
    /// A local branch created from `origin/<point>`
    CreatedLocalBranch,
    /// A remote-tracking branch, mapped back to a local branch
    RemoteTrackingBranch,
    /// An existing tag
    Tag,
    /// Nothing matched (only produced when resolution is lenient)
    Unresolved,
}

/// The concrete reference a point resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPoint {
    /// A local branch and the remote-tracking branch it follows. `remote` is
    /// only `None` when lenient resolution accepted a branch without upstream.
    Branch {
        local: String,
        remote: Option<String>,
    },
    Tag(String),
    Unresolved,
}

impl ResolvedPoint {
    pub fn branch(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self::Branch {
            local: local.into(),
            remote: Some(remote.into()),
        }
    }

    pub fn local(&self) -> Option<&str> {
        match self {
            Self::Branch { local, .. } => Some(local),
            _ => None,
        }
    }

    pub fn remote(&self) -> Option<&str> {
        match self {
            Self::Branch { remote, .. } => remote.as_deref(),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// The (local, remote) pair with missing halves as empty strings, which is
    /// what stream-config layering keys on.
    pub fn stream_names(&self) -> (&str, &str) {
        (self.local().unwrap_or(""), self.remote().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_accessors() {
        let point = ResolvedPoint::branch("feature", "origin/feature");
        assert_eq!(point.local(), Some("feature"));
        assert_eq!(point.remote(), Some("origin/feature"));
        assert_eq!(point.tag(), None);
    }

    #[test]
    fn test_stream_names_for_partial_points() {
        let dangling = ResolvedPoint::Branch {
            local: "scratch".to_string(),
            remote: None,
        };
        assert_eq!(dangling.stream_names(), ("scratch", ""));
        assert_eq!(ResolvedPoint::Unresolved.stream_names(), ("", ""));
        assert_eq!(ResolvedPoint::Tag("v1".into()).stream_names(), ("", ""));
    }
}
