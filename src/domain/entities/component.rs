use crate::common::error::CmgError;
use crate::common::result::{CmgResult, OptionExt};
use crate::domain::entities::config_snapshot::ConfigSnapshot;
use crate::domain::value_objects::scm_type::ScmType;

/// What a Git component should be pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitTarget {
    /// A point resolved with the branch rules (may be empty)
    Branch(String),
    /// An existing tag
    Tag(String),
}

/// Where a Subversion working copy should be switched to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvnLocation {
    Branch { url: String, revision: Option<String> },
    Tag { tags_url: String, tag: String },
}

impl SvnLocation {
    /// Full repository URL of the location
    pub fn url(&self) -> String {
        match self {
            Self::Branch { url, .. } => url.clone(),
            Self::Tag { tags_url, tag } => format!("{}/{}", tags_url.trim_end_matches('/'), tag),
        }
    }

    pub fn revision(&self) -> Option<&str> {
        match self {
            Self::Branch { revision, .. } => revision.as_deref(),
            Self::Tag { .. } => None,
        }
    }

    /// Tags and fixed revisions never move, so they are never committed to
    pub fn is_pinned(&self) -> bool {
        match self {
            Self::Branch { revision, .. } => revision.is_some(),
            Self::Tag { .. } => true,
        }
    }
}

/// Backend-specific connection parameters of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSource {
    Git {
        url: String,
        pushurl: Option<String>,
        target: GitTarget,
    },
    Subversion(SvnLocation),
    /// Plain copy of a file or a directory tree
    Copy { url: String },
}

/// One component section of a configuration snapshot, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub kind: ScmType,
    pub source: ComponentSource,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl Component {
    /// Backend kind declared by the `type` option of `section`.
    pub fn kind_of(snapshot: &ConfigSnapshot, section: &str) -> CmgResult<ScmType> {
        let raw = snapshot.get(section, "type").ok_or_missing_key(section, "type")?;
        raw.parse::<ScmType>()
            .map_err(|e| CmgError::config_error(section, e.to_string()))
    }

    /// Validate the section `name` of `snapshot`.
    pub fn from_snapshot(snapshot: &ConfigSnapshot, name: &str) -> CmgResult<Self> {
        let kind = Self::kind_of(snapshot, name)?;
        let get = |key: &str| snapshot.get(name, key);

        let source = match kind {
            ScmType::Git => {
                let url = get("url").ok_or_missing_key(name, "url")?.to_string();
                let target = if let Some(branch) = get("branch") {
                    GitTarget::Branch(branch.to_string())
                } else if let Some(tag) = non_empty(get("tag")) {
                    GitTarget::Tag(tag)
                } else {
                    return Err(CmgError::missing_key(name, "branch"));
                };
                ComponentSource::Git {
                    url,
                    pushurl: non_empty(get("pushurl")),
                    target,
                }
            }
            ScmType::Svn => {
                let location = if let Some(url) = non_empty(get("branch_url")) {
                    SvnLocation::Branch {
                        url,
                        revision: non_empty(get("revision")),
                    }
                } else {
                    let tags_url = get("tags_url").ok_or_missing_key(name, "branch_url")?;
                    let tag = non_empty(get("tag")).ok_or_missing_key(name, "tag")?;
                    SvnLocation::Tag {
                        tags_url: tags_url.to_string(),
                        tag,
                    }
                };
                ComponentSource::Subversion(location)
            }
            ScmType::File | ScmType::Dir => ComponentSource::Copy {
                url: get("url").ok_or_missing_key(name, "url")?.to_string(),
            },
        };

        Ok(Self {
            name: name.to_string(),
            kind,
            source,
        })
    }

    /// Validate every component of `snapshot` in declaration order.
    ///
    /// Fails on the first invalid section so that nothing is dispatched for a
    /// snapshot with any bad component.
    pub fn all_from(snapshot: &ConfigSnapshot) -> CmgResult<Vec<Self>> {
        snapshot
            .section_names()
            .map(|name| Self::from_snapshot(snapshot, name))
            .collect()
    }
}
