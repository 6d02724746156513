use std::fmt;
use std::str::FromStr;

/// Backend kind of a component, as declared by the `type` option of its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScmType {
    /// Git repository cloned from `url`
    Git,
    /// Subversion working copy
    Svn,
    /// Single file copied from `url`
    File,
    /// Directory tree copied from `url`
    Dir,
}

impl fmt::Display for ScmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScmType::Git => write!(f, "git"),
            ScmType::Svn => write!(f, "svn"),
            ScmType::File => write!(f, "file"),
            ScmType::Dir => write!(f, "dir"),
        }
    }
}

impl FromStr for ScmType {
    type Err = ScmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "git" => Ok(ScmType::Git),
            "svn" | "subversion" => Ok(ScmType::Svn),
            "fl" | "file" => Ok(ScmType::File),
            "dir" | "directory" => Ok(ScmType::Dir),
            _ => Err(ScmTypeError::UnsupportedScmType(s.to_string())),
        }
    }
}

/// Errors that can occur when parsing a backend kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScmTypeError {
    /// The specified type is not supported
    UnsupportedScmType(String),
}

impl fmt::Display for ScmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScmTypeError::UnsupportedScmType(scm) => {
                write!(
                    f,
                    "type '{}' is not supported. Supported types are: git, svn, file, dir",
                    scm
                )
            }
        }
    }
}

impl std::error::Error for ScmTypeError {}
