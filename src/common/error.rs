use std::path::PathBuf;
use thiserror::Error;

use crate::domain::entities::config_snapshot::ConfigParseError;
use crate::infrastructure::scm::ScmError;

/// Exit status used for every fatal error, including usage errors reported by clap.
pub const FATAL_EXIT_CODE: i32 = 2;

#[derive(Error, Debug)]
pub enum CmgError {
    #[error("Bad format of stream/baseline config: {message} (section '{section}')")]
    ConfigError {
        section: String,
        key: Option<String>,
        message: String,
    },

    #[error("Failed to read config: {source}")]
    ConfigParseError {
        #[from]
        source: ConfigParseError,
    },

    #[error("Container not found: no '{marker}' file in {start} or any parent directory")]
    ContainerNotFound { marker: String, start: PathBuf },

    #[error("{message}")]
    ResolutionError { message: String, point: String },

    #[error("Version control operation failed: {source}")]
    BackendError {
        #[from]
        source: ScmError,
    },

    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Component '{component}': {message}")]
    ComponentError { component: String, message: String },

    #[error("CMG is running under offline mode: {message}")]
    Offline { message: String },

    #[error("Aborted by operator: {context}")]
    Aborted { context: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CmgError {
    pub fn config_error(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigError {
            section: section.into(),
            key: None,
            message: message.into(),
        }
    }

    pub fn missing_key(section: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        Self::ConfigError {
            section: section.into(),
            message: format!("no '{}' option", key),
            key: Some(key),
        }
    }

    pub fn resolution_error(point: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResolutionError {
            message: message.into(),
            point: point.into(),
        }
    }

    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    pub fn component_error(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ComponentError {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn offline(message: impl Into<String>) -> Self {
        Self::Offline {
            message: message.into(),
        }
    }

    pub fn aborted(context: impl Into<String>) -> Self {
        Self::Aborted {
            context: context.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Process exit status for this error. Every failure is fatal to the whole run.
    pub fn exit_code(&self) -> i32 {
        FATAL_EXIT_CODE
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. } | Self::ConfigParseError { .. })
    }
}

impl From<std::io::Error> for CmgError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("File system operation failed", None, error)
    }
}

impl From<walkdir::Error> for CmgError {
    fn from(error: walkdir::Error) -> Self {
        let path = error.path().map(|p| p.to_path_buf());
        match error.into_io_error() {
            Some(io) => Self::filesystem_error_with_source("Failed to walk directory tree", path, io),
            None => Self::filesystem_error("Failed to walk directory tree", path),
        }
    }
}
