/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - SCM operations (Git and Subversion executables)
/// - File system operations (stream files, baseline staging, plain copies)
/// - Process execution
pub mod filesystem;
pub mod process;
pub mod scm;

// Re-export commonly used types
pub use filesystem::StreamStore;
pub use process::{CommandRunner, ProcessRunner};
pub use scm::{GitOperations, ScmError, ScmFactory, ScmProvider, SvnOperations};
