/// SCM (Source Control Management) operations infrastructure
///
/// Git and Subversion backends behind the capability traits the orchestrator consumes.
pub mod git_scm;
pub mod scm_factory;
pub mod scm_interface;
pub mod svn_scm;

pub use scm_factory::{ScmFactory, ScmProvider};
pub use scm_interface::{
    Divergence, GitOperations, PushOutcome, RemoteConfig, ScmError, SvnInfo, SvnOperations,
    SvnStatusEntry, TrackedBranch, UpdateOutcome, WorkingTreeState,
};
