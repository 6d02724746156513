//! Container trees and run contexts for tests

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use cmg::application::context::RunContext;
use cmg::application::services::decision::{
    CleanupChoice, CleanupRequest, ConfirmKind, ConfirmRequest, Confirmation, Decider,
    GitTagChoice, GitTagRequest, SvnTagChoice, SvnTagRequest,
};
use cmg::application::services::reporter::RecordingReporter;
use cmg::domain::entities::settings::Settings;

use super::fake_scm::{FakeGit, FakeProvider};

/// Answers every question from a fixed script and records what was asked.
pub struct ScriptedDecider {
    pub cleanup: CleanupChoice,
    pub confirm: Confirmation,
    pub local_branch: Option<String>,
    pub git_tag: GitTagChoice,
    pub svn_tag: SvnTagChoice,
    pub tags_url: Option<String>,
    pub asked: Mutex<Vec<String>>,
}

impl Default for ScriptedDecider {
    fn default() -> Self {
        Self {
            cleanup: CleanupChoice::Abort,
            confirm: Confirmation::Continue,
            local_branch: None,
            git_tag: GitTagChoice::CreateBaseline,
            svn_tag: SvnTagChoice::UseRevision,
            tags_url: None,
            asked: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedDecider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    fn record(&self, question: String) {
        self.asked.lock().unwrap().push(question);
    }
}

impl Decider for ScriptedDecider {
    fn cleanup(&self, request: &CleanupRequest) -> CleanupChoice {
        self.record(format!("cleanup {}", request.location.display()));
        self.cleanup
    }

    fn confirm(&self, request: &ConfirmRequest) -> Confirmation {
        self.record(format!("confirm {:?}", request.kind));
        self.confirm
    }

    fn select_local_branch(&self, remote: &str, _candidates: &[String]) -> Option<String> {
        self.record(format!("select {}", remote));
        self.local_branch.clone()
    }

    fn git_tag(&self, request: &GitTagRequest) -> GitTagChoice {
        self.record(format!("git tag {}", request.location.display()));
        self.git_tag.clone()
    }

    fn svn_tag(&self, request: &SvnTagRequest) -> SvnTagChoice {
        self.record(format!("svn tag {}", request.location.display()));
        self.svn_tag.clone()
    }

    fn tags_url(&self, branch_url: &str) -> Option<String> {
        self.record(format!("tags_url {}", branch_url));
        self.tags_url.clone()
    }
}

/// Whether `kind` was among the confirmations asked
pub fn was_confirmed(decider: &ScriptedDecider, kind: ConfirmKind) -> bool {
    decider.asked().contains(&format!("confirm {:?}", kind))
}

/// A container directory with a `_stream` file and in-memory backends
pub struct ContainerFixture {
    pub temp_dir: TempDir,
    pub provider: Arc<FakeProvider>,
    pub reporter: Arc<RecordingReporter>,
    pub container: Arc<FakeGit>,
}

impl ContainerFixture {
    /// Container checked out on `feature`, tracking `origin/feature`
    pub fn new(stream: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("_stream"), stream).expect("Failed to write _stream");
        let provider = Arc::new(FakeProvider::new());
        let container = provider.add_git(
            FakeGit::on_branch(temp_dir.path(), "feature")
                .with_branch("master", Some("origin/master"))
                .with_remote_branch("origin/master"),
        );
        Self {
            temp_dir,
            provider,
            reporter: Arc::new(RecordingReporter::new()),
            container,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Write a file below the container root, creating parent directories
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn add_git(&self, name: &str, git: impl FnOnce(PathBuf) -> FakeGit) -> Arc<FakeGit> {
        self.provider.add_git(git(self.path(name)))
    }

    pub fn context(&self, decider: Arc<dyn Decider>) -> RunContext {
        self.context_with(decider, Settings::default())
    }

    pub fn context_with(&self, decider: Arc<dyn Decider>, settings: Settings) -> RunContext {
        RunContext::new(
            self.root(),
            settings,
            self.provider.clone(),
            decider,
            self.reporter.clone(),
        )
    }
}
