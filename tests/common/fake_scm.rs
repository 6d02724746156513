//! In-memory Git and Subversion backends
//!
//! Each fake keeps its state behind a mutex and logs every mutating call so
//! tests can check what a verb did to which work tree.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cmg::infrastructure::scm::{
    Divergence, GitOperations, PushOutcome, RemoteConfig, ScmError, ScmProvider, SvnInfo,
    SvnOperations, SvnStatusEntry, TrackedBranch, UpdateOutcome, WorkingTreeState,
};

#[derive(Debug, Default)]
pub struct GitState {
    pub repository: bool,
    pub branches: Vec<TrackedBranch>,
    pub remote_branches: Vec<String>,
    pub tags: Vec<String>,
    pub tags_containing_head: Vec<String>,
    pub tags_at_head: Vec<String>,
    pub annotations: HashMap<String, String>,
    pub dirty: Option<String>,
    pub divergence: HashMap<String, Divergence>,
    pub remote: RemoteConfig,
    pub config: HashMap<String, String>,
    pub update: Option<UpdateOutcome>,
    pub pushes: VecDeque<PushOutcome>,
    pub calls: Vec<String>,
}

/// Git repository that lives only in memory
pub struct FakeGit {
    root: PathBuf,
    state: Mutex<GitState>,
}

impl FakeGit {
    /// A directory with no repository yet
    pub fn absent(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: Mutex::new(GitState::default()),
        }
    }

    /// A repository checked out on `head`, which tracks `origin/<head>`
    pub fn on_branch(root: impl Into<PathBuf>, head: &str) -> Self {
        let git = Self::absent(root);
        git.edit(|s| {
            s.repository = true;
            s.branches.push(TrackedBranch {
                local: head.to_string(),
                upstream: Some(format!("origin/{}", head)),
                is_head: true,
            });
            s.remote_branches.push(format!("origin/{}", head));
        });
        git
    }

    pub fn edit(&self, f: impl FnOnce(&mut GitState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn with_branch(self, local: &str, upstream: Option<&str>) -> Self {
        self.edit(|s| {
            s.branches.push(TrackedBranch {
                local: local.to_string(),
                upstream: upstream.map(str::to_string),
                is_head: false,
            })
        });
        self
    }

    pub fn with_remote_branch(self, name: &str) -> Self {
        self.edit(|s| s.remote_branches.push(name.to_string()));
        self
    }

    pub fn with_tag(self, tag: &str) -> Self {
        self.edit(|s| s.tags.push(tag.to_string()));
        self
    }

    /// Tags that contain HEAD (and therefore exist)
    pub fn with_tags_containing_head(self, tags: &[&str]) -> Self {
        self.edit(|s| {
            for tag in tags {
                s.tags.push(tag.to_string());
                s.tags_containing_head.push(tag.to_string());
            }
        });
        self
    }

    pub fn with_remote_url(self, url: &str) -> Self {
        self.edit(|s| s.remote.url = Some(url.to_string()));
        self
    }

    pub fn with_dirty_tree(self, summary: &str) -> Self {
        self.edit(|s| s.dirty = Some(summary.to_string()));
        self
    }

    pub fn with_update(self, outcome: UpdateOutcome) -> Self {
        self.edit(|s| s.update = Some(outcome));
        self
    }

    pub fn with_pushes(self, pushes: Vec<PushOutcome>) -> Self {
        self.edit(|s| s.pushes = pushes.into());
        self
    }

    pub fn with_config(self, key: &str, value: &str) -> Self {
        self.edit(|s| {
            s.config.insert(key.to_string(), value.to_string());
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Whether any logged call starts with `prefix`
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    pub fn head(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .branches
            .iter()
            .find(|b| b.is_head)
            .map(|b| b.local.clone())
    }

    pub fn annotation(&self, tag: &str) -> Option<String> {
        self.state.lock().unwrap().annotations.get(tag).cloned()
    }

    pub fn branch_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.branches.iter().map(|b| b.local.clone()).collect()
    }

    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn failed(command: &str, stderr: &str) -> ScmError {
    ScmError::command_failed(command, 1, stderr)
}

#[async_trait]
impl GitOperations for FakeGit {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_repository(&self) -> bool {
        self.state.lock().unwrap().repository
    }

    async fn clone_from(&self, url: &str) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("clone {}", url));
        s.repository = true;
        s.remote.url = Some(url.to_string());
        // the default branch of the clone is the first remote branch
        if let Some(first) = s.remote_branches.first().cloned() {
            let local = first.trim_start_matches("origin/").to_string();
            s.branches.push(TrackedBranch {
                local,
                upstream: Some(first),
                is_head: true,
            });
        }
        Ok(())
    }

    async fn config_value(&self, key: &str) -> Result<Option<String>, ScmError> {
        Ok(self.state.lock().unwrap().config.get(key).cloned())
    }

    async fn local_branches(&self) -> Result<Vec<TrackedBranch>, ScmError> {
        Ok(self.state.lock().unwrap().branches.clone())
    }

    async fn remote_branches(&self) -> Result<Vec<String>, ScmError> {
        Ok(self.state.lock().unwrap().remote_branches.clone())
    }

    async fn tags(&self) -> Result<Vec<String>, ScmError> {
        Ok(self.state.lock().unwrap().tags.clone())
    }

    async fn tags_containing_head(&self) -> Result<Vec<String>, ScmError> {
        Ok(self.state.lock().unwrap().tags_containing_head.clone())
    }

    async fn tags_at_head(&self) -> Result<Vec<String>, ScmError> {
        Ok(self.state.lock().unwrap().tags_at_head.clone())
    }

    async fn tag_annotation(&self, tag: &str) -> Result<String, ScmError> {
        self.state
            .lock()
            .unwrap()
            .annotations
            .get(tag)
            .cloned()
            .ok_or_else(|| failed(&format!("git tag -l --format {}", tag), "no annotation"))
    }

    async fn fetch(&self) -> Result<(), ScmError> {
        self.log("fetch".to_string());
        Ok(())
    }

    async fn checkout_branch(&self, branch: &str) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        if !s.branches.iter().any(|b| b.local == branch) {
            return Err(failed(&format!("git checkout {}", branch), "no such branch"));
        }
        s.calls.push(format!("checkout {}", branch));
        for b in s.branches.iter_mut() {
            b.is_head = b.local == branch;
        }
        s.tags_at_head.clear();
        Ok(())
    }

    async fn checkout_tag(&self, tag: &str) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("checkout tag {}", tag));
        for b in s.branches.iter_mut() {
            b.is_head = false;
        }
        s.tags_at_head = vec![tag.to_string()];
        Ok(())
    }

    async fn merge(&self, remote: &str) -> Result<UpdateOutcome, ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("merge {}", remote));
        Ok(s.update.clone().unwrap_or(UpdateOutcome::UpToDate))
    }

    async fn rebase(&self, remote: &str) -> Result<UpdateOutcome, ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("rebase {}", remote));
        Ok(s.update.clone().unwrap_or(UpdateOutcome::UpToDate))
    }

    async fn push_branch(&self, branch: &str) -> Result<PushOutcome, ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("push {}", branch));
        Ok(s.pushes.pop_front().unwrap_or(PushOutcome::Pushed))
    }

    async fn push_tag(&self, tag: &str) -> Result<PushOutcome, ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("push tag {}", tag));
        Ok(s.pushes.pop_front().unwrap_or(PushOutcome::Pushed))
    }

    async fn create_branch(&self, local: &str, remote: &str) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("branch {} {}", local, remote));
        s.branches.push(TrackedBranch {
            local: local.to_string(),
            upstream: Some(remote.to_string()),
            is_head: false,
        });
        Ok(())
    }

    async fn create_tag(&self, tag: &str) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("tag {}", tag));
        s.tags.push(tag.to_string());
        s.tags_at_head.push(tag.to_string());
        s.tags_containing_head.push(tag.to_string());
        Ok(())
    }

    async fn create_annotated_tag(&self, tag: &str, message_file: &Path) -> Result<(), ScmError> {
        let message = std::fs::read_to_string(message_file)?;
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("tag -a {}", tag));
        s.tags.push(tag.to_string());
        s.tags_at_head.push(tag.to_string());
        s.tags_containing_head.push(tag.to_string());
        s.annotations.insert(tag.to_string(), message);
        Ok(())
    }

    async fn working_tree(&self) -> Result<WorkingTreeState, ScmError> {
        let s = self.state.lock().unwrap();
        Ok(WorkingTreeState {
            clean: s.dirty.is_none(),
            detached: !s.branches.iter().any(|b| b.is_head),
            summary: s.dirty.clone().unwrap_or_default(),
        })
    }

    async fn divergence(&self, remote: &str) -> Result<Divergence, ScmError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .divergence
            .get(remote)
            .copied()
            .unwrap_or_default())
    }

    async fn remote_config(&self) -> Result<RemoteConfig, ScmError> {
        Ok(self.state.lock().unwrap().remote.clone())
    }

    async fn set_remote_config(&self, config: &RemoteConfig) -> Result<(), ScmError> {
        self.state.lock().unwrap().remote = config.clone();
        Ok(())
    }

    async fn commit_all(&self) -> Result<bool, ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push("commit -a".to_string());
        s.dirty = None;
        Ok(true)
    }

    async fn reset_and_clean(&self) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push("reset --hard".to_string());
        s.dirty = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SvnState {
    pub working_copy: bool,
    pub url: String,
    pub revision: String,
    /// Tip revision per URL
    pub tips: HashMap<String, String>,
    pub status: Vec<SvnStatusEntry>,
    pub calls: Vec<String>,
}

/// Subversion working copy that lives only in memory
pub struct FakeSvn {
    root: PathBuf,
    state: Mutex<SvnState>,
}

impl FakeSvn {
    pub fn absent(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: Mutex::new(SvnState::default()),
        }
    }

    /// A working copy of `url` at `revision`
    pub fn at(root: impl Into<PathBuf>, url: &str, revision: &str) -> Self {
        let svn = Self::absent(root);
        svn.edit(|s| {
            s.working_copy = true;
            s.url = url.to_string();
            s.revision = revision.to_string();
            s.tips.insert(url.to_string(), revision.to_string());
        });
        svn
    }

    pub fn edit(&self, f: impl FnOnce(&mut SvnState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn with_status(self, code: char, path: &str) -> Self {
        self.edit(|s| {
            s.status.push(SvnStatusEntry {
                code,
                path: path.to_string(),
            })
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn tip(s: &SvnState, url: &str) -> String {
        s.tips.get(url).cloned().unwrap_or_else(|| "1".to_string())
    }
}

#[async_trait]
impl SvnOperations for FakeSvn {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_working_copy(&self) -> bool {
        self.state.lock().unwrap().working_copy
    }

    async fn checkout(&self, url: &str, revision: Option<&str>) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("checkout {}", url));
        let revision = revision.map(str::to_string).unwrap_or_else(|| Self::tip(&s, url));
        s.working_copy = true;
        s.url = url.to_string();
        s.revision = revision;
        Ok(())
    }

    async fn status(&self) -> Result<Vec<SvnStatusEntry>, ScmError> {
        Ok(self.state.lock().unwrap().status.clone())
    }

    async fn info(&self) -> Result<SvnInfo, ScmError> {
        let s = self.state.lock().unwrap();
        Ok(SvnInfo {
            url: s.url.clone(),
            revision: s.revision.clone(),
        })
    }

    async fn remote_revision(&self, url: &str) -> Result<String, ScmError> {
        let s = self.state.lock().unwrap();
        Ok(Self::tip(&s, url))
    }

    async fn switch(&self, url: &str, revision: Option<&str>) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("switch {}", url));
        let revision = revision.map(str::to_string).unwrap_or_else(|| Self::tip(&s, url));
        s.url = url.to_string();
        s.revision = revision;
        Ok(())
    }

    async fn update(&self) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push("update".to_string());
        let tip = Self::tip(&s, &s.url);
        s.revision = tip;
        Ok(())
    }

    async fn add(&self, paths: &[String]) -> Result<(), ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(format!("add {}", paths.join(" ")));
        for entry in s.status.iter_mut() {
            if paths.contains(&entry.path) {
                entry.code = 'A';
            }
        }
        Ok(())
    }

    async fn commit(&self) -> Result<bool, ScmError> {
        let mut s = self.state.lock().unwrap();
        s.calls.push("commit".to_string());
        s.status.clear();
        Ok(true)
    }

    async fn copy(&self, from: &str, revision: &str, to: &str, _message: &str) -> Result<(), ScmError> {
        self.log(format!("copy {}@{} {}", from, revision, to));
        Ok(())
    }
}

impl FakeSvn {
    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

/// Hands out the registered fakes; unknown directories get an absent backend.
#[derive(Default)]
pub struct FakeProvider {
    gits: Mutex<HashMap<PathBuf, Arc<FakeGit>>>,
    svns: Mutex<HashMap<PathBuf, Arc<FakeSvn>>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_git(&self, git: FakeGit) -> Arc<FakeGit> {
        let git = Arc::new(git);
        self.gits
            .lock()
            .unwrap()
            .insert(git.root.clone(), git.clone());
        git
    }

    pub fn add_svn(&self, svn: FakeSvn) -> Arc<FakeSvn> {
        let svn = Arc::new(svn);
        self.svns
            .lock()
            .unwrap()
            .insert(svn.root.clone(), svn.clone());
        svn
    }
}

impl ScmProvider for FakeProvider {
    fn git(&self, root: &Path) -> Arc<dyn GitOperations> {
        let git = self
            .gits
            .lock()
            .unwrap()
            .entry(root.to_path_buf())
            .or_insert_with(|| Arc::new(FakeGit::absent(root)))
            .clone();
        git
    }

    fn svn(&self, root: &Path) -> Arc<dyn SvnOperations> {
        let svn = self
            .svns
            .lock()
            .unwrap()
            .entry(root.to_path_buf())
            .or_insert_with(|| Arc::new(FakeSvn::absent(root)))
            .clone();
        svn
    }
}
