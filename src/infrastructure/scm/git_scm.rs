use super::scm_interface::{
    Divergence, GitOperations, PushOutcome, RemoteConfig, ScmError, TrackedBranch, UpdateOutcome,
    WorkingTreeState,
};
use crate::domain::value_objects::branch_name::DEFAULT_REMOTE;
use crate::infrastructure::process::{CommandOutput, CommandRunner, Invocation};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Git backend driving the `git` executable in one work tree
pub struct GitScm {
    root: PathBuf,
    runner: Arc<dyn CommandRunner>,
    git_executable: String,
}

impl GitScm {
    /// Create a Git backend for the work tree at `root`
    pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
            git_executable: "git".to_string(),
        }
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation::new(&self.git_executable, &self.root).args(args.iter().copied())
    }

    fn map_spawn_error(&self, error: io::Error) -> ScmError {
        if error.kind() == io::ErrorKind::NotFound {
            ScmError::executable_not_found(&self.git_executable)
        } else {
            error.into()
        }
    }

    /// Execute a git command in the work tree
    async fn execute_git_command(&self, args: &[&str]) -> Result<CommandOutput, ScmError> {
        self.runner
            .run(&self.invocation(args))
            .await
            .map_err(|e| self.map_spawn_error(e))
    }

    /// Execute a git command and check for success
    async fn execute_git_command_checked(&self, args: &[&str]) -> Result<String, ScmError> {
        let output = self.execute_git_command(args).await?;
        if !output.is_success() {
            return Err(ScmError::command_failed(
                self.invocation(args).to_string(),
                output.exit_code,
                output.stderr.trim(),
            ));
        }
        Ok(output.stdout.trim_end().to_string())
    }

    async fn execute_git_interactive(&self, args: &[&str]) -> Result<i32, ScmError> {
        self.runner
            .run_interactive(&self.invocation(args))
            .await
            .map_err(|e| self.map_spawn_error(e))
    }

    async fn list_refs(&self, format: &str, pattern: &str) -> Result<Vec<String>, ScmError> {
        let format = format!("--format={}", format);
        let output = self
            .execute_git_command_checked(&["for-each-ref", &format, pattern])
            .await?;
        Ok(output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn integrate(&self, args: &[&str], remote: &str) -> Result<UpdateOutcome, ScmError> {
        if self.divergence(remote).await?.behind == 0 {
            return Ok(UpdateOutcome::UpToDate);
        }
        let output = self.execute_git_command(args).await?;
        if output.is_success() {
            Ok(UpdateOutcome::Updated)
        } else {
            let report = format!("{}{}", output.stdout, output.stderr);
            Ok(UpdateOutcome::Conflict(report.trim().to_string()))
        }
    }

    async fn push(&self, args: &[&str]) -> Result<PushOutcome, ScmError> {
        let output = self.execute_git_command(args).await?;
        let mut rejected = Vec::new();
        let mut all_up_to_date = true;
        for line in output.stdout.lines() {
            let mut fields = line.split('\t');
            let flag = fields.next().unwrap_or("");
            let refs = fields.next();
            if refs.is_none() {
                continue;
            }
            match flag.trim() {
                "!" => rejected.push(line.to_string()),
                "=" => {}
                _ => all_up_to_date = false,
            }
        }

        if !rejected.is_empty() {
            let mut report = rejected.join("\n");
            if !output.stderr.trim().is_empty() {
                report.push('\n');
                report.push_str(output.stderr.trim());
            }
            return Ok(PushOutcome::Rejected(report));
        }
        if !output.is_success() {
            return Err(ScmError::command_failed(
                self.invocation(args).to_string(),
                output.exit_code,
                output.stderr.trim(),
            ));
        }
        Ok(if all_up_to_date {
            PushOutcome::UpToDate
        } else {
            PushOutcome::Pushed
        })
    }
}

fn parse_tracked_branch(line: &str) -> Option<TrackedBranch> {
    let mut fields = line.split('\t');
    let head = fields.next()?;
    let local = fields.next()?.trim();
    if local.is_empty() {
        return None;
    }
    let upstream = fields.next().map(str::trim).filter(|u| !u.is_empty());
    Some(TrackedBranch {
        local: local.to_string(),
        upstream: upstream.map(str::to_string),
        is_head: head.trim() == "*",
    })
}

#[async_trait]
impl GitOperations for GitScm {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_repository(&self) -> bool {
        self.root.join(".git").exists()
    }

    async fn clone_from(&self, url: &str) -> Result<(), ScmError> {
        let parent = self
            .root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&parent).await?;

        let target = self.root.to_string_lossy().into_owned();
        let invocation = Invocation::new(&self.git_executable, &parent)
            .args(["clone", url])
            .arg(target);
        let code = self
            .runner
            .run_interactive(&invocation)
            .await
            .map_err(|e| self.map_spawn_error(e))?;
        if code != 0 {
            return Err(ScmError::clone_failed(format!(
                "git clone {} exited with {}",
                url, code
            )));
        }
        Ok(())
    }

    async fn config_value(&self, key: &str) -> Result<Option<String>, ScmError> {
        let output = self.execute_git_command(&["config", "--get", key]).await?;
        match output.exit_code {
            0 => Ok(Some(output.stdout.trim().to_string())),
            1 => Ok(None),
            code => Err(ScmError::command_failed(
                format!("git config --get {}", key),
                code,
                output.stderr.trim(),
            )),
        }
    }

    async fn local_branches(&self) -> Result<Vec<TrackedBranch>, ScmError> {
        let lines = self
            .list_refs(
                "%(HEAD)%09%(refname:lstrip=2)%09%(upstream:lstrip=2)",
                "refs/heads",
            )
            .await?;
        Ok(lines.iter().filter_map(|l| parse_tracked_branch(l)).collect())
    }

    async fn remote_branches(&self) -> Result<Vec<String>, ScmError> {
        let lines = self.list_refs("%(refname:lstrip=2)", "refs/remotes").await?;
        Ok(lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|name| !name.ends_with("/HEAD"))
            .collect())
    }

    async fn tags(&self) -> Result<Vec<String>, ScmError> {
        let lines = self.list_refs("%(refname:lstrip=2)", "refs/tags").await?;
        Ok(lines.into_iter().map(|l| l.trim().to_string()).collect())
    }

    async fn tags_containing_head(&self) -> Result<Vec<String>, ScmError> {
        let output = self
            .execute_git_command_checked(&["tag", "--list", "--contains", "HEAD"])
            .await?;
        Ok(output.lines().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect())
    }

    async fn tags_at_head(&self) -> Result<Vec<String>, ScmError> {
        let output = self
            .execute_git_command_checked(&["tag", "--list", "--points-at", "HEAD"])
            .await?;
        Ok(output.lines().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect())
    }

    async fn tag_annotation(&self, tag: &str) -> Result<String, ScmError> {
        let reference = format!("refs/tags/{}", tag);
        self.execute_git_command_checked(&["for-each-ref", "--format=%(contents)", &reference])
            .await
    }

    async fn fetch(&self) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["fetch", DEFAULT_REMOTE]).await?;
        Ok(())
    }

    async fn checkout_branch(&self, branch: &str) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["checkout", branch]).await?;
        Ok(())
    }

    async fn checkout_tag(&self, tag: &str) -> Result<(), ScmError> {
        let reference = format!("refs/tags/{}", tag);
        self.execute_git_command_checked(&["checkout", "--detach", &reference])
            .await?;
        Ok(())
    }

    async fn merge(&self, remote: &str) -> Result<UpdateOutcome, ScmError> {
        self.integrate(&["merge", "--no-edit", remote], remote).await
    }

    async fn rebase(&self, remote: &str) -> Result<UpdateOutcome, ScmError> {
        self.integrate(&["rebase", remote], remote).await
    }

    async fn push_branch(&self, branch: &str) -> Result<PushOutcome, ScmError> {
        let refspec = format!("HEAD:{}", branch);
        self.push(&["push", "--porcelain", DEFAULT_REMOTE, &refspec]).await
    }

    async fn push_tag(&self, tag: &str) -> Result<PushOutcome, ScmError> {
        self.push(&["push", "--porcelain", DEFAULT_REMOTE, "tag", tag]).await
    }

    async fn create_branch(&self, local: &str, remote: &str) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["branch", "--track", local, remote])
            .await?;
        Ok(())
    }

    async fn create_tag(&self, tag: &str) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["tag", tag]).await?;
        Ok(())
    }

    async fn create_annotated_tag(&self, tag: &str, message_file: &Path) -> Result<(), ScmError> {
        let file = message_file.to_string_lossy();
        self.execute_git_command_checked(&["tag", "-F", &file, tag]).await?;
        Ok(())
    }

    async fn working_tree(&self) -> Result<WorkingTreeState, ScmError> {
        let summary = self.execute_git_command_checked(&["status", "--porcelain"]).await?;
        let symbolic = self.execute_git_command(&["symbolic-ref", "-q", "HEAD"]).await?;
        Ok(WorkingTreeState {
            clean: summary.trim().is_empty(),
            detached: !symbolic.is_success(),
            summary,
        })
    }

    async fn divergence(&self, remote: &str) -> Result<Divergence, ScmError> {
        let range = format!("HEAD...{}", remote);
        let output = self
            .execute_git_command_checked(&["rev-list", "--left-right", "--count", &range])
            .await?;
        let mut counts = output.split_whitespace().map(str::parse::<usize>);
        match (counts.next(), counts.next()) {
            (Some(Ok(ahead)), Some(Ok(behind))) => Ok(Divergence { ahead, behind }),
            _ => Err(ScmError::unexpected_output(
                format!("git rev-list --left-right --count {}", range),
                output,
            )),
        }
    }

    async fn remote_config(&self) -> Result<RemoteConfig, ScmError> {
        Ok(RemoteConfig {
            url: self.config_value("remote.origin.url").await?,
            pushurl: self.config_value("remote.origin.pushurl").await?,
        })
    }

    async fn set_remote_config(&self, config: &RemoteConfig) -> Result<(), ScmError> {
        if let Some(url) = &config.url {
            self.execute_git_command_checked(&["config", "remote.origin.url", url])
                .await?;
        }
        self.execute_git_command_checked(&[
            "config",
            "remote.origin.fetch",
            "+refs/heads/*:refs/remotes/origin/*",
        ])
        .await?;
        match &config.pushurl {
            Some(pushurl) => {
                self.execute_git_command_checked(&["config", "remote.origin.pushurl", pushurl])
                    .await?;
            }
            None => {
                // exit status 5: nothing to unset
                let output = self
                    .execute_git_command(&["config", "--unset", "remote.origin.pushurl"])
                    .await?;
                if !output.is_success() && output.exit_code != 5 {
                    return Err(ScmError::command_failed(
                        "git config --unset remote.origin.pushurl",
                        output.exit_code,
                        output.stderr.trim(),
                    ));
                }
            }
        }
        Ok(())
    }

    async fn commit_all(&self) -> Result<bool, ScmError> {
        self.execute_git_command_checked(&["add", "-A"]).await?;
        Ok(self.execute_git_interactive(&["commit"]).await? == 0)
    }

    async fn reset_and_clean(&self) -> Result<(), ScmError> {
        self.execute_git_command_checked(&["reset", "--hard", "HEAD"]).await?;
        self.execute_git_command_checked(&["clean", "-fd"]).await?;
        Ok(())
    }
}
