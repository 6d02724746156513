use super::scm_interface::{ScmError, SvnInfo, SvnOperations, SvnStatusEntry};
use crate::infrastructure::process::{CommandOutput, CommandRunner, Invocation};
use async_trait::async_trait;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// SVN (Subversion) backend driving the `svn` executable in one working copy
pub struct SvnScm {
    root: PathBuf,
    runner: Arc<dyn CommandRunner>,
    svn_executable: String,
}

impl SvnScm {
    /// Create a Subversion backend for the working copy at `root`
    pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
            svn_executable: "svn".to_string(),
        }
    }

    fn invocation_in(&self, cwd: &Path, args: &[&str]) -> Invocation {
        Invocation::new(&self.svn_executable, cwd).args(args.iter().copied())
    }

    fn map_spawn_error(&self, error: io::Error) -> ScmError {
        if error.kind() == io::ErrorKind::NotFound {
            ScmError::executable_not_found(&self.svn_executable)
        } else {
            error.into()
        }
    }

    /// Execute an SVN command and check for success
    async fn execute_svn_command_checked(&self, args: &[&str]) -> Result<String, ScmError> {
        let invocation = self.invocation_in(&self.root, args);
        let output: CommandOutput = self
            .runner
            .run(&invocation)
            .await
            .map_err(|e| self.map_spawn_error(e))?;
        if !output.is_success() {
            return Err(ScmError::command_failed(
                invocation.to_string(),
                output.exit_code,
                output.stderr.trim(),
            ));
        }
        Ok(output.stdout)
    }

    /// Execute an SVN command attached to the terminal; a nonzero exit is an error.
    async fn execute_svn_interactive(&self, cwd: &Path, args: &[&str]) -> Result<i32, ScmError> {
        let invocation = self.invocation_in(cwd, args);
        self.runner
            .run_interactive(&invocation)
            .await
            .map_err(|e| self.map_spawn_error(e))
    }

    async fn execute_svn_interactive_checked(&self, cwd: &Path, args: &[&str]) -> Result<(), ScmError> {
        let code = self.execute_svn_interactive(cwd, args).await?;
        if code != 0 {
            let command = self.invocation_in(cwd, args).to_string();
            return Err(ScmError::command_failed(command, code, ""));
        }
        Ok(())
    }
}

fn with_revision(url: &str, revision: Option<&str>) -> String {
    match revision {
        Some(rev) => format!("{}@{}", url, rev),
        None => url.to_string(),
    }
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"(?m)^URL: (\S+)").expect("valid URL regex"))
}

fn revision_regex() -> &'static Regex {
    static REVISION: OnceLock<Regex> = OnceLock::new();
    REVISION.get_or_init(|| Regex::new(r"(?m)^Revision: (\S+)").expect("valid revision regex"))
}

fn parse_info(command: &str, output: &str) -> Result<SvnInfo, ScmError> {
    let url = url_regex().captures(output).map(|c| c[1].to_string());
    let revision = revision_regex().captures(output).map(|c| c[1].to_string());
    match (url, revision) {
        (Some(url), Some(revision)) => Ok(SvnInfo { url, revision }),
        _ => Err(ScmError::unexpected_output(command, output)),
    }
}

/// Characters allowed in each of the seven status columns
const STATUS_COLUMNS: [&str; 7] = [" ADMRCXI?!~", " MC", " L", " +", " SX", " KOTB", " C"];

/// The status columns of an entry line, `None` for headers, footers and
/// tree-conflict details.
fn status_columns(line: &str) -> Option<&str> {
    let columns = line.get(..8)?;
    let bytes = columns.as_bytes();
    let valid = STATUS_COLUMNS
        .iter()
        .zip(bytes)
        .all(|(allowed, b)| allowed.as_bytes().contains(b));
    (valid && bytes[7] == b' ').then_some(columns)
}

fn parse_status(output: &str) -> Vec<SvnStatusEntry> {
    output
        .lines()
        .filter(|line| line.len() > 8)
        .filter_map(|line| {
            let columns = status_columns(line)?;
            let path = line.get(8..)?;
            let code = columns.chars().take(7).find(|c| !c.is_whitespace())?;
            if code == 'X' {
                return None;
            }
            Some(SvnStatusEntry {
                code,
                path: path.trim().to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl SvnOperations for SvnScm {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_working_copy(&self) -> bool {
        self.root.join(".svn").exists()
    }

    async fn checkout(&self, url: &str, revision: Option<&str>) -> Result<(), ScmError> {
        let parent = self
            .root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&parent).await?;
        let target = self.root.to_string_lossy().into_owned();
        let source = with_revision(url, revision);
        self.execute_svn_interactive_checked(&parent, &["checkout", &source, &target])
            .await
    }

    async fn status(&self) -> Result<Vec<SvnStatusEntry>, ScmError> {
        let output = self.execute_svn_command_checked(&["status"]).await?;
        Ok(parse_status(&output))
    }

    async fn info(&self) -> Result<SvnInfo, ScmError> {
        if !self.is_working_copy() {
            return Err(ScmError::repository_not_found(&self.root));
        }
        let output = self.execute_svn_command_checked(&["info"]).await?;
        parse_info("svn info", &output)
    }

    async fn remote_revision(&self, url: &str) -> Result<String, ScmError> {
        let output = self.execute_svn_command_checked(&["info", url]).await?;
        Ok(parse_info(&format!("svn info {}", url), &output)?.revision)
    }

    async fn switch(&self, url: &str, revision: Option<&str>) -> Result<(), ScmError> {
        let target = with_revision(url, revision);
        self.execute_svn_interactive_checked(&self.root, &["switch", &target])
            .await
    }

    async fn update(&self) -> Result<(), ScmError> {
        self.execute_svn_interactive_checked(&self.root, &["update"]).await
    }

    async fn add(&self, paths: &[String]) -> Result<(), ScmError> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add"];
        args.extend(paths.iter().map(String::as_str));
        self.execute_svn_command_checked(&args).await?;
        Ok(())
    }

    async fn commit(&self) -> Result<bool, ScmError> {
        Ok(self.execute_svn_interactive(&self.root, &["commit"]).await? == 0)
    }

    async fn copy(&self, from: &str, revision: &str, to: &str, message: &str) -> Result<(), ScmError> {
        let source = with_revision(from, Some(revision));
        self.execute_svn_command_checked(&["copy", &source, to, "-m", message])
            .await?;
        Ok(())
    }
}
