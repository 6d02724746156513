use tracing::{debug, info};

use crate::application::context::RunContext;
use crate::application::services::decision::{CleanupChoice, CleanupRequest, ConfirmKind};
use crate::application::services::outcome::Outcome;
use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::infrastructure::scm::{GitOperations, PushOutcome, UpdateOutcome};

/// 作業ツリーがきれいになるまで対処方法を尋ね続ける
pub async fn ensure_clean(ctx: &RunContext, git: &dyn GitOperations) -> CmgResult<()> {
    loop {
        let state = git.working_tree().await?;
        if state.clean {
            return Ok(());
        }
        let request = CleanupRequest {
            location: git.root().to_path_buf(),
            summary: state.summary.clone(),
            detached: state.detached,
        };
        let choice = ctx.decider.cleanup(&request);
        debug!(location = %git.root().display(), ?choice, "cleanup");
        match choice {
            CleanupChoice::CommitAll if state.detached => {
                ctx.reporter
                    .warning("HEAD is detached; commit is not available here");
            }
            CleanupChoice::CommitAll => {
                if !git.commit_all().await? {
                    ctx.reporter.warning("commit did not complete");
                }
            }
            CleanupChoice::ResetAndClean => {
                if let Err(e) = git.reset_and_clean().await {
                    ctx.reporter.warning(&format!("reset failed: {}", e));
                }
            }
            CleanupChoice::HandledManually => {}
            CleanupChoice::Abort => {
                return Err(CmgError::aborted(format!(
                    "uncommitted changes in {}",
                    git.root().display()
                )))
            }
        }
    }
}

/// 設定に従い、リモート追跡ブランチを rebase または merge で取り込む
pub async fn integrate_remote(ctx: &RunContext, git: &dyn GitOperations, remote: &str) -> CmgResult<Outcome> {
    let outcome = if ctx.settings.rebase {
        git.rebase(remote).await?
    } else {
        git.merge(remote).await?
    };
    match outcome {
        UpdateOutcome::UpToDate => Ok(Outcome::NoOp),
        UpdateOutcome::Updated => {
            info!(location = %git.root().display(), remote, "integrated remote branch");
            Ok(Outcome::Success)
        }
        UpdateOutcome::Conflict(report) => {
            ctx.reporter.warning(&report);
            ctx.confirm_or_abort(
                ConfirmKind::ConflictResolved,
                format!(
                    "Integrating {} in {} stopped with conflicts. Resolve them, then continue",
                    remote,
                    git.root().display()
                ),
            )?;
            Ok(Outcome::Conflict(report))
        }
    }
}

#[derive(Clone, Copy)]
enum PushTarget<'a> {
    Branch(&'a str),
    Tag(&'a str),
}

impl PushTarget<'_> {
    fn name(&self) -> &str {
        match self {
            PushTarget::Branch(name) | PushTarget::Tag(name) => name,
        }
    }
}

async fn push_until_accepted(
    ctx: &RunContext,
    git: &dyn GitOperations,
    target: PushTarget<'_>,
) -> CmgResult<Outcome> {
    let mut rejection: Option<String> = None;
    loop {
        let pushed = match target {
            PushTarget::Branch(branch) => git.push_branch(branch).await?,
            PushTarget::Tag(tag) => git.push_tag(tag).await?,
        };
        match pushed {
            PushOutcome::Pushed => {
                info!(location = %git.root().display(), refname = target.name(), "pushed");
                return Ok(match rejection {
                    Some(report) => Outcome::Conflict(report),
                    None => Outcome::Success,
                });
            }
            PushOutcome::UpToDate => return Ok(Outcome::NoOp),
            PushOutcome::Rejected(report) => {
                ctx.reporter.warning(&report);
                ctx.confirm_or_abort(
                    ConfirmKind::PushRejected,
                    format!(
                        "Pushing {} from {} was rejected. Fix it, then continue to push again",
                        target.name(),
                        git.root().display()
                    ),
                )?;
                rejection = Some(report);
            }
        }
    }
}

/// HEAD を origin の `branch` に push する
pub async fn publish(ctx: &RunContext, git: &dyn GitOperations, branch: &str) -> CmgResult<Outcome> {
    push_until_accepted(ctx, git, PushTarget::Branch(branch)).await
}

/// タグを origin に push する
pub async fn publish_tag(ctx: &RunContext, git: &dyn GitOperations, tag: &str) -> CmgResult<Outcome> {
    push_until_accepted(ctx, git, PushTarget::Tag(tag)).await
}

/// `remote` を追跡するローカルブランチが複数あれば、その警告文
pub async fn shared_upstream_warning(git: &dyn GitOperations, remote: &str) -> CmgResult<Option<String>> {
    let locals = git.locals_tracking(remote).await?;
    if locals.len() < 2 {
        return Ok(None);
    }
    let names: Vec<&str> = locals.iter().map(|b| b.local.as_str()).collect();
    Ok(Some(format!(
        "'{}' is tracked by several local branches: {}",
        remote,
        names.join(", ")
    )))
}
