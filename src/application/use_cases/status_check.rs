use super::container::{dispatch, load_snapshot, refresh_remote, Verb};
use crate::application::context::RunContext;
use crate::application::services::git_workflow::shared_upstream_warning;
use crate::application::services::outcome::RunSummary;
use crate::application::services::reference_resolver::{ReferenceResolver, Strictness};
use crate::common::result::CmgResult;
use crate::domain::entities::component::Component;
use crate::domain::value_objects::reference_point::ResolvedPoint;

/// ステータス確認の設定
#[derive(Debug, Clone, Default)]
pub struct StatusCheckConfig {
    /// 比較対象の point（空なら現在のブランチ）
    pub point: String,
}

impl StatusCheckConfig {
    pub fn new(point: impl Into<String>) -> Self {
        Self { point: point.into() }
    }
}

/// 期待される状態との食い違いを警告として報告する。
///
/// 設定エラー以外では失敗しない（VCS コマンド自体の失敗は除く）。
pub struct StatusCheckUseCase {
    ctx: RunContext,
    config: StatusCheckConfig,
}

impl StatusCheckUseCase {
    pub fn new(ctx: RunContext, config: StatusCheckConfig) -> Self {
        Self { ctx, config }
    }

    pub async fn execute(&self) -> CmgResult<RunSummary> {
        let ctx = &self.ctx;
        let git = ctx.container_git();
        let git = git.as_ref();
        ctx.reporter.section(&ctx.root);

        refresh_remote(ctx, git).await?;
        let resolution = ReferenceResolver::new(git, ctx.decider.as_ref(), Strictness::Lenient)
            .resolve(&self.config.point)
            .await?;
        for warning in &resolution.warnings {
            ctx.reporter.warning(warning);
        }

        match &resolution.point {
            ResolvedPoint::Branch { local, remote } => {
                match git.current_branch().await? {
                    Some(current) if current == *local => {}
                    Some(current) => ctx.reporter.warning(&format!(
                        "container is on branch '{}', expected '{}'",
                        current, local
                    )),
                    None => ctx
                        .reporter
                        .warning(&format!("container HEAD is detached, expected '{}'", local)),
                }
                if let Some(remote) = remote {
                    if let Some(warning) = shared_upstream_warning(git, remote).await? {
                        if !resolution.warnings.contains(&warning) {
                            ctx.reporter.warning(&warning);
                        }
                    }
                    let divergence = git.divergence(remote).await?;
                    if !divergence.is_even() {
                        ctx.reporter.warning(&format!(
                            "container is {} ahead and {} behind {}",
                            divergence.ahead, divergence.behind, remote
                        ));
                    }
                }
            }
            ResolvedPoint::Tag(tag) => {
                if !git.is_on_tag(tag).await? {
                    ctx.reporter
                        .warning(&format!("container HEAD is not on tag '{}'", tag));
                }
            }
            ResolvedPoint::Unresolved => {}
        }

        let tree = git.working_tree().await?;
        if !tree.clean {
            ctx.reporter
                .warning(&format!("container has uncommitted changes:\n{}", tree.summary));
        }

        let snapshot = load_snapshot(ctx, git, &resolution.point).await?;
        let components = Component::all_from(&snapshot)?;
        dispatch(ctx, &components, Verb::Status).await
    }
}
