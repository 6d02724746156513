use tracing::info;

use super::container::{dispatch, load_snapshot, refresh_remote, Verb};
use crate::application::context::RunContext;
use crate::application::services::git_workflow::{ensure_clean, integrate_remote};
use crate::application::services::outcome::RunSummary;
use crate::application::services::reference_resolver::{ReferenceResolver, Strictness};
use crate::common::result::CmgResult;
use crate::domain::entities::component::Component;
use crate::domain::value_objects::reference_point::ResolvedPoint;

/// download の設定
#[derive(Debug, Clone, Default)]
pub struct DownloadConfig {
    /// 空なら現在のブランチ
    pub point: String,
}

impl DownloadConfig {
    pub fn new(point: impl Into<String>) -> Self {
        Self { point: point.into() }
    }
}

/// コンテナと全コンポーネントを point に合わせる
pub struct DownloadUseCase {
    ctx: RunContext,
    config: DownloadConfig,
}

impl DownloadUseCase {
    pub fn new(ctx: RunContext, config: DownloadConfig) -> Self {
        Self { ctx, config }
    }

    pub async fn execute(&self) -> CmgResult<RunSummary> {
        let ctx = &self.ctx;
        let git = ctx.container_git();
        let git = git.as_ref();
        ctx.reporter.section(&ctx.root);

        refresh_remote(ctx, git).await?;
        let resolution = ReferenceResolver::new(git, ctx.decider.as_ref(), Strictness::Strict)
            .resolve(&self.config.point)
            .await?;
        info!(point = %self.config.point, category = ?resolution.category, "container point resolved");

        ensure_clean(ctx, git).await?;
        match &resolution.point {
            ResolvedPoint::Branch { local, remote } => {
                if git.current_branch().await?.as_deref() != Some(local.as_str()) {
                    git.checkout_branch(local).await?;
                }
                if let Some(remote) = remote {
                    integrate_remote(ctx, git, remote).await?;
                }
            }
            ResolvedPoint::Tag(tag) => git.checkout_tag(tag).await?,
            ResolvedPoint::Unresolved => {}
        }

        let snapshot = load_snapshot(ctx, git, &resolution.point).await?;
        let components = Component::all_from(&snapshot)?;
        dispatch(ctx, &components, Verb::Download).await
    }
}
