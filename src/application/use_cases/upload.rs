use super::container::{dispatch, load_snapshot, Verb};
use crate::application::context::RunContext;
use crate::application::services::git_workflow::{ensure_clean, integrate_remote, publish, publish_tag};
use crate::application::services::outcome::RunSummary;
use crate::application::services::reference_resolver::{ReferenceResolver, Strictness};
use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::domain::entities::component::Component;
use crate::domain::value_objects::branch_name::RemoteBranch;
use crate::domain::value_objects::reference_point::ResolvedPoint;

/// upload の設定
#[derive(Debug, Clone, Default)]
pub struct UploadConfig {
    /// 指定した場合、現在のブランチがそのローカルブランチでなければならない
    pub point: Option<String>,
}

impl UploadConfig {
    pub fn new(point: Option<String>) -> Self {
        Self { point }
    }
}

/// 全コンポーネントを push/commit し、最後にコンテナを push する
pub struct UploadUseCase {
    ctx: RunContext,
    config: UploadConfig,
}

impl UploadUseCase {
    pub fn new(ctx: RunContext, config: UploadConfig) -> Self {
        Self { ctx, config }
    }

    pub async fn execute(&self) -> CmgResult<RunSummary> {
        let ctx = &self.ctx;
        if !ctx.settings.online {
            return Err(CmgError::offline("upload needs access to the remote repositories"));
        }
        let git = ctx.container_git();
        let git = git.as_ref();
        ctx.reporter.section(&ctx.root);
        git.fetch().await?;

        let point = self.config.point.as_deref().unwrap_or("");
        let resolution = ReferenceResolver::new(git, ctx.decider.as_ref(), Strictness::Strict)
            .resolve(point)
            .await?;

        if let (Some(point), ResolvedPoint::Branch { local, .. }) = (&self.config.point, &resolution.point) {
            let current = git.current_branch().await?;
            if current.as_deref() != Some(local.as_str()) {
                return Err(CmgError::resolution_error(
                    point.as_str(),
                    format!(
                        "container is on {}, but '{}' maps to local branch '{}'",
                        current.map(|c| format!("'{}'", c)).unwrap_or_else(|| "no branch".into()),
                        point,
                        local
                    ),
                ));
            }
        }

        ensure_clean(ctx, git).await?;
        let snapshot = load_snapshot(ctx, git, &resolution.point).await?;
        let components = Component::all_from(&snapshot)?;
        let mut summary = dispatch(ctx, &components, Verb::Upload).await?;

        ctx.reporter.section(&ctx.root);
        let container = match &resolution.point {
            ResolvedPoint::Branch {
                remote: Some(remote),
                ..
            } => {
                let branch = RemoteBranch::parse(remote).ok_or_else(|| {
                    CmgError::resolution_error(remote.as_str(), format!("'{}' is not a branch of origin", remote))
                })?;
                let integrated = integrate_remote(ctx, git, remote).await?;
                integrated.combine(publish(ctx, git, branch.branch()).await?)
            }
            ResolvedPoint::Tag(tag) => publish_tag(ctx, git, tag).await?,
            other => {
                return Err(CmgError::internal_error(format!(
                    "unexpected container resolution {:?}",
                    other
                )))
            }
        };
        summary.record(&ctx.root.display().to_string(), container);
        Ok(summary)
    }
}
