use std::path::PathBuf;
use tracing::info;

use super::container::{load_snapshot, refresh_remote};
use crate::application::adapters::{ComponentBackend, FreezeTarget};
use crate::application::context::RunContext;
use crate::application::services::decision::{ConfirmKind, ConfirmRequest, Confirmation};
use crate::application::services::git_workflow::{ensure_clean, publish_tag};
use crate::application::services::outcome::RunSummary;
use crate::application::services::reference_resolver::{ReferenceResolver, Strictness};
use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::domain::entities::component::Component;
use crate::domain::value_objects::reference_point::ResolvedPoint;

/// freeze の設定
#[derive(Debug, Clone)]
pub struct FreezeConfig {
    /// 作成するベースラインタグ
    pub tag: String,
    /// 参照する旧ベースライン（無ければ現在のストリーム）
    pub old_tag: Option<String>,
}

impl FreezeConfig {
    pub fn new(tag: impl Into<String>, old_tag: Option<String>) -> Self {
        Self {
            tag: tag.into(),
            old_tag,
        }
    }
}

/// freeze の結果
#[derive(Debug, Clone)]
pub struct FreezeReport {
    pub summary: RunSummary,
    /// `.git/_baseline`
    pub staging_file: PathBuf,
    /// false ならオペレータが確認で中断した
    pub tag_created: bool,
    pub tag: String,
}

/// 全コンポーネントの現在の状態をベースラインとしてタグに記録する
pub struct FreezeUseCase {
    ctx: RunContext,
    config: FreezeConfig,
}

impl FreezeUseCase {
    pub fn new(ctx: RunContext, config: FreezeConfig) -> Self {
        Self { ctx, config }
    }

    pub async fn execute(&self) -> CmgResult<FreezeReport> {
        let ctx = &self.ctx;
        let tag = self.config.tag.as_str();
        let git = ctx.container_git();
        let git = git.as_ref();
        ctx.reporter.section(&ctx.root);
        refresh_remote(ctx, git).await?;

        if git.is_tag(tag).await? {
            return Err(CmgError::resolution_error(tag, format!("tag '{}' already exists", tag)));
        }
        if let Some(old_tag) = &self.config.old_tag {
            if !git.is_tag(old_tag).await? {
                return Err(CmgError::resolution_error(
                    old_tag.as_str(),
                    format!("baseline tag '{}' does not exist", old_tag),
                ));
            }
        }

        ensure_clean(ctx, git).await?;

        // 記録するのは常に現在のストリーム。HEAD が切り離されていれば基本ストリーム
        let resolution = ReferenceResolver::new(git, ctx.decider.as_ref(), Strictness::Lenient)
            .resolve("")
            .await?;
        for warning in &resolution.warnings {
            ctx.reporter.warning(warning);
        }
        let (local, remote) = resolution.point.stream_names();
        let current = ctx.store().load_stream(local, remote).await?;

        // 旧ベースラインはドリフト検査の基準にだけ使う
        let reference = match &self.config.old_tag {
            Some(old_tag) => load_snapshot(ctx, git, &ResolvedPoint::Tag(old_tag.clone())).await?,
            None => current.clone(),
        };
        let kinds = current
            .section_names()
            .map(|name| Component::kind_of(&current, name).map(|kind| (name.to_string(), kind)))
            .collect::<CmgResult<Vec<_>>>()?;

        let mut frozen = current.clone();
        let mut summary = RunSummary::default();
        for (name, kind) in &kinds {
            ctx.reporter.section(&ctx.component_root(name));
            let backend = ComponentBackend::for_kind(*kind);
            let outcome = backend
                .adapter()
                .freeze(
                    ctx,
                    FreezeTarget {
                        name,
                        reference: &reference,
                        current: &mut frozen,
                        baseline: tag,
                    },
                )
                .await?;
            summary.record(name, outcome);
        }

        let staging_file = ctx.store().write_baseline(&frozen).await?;
        ctx.reporter.section(&ctx.root);
        let review = ConfirmRequest::new(
            ConfirmKind::ReviewBaseline,
            format!(
                "Review the baseline in {} and continue to create tag '{}'",
                staging_file.display(),
                tag
            ),
        );
        if ctx.decider.confirm(&review) == Confirmation::Quit {
            ctx.reporter.info(&format!(
                "tag '{}' not created; the baseline is kept in {}",
                tag,
                staging_file.display()
            ));
            return Ok(FreezeReport {
                summary,
                staging_file,
                tag_created: false,
                tag: tag.to_string(),
            });
        }

        git.create_annotated_tag(tag, &staging_file).await?;
        info!(%tag, "baseline tag created");
        if ctx.settings.online {
            publish_tag(ctx, git, tag).await?;
        } else {
            ctx.reporter
                .warning(&format!("offline: baseline tag '{}' is not pushed", tag));
        }

        Ok(FreezeReport {
            summary,
            staging_file,
            tag_created: true,
            tag: tag.to_string(),
        })
    }
}
