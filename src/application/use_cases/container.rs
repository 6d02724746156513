use tracing::debug;

use crate::application::adapters::ComponentBackend;
use crate::application::context::RunContext;
use crate::application::services::outcome::RunSummary;
use crate::common::result::CmgResult;
use crate::domain::entities::component::Component;
use crate::domain::entities::config_snapshot::ConfigSnapshot;
use crate::domain::value_objects::reference_point::ResolvedPoint;
use crate::infrastructure::filesystem::load_baseline_config;
use crate::infrastructure::scm::GitOperations;

/// コンポーネントごとに呼び出す操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verb {
    Download,
    Status,
    Upload,
}

/// オンラインなら fetch、オフラインなら警告だけ
pub(crate) async fn refresh_remote(ctx: &RunContext, git: &dyn GitOperations) -> CmgResult<()> {
    if ctx.settings.online {
        git.fetch().await?;
    } else {
        ctx.reporter
            .warning("CMG is running under offline mode; remote state is not fetched");
    }
    Ok(())
}

/// 解決済みの point に対応する設定: ブランチならストリーム、タグならベースライン
pub(crate) async fn load_snapshot(
    ctx: &RunContext,
    git: &dyn GitOperations,
    point: &ResolvedPoint,
) -> CmgResult<ConfigSnapshot> {
    match point {
        ResolvedPoint::Tag(tag) => {
            let annotation = git.tag_annotation(tag).await?;
            load_baseline_config(tag, &annotation)
        }
        other => {
            let (local, remote) = other.stream_names();
            ctx.store().load_stream(local, remote).await
        }
    }
}

/// 宣言順に 1 つずつ処理する。最初のエラーで全体を止める。
pub(crate) async fn dispatch(ctx: &RunContext, components: &[Component], verb: Verb) -> CmgResult<RunSummary> {
    let mut summary = RunSummary::default();
    for component in components {
        ctx.reporter.section(&ctx.component_root(&component.name));
        let backend = ComponentBackend::for_kind(component.kind);
        let adapter = backend.adapter();
        debug!(component = %component.name, kind = %component.kind, ?verb, "dispatching");
        let outcome = match verb {
            Verb::Download => adapter.download(ctx, component).await?,
            Verb::Status => adapter.status(ctx, component).await?,
            Verb::Upload => adapter.upload(ctx, component).await?,
        };
        summary.record(&component.name, outcome);
    }
    Ok(summary)
}
