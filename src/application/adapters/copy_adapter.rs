use async_trait::async_trait;
use tracing::info;

use super::{ComponentAdapter, Findings, FreezeTarget};
use crate::application::context::RunContext;
use crate::application::services::outcome::Outcome;
use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::domain::entities::component::{Component, ComponentSource};
use crate::infrastructure::filesystem::plain_copy::{
    copy_file, copy_tree, egg_marker_path, read_egg_marker, remove_path, source_path,
    write_egg_marker,
};

/// 単一ファイルまたはディレクトリツリーのコピー
#[derive(Debug, Clone, Copy)]
pub struct CopyAdapter {
    directory: bool,
}

impl CopyAdapter {
    pub fn file() -> Self {
        Self { directory: false }
    }

    pub fn directory() -> Self {
        Self { directory: true }
    }
}

fn declared_url(component: &Component) -> CmgResult<&str> {
    match &component.source {
        ComponentSource::Copy { url } => Ok(url),
        _ => Err(CmgError::internal_error(format!(
            "component '{}' is not a plain copy",
            component.name
        ))),
    }
}

#[async_trait]
impl ComponentAdapter for CopyAdapter {
    async fn download(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        let url = declared_url(component)?;
        let target = ctx.component_root(&component.name);
        let marker = egg_marker_path(&ctx.root, &component.name);

        let recorded = read_egg_marker(&marker).await?;
        if recorded.as_deref() == Some(url) && target.exists() {
            return Ok(Outcome::NoOp);
        }

        let source = source_path(&ctx.root, url)?;
        if !source.exists() {
            return Err(CmgError::component_error(
                &component.name,
                format!("copy source {} does not exist", source.display()),
            ));
        }

        info!(component = %component.name, source = %source.display(), "copying");
        remove_path(&target).await?;
        if self.directory {
            copy_tree(&source, &target).await?;
        } else {
            copy_file(&source, &target).await?;
        }
        write_egg_marker(&marker, url).await?;
        Ok(Outcome::Success)
    }

    async fn status(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        let url = declared_url(component)?;
        let target = ctx.component_root(&component.name);
        let marker = egg_marker_path(&ctx.root, &component.name);
        let mut findings = Findings::new(ctx);

        if !target.exists() {
            findings.warn(format!("{} does not exist", target.display()));
        }
        match read_egg_marker(&marker).await {
            Ok(Some(recorded)) if recorded == url => {}
            Ok(Some(recorded)) => findings.warn(format!("copied from {}, expected {}", recorded, url)),
            Ok(None) => findings.warn(format!("{} is missing", marker.display())),
            Err(e) => findings.warn(format!("cannot read {}: {}", marker.display(), e)),
        }
        Ok(findings.into_outcome())
    }

    async fn upload(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        ctx.reporter.info(&format!(
            "{} is a plain copy; nothing to upload",
            component.name
        ));
        Ok(Outcome::NoOp)
    }

    async fn freeze(&self, ctx: &RunContext, target: FreezeTarget<'_>) -> CmgResult<Outcome> {
        let name = target.name;
        let path = ctx.component_root(name);
        if !path.exists() {
            return Err(CmgError::component_error(
                name,
                format!("{} does not exist; download it first", path.display()),
            ));
        }
        let marker = egg_marker_path(&ctx.root, name);
        let recorded = read_egg_marker(&marker).await?.ok_or_else(|| {
            CmgError::component_error(name, format!("{} is missing", marker.display()))
        })?;

        let outcome = match target.reference.get(name, "url") {
            Some(expected) if expected == recorded => Outcome::NoOp,
            expected => {
                ctx.reporter.warning(&format!(
                    "{} was copied from {}, stream says {}",
                    name,
                    recorded,
                    expected.unwrap_or("nothing")
                ));
                Outcome::Success
            }
        };
        target.current.set(name, "url", recorded);
        Ok(outcome)
    }
}
