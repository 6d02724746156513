use async_trait::async_trait;
use tracing::{debug, info};

use super::{ComponentAdapter, Findings, FreezeTarget};
use crate::application::context::RunContext;
use crate::application::services::decision::{ConfirmKind, SvnTagChoice, SvnTagRequest};
use crate::application::services::outcome::Outcome;
use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::domain::entities::component::{Component, ComponentSource, SvnLocation};
use crate::domain::entities::config_snapshot::ConfigSnapshot;
use crate::infrastructure::scm::{SvnInfo, SvnOperations, SvnStatusEntry};

/// Subversion コンポーネント
#[derive(Debug, Clone, Copy, Default)]
pub struct SvnAdapter;

fn location(component: &Component) -> CmgResult<&SvnLocation> {
    match &component.source {
        ComponentSource::Subversion(location) => Ok(location),
        _ => Err(CmgError::internal_error(format!(
            "component '{}' is not a Subversion component",
            component.name
        ))),
    }
}

fn has_modifications(entries: &[SvnStatusEntry]) -> bool {
    entries.iter().any(|e| !e.is_unversioned())
}

/// Windows のファイル URL は大文字小文字を区別しない
fn same_url(a: &str, b: &str) -> bool {
    let a = a.trim_end_matches('/');
    let b = b.trim_end_matches('/');
    if cfg!(windows) {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn join_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

fn non_empty<'a>(snapshot: &'a ConfigSnapshot, section: &str, key: &str) -> Option<&'a str> {
    snapshot.get(section, key).filter(|v| !v.is_empty())
}

#[async_trait]
impl ComponentAdapter for SvnAdapter {
    async fn download(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        let location = location(component)?;
        let svn = ctx.scm.svn(&ctx.component_root(&component.name));
        let url = location.url();

        if !svn.is_working_copy() {
            if !ctx.settings.online {
                return Err(CmgError::offline(format!(
                    "cannot check out {} into {}",
                    url,
                    svn.root().display()
                )));
            }
            info!(component = %component.name, %url, "checking out");
            svn.checkout(&url, location.revision()).await?;
            return Ok(Outcome::Success);
        }

        if !ctx.settings.online {
            ctx.reporter.warning(&format!(
                "offline: {} is not switched to {}",
                svn.root().display(),
                url
            ));
            return Ok(Outcome::NoOp);
        }

        if location.is_pinned() && has_modifications(&svn.status().await?) {
            ctx.confirm_or_abort(
                ConfirmKind::PinnedModified,
                format!(
                    "{} has local modifications but is pinned to {}; continue switching",
                    svn.root().display(),
                    url
                ),
            )?;
        }
        debug!(component = %component.name, %url, revision = ?location.revision(), "switching");
        svn.switch(&url, location.revision()).await?;
        Ok(Outcome::Success)
    }

    async fn status(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        let location = location(component)?;
        let svn = ctx.scm.svn(&ctx.component_root(&component.name));
        let mut findings = Findings::new(ctx);

        if !svn.is_working_copy() {
            findings.warn(format!("{} is not checked out", svn.root().display()));
            return Ok(findings.into_outcome());
        }

        let expected = location.url();
        let info = svn.info().await?;
        if !same_url(&info.url, &expected) {
            findings.warn(format!("working copy is at {}, expected {}", info.url, expected));
        }
        match location.revision() {
            Some(revision) if revision != info.revision => findings.warn(format!(
                "working copy is at revision {}, expected {}",
                info.revision, revision
            )),
            Some(_) => {}
            None if matches!(location, SvnLocation::Branch { .. }) && ctx.settings.online => {
                let tip = svn.remote_revision(&expected).await?;
                if tip != info.revision {
                    findings.warn(format!(
                        "working copy is at revision {}, branch tip is {}",
                        info.revision, tip
                    ));
                }
            }
            None => {}
        }

        if has_modifications(&svn.status().await?) {
            if location.is_pinned() {
                findings.warn("pinned working copy has local modifications");
            } else {
                findings.warn("uncommitted changes");
            }
        }
        Ok(findings.into_outcome())
    }

    async fn upload(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        let location = location(component)?;
        let svn = ctx.scm.svn(&ctx.component_root(&component.name));
        if !svn.is_working_copy() {
            return Err(CmgError::component_error(
                &component.name,
                format!("{} does not exist; download it first", svn.root().display()),
            ));
        }

        let entries = svn.status().await?;
        if location.is_pinned() {
            if has_modifications(&entries) {
                ctx.confirm_or_abort(
                    ConfirmKind::PinnedModified,
                    format!(
                        "{} is pinned to {} and its modifications will not be uploaded",
                        svn.root().display(),
                        location.url()
                    ),
                )?;
            } else {
                ctx.reporter
                    .info(&format!("{} is pinned; nothing to upload", svn.root().display()));
            }
            return Ok(Outcome::NoOp);
        }

        let url = location.url();
        let info = svn.info().await?;
        if !same_url(&info.url, &url) {
            return Err(CmgError::component_error(
                &component.name,
                format!("working copy is at {}, expected {}", info.url, url),
            ));
        }
        if svn.remote_revision(&url).await? != info.revision {
            svn.update().await?;
        }

        let mut entries = svn.status().await?;
        if ctx.settings.add_new_files {
            let unversioned: Vec<String> = entries
                .iter()
                .filter(|e| e.is_unversioned())
                .map(|e| e.path.clone())
                .collect();
            if !unversioned.is_empty() {
                svn.add(&unversioned).await?;
                entries = svn.status().await?;
            }
        }
        if !has_modifications(&entries) {
            return Ok(Outcome::NoOp);
        }
        if !svn.commit().await? {
            return Err(CmgError::aborted(format!(
                "svn commit in {} did not complete",
                svn.root().display()
            )));
        }
        Ok(Outcome::Success)
    }

    async fn freeze(&self, ctx: &RunContext, target: FreezeTarget<'_>) -> CmgResult<Outcome> {
        let name = target.name;
        let svn = ctx.scm.svn(&ctx.component_root(name));
        let svn = svn.as_ref();
        if !svn.is_working_copy() {
            return Err(CmgError::component_error(
                name,
                format!("{} does not exist; download it first", svn.root().display()),
            ));
        }
        if has_modifications(&svn.status().await?) {
            ctx.confirm_or_abort(
                ConfirmKind::FreezeModified,
                format!(
                    "{} has uncommitted changes that will not be part of the baseline",
                    svn.root().display()
                ),
            )?;
        }

        let info = svn.info().await?;
        let reference = target.reference;
        let branch_pinned = non_empty(reference, name, "branch_url").is_some()
            && non_empty(reference, name, "revision").is_some();

        if branch_pinned {
            record_revision(target.current, name, &info);
            return Ok(Outcome::NoOp);
        }

        let tags_url = non_empty(reference, name, "tags_url").map(str::to_string);
        if let (Some(tags_url), Some(tag)) = (&tags_url, non_empty(reference, name, "tag")) {
            if same_url(&info.url, &join_url(tags_url, tag)) {
                record_tag(target.current, name, tags_url, tag);
                return Ok(Outcome::NoOp);
            }
            let prefix = format!("{}/", tags_url.trim_end_matches('/'));
            if let Some(rest) = info.url.strip_prefix(&prefix) {
                let other = rest.split('/').next().unwrap_or(rest);
                if !other.is_empty() {
                    record_tag(target.current, name, tags_url, other);
                    return Ok(Outcome::Success);
                }
            }
        }

        tag_creation_flow(ctx, svn, target, &info, tags_url).await
    }
}

fn record_revision(current: &mut ConfigSnapshot, name: &str, info: &SvnInfo) {
    current.set(name, "branch_url", info.url.clone());
    current.set(name, "revision", info.revision.clone());
    current.remove_option(name, "tag");
}

fn record_tag(current: &mut ConfigSnapshot, name: &str, tags_url: &str, tag: &str) {
    current.set(name, "tags_url", tags_url);
    current.set(name, "tag", tag);
    current.remove_option(name, "branch_url");
    current.remove_option(name, "revision");
}

async fn tag_creation_flow(
    ctx: &RunContext,
    svn: &dyn SvnOperations,
    target: FreezeTarget<'_>,
    info: &SvnInfo,
    tags_url: Option<String>,
) -> CmgResult<Outcome> {
    let request = SvnTagRequest {
        location: svn.root().to_path_buf(),
        baseline: target.baseline.to_string(),
        branch_url: info.url.clone(),
        revision: info.revision.clone(),
        tags_url: tags_url.clone(),
    };
    let tag = match ctx.decider.svn_tag(&request) {
        SvnTagChoice::UseRevision => {
            record_revision(target.current, target.name, info);
            return Ok(Outcome::Success);
        }
        SvnTagChoice::CreateNamed(tag) => tag,
        SvnTagChoice::CreateBaseline => target.baseline.to_string(),
    };

    let tags_url = match tags_url.or_else(|| ctx.decider.tags_url(&info.url)) {
        Some(url) => url,
        None => {
            return Err(CmgError::aborted(format!(
                "no tags directory URL for {}",
                svn.root().display()
            )))
        }
    };
    if !ctx.settings.online {
        return Err(CmgError::offline(format!(
            "cannot create tag {} for {}",
            tag,
            svn.root().display()
        )));
    }

    let destination = join_url(&tags_url, &tag);
    info!(component = target.name, from = %info.url, to = %destination, "creating tag");
    svn.copy(
        &info.url,
        &info.revision,
        &destination,
        &format!("cmg freeze: {} for baseline {}", tag, target.baseline),
    )
    .await?;
    record_tag(target.current, target.name, &tags_url, &tag);
    Ok(Outcome::Success)
}
