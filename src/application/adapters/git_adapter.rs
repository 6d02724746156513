use async_trait::async_trait;
use tracing::{debug, info};

use super::{ComponentAdapter, Findings, FreezeTarget};
use crate::application::context::RunContext;
use crate::application::services::decision::{ConfirmKind, GitTagChoice, GitTagRequest};
use crate::application::services::git_workflow::{
    ensure_clean, integrate_remote, publish, publish_tag, shared_upstream_warning,
};
use crate::application::services::outcome::Outcome;
use crate::application::services::reference_resolver::{ReferenceResolver, Resolution, Strictness};
use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::domain::entities::component::{Component, ComponentSource, GitTarget};
use crate::domain::value_objects::branch_name::RemoteBranch;
use crate::domain::value_objects::reference_point::ResolvedPoint;
use crate::infrastructure::scm::{GitOperations, RemoteConfig};

/// Git コンポーネント
#[derive(Debug, Clone, Copy, Default)]
pub struct GitAdapter;

struct GitParams<'a> {
    url: &'a str,
    pushurl: Option<&'a str>,
    target: &'a GitTarget,
}

fn params(component: &Component) -> CmgResult<GitParams<'_>> {
    match &component.source {
        ComponentSource::Git { url, pushurl, target } => Ok(GitParams {
            url,
            pushurl: pushurl.as_deref(),
            target,
        }),
        _ => Err(CmgError::internal_error(format!(
            "component '{}' is not a Git component",
            component.name
        ))),
    }
}

async fn configure_remote(git: &dyn GitOperations, params: &GitParams<'_>) -> CmgResult<()> {
    git.set_remote_config(&RemoteConfig {
        url: Some(params.url.to_string()),
        pushurl: params.pushurl.map(str::to_string),
    })
    .await?;
    Ok(())
}

async fn resolve(
    ctx: &RunContext,
    git: &dyn GitOperations,
    target: &GitTarget,
    strictness: Strictness,
) -> CmgResult<Resolution> {
    let resolver = ReferenceResolver::new(git, ctx.decider.as_ref(), strictness);
    match target {
        GitTarget::Branch(point) => resolver.resolve_branch(point).await,
        GitTarget::Tag(tag) => resolver.resolve_tag(tag).await,
    }
}

fn remote_branch_of(component: &str, remote: &str) -> CmgResult<RemoteBranch> {
    RemoteBranch::parse(remote).ok_or_else(|| {
        CmgError::component_error(
            component,
            format!("upstream '{}' is not a branch of origin", remote),
        )
    })
}

#[async_trait]
impl ComponentAdapter for GitAdapter {
    async fn download(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        let params = params(component)?;
        let git = ctx.scm.git(&ctx.component_root(&component.name));
        let git = git.as_ref();

        let mut outcome = Outcome::NoOp;
        if !git.is_repository() {
            if !ctx.settings.online {
                return Err(CmgError::offline(format!(
                    "cannot clone {} into {}",
                    params.url,
                    git.root().display()
                )));
            }
            info!(component = %component.name, url = params.url, "cloning");
            git.clone_from(params.url).await?;
            outcome = Outcome::Success;
        }
        configure_remote(git, &params).await?;
        if ctx.settings.online {
            git.fetch().await?;
        }

        let resolution = resolve(ctx, git, params.target, Strictness::Strict).await?;
        debug!(component = %component.name, ?resolution, "resolved");
        ensure_clean(ctx, git).await?;

        match resolution.point {
            ResolvedPoint::Branch {
                local,
                remote: Some(remote),
            } => {
                if git.current_branch().await?.as_deref() != Some(local.as_str()) {
                    git.checkout_branch(&local).await?;
                    outcome = Outcome::Success;
                }
                Ok(outcome.combine(integrate_remote(ctx, git, &remote).await?))
            }
            ResolvedPoint::Tag(tag) => {
                if !git.is_on_tag(&tag).await? || git.current_branch().await?.is_some() {
                    git.checkout_tag(&tag).await?;
                    outcome = Outcome::Success;
                }
                Ok(outcome)
            }
            other => Err(CmgError::internal_error(format!(
                "unexpected resolution {:?} for '{}'",
                other, component.name
            ))),
        }
    }

    async fn status(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        let params = params(component)?;
        let git = ctx.scm.git(&ctx.component_root(&component.name));
        let git = git.as_ref();
        let mut findings = Findings::new(ctx);

        if !git.is_repository() {
            findings.warn(format!("{} is not downloaded", git.root().display()));
            return Ok(findings.into_outcome());
        }
        configure_remote(git, &params).await?;
        if ctx.settings.online {
            git.fetch().await?;
        }

        let resolution = resolve(ctx, git, params.target, Strictness::Lenient).await?;
        for warning in &resolution.warnings {
            findings.warn(warning.clone());
        }

        match &resolution.point {
            ResolvedPoint::Branch { local, remote } => {
                match git.current_branch().await? {
                    Some(current) if current == *local => {}
                    Some(current) => findings.warn(format!("on branch '{}', expected '{}'", current, local)),
                    None => findings.warn(format!("HEAD is detached, expected branch '{}'", local)),
                }
                if let Some(remote) = remote {
                    if let Some(warning) = shared_upstream_warning(git, remote).await? {
                        if !resolution.warnings.contains(&warning) {
                            findings.warn(warning);
                        }
                    }
                    let divergence = git.divergence(remote).await?;
                    if divergence.is_diverged() {
                        findings.warn(format!(
                            "diverged from {} ({} ahead, {} behind)",
                            remote, divergence.ahead, divergence.behind
                        ));
                    } else if divergence.ahead > 0 {
                        findings.warn(format!("ahead of {} by {} commit(s)", remote, divergence.ahead));
                    } else if divergence.behind > 0 {
                        findings.warn(format!("behind {} by {} commit(s)", remote, divergence.behind));
                    }
                }
            }
            ResolvedPoint::Tag(tag) => {
                if !git.is_on_tag(tag).await? {
                    findings.warn(format!("HEAD is not on tag '{}'", tag));
                }
            }
            ResolvedPoint::Unresolved => {}
        }

        let tree = git.working_tree().await?;
        if !tree.clean {
            findings.warn(format!("uncommitted changes:\n{}", tree.summary));
        }
        Ok(findings.into_outcome())
    }

    async fn upload(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome> {
        let params = params(component)?;
        let git = ctx.scm.git(&ctx.component_root(&component.name));
        let git = git.as_ref();

        if !git.is_repository() {
            return Err(CmgError::component_error(
                &component.name,
                format!("{} does not exist; download it first", git.root().display()),
            ));
        }
        configure_remote(git, &params).await?;
        git.fetch().await?;

        let resolution = resolve(ctx, git, params.target, Strictness::Strict).await?;
        match resolution.point {
            ResolvedPoint::Tag(tag) => {
                if !git.working_tree().await?.clean {
                    ctx.confirm_or_abort(
                        ConfirmKind::PinnedModified,
                        format!(
                            "{} is pinned to tag '{}' but has local modifications; they will not be uploaded",
                            git.root().display(),
                            tag
                        ),
                    )?;
                    return Ok(Outcome::NoOp);
                }
                publish_tag(ctx, git, &tag).await
            }
            ResolvedPoint::Branch {
                local,
                remote: Some(remote),
            } => {
                let current = git.current_branch().await?;
                if current.as_deref() != Some(local.as_str()) {
                    return Err(CmgError::component_error(
                        &component.name,
                        format!(
                            "checked-out branch is {}, expected '{}'",
                            current.map(|c| format!("'{}'", c)).unwrap_or_else(|| "none".into()),
                            local
                        ),
                    ));
                }
                let branch = remote_branch_of(&component.name, &remote)?;
                ensure_clean(ctx, git).await?;
                let integrated = integrate_remote(ctx, git, &remote).await?;
                Ok(integrated.combine(publish(ctx, git, branch.branch()).await?))
            }
            other => Err(CmgError::internal_error(format!(
                "unexpected resolution {:?} for '{}'",
                other, component.name
            ))),
        }
    }

    async fn freeze(&self, ctx: &RunContext, target: FreezeTarget<'_>) -> CmgResult<Outcome> {
        let name = target.name;
        let git = ctx.scm.git(&ctx.component_root(name));
        let git = git.as_ref();
        if !git.is_repository() {
            return Err(CmgError::component_error(
                name,
                format!("{} does not exist; download it first", git.root().display()),
            ));
        }

        let remote = git.remote_config().await?;
        let url = match remote.url {
            Some(url) => url,
            None => {
                return Err(CmgError::component_error(name, "remote 'origin' has no URL"));
            }
        };
        // push 先が未設定なら fetch 先と同じ
        let pushurl = remote.pushurl.unwrap_or_else(|| url.clone());
        target.current.set(name, "url", url);
        target.current.set(name, "pushurl", pushurl);

        if !git.working_tree().await?.clean {
            ctx.reporter.warning(&format!(
                "{} has uncommitted changes; they are not part of the baseline",
                git.root().display()
            ));
        }

        let candidates = git.tags_containing_head().await?;
        let reference_tag = target
            .reference
            .get(name, "tag")
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let (tag, outcome) = match reference_tag {
            Some(tag) if candidates.contains(&tag) => (tag, Outcome::NoOp),
            _ => {
                let request = GitTagRequest {
                    location: git.root().to_path_buf(),
                    baseline: target.baseline.to_string(),
                    candidates: candidates.clone(),
                };
                match ctx.decider.git_tag(&request) {
                    GitTagChoice::UseExisting(tag) if candidates.contains(&tag) => (tag, Outcome::Success),
                    GitTagChoice::UseExisting(tag) => {
                        return Err(CmgError::component_error(
                            name,
                            format!("tag '{}' does not contain HEAD", tag),
                        ))
                    }
                    GitTagChoice::CreateNamed(tag) => (create_tag(ctx, git, &tag).await?, Outcome::Success),
                    GitTagChoice::CreateBaseline => {
                        (create_tag(ctx, git, target.baseline).await?, Outcome::Success)
                    }
                }
            }
        };

        info!(component = name, %tag, "frozen");
        target.current.set(name, "tag", tag);
        target.current.remove_option(name, "branch");
        Ok(outcome)
    }
}

async fn create_tag(ctx: &RunContext, git: &dyn GitOperations, tag: &str) -> CmgResult<String> {
    if git.is_tag(tag).await? {
        return Err(CmgError::component_error(
            git.root().display().to_string(),
            format!("tag '{}' already exists", tag),
        ));
    }
    git.create_tag(tag).await?;
    if ctx.settings.online {
        publish_tag(ctx, git, tag).await?;
    } else {
        ctx.reporter.warning(&format!(
            "offline: tag '{}' in {} is not pushed",
            tag,
            git.root().display()
        ));
    }
    Ok(tag.to_string())
}
