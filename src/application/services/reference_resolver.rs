use tracing::debug;

use crate::application::services::decision::Decider;
use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::domain::value_objects::branch_name::{is_remote_qualified, RemoteBranch};
use crate::domain::value_objects::reference_point::{PointCategory, ResolvedPoint};
use crate::infrastructure::scm::GitOperations;

/// 解決できない point をエラーにするか警告にするか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// download / upload / freeze
    Strict,
    /// status
    Lenient,
}

/// point の解決結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub point: ResolvedPoint,
    pub category: PointCategory,
    /// Lenient のときだけ積まれる
    pub warnings: Vec<String>,
}

impl Resolution {
    fn new(point: ResolvedPoint, category: PointCategory) -> Self {
        Self {
            point,
            category,
            warnings: Vec::new(),
        }
    }
}

/// point 文字列をブランチの組またはタグに解決する。
///
/// 判定順:
/// 1. 空文字列: 現在のブランチと追跡先
/// 2. 既存のローカルブランチ
/// 3. `origin/<point>` があればローカルブランチを作成
/// 4. リモート追跡ブランチ名そのもの
/// 5. タグ
pub struct ReferenceResolver<'a> {
    git: &'a dyn GitOperations,
    decider: &'a dyn Decider,
    strictness: Strictness,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(git: &'a dyn GitOperations, decider: &'a dyn Decider, strictness: Strictness) -> Self {
        Self {
            git,
            decider,
            strictness,
        }
    }

    /// 全規則で解決する
    pub async fn resolve(&self, point: &str) -> CmgResult<Resolution> {
        if let Some(resolution) = self.resolve_branch_rules(point).await? {
            return Ok(resolution);
        }
        if self.git.is_tag(point).await? {
            debug!(point, "resolved as tag");
            return Ok(Resolution::new(
                ResolvedPoint::Tag(point.to_string()),
                PointCategory::Tag,
            ));
        }
        self.unresolved(
            point,
            format!(
                "'{}' is not a local branch, remote-tracking branch, or tag in {}",
                point,
                self.git.root().display()
            ),
        )
    }

    /// ブランチの規則（1〜4）だけで解決する
    pub async fn resolve_branch(&self, point: &str) -> CmgResult<Resolution> {
        match self.resolve_branch_rules(point).await? {
            Some(resolution) => Ok(resolution),
            None => self.unresolved(
                point,
                format!(
                    "'{}' is not a local branch or remote-tracking branch in {}",
                    point,
                    self.git.root().display()
                ),
            ),
        }
    }

    /// 既存タグであることだけを確認する
    pub async fn resolve_tag(&self, tag: &str) -> CmgResult<Resolution> {
        if self.git.is_tag(tag).await? {
            Ok(Resolution::new(ResolvedPoint::Tag(tag.to_string()), PointCategory::Tag))
        } else {
            self.unresolved(
                tag,
                format!("tag '{}' does not exist in {}", tag, self.git.root().display()),
            )
        }
    }

    async fn resolve_branch_rules(&self, point: &str) -> CmgResult<Option<Resolution>> {
        if point.is_empty() {
            return self.resolve_current().await.map(Some);
        }

        if !is_remote_qualified(point) {
            if let Some(upstream) = self.git.upstream_of(point).await? {
                debug!(point, ?upstream, "resolved as local branch");
                return self
                    .tracked(point.to_string(), upstream, PointCategory::LocalBranch)
                    .map(Some);
            }

            let remote = RemoteBranch::origin(point).to_string();
            if self.git.is_remote_branch(&remote).await? {
                debug!(point, %remote, "creating local branch");
                self.git.create_branch(point, &remote).await?;
                return Ok(Some(Resolution::new(
                    ResolvedPoint::branch(point, remote),
                    PointCategory::CreatedLocalBranch,
                )));
            }
        }

        if let Some(remote) = RemoteBranch::parse(point) {
            let remote_name = remote.to_string();
            if self.git.is_remote_branch(&remote_name).await? {
                return self.reverse_resolve(point, &remote).await.map(Some);
            }
        }

        Ok(None)
    }

    async fn resolve_current(&self) -> CmgResult<Resolution> {
        match self.git.current_pair().await? {
            Some((local, upstream)) => self.tracked(local, upstream, PointCategory::CurrentBranch),
            None => self.unresolved(
                "",
                format!("HEAD is not on a branch in {}", self.git.root().display()),
            ),
        }
    }

    async fn reverse_resolve(&self, point: &str, remote: &RemoteBranch) -> CmgResult<Resolution> {
        let remote_name = remote.to_string();
        let found = |local: String| {
            Resolution::new(
                ResolvedPoint::branch(local, remote_name.clone()),
                PointCategory::RemoteTrackingBranch,
            )
        };

        if let Some((local, Some(upstream))) = self.git.current_pair().await? {
            if upstream == remote_name {
                return Ok(found(local));
            }
        }

        let mut locals: Vec<String> = self
            .git
            .locals_tracking(&remote_name)
            .await?
            .into_iter()
            .map(|b| b.local)
            .collect();

        match locals.len() {
            0 => {
                let local = remote.branch().to_string();
                debug!(%remote_name, %local, "creating default local branch");
                self.git.create_branch(&local, &remote_name).await?;
                Ok(found(local))
            }
            1 => Ok(found(locals.remove(0))),
            _ => match self.strictness {
                Strictness::Strict => match self.decider.select_local_branch(&remote_name, &locals) {
                    Some(local) => Ok(found(local)),
                    None => Err(CmgError::resolution_error(
                        point,
                        format!(
                            "'{}' is tracked by several local branches ({}); check one of them out",
                            remote_name,
                            locals.join(", ")
                        ),
                    )),
                },
                Strictness::Lenient => {
                    let message = format!(
                        "'{}' is tracked by several local branches: {}",
                        remote_name,
                        locals.join(", ")
                    );
                    let mut resolution = found(locals.remove(0));
                    resolution.warnings.push(message);
                    Ok(resolution)
                }
            },
        }
    }

    fn tracked(
        &self,
        local: String,
        upstream: Option<String>,
        category: PointCategory,
    ) -> CmgResult<Resolution> {
        match upstream {
            Some(remote) => Ok(Resolution::new(ResolvedPoint::branch(local, remote), category)),
            None => {
                let message = format!("local branch '{}' does not track a remote branch", local);
                match self.strictness {
                    Strictness::Strict => Err(CmgError::resolution_error(local, message)),
                    Strictness::Lenient => Ok(Resolution {
                        point: ResolvedPoint::Branch { local, remote: None },
                        category,
                        warnings: vec![message],
                    }),
                }
            }
        }
    }

    fn unresolved(&self, point: &str, message: String) -> CmgResult<Resolution> {
        match self.strictness {
            Strictness::Strict => Err(CmgError::resolution_error(point, message)),
            Strictness::Lenient => Ok(Resolution {
                point: ResolvedPoint::Unresolved,
                category: PointCategory::Unresolved,
                warnings: vec![message],
            }),
        }
    }
}
