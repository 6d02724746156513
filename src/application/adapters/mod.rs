//! バックエンドごとのコンポーネント操作
//!
//! 4 つの動詞それぞれについて、1 コンポーネント分の処理を行う。

pub mod copy_adapter;
pub mod git_adapter;
pub mod svn_adapter;

use async_trait::async_trait;

use crate::application::context::RunContext;
use crate::application::services::outcome::Outcome;
use crate::common::result::CmgResult;
use crate::domain::entities::component::Component;
use crate::domain::entities::config_snapshot::ConfigSnapshot;
use crate::domain::value_objects::scm_type::ScmType;

pub use copy_adapter::CopyAdapter;
pub use git_adapter::GitAdapter;
pub use svn_adapter::SvnAdapter;

/// freeze の入力と出力
pub struct FreezeTarget<'a> {
    /// コンポーネント名（セクション名）
    pub name: &'a str,
    /// 参照する設定（現在のストリームまたは旧ベースライン）
    pub reference: &'a ConfigSnapshot,
    /// 書き換え中の新しいベースライン
    pub current: &'a mut ConfigSnapshot,
    /// 作成するベースラインのタグ名
    pub baseline: &'a str,
}

/// 1 コンポーネント分の download / status / upload / freeze
#[async_trait]
pub trait ComponentAdapter: Send + Sync {
    async fn download(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome>;

    /// 警告だけを出す。ここでエラーになるのは VCS の実行失敗のみ。
    async fn status(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome>;

    async fn upload(&self, ctx: &RunContext, component: &Component) -> CmgResult<Outcome>;

    async fn freeze(&self, ctx: &RunContext, target: FreezeTarget<'_>) -> CmgResult<Outcome>;
}

/// バックエンドの種類ごとのアダプタ
#[derive(Debug, Clone, Copy)]
pub enum ComponentBackend {
    Git(GitAdapter),
    Subversion(SvnAdapter),
    FileCopy(CopyAdapter),
    DirectoryCopy(CopyAdapter),
}

impl ComponentBackend {
    pub fn for_kind(kind: ScmType) -> Self {
        match kind {
            ScmType::Git => Self::Git(GitAdapter),
            ScmType::Svn => Self::Subversion(SvnAdapter),
            ScmType::File => Self::FileCopy(CopyAdapter::file()),
            ScmType::Dir => Self::DirectoryCopy(CopyAdapter::directory()),
        }
    }

    pub fn adapter(&self) -> &dyn ComponentAdapter {
        match self {
            Self::Git(adapter) => adapter,
            Self::Subversion(adapter) => adapter,
            Self::FileCopy(adapter) | Self::DirectoryCopy(adapter) => adapter,
        }
    }
}

/// status の警告を報告しつつ集める
pub(crate) struct Findings<'a> {
    ctx: &'a RunContext,
    messages: Vec<String>,
}

impl<'a> Findings<'a> {
    pub(crate) fn new(ctx: &'a RunContext) -> Self {
        Self {
            ctx,
            messages: Vec::new(),
        }
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.ctx.reporter.warning(&message);
        self.messages.push(message);
    }

    /// 警告が無ければ NoOp、あれば要確認として Conflict
    pub(crate) fn into_outcome(self) -> Outcome {
        if self.messages.is_empty() {
            Outcome::NoOp
        } else {
            Outcome::Conflict(self.messages.join("\n"))
        }
    }
}
