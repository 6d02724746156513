use std::path::PathBuf;

/// 作業ツリーが汚れているときの対処方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupChoice {
    /// すべてステージしてコミット（detached HEAD では選べない）
    CommitAll,
    /// `reset --hard` と `clean -fd`
    ResetAndClean,
    /// オペレータが手動で片付けた
    HandledManually,
    Abort,
}

/// クリーンアップ判断の入力
#[derive(Debug, Clone)]
pub struct CleanupRequest {
    pub location: PathBuf,
    /// `status --porcelain` の出力
    pub summary: String,
    pub detached: bool,
}

impl CleanupRequest {
    /// オペレータに提示する選択肢
    pub fn choices(&self) -> Vec<CleanupChoice> {
        let mut choices = Vec::with_capacity(4);
        if !self.detached {
            choices.push(CleanupChoice::CommitAll);
        }
        choices.extend([
            CleanupChoice::ResetAndClean,
            CleanupChoice::HandledManually,
            CleanupChoice::Abort,
        ]);
        choices
    }
}

/// 確認が必要な状況の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    /// merge / rebase が衝突で止まった
    ConflictResolved,
    /// タグや固定リビジョンの作業コピーに変更がある
    PinnedModified,
    /// push が拒否された
    PushRejected,
    /// freeze 対象の作業コピーに未コミットの変更がある
    FreezeModified,
    /// freeze のベースラインを確認した
    ReviewBaseline,
}

#[derive(Debug, Clone)]
pub struct ConfirmRequest {
    pub kind: ConfirmKind,
    pub message: String,
}

impl ConfirmRequest {
    pub fn new(kind: ConfirmKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Continue,
    Quit,
}

/// Git コンポーネントの freeze でのタグ選択
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitTagChoice {
    /// 任意の名前で新しいタグを作る
    CreateNamed(String),
    /// ベースラインと同じ名前のタグを作る
    CreateBaseline,
    /// HEAD を含む既存タグを使う
    UseExisting(String),
}

#[derive(Debug, Clone)]
pub struct GitTagRequest {
    pub location: PathBuf,
    pub baseline: String,
    /// HEAD を含むタグ
    pub candidates: Vec<String>,
}

/// Subversion コンポーネントの freeze での選択
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvnTagChoice {
    /// 現在の URL とリビジョンを記録する
    UseRevision,
    CreateNamed(String),
    CreateBaseline,
}

#[derive(Debug, Clone)]
pub struct SvnTagRequest {
    pub location: PathBuf,
    pub baseline: String,
    pub branch_url: String,
    pub revision: String,
    pub tags_url: Option<String>,
}

/// 対話的な判断をまとめた境界。
///
/// 端末実装と非対話ポリシー実装がある。
pub trait Decider: Send + Sync {
    fn cleanup(&self, request: &CleanupRequest) -> CleanupChoice;

    fn confirm(&self, request: &ConfirmRequest) -> Confirmation;

    /// リモート追跡ブランチを追う複数のローカルブランチから一つ選ぶ
    fn select_local_branch(&self, remote: &str, candidates: &[String]) -> Option<String>;

    fn git_tag(&self, request: &GitTagRequest) -> GitTagChoice;

    fn svn_tag(&self, request: &SvnTagRequest) -> SvnTagChoice;

    /// タグディレクトリの URL を尋ねる
    fn tags_url(&self, branch_url: &str) -> Option<String>;
}

/// 端末が無いときに使う決定的なポリシー
#[derive(Debug, Clone, Copy)]
pub struct PolicyDecider {
    accept_review: bool,
}

impl PolicyDecider {
    /// すべての確認で中断する
    pub fn aborting() -> Self {
        Self { accept_review: false }
    }

    /// ベースラインの確認だけは続行する
    pub fn accepting() -> Self {
        Self { accept_review: true }
    }
}

impl Decider for PolicyDecider {
    fn cleanup(&self, _request: &CleanupRequest) -> CleanupChoice {
        CleanupChoice::Abort
    }

    fn confirm(&self, request: &ConfirmRequest) -> Confirmation {
        if self.accept_review && request.kind == ConfirmKind::ReviewBaseline {
            Confirmation::Continue
        } else {
            Confirmation::Quit
        }
    }

    fn select_local_branch(&self, _remote: &str, _candidates: &[String]) -> Option<String> {
        None
    }

    fn git_tag(&self, request: &GitTagRequest) -> GitTagChoice {
        match request.candidates.first() {
            Some(tag) => GitTagChoice::UseExisting(tag.clone()),
            None => GitTagChoice::CreateBaseline,
        }
    }

    fn svn_tag(&self, _request: &SvnTagRequest) -> SvnTagChoice {
        SvnTagChoice::UseRevision
    }

    fn tags_url(&self, _branch_url: &str) -> Option<String> {
        None
    }
}
