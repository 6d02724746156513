use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::application::services::decision::{ConfirmKind, ConfirmRequest, Confirmation, Decider};
use crate::application::services::reporter::Reporter;
use crate::common::error::CmgError;
use crate::common::result::CmgResult;
use crate::domain::entities::settings::Settings;
use crate::infrastructure::filesystem::{find_container_root, StreamStore};
use crate::infrastructure::scm::{GitOperations, ScmProvider};

/// 1 回の実行で共有する文脈
#[derive(Clone)]
pub struct RunContext {
    /// コンテナのルート（`_stream` のあるディレクトリ）
    pub root: PathBuf,
    pub settings: Settings,
    pub scm: Arc<dyn ScmProvider>,
    pub decider: Arc<dyn Decider>,
    pub reporter: Arc<dyn Reporter>,
}

impl RunContext {
    pub fn new(
        root: impl Into<PathBuf>,
        settings: Settings,
        scm: Arc<dyn ScmProvider>,
        decider: Arc<dyn Decider>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            root: root.into(),
            settings,
            scm,
            decider,
            reporter,
        }
    }

    /// `start` から上へ `_stream` を探し、`git config cmg.*` を読んで文脈を作る
    pub async fn open(
        start: &Path,
        scm: Arc<dyn ScmProvider>,
        decider: Arc<dyn Decider>,
        reporter: Arc<dyn Reporter>,
    ) -> CmgResult<Self> {
        let root = find_container_root(start)?;
        let settings = load_settings(scm.git(&root).as_ref()).await?;
        debug!(root = %root.display(), ?settings, "container opened");
        Ok(Self::new(root, settings, scm, decider, reporter))
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn component_root(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// コンテナ自身の Git リポジトリ
    pub fn container_git(&self) -> Arc<dyn GitOperations> {
        self.scm.git(&self.root)
    }

    pub fn store(&self) -> StreamStore {
        StreamStore::new(&self.root)
    }

    /// 確認を求め、Quit なら実行全体を中断する
    pub fn confirm_or_abort(&self, kind: ConfirmKind, message: impl Into<String>) -> CmgResult<()> {
        let request = ConfirmRequest::new(kind, message);
        match self.decider.confirm(&request) {
            Confirmation::Continue => Ok(()),
            Confirmation::Quit => Err(CmgError::aborted(request.message)),
        }
    }
}

/// `cmg.<key>` を読み込む。未設定や true/false 以外は既定値のまま。
pub async fn load_settings(git: &dyn GitOperations) -> CmgResult<Settings> {
    let mut settings = Settings::default();
    if !git.is_repository() {
        return Ok(settings);
    }
    for key in Settings::KEYS {
        if let Some(raw) = git.config_value(&format!("cmg.{}", key)).await? {
            if !settings.apply_raw(key, &raw) {
                debug!(key, %raw, "ignoring non-boolean setting");
            }
        }
    }
    Ok(settings)
}
