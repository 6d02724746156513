use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// オペレータ向けの出力先
pub trait Reporter: Send + Sync {
    /// コンポーネント（またはコンテナ）の処理開始
    fn section(&self, location: &Path);

    fn info(&self, message: &str);

    fn warning(&self, message: &str);
}

/// 記録されたイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Section(PathBuf),
    Info(String),
    Warning(String),
}

/// 出力をメモリに貯めるだけの Reporter
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReportEvent::Warning(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Reporter for RecordingReporter {
    fn section(&self, location: &Path) {
        self.push(ReportEvent::Section(location.to_path_buf()));
    }

    fn info(&self, message: &str) {
        self.push(ReportEvent::Info(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(ReportEvent::Warning(message.to_string()));
    }
}
