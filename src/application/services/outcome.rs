/// 1 コンポーネント分の処理結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 何かを変更した
    Success,
    /// すでに期待通りだった
    NoOp,
    /// 衝突や食い違いがあり、オペレータが対処した（status では要確認）
    Conflict(String),
}

impl Outcome {
    /// 優先度 Conflict > Success > NoOp で結合する
    pub fn combine(self, other: Outcome) -> Outcome {
        match (self, other) {
            (Outcome::Conflict(a), Outcome::Conflict(b)) => Outcome::Conflict(format!("{}\n{}", a, b)),
            (conflict @ Outcome::Conflict(_), _) | (_, conflict @ Outcome::Conflict(_)) => conflict,
            (Outcome::Success, _) | (_, Outcome::Success) => Outcome::Success,
            _ => Outcome::NoOp,
        }
    }
}

/// 動詞全体の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub components: usize,
    pub changed: usize,
    pub unchanged: usize,
    /// (コンポーネント名, 内容)
    pub conflicts: Vec<(String, String)>,
}

impl RunSummary {
    pub fn record(&mut self, component: &str, outcome: Outcome) {
        self.components += 1;
        match outcome {
            Outcome::Success => self.changed += 1,
            Outcome::NoOp => self.unchanged += 1,
            Outcome::Conflict(detail) => self.conflicts.push((component.to_string(), detail)),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}
