//! プレゼンテーション層: CLI と端末 UI

pub mod cli;
pub mod ui;
