//! 動詞をまたいで使うサービス

pub mod decision;
pub mod git_workflow;
pub mod outcome;
pub mod reference_resolver;
pub mod reporter;
