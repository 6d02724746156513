//! 端末向けの Reporter と Decider

pub mod terminal_decider;
pub mod terminal_reporter;

pub use terminal_decider::TerminalDecider;
pub use terminal_reporter::TerminalReporter;
