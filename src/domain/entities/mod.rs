//! Domain entities.

pub mod component;
pub mod config_snapshot;
pub mod settings;
