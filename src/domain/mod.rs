//! Domain layer: configuration snapshots, components, run settings and value objects.
//!
//! Nothing in here touches the file system or spawns processes.

pub mod entities;
pub mod value_objects;
