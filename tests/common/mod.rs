//! Common test utilities and helpers
//!
//! In-memory backends and container fixtures shared by the integration tests.

#![allow(dead_code)]

pub mod fake_scm;
pub mod test_fixtures;
