//! Application layer: the four container verbs, the per-backend adapters they
//! dispatch to, and the services they share.

pub mod adapters;
pub mod context;
pub mod services;
pub mod use_cases;
