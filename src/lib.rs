//! # cmg - configuration management glue
//!
//! `cmg` keeps a *container* (a Git repository) and the *components* it lists
//! in step. Components are Git repositories, Subversion working copies or plain
//! copies of a file or directory. The list lives in INI-style stream files at
//! the container root:
//!
//! ```ini
//! [lib]
//! type = git
//! url = git@example.com:lib.git
//! branch = main
//!
//! [docs]
//! type = dir
//! url = /share/docs
//! ```
//!
//! `_stream` is the base file; `_stream_<local>` and `_stream_<remote>` override
//! it for a container branch. A *baseline* is an annotated tag on the container
//! whose message is the full configuration at freeze time.
//!
//! ## Verbs
//!
//! - `download [point]`: bring the container and every component to a point
//! - `status [point]`: warn about everything that differs from the point
//! - `upload [point]`: push every component, then the container
//! - `freeze <tag> [old_tag]`: pin every component and tag the result
//!
//! ## Architecture
//!
//! - [`domain`]: configuration snapshots, components, settings and value objects
//! - [`application`]: the four verbs, the reference resolver, the per-kind adapters
//!   and the operator decision boundary
//! - [`infrastructure`]: `git`/`svn` executables, stream files, plain copies
//! - [`presentation`]: clap CLI and terminal UI
//! - [`common`]: [`CmgError`] and [`Result`]
//!
//! ## Using the library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cmg::application::context::RunContext;
//! use cmg::application::services::decision::PolicyDecider;
//! use cmg::application::services::reporter::RecordingReporter;
//! use cmg::application::use_cases::{StatusCheckConfig, StatusCheckUseCase};
//! use cmg::infrastructure::ScmFactory;
//!
//! # async fn example() -> cmg::Result<()> {
//! let ctx = RunContext::open(
//!     std::path::Path::new("."),
//!     Arc::new(ScmFactory::default()),
//!     Arc::new(PolicyDecider::aborting()),
//!     Arc::new(RecordingReporter::new()),
//! )
//! .await?;
//! let summary = StatusCheckUseCase::new(ctx, StatusCheckConfig::default())
//!     .execute()
//!     .await?;
//! println!("{} components need attention", summary.conflicts.len());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use crate::common::error::CmgError;
pub use crate::common::result::CmgResult as Result;
