//! # Engine Module
//!
//! Run-time plumbing shared by the workflows.
//!
//! - **Configuration** ([`config`]) - assembly and force-field settings with their defaults
//! - **Backbones** ([`backbone`]) - dispatch from a statepoint name to a chain builder
//! - **Projects and Jobs** ([`job`]) - workspace layout, statepoints and completion checks
//! - **Index Groups** ([`index_groups`]) - per-monolayer atom selections for `init.ndx`
//! - **Progress Monitoring** ([`progress`]) - callback-based progress events
//! - **Error Handling** ([`error`]) - the error type returned by every workflow

pub mod backbone;
pub mod config;
pub mod error;
pub mod index_groups;
pub mod job;
pub mod progress;
