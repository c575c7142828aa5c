//! # Workflows Module
//!
//! Complete operations over a job. Each workflow takes a
//! [`Job`](crate::engine::job::Job), a configuration and a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter), and writes
//! its outputs into the job workspace.
//!
//! - [`initialize`] builds the dual-monolayer system and writes `init.gro`,
//!   `init.top`, `init.lammps` and `init.ndx`.

pub mod initialize;
