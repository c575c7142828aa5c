//! # monoforge Core Library
//!
//! Builds amorphous silica dual-monolayer systems, parameterizes them with a
//! rule-based OPLS-AA style force field and writes GROMACS and LAMMPS inputs.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Molecular data models, geometry builders,
//!   force-field parameters and file formats. Nothing here touches a job or a
//!   project directory.
//!
//! - **[`engine`]: The Plumbing.** Run configuration, project and job
//!   bookkeeping, progress reporting, index-group generation and the error
//!   type that the workflows return.
//!
//! - **[`workflows`]: The Public API.** Complete operations over a job, such
//!   as [`workflows::initialize::run`], which produces `init.gro`,
//!   `init.top`, `init.lammps` and `init.ndx`.

pub mod core;
pub mod engine;
pub mod workflows;
