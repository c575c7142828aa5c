//! # Core Module
//!
//! Stateless building blocks for assembling and describing monolayer systems.
//!
//! - **Molecular Representation** ([`models`]) - atoms, residues, bonds and the periodic box
//! - **Geometry Builders** ([`builders`]) - silica surfaces, alkylsilane chains, monolayers and dual assemblies
//! - **Force Field** ([`forcefield`]) - TOML parameter sets, atom typing and term assignment
//! - **File I/O** ([`io`]) - GRO, TOP, LAMMPS data and NDX serialization
//! - **Utilities** ([`utils`]) - rotations and tetrahedral placement
//!
//! All lengths are nanometers and all energies kJ/mol until a writer converts
//! them to the units of its format.

pub mod builders;
pub mod forcefield;
pub mod io;
pub mod models;
pub mod utils;
