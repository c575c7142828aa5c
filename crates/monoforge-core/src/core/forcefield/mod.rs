//! # Force Field Module
//!
//! Turns a built [`MolecularSystem`](crate::core::models::system::MolecularSystem)
//! into a parameterized [`Structure`](structure::Structure).
//!
//! ## Overview
//!
//! Parameters live in a TOML file (see `resources/oplsaa.toml`). Atom types are
//! assigned by ordered element and first-neighbor rules, then bonds, angles,
//! and Ryckaert-Bellemans dihedrals are enumerated from connectivity and
//! matched against class-based parameter tables that accept `X` wildcards.
//!
//! ## Key Components
//!
//! - [`params`] - TOML schema, loading, validation, and the bundled parameter set
//! - [`typing`] - Rule-based atom typing
//! - [`parameterization`] - The [`Parameterize`](parameterization::Parameterize) trait and term enumeration
//! - [`structure`] - The parameterized output consumed by the topology writers

pub mod parameterization;
pub mod params;
pub mod structure;
pub mod typing;
