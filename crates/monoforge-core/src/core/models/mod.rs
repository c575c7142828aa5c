//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent
//! molecular systems in monoforge.
//!
//! ## Overview
//!
//! The models describe atoms, residues, bonds and the periodic box of a system.
//! Geometry builders produce them, the force field consumes them, and every
//! file writer reads from them. Positions are kept in nanometers throughout.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom representation with coordinates and role
//! - [`element`] - Chemical elements and their atomic numbers
//! - [`residue`] - Named groups of atoms (a whole monolayer is one residue)
//! - [`system`] - Complete molecular system with residues, bonds, and periodicity
//! - [`topology`] - Bond representation
//! - [`ids`] - Unique identifier types for atoms and residues
//!
//! ## Usage
//!
//! ```ignore
//! use monoforge::core::models::{system::MolecularSystem, atom::Atom, element::Element};
//!
//! let mut system = MolecularSystem::new();
//! let residue_id = system.add_residue("Bottom");
//! let atom = Atom::new(Element::Si, residue_id, Point3::new(0.0, 0.0, 0.0));
//! system.add_atom_to_residue(residue_id, atom);
//! ```

pub mod atom;
pub mod element;
pub mod ids;
pub mod residue;
pub mod system;
pub mod topology;
