//! File formats written by the initialization workflow.
//!
//! [`gro`] implements [`traits::MolecularFile`] for coordinates. [`top`] and
//! [`lammps`] serialize a parameterized
//! [`Structure`](crate::core::forcefield::structure::Structure), and [`ndx`]
//! writes index groups.

pub mod gro;
pub mod lammps;
pub mod ndx;
pub mod top;
pub mod traits;
