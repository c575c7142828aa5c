//! Geometry builders for silica surfaces, silane chains, and monolayers.
//!
//! Builders are deterministic: every source of randomness is a
//! [`rand_chacha::ChaCha8Rng`] seeded from the caller's seed, and atoms are
//! created in a fixed order. Rebuilding with the same inputs yields identical
//! coordinates.

pub mod chain;
pub mod dual;
pub mod error;
pub mod monolayer;
pub mod pattern;
pub mod surface;
pub mod terminal;
