use super::error::BuildError;
use super::terminal::TerminalGroup;
use crate::core::models::atom::{Atom, AtomRole};
use crate::core::models::element::Element;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use crate::core::utils::geometry::{TETRAHEDRAL_ANGLE_DEG, tetrahedral_substituents};
use nalgebra::{Point3, Vector3};

const SI_C_BOND_LENGTH: f64 = 0.185;
const C_C_BOND_LENGTH: f64 = 0.154;
const C_H_BOND_LENGTH: f64 = 0.109;
const SI_O_BOND_LENGTH: f64 = 0.165;
const O_H_BOND_LENGTH: f64 = 0.096;
const CHAIN_RESIDUE_NAME: &str = "CHN";

/// A single chain ready to be copied onto a surface.
///
/// The head silicon sits at the origin and the chain extends along +z. The
/// head is missing its bond to the surface: whoever attaches the prototype
/// bonds the head to a surface oxygen located at `-z`.
#[derive(Debug, Clone)]
pub struct ChainPrototype {
    system: MolecularSystem,
    head: AtomId,
}

impl ChainPrototype {
    pub fn system(&self) -> &MolecularSystem {
        &self.system
    }

    pub fn head(&self) -> AtomId {
        self.head
    }

    pub fn atom_count(&self) -> usize {
        self.system.atom_count()
    }
}

/// Linear alkylsilane: a silanol head, `chain_length` methylene units, and a
/// terminal group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alkylsilane {
    pub chain_length: usize,
    pub terminal_group: TerminalGroup,
}

impl Alkylsilane {
    pub fn new(chain_length: usize, terminal_group: TerminalGroup) -> Self {
        Self {
            chain_length,
            terminal_group,
        }
    }

    /// Builds the all-trans chain geometry.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyChain`] when `chain_length` is zero.
    pub fn build(&self) -> Result<ChainPrototype, BuildError> {
        if self.chain_length == 0 {
            return Err(BuildError::EmptyChain);
        }

        let mut builder = ChainAssembler::new();

        // Heavy atoms follow a planar zig-zag: Si, C1..Cn, then the terminal heavy atom.
        let half_angle = ((180.0 - TETRAHEDRAL_ANGLE_DEG) / 2.0).to_radians();
        let step = |index: usize| {
            let sign = if index % 2 == 1 { 1.0 } else { -1.0 };
            Vector3::new(sign * half_angle.sin(), 0.0, half_angle.cos())
        };

        let head = builder.add(Element::Si, Point3::origin(), AtomRole::Anchor)?;
        let mut heavy = vec![(head, Point3::origin())];
        let mut position = Point3::origin();
        for m in 1..=self.chain_length {
            let length = if m == 1 {
                SI_C_BOND_LENGTH
            } else {
                C_C_BOND_LENGTH
            };
            position += step(m) * length;
            let carbon = builder.add(Element::C, position, AtomRole::Backbone)?;
            builder.bond(heavy[m - 1].0, carbon);
            heavy.push((carbon, position));
        }

        let terminal = self.terminal_group;
        position += step(self.chain_length + 1) * terminal.heavy_bond_length();
        let terminal_heavy = builder.add(terminal.heavy_element(), position, AtomRole::Terminal)?;
        builder.bond(heavy[self.chain_length].0, terminal_heavy);
        heavy.push((terminal_heavy, position));

        // Silanol groups complete the head tetrahedron around the missing surface bond.
        let surface_oxygen = Point3::new(0.0, 0.0, -SI_O_BOND_LENGTH);
        let hydroxyls = tetrahedral_substituents(
            &Point3::origin(),
            &[surface_oxygen, heavy[1].1],
            None,
            SI_O_BOND_LENGTH,
        );
        let away_from_surface = -Vector3::z();
        for o_position in hydroxyls {
            let oxygen = builder.add(Element::O, o_position, AtomRole::Anchor)?;
            builder.bond(head, oxygen);
            let h_position = tetrahedral_substituents(
                &o_position,
                &[Point3::origin()],
                Some(&away_from_surface),
                O_H_BOND_LENGTH,
            )
            .into_iter()
            .next()
            .ok_or_else(|| BuildError::Internal("cannot place silanol hydrogen".to_string()))?;
            let hydrogen = builder.add(Element::H, h_position, AtomRole::Anchor)?;
            builder.bond(oxygen, hydrogen);
        }

        for m in 1..=self.chain_length {
            let (carbon, c_position) = heavy[m];
            let neighbors = [heavy[m - 1].1, heavy[m + 1].1];
            let hydrogens = tetrahedral_substituents(&c_position, &neighbors, None, C_H_BOND_LENGTH);
            for h_position in hydrogens {
                let hydrogen = builder.add(Element::H, h_position, AtomRole::Backbone)?;
                builder.bond(carbon, hydrogen);
            }
        }

        let (element, count, length) = terminal.substituents();
        let last_carbon = heavy[self.chain_length].1;
        let anti_reference = heavy[self.chain_length - 1].1 - last_carbon;
        let positions =
            tetrahedral_substituents(&position, &[last_carbon], Some(&anti_reference), length);
        for sub_position in positions.into_iter().take(count) {
            let atom = builder.add(element, sub_position, AtomRole::Terminal)?;
            builder.bond(terminal_heavy, atom);
        }

        Ok(ChainPrototype {
            system: builder.system,
            head,
        })
    }
}

struct ChainAssembler {
    system: MolecularSystem,
    residue_id: ResidueId,
}

impl ChainAssembler {
    fn new() -> Self {
        let mut system = MolecularSystem::new();
        let residue_id = system.add_residue(CHAIN_RESIDUE_NAME);
        Self { system, residue_id }
    }

    fn add(
        &mut self,
        element: Element,
        position: Point3<f64>,
        role: AtomRole,
    ) -> Result<AtomId, BuildError> {
        let atom = Atom::new(element, self.residue_id, position).with_role(role);
        self.system
            .add_atom_to_residue(self.residue_id, atom)
            .ok_or_else(|| BuildError::Internal("chain residue vanished".to_string()))
    }

    fn bond(&mut self, a: AtomId, b: AtomId) {
        self.system.add_bond(a, b, BondOrder::Single);
    }
}
