use super::atom::{Atom, AtomRole};
use super::ids::{AtomId, ResidueId};
use super::residue::Residue;
use super::topology::{Bond, BondOrder};
use nalgebra::{Point3, Rotation3, Vector3};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashMap;

/// Axis-aligned bounding box of a set of atom positions, in nanometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn lengths(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Represents a complete molecular system with atoms, residues, bonds and a periodic box.
///
/// Atoms and residues live in slot maps for stable IDs. Residues are kept in
/// insertion order, and atoms are ordered by residue and then by insertion,
/// which is the order every file writer uses.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Residue IDs in insertion order.
    residue_order: Vec<ResidueId>,
    /// List of all bonds in the system.
    bonds: Vec<Bond>,
    /// Cached adjacency list for bond connectivity, indexed by atom ID.
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
    /// Periodic box lengths in nanometers.
    periodicity: Vector3<f64>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system with a zero-sized box.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Retrieves a mutable reference to an atom by its ID.
    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    /// Returns an iterator over all atoms in storage order.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    /// Returns the number of atoms in the system.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Retrieves an immutable reference to a residue by its ID.
    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    /// Returns an iterator over all residues in insertion order.
    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residue_order
            .iter()
            .filter_map(|&id| self.residues.get(id).map(|r| (id, r)))
    }

    /// Finds the first residue with the given name.
    pub fn find_residue_by_name(&self, name: &str) -> Option<ResidueId> {
        self.residues_iter()
            .find(|(_, residue)| residue.name == name)
            .map(|(id, _)| id)
    }

    /// Returns a slice of all bonds in the system.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Returns the periodic box lengths in nanometers.
    pub fn periodicity(&self) -> Vector3<f64> {
        self.periodicity
    }

    /// Replaces the periodic box lengths.
    pub fn set_periodicity(&mut self, periodicity: Vector3<f64>) {
        self.periodicity = periodicity;
    }

    /// Adds a new residue at the end of the residue order.
    ///
    /// Residue numbers are assigned sequentially starting at 1.
    pub fn add_residue(&mut self, name: &str) -> ResidueId {
        let number = self.residue_order.len() as isize + 1;
        let residue_id = self.residues.insert(Residue::new(number, name));
        self.residue_order.push(residue_id);
        residue_id
    }

    /// Renames a residue.
    ///
    /// Returns `None` if the residue does not exist.
    pub fn rename_residue(&mut self, residue_id: ResidueId, name: &str) -> Option<()> {
        let residue = self.residues.get_mut(residue_id)?;
        residue.name = name.to_string();
        Some(())
    }

    /// Adds an atom to a specific residue.
    ///
    /// The atom's `residue_id` is overwritten with `residue_id`.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)` if successful, otherwise `None` (e.g., if residue doesn't exist).
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        atom.residue_id = residue_id;

        let atom_id = self.atoms.insert(atom);
        self.bond_adjacency.insert(atom_id, Vec::new());
        self.residues.get_mut(residue_id)?.add_atom(atom_id);

        Some(atom_id)
    }

    /// Adds a bond between two atoms.
    ///
    /// Adding an existing bond succeeds without creating a duplicate.
    ///
    /// # Return
    ///
    /// Returns `Some(())` if successful, otherwise `None` (e.g., if atoms don't exist
    /// or both IDs refer to the same atom).
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId, order: BondOrder) -> Option<()> {
        if atom1_id == atom2_id
            || !self.atoms.contains_key(atom1_id)
            || !self.atoms.contains_key(atom2_id)
        {
            return None;
        }

        if self.bond_adjacency[atom1_id].contains(&atom2_id) {
            return Some(());
        }

        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        self.bond_adjacency[atom1_id].push(atom2_id);
        self.bond_adjacency[atom2_id].push(atom1_id);
        Some(())
    }

    /// Retrieves the bonded neighbors of an atom.
    pub fn get_bonded_neighbors(&self, atom_id: AtomId) -> Option<&[AtomId]> {
        self.bond_adjacency.get(atom_id).map(|v| v.as_slice())
    }

    /// Returns the atom IDs ordered by residue and then by insertion within each residue.
    pub fn ordered_atom_ids(&self) -> Vec<AtomId> {
        self.residues_iter()
            .flat_map(|(_, residue)| residue.atoms().iter().copied())
            .collect()
    }

    /// Maps every atom ID to its 0-based position in [`ordered_atom_ids`](Self::ordered_atom_ids).
    pub fn atom_index_map(&self) -> HashMap<AtomId, usize> {
        self.ordered_atom_ids()
            .into_iter()
            .enumerate()
            .map(|(idx, id)| (id, idx))
            .collect()
    }

    /// Returns an iterator over atoms with a specific role.
    pub fn atoms_by_role(&self, role: AtomRole) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter().filter(move |(_, atom)| atom.role == role)
    }

    /// Computes the axis-aligned bounding box of all atoms.
    ///
    /// Returns `None` for an empty system.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        bounding_box_of(self.atoms.values().map(|atom| atom.position))
    }

    /// Moves every atom by `shift`.
    pub fn translate(&mut self, shift: &Vector3<f64>) {
        for atom in self.atoms.values_mut() {
            atom.position += shift;
        }
    }

    /// Rotates every atom about `pivot`.
    pub fn rotate_about(&mut self, rotation: &Rotation3<f64>, pivot: &Point3<f64>) {
        for atom in self.atoms.values_mut() {
            atom.position = pivot + rotation * (atom.position - pivot);
        }
    }

    /// Copies all residues, atoms and bonds of `other` into this system.
    ///
    /// Residues keep their names and are appended after the existing ones.
    /// The periodic box of `self` is left untouched.
    ///
    /// # Return
    ///
    /// A map from the atom IDs of `other` to the newly created IDs.
    pub fn merge(&mut self, other: &MolecularSystem) -> HashMap<AtomId, AtomId> {
        let mut id_map = HashMap::with_capacity(other.atom_count());
        for (_, residue) in other.residues_iter() {
            let new_residue_id = self.add_residue(&residue.name);
            self.copy_atoms(other, residue.atoms(), new_residue_id, &mut id_map);
        }
        self.copy_bonds(other, &id_map);
        id_map
    }

    /// Copies all atoms and bonds of `other` into a single existing residue.
    ///
    /// # Return
    ///
    /// A map from the atom IDs of `other` to the newly created IDs, or `None`
    /// if `residue_id` does not exist.
    pub fn merge_into_residue(
        &mut self,
        other: &MolecularSystem,
        residue_id: ResidueId,
    ) -> Option<HashMap<AtomId, AtomId>> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        let mut id_map = HashMap::with_capacity(other.atom_count());
        let ordered = other.ordered_atom_ids();
        self.copy_atoms(other, &ordered, residue_id, &mut id_map);
        self.copy_bonds(other, &id_map);
        Some(id_map)
    }

    fn copy_atoms(
        &mut self,
        other: &MolecularSystem,
        atom_ids: &[AtomId],
        residue_id: ResidueId,
        id_map: &mut HashMap<AtomId, AtomId>,
    ) {
        for &old_id in atom_ids {
            if let Some(atom) = other.atom(old_id) {
                if let Some(new_id) = self.add_atom_to_residue(residue_id, atom.clone()) {
                    id_map.insert(old_id, new_id);
                }
            }
        }
    }

    fn copy_bonds(&mut self, other: &MolecularSystem, id_map: &HashMap<AtomId, AtomId>) {
        for bond in other.bonds() {
            if let (Some(&a1), Some(&a2)) = (id_map.get(&bond.atom1_id), id_map.get(&bond.atom2_id))
            {
                self.add_bond(a1, a2, bond.order);
            }
        }
    }
}

fn bounding_box_of(positions: impl Iterator<Item = Point3<f64>>) -> Option<BoundingBox> {
    positions.fold(None, |acc, p| match acc {
        None => Some(BoundingBox { min: p, max: p }),
        Some(bb) => Some(BoundingBox {
            min: bb.min.inf(&p),
            max: bb.max.sup(&p),
        }),
    })
}
