use super::params::{AngleParam, BondParam, CombiningRule, DihedralParam};
use crate::core::models::element::Element;
use nalgebra::{Point3, Vector3};

/// Non-bonded parameters of an atom type used somewhere in a [`Structure`].
#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    pub name: String,
    pub class: String,
    pub element: Element,
    pub mass: f64,
    pub charge: f64,
    pub sigma: f64,
    pub epsilon: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructureAtom {
    pub name: String,
    pub residue_number: isize,
    pub residue_name: String,
    /// Index into [`Structure::atom_types`].
    pub type_index: usize,
    pub charge: f64,
    pub mass: f64,
    /// nm
    pub position: Point3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BondTerm {
    pub atoms: [usize; 2],
    pub param: BondParam,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AngleTerm {
    pub atoms: [usize; 3],
    pub param: AngleParam,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DihedralTerm {
    pub atoms: [usize; 4],
    pub param: DihedralParam,
}

/// A fully parameterized system, ready for serialization.
///
/// Atom indices in every term are 0-based positions in [`Structure::atoms`],
/// which follows residue order. Lengths are in nm and energies in kJ/mol.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub name: String,
    pub atoms: Vec<StructureAtom>,
    pub atom_types: Vec<AtomType>,
    pub bonds: Vec<BondTerm>,
    pub angles: Vec<AngleTerm>,
    pub dihedrals: Vec<DihedralTerm>,
    /// 1-4 pairs, each stored with the lower index first.
    pub pairs: Vec<[usize; 2]>,
    pub combining_rule: CombiningRule,
    pub fudge_lj: f64,
    pub fudge_qq: f64,
    pub periodicity: Vector3<f64>,
}

impl Structure {
    pub fn set_combining_rule(&mut self, rule: CombiningRule) {
        self.combining_rule = rule;
    }

    pub fn atom_type_of(&self, atom_index: usize) -> Option<&AtomType> {
        self.atoms
            .get(atom_index)
            .and_then(|a| self.atom_types.get(a.type_index))
    }

    pub fn total_charge(&self) -> f64 {
        self.atoms.iter().map(|a| a.charge).sum()
    }

    /// Residues in atom order as `(number, name, atom count)`.
    pub fn residue_runs(&self) -> Vec<(isize, String, usize)> {
        let mut runs: Vec<(isize, String, usize)> = Vec::new();
        for atom in &self.atoms {
            match runs.last_mut() {
                Some((number, _, count)) if *number == atom.residue_number => *count += 1,
                _ => runs.push((atom.residue_number, atom.residue_name.clone(), 1)),
            }
        }
        runs
    }
}
