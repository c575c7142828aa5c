use super::params::{AngleParam, BondParam, DihedralParam, Forcefield, WILDCARD_CLASS};
use super::structure::{AngleTerm, AtomType, BondTerm, DihedralTerm, Structure, StructureAtom};
use super::typing::AtomTyper;
use crate::core::models::system::MolecularSystem;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterizationError {
    #[error(
        "No atom type matches atom {index} ('{atom_name}') in residue '{residue_name}' with neighbors [{neighbors}]"
    )]
    UntypedAtom {
        index: usize,
        atom_name: String,
        residue_name: String,
        neighbors: String,
    },
    #[error("Atom type '{type_name}' references unknown element '{symbol}'")]
    InvalidTypeRule { type_name: String, symbol: String },
    #[error("Missing bond parameters for classes {classes}")]
    MissingBondParams { classes: String },
    #[error("Missing angle parameters for classes {classes}")]
    MissingAngleParams { classes: String },
    #[error("Missing dihedral parameters for classes {classes}")]
    MissingDihedralParams { classes: String },
}

/// Anything that can turn a built system into a parameterized [`Structure`].
pub trait Parameterize {
    fn apply(
        &self,
        system: &MolecularSystem,
        strict_dihedrals: bool,
    ) -> Result<Structure, ParameterizationError>;
}

impl Parameterize for Forcefield {
    fn apply(
        &self,
        system: &MolecularSystem,
        strict_dihedrals: bool,
    ) -> Result<Structure, ParameterizationError> {
        Parameterizer::new(self)
            .strict_dihedrals(strict_dihedrals)
            .parameterize_system(system)
    }
}

pub struct Parameterizer<'a> {
    forcefield: &'a Forcefield,
    strict_dihedrals: bool,
}

impl<'a> Parameterizer<'a> {
    pub fn new(forcefield: &'a Forcefield) -> Self {
        Self {
            forcefield,
            strict_dihedrals: false,
        }
    }

    /// Treat dihedrals without parameters as an error instead of a warning.
    pub fn strict_dihedrals(mut self, strict: bool) -> Self {
        self.strict_dihedrals = strict;
        self
    }

    pub fn parameterize_system(
        &self,
        system: &MolecularSystem,
    ) -> Result<Structure, ParameterizationError> {
        let typer = AtomTyper::new(self.forcefield)?;
        let assignment = typer.assign(system)?;

        let ordered = system.ordered_atom_ids();
        let index_of = system.atom_index_map();

        // Pass 1: atoms and the atom types they use, in order of first use.
        let mut used_types: Vec<usize> = Vec::new();
        let mut type_slot: HashMap<usize, usize> = HashMap::new();
        let mut atoms = Vec::with_capacity(ordered.len());
        let mut classes = Vec::with_capacity(ordered.len());
        for atom_id in &ordered {
            let (Some(atom), Some(&rule)) = (system.atom(*atom_id), assignment.get(atom_id)) else {
                continue;
            };
            let param = &self.forcefield.atom_types[rule];
            let slot = *type_slot.entry(rule).or_insert_with(|| {
                used_types.push(rule);
                used_types.len() - 1
            });
            let residue = system.residue(atom.residue_id);
            atoms.push(StructureAtom {
                name: atom.name.clone(),
                residue_number: residue.map(|r| r.number).unwrap_or(1),
                residue_name: residue.map(|r| r.name.clone()).unwrap_or_default(),
                type_index: slot,
                charge: param.charge,
                mass: param.mass,
                position: atom.position,
            });
            classes.push(param.class.as_str());
        }
        let atom_types = used_types
            .iter()
            .filter_map(|&rule| {
                let param = &self.forcefield.atom_types[rule];
                Some(AtomType {
                    name: param.name.clone(),
                    class: param.class.clone(),
                    element: param.element.parse().ok()?,
                    mass: param.mass,
                    charge: param.charge,
                    sigma: param.sigma,
                    epsilon: param.epsilon,
                })
            })
            .collect();

        // Pass 2: connectivity in output indices.
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); atoms.len()];
        let mut bond_pairs = Vec::with_capacity(system.bonds().len());
        for bond in system.bonds() {
            if let (Some(&i), Some(&j)) = (index_of.get(&bond.atom1_id), index_of.get(&bond.atom2_id))
            {
                let (i, j) = (i.min(j), i.max(j));
                neighbors[i].push(j);
                neighbors[j].push(i);
                bond_pairs.push([i, j]);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }
        bond_pairs.sort_unstable();

        // Pass 3: bonded terms.
        let mut bonds = Vec::with_capacity(bond_pairs.len());
        for &[i, j] in &bond_pairs {
            let param = self.find_bond(classes[i], classes[j]).ok_or_else(|| {
                ParameterizationError::MissingBondParams {
                    classes: format!("{}-{}", classes[i], classes[j]),
                }
            })?;
            bonds.push(BondTerm {
                atoms: [i, j],
                param: param.clone(),
            });
        }

        let mut angles = Vec::new();
        for (center, list) in neighbors.iter().enumerate() {
            for (a, &i) in list.iter().enumerate() {
                for &k in &list[a + 1..] {
                    let key = [classes[i], classes[center], classes[k]];
                    let param = self.find_angle(&key).ok_or_else(|| {
                        ParameterizationError::MissingAngleParams {
                            classes: key.join("-"),
                        }
                    })?;
                    angles.push(AngleTerm {
                        atoms: [i, center, k],
                        param: param.clone(),
                    });
                }
            }
        }

        let mut dihedrals = Vec::new();
        let mut end_pairs = BTreeSet::new();
        let mut missing: BTreeMap<String, usize> = BTreeMap::new();
        for &[j, k] in &bond_pairs {
            for &i in neighbors[j].iter().filter(|&&i| i != k) {
                for &l in neighbors[k].iter().filter(|&&l| l != j && l != i) {
                    end_pairs.insert([i.min(l), i.max(l)]);
                    let key = [classes[i], classes[j], classes[k], classes[l]];
                    match self.find_dihedral(&key) {
                        Some(param) => dihedrals.push(DihedralTerm {
                            atoms: [i, j, k, l],
                            param: param.clone(),
                        }),
                        None if self.strict_dihedrals => {
                            return Err(ParameterizationError::MissingDihedralParams {
                                classes: key.join("-"),
                            });
                        }
                        None => *missing.entry(key.join("-")).or_default() += 1,
                    }
                }
            }
        }
        for (key, count) in &missing {
            warn!(
                "No dihedral parameters for classes {}; skipped {} dihedral(s).",
                key, count
            );
        }

        let bonded: HashSet<[usize; 2]> = bond_pairs.iter().copied().collect();
        let one_three: HashSet<[usize; 2]> = angles
            .iter()
            .map(|a| [a.atoms[0].min(a.atoms[2]), a.atoms[0].max(a.atoms[2])])
            .collect();
        let pairs: Vec<[usize; 2]> = end_pairs
            .into_iter()
            .filter(|p| !bonded.contains(p) && !one_three.contains(p))
            .collect();

        debug!(
            atoms = atoms.len(),
            bonds = bonds.len(),
            angles = angles.len(),
            dihedrals = dihedrals.len(),
            pairs = pairs.len(),
            "Parameterized system"
        );

        Ok(Structure {
            name: self.forcefield.globals.name.clone(),
            atoms,
            atom_types,
            bonds,
            angles,
            dihedrals,
            pairs,
            combining_rule: self.forcefield.globals.combining_rule,
            fudge_lj: self.forcefield.globals.fudge_lj,
            fudge_qq: self.forcefield.globals.fudge_qq,
            periodicity: system.periodicity(),
        })
    }

    fn find_bond(&self, a: &str, b: &str) -> Option<&BondParam> {
        self.forcefield.bonds.iter().find(|p| {
            (p.classes[0] == a && p.classes[1] == b) || (p.classes[0] == b && p.classes[1] == a)
        })
    }

    fn find_angle(&self, key: &[&str; 3]) -> Option<&AngleParam> {
        best_match(self.forcefield.angles.iter(), key, |p| &p.classes)
    }

    fn find_dihedral(&self, key: &[&str; 4]) -> Option<&DihedralParam> {
        best_match(self.forcefield.dihedrals.iter(), key, |p| &p.classes)
    }
}

/// Number of exactly matched classes, or `None` if `pattern` does not fit `key`.
fn specificity<const N: usize>(pattern: &[String; N], key: &[&str; N]) -> Option<usize> {
    pattern.iter().zip(key).try_fold(0, |score, (p, k)| {
        if p == WILDCARD_CLASS {
            Some(score)
        } else if p == k {
            Some(score + 1)
        } else {
            None
        }
    })
}

/// Picks the most specific parameter matching `key` in either direction.
/// Ties go to the earliest entry.
fn best_match<'p, P, const N: usize>(
    params: impl Iterator<Item = &'p P>,
    key: &[&str; N],
    classes: impl Fn(&P) -> &[String; N],
) -> Option<&'p P>
where
    P: 'p,
{
    let mut reversed = *key;
    reversed.reverse();
    let mut best: Option<(usize, &'p P)> = None;
    for param in params {
        let pattern = classes(param);
        let score = specificity(pattern, key).max(specificity(pattern, &reversed));
        if let Some(score) = score {
            if best.is_none_or(|(current, _)| score > current) {
                best = Some((score, param));
            }
        }
    }
    best.map(|(_, param)| param)
}
