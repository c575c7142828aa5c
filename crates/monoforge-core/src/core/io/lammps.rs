use crate::core::forcefield::params::CombiningRule;
use crate::core::forcefield::structure::Structure;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const NM_TO_ANGSTROM: f64 = 10.0;
const KJ_TO_KCAL: f64 = 1.0 / 4.184;

#[derive(Debug, Error)]
pub enum LammpsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(
        "Dihedral {classes} has a non-zero c5 term ({c5}) that multi/harmonic cannot represent"
    )]
    UnsupportedDihedral { classes: String, c5: f64 },
}

/// Converts Ryckaert-Bellemans coefficients (kJ/mol, polymer convention) to
/// LAMMPS `multi/harmonic` coefficients (kcal/mol).
///
/// RB uses psi = phi - 180, so odd powers of cos change sign.
pub fn rb_to_multi_harmonic(c: &[f64; 6]) -> Option<[f64; 5]> {
    if c[5] != 0.0 {
        return None;
    }
    let mut a = [0.0; 5];
    for (n, value) in a.iter_mut().enumerate() {
        let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
        *value = sign * c[n] * KJ_TO_KCAL;
    }
    Some(a)
}

/// Assigns 1-based type ids to distinct keys, in order of first appearance.
struct TypeTable {
    ids: HashMap<String, usize>,
    order: Vec<(String, usize)>,
}

impl TypeTable {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Returns the type id of `key`; `term` is the index of the term that
    /// first introduced it.
    fn id(&mut self, key: String, term: usize) -> usize {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.order.len() + 1;
        self.ids.insert(key.clone(), id);
        self.order.push((key, term));
        id
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// LAMMPS data file writer (`units real`, `atom_style full`).
pub struct LammpsDataFile;

impl LammpsDataFile {
    pub fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), LammpsError> {
        let mut bond_types = TypeTable::new();
        let bond_type_ids: Vec<usize> = structure
            .bonds
            .iter()
            .enumerate()
            .map(|(i, b)| bond_types.id(b.param.classes.join("-"), i))
            .collect();
        let mut angle_types = TypeTable::new();
        let angle_type_ids: Vec<usize> = structure
            .angles
            .iter()
            .enumerate()
            .map(|(i, a)| angle_types.id(a.param.classes.join("-"), i))
            .collect();
        let mut dihedral_types = TypeTable::new();
        let dihedral_type_ids: Vec<usize> = structure
            .dihedrals
            .iter()
            .enumerate()
            .map(|(i, d)| dihedral_types.id(d.param.classes.join("-"), i))
            .collect();

        let mut dihedral_coeffs = Vec::with_capacity(dihedral_types.len());
        for (key, term) in &dihedral_types.order {
            let param = &structure.dihedrals[*term].param;
            let coeffs = rb_to_multi_harmonic(&param.coefficients()).ok_or_else(|| {
                LammpsError::UnsupportedDihedral {
                    classes: key.clone(),
                    c5: param.c5,
                }
            })?;
            dihedral_coeffs.push((key, coeffs));
        }

        let mix = match structure.combining_rule {
            CombiningRule::Geometric => "geometric",
            CombiningRule::LorentzBerthelot => "arithmetic",
        };
        writeln!(
            writer,
            "LAMMPS data file generated by monoforge (force field '{}', units real, pair_modify mix {})",
            structure.name, mix
        )?;
        writeln!(writer)?;
        writeln!(writer, "{} atoms", structure.atoms.len())?;
        writeln!(writer, "{} bonds", structure.bonds.len())?;
        writeln!(writer, "{} angles", structure.angles.len())?;
        writeln!(writer, "{} dihedrals", structure.dihedrals.len())?;
        writeln!(writer)?;
        writeln!(writer, "{} atom types", structure.atom_types.len())?;
        writeln!(writer, "{} bond types", bond_types.len())?;
        writeln!(writer, "{} angle types", angle_types.len())?;
        writeln!(writer, "{} dihedral types", dihedral_types.len())?;
        writeln!(writer)?;

        let cell = structure.periodicity * NM_TO_ANGSTROM;
        writeln!(writer, "{:.6} {:.6} xlo xhi", 0.0, cell.x)?;
        writeln!(writer, "{:.6} {:.6} ylo yhi", 0.0, cell.y)?;
        writeln!(writer, "{:.6} {:.6} zlo zhi", 0.0, cell.z)?;

        writeln!(writer, "\nMasses\n")?;
        for (i, atom_type) in structure.atom_types.iter().enumerate() {
            writeln!(writer, "{} {:.6} # {}", i + 1, atom_type.mass, atom_type.name)?;
        }

        writeln!(writer, "\nPair Coeffs # lj/cut/coul/long\n")?;
        for (i, atom_type) in structure.atom_types.iter().enumerate() {
            writeln!(
                writer,
                "{} {:.6} {:.6} # {}",
                i + 1,
                atom_type.epsilon * KJ_TO_KCAL,
                atom_type.sigma * NM_TO_ANGSTROM,
                atom_type.name
            )?;
        }

        if !bond_types.order.is_empty() {
            writeln!(writer, "\nBond Coeffs # harmonic\n")?;
            for (id, (key, term)) in bond_types.order.iter().enumerate() {
                let param = &structure.bonds[*term].param;
                writeln!(
                    writer,
                    "{} {:.6} {:.6} # {}",
                    id + 1,
                    param.k / 2.0 * KJ_TO_KCAL / (NM_TO_ANGSTROM * NM_TO_ANGSTROM),
                    param.r0 * NM_TO_ANGSTROM,
                    key
                )?;
            }
        }

        if !angle_types.order.is_empty() {
            writeln!(writer, "\nAngle Coeffs # harmonic\n")?;
            for (id, (key, term)) in angle_types.order.iter().enumerate() {
                let param = &structure.angles[*term].param;
                writeln!(
                    writer,
                    "{} {:.6} {:.6} # {}",
                    id + 1,
                    param.k / 2.0 * KJ_TO_KCAL,
                    param.theta0,
                    key
                )?;
            }
        }

        if !dihedral_coeffs.is_empty() {
            writeln!(writer, "\nDihedral Coeffs # multi/harmonic\n")?;
            for (id, (key, a)) in dihedral_coeffs.iter().enumerate() {
                writeln!(
                    writer,
                    "{} {:.6} {:.6} {:.6} {:.6} {:.6} # {}",
                    id + 1,
                    a[0],
                    a[1],
                    a[2],
                    a[3],
                    a[4],
                    key
                )?;
            }
        }

        writeln!(writer, "\nAtoms # full\n")?;
        for (i, atom) in structure.atoms.iter().enumerate() {
            let p = atom.position * NM_TO_ANGSTROM;
            writeln!(
                writer,
                "{} {} {} {:.6} {:.6} {:.6} {:.6}",
                i + 1,
                atom.residue_number,
                atom.type_index + 1,
                atom.charge,
                p.x,
                p.y,
                p.z
            )?;
        }

        if !structure.bonds.is_empty() {
            writeln!(writer, "\nBonds\n")?;
            for (i, (bond, type_id)) in structure.bonds.iter().zip(&bond_type_ids).enumerate() {
                writeln!(
                    writer,
                    "{} {} {} {}",
                    i + 1,
                    type_id,
                    bond.atoms[0] + 1,
                    bond.atoms[1] + 1
                )?;
            }
        }

        if !structure.angles.is_empty() {
            writeln!(writer, "\nAngles\n")?;
            for (i, (angle, type_id)) in structure.angles.iter().zip(&angle_type_ids).enumerate()
            {
                let [a, b, c] = angle.atoms;
                writeln!(writer, "{} {} {} {} {}", i + 1, type_id, a + 1, b + 1, c + 1)?;
            }
        }

        if !structure.dihedrals.is_empty() {
            writeln!(writer, "\nDihedrals\n")?;
            for (i, (dihedral, type_id)) in structure
                .dihedrals
                .iter()
                .zip(&dihedral_type_ids)
                .enumerate()
            {
                let [a, b, c, d] = dihedral.atoms;
                writeln!(
                    writer,
                    "{} {} {} {} {} {}",
                    i + 1,
                    type_id,
                    a + 1,
                    b + 1,
                    c + 1,
                    d + 1
                )?;
            }
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(structure: &Structure, path: P) -> Result<(), LammpsError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builders::chain::Alkylsilane;
    use crate::core::builders::terminal::TerminalGroup;
    use crate::core::forcefield::parameterization::Parameterize;
    use crate::core::forcefield::params::Forcefield;

    fn structure() -> Structure {
        let chain = Alkylsilane::new(3, TerminalGroup::Hydroxyl).build().unwrap();
        Forcefield::bundled()
            .unwrap()
            .apply(chain.system(), false)
            .unwrap()
    }

    fn section<'a>(text: &'a str, header: &str) -> Vec<&'a str> {
        text.lines()
            .skip_while(|l| !l.starts_with(header))
            .skip(2)
            .take_while(|l| !l.trim().is_empty())
            .collect()
    }

    #[test]
    fn rb_conversion_flips_odd_terms_and_converts_units() {
        let c = [4.184, 4.184, 4.184, 4.184, 4.184, 0.0];
        let a = rb_to_multi_harmonic(&c).unwrap();
        assert_eq!(a.len(), 5);
        for (n, value) in a.iter().enumerate() {
            let expected = if n % 2 == 0 { 1.0 } else { -1.0 };
            assert!((value - expected).abs() < 1e-12);
        }
        assert!(rb_to_multi_harmonic(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]).is_none());
    }

    #[test]
    fn header_counts_match_structure() {
        let s = structure();
        let mut buffer = Vec::new();
        LammpsDataFile::write_to(&s, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains(&format!("\n{} atoms\n", s.atoms.len())));
        assert!(text.contains(&format!("\n{} bonds\n", s.bonds.len())));
        assert!(text.contains(&format!("\n{} angles\n", s.angles.len())));
        assert!(text.contains(&format!("\n{} dihedrals\n", s.dihedrals.len())));
        assert!(text.contains(&format!("\n{} atom types\n", s.atom_types.len())));

        assert_eq!(section(&text, "Atoms").len(), s.atoms.len());
        assert_eq!(section(&text, "Bonds").len(), s.bonds.len());
        assert_eq!(section(&text, "Angles").len(), s.angles.len());
        assert_eq!(section(&text, "Dihedrals").len(), s.dihedrals.len());
        assert_eq!(section(&text, "Masses").len(), s.atom_types.len());
    }

    #[test]
    fn units_are_converted_to_real() {
        let s = structure();
        let mut buffer = Vec::new();
        LammpsDataFile::write_to(&s, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let ct_ct = section(&text, "Bond Coeffs")
            .into_iter()
            .find(|l| l.ends_with("# CT-CT"))
            .unwrap();
        let fields: Vec<f64> = ct_ct
            .split_whitespace()
            .skip(1)
            .take(2)
            .map(|v| v.parse().unwrap())
            .collect();
        assert!((fields[0] - 224262.4 / 2.0 / 4.184 / 100.0).abs() < 1e-5);
        assert!((fields[1] - 1.529).abs() < 1e-6);

        let first_atom: Vec<f64> = section(&text, "Atoms")[0]
            .split_whitespace()
            .skip(4)
            .map(|v| v.parse().unwrap())
            .collect();
        let expected = s.atoms[0].position * 10.0;
        assert!((first_atom[0] - expected.x).abs() < 1e-5);
        assert!((first_atom[2] - expected.z).abs() < 1e-5);
    }

    #[test]
    fn non_zero_c5_is_rejected() {
        let mut s = structure();
        s.dihedrals[0].param.c5 = 1.0;
        let mut buffer = Vec::new();
        let err = LammpsDataFile::write_to(&s, &mut buffer).unwrap_err();
        assert!(matches!(err, LammpsError::UnsupportedDihedral { .. }));
    }

    #[test]
    fn bond_types_are_deduplicated_by_classes() {
        let s = structure();
        let mut buffer = Vec::new();
        LammpsDataFile::write_to(&s, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let coeffs = section(&text, "Bond Coeffs");
        let distinct: std::collections::HashSet<_> =
            s.bonds.iter().map(|b| b.param.classes.join("-")).collect();
        assert_eq!(coeffs.len(), distinct.len());
    }
}
