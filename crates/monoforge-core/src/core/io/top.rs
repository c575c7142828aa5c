use crate::core::forcefield::params::CombiningRule;
use crate::core::forcefield::structure::Structure;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Name of the single molecule type holding the whole system.
pub const MOLECULE_NAME: &str = "System";
const NREXCL: usize = 3;

/// GROMACS topology (`.top`) writer.
///
/// The whole structure is emitted as one molecule type. Units are the
/// GROMACS ones: nm, kJ/mol, degrees.
pub struct TopFile;

impl TopFile {
    pub fn write_to(structure: &Structure, title: &str, writer: &mut impl Write) -> io::Result<()> {
        writeln!(
            writer,
            "; Topology generated by monoforge with force field '{}'",
            structure.name
        )?;
        writeln!(writer)?;

        let comb_rule = match structure.combining_rule {
            CombiningRule::LorentzBerthelot => 2,
            CombiningRule::Geometric => 3,
        };
        writeln!(writer, "[ defaults ]")?;
        writeln!(writer, "; nbfunc  comb-rule  gen-pairs  fudgeLJ  fudgeQQ")?;
        writeln!(
            writer,
            "{:<8}  {:<9}  {:<9}  {:<7}  {}",
            1, comb_rule, "yes", structure.fudge_lj, structure.fudge_qq
        )?;
        writeln!(writer)?;

        writeln!(writer, "[ atomtypes ]")?;
        writeln!(
            writer,
            "; name       bond_type  at.num      mass    charge ptype      sigma    epsilon"
        )?;
        for atom_type in &structure.atom_types {
            writeln!(
                writer,
                "{:<12} {:<9} {:>6} {:>9.5} {:>9.5} {:>5} {:>10.5} {:>10.5}",
                atom_type.name,
                atom_type.class,
                atom_type.element.atomic_number(),
                atom_type.mass,
                atom_type.charge,
                "A",
                atom_type.sigma,
                atom_type.epsilon
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "[ moleculetype ]")?;
        writeln!(writer, "; name  nrexcl")?;
        writeln!(writer, "{}  {}", MOLECULE_NAME, NREXCL)?;
        writeln!(writer)?;

        writeln!(writer, "[ atoms ]")?;
        writeln!(
            writer,
            ";    nr  type          resnr  residue  atom    cgnr    charge      mass"
        )?;
        for (index, atom) in structure.atoms.iter().enumerate() {
            let type_name = structure
                .atom_types
                .get(atom.type_index)
                .map(|t| t.name.as_str())
                .unwrap_or("");
            writeln!(
                writer,
                "{:>7}  {:<12} {:>6}  {:<8} {:<6} {:>6} {:>9.5} {:>9.5}",
                index + 1,
                type_name,
                atom.residue_number,
                atom.residue_name,
                atom.name,
                index + 1,
                atom.charge,
                atom.mass
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "[ bonds ]")?;
        writeln!(writer, ";    ai      aj  funct         b0          kb")?;
        for bond in &structure.bonds {
            writeln!(
                writer,
                "{:>7} {:>7} {:>6} {:>10.5} {:>11.3}",
                bond.atoms[0] + 1,
                bond.atoms[1] + 1,
                1,
                bond.param.r0,
                bond.param.k
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "[ pairs ]")?;
        writeln!(writer, ";    ai      aj  funct")?;
        for pair in &structure.pairs {
            writeln!(writer, "{:>7} {:>7} {:>6}", pair[0] + 1, pair[1] + 1, 1)?;
        }
        writeln!(writer)?;

        writeln!(writer, "[ angles ]")?;
        writeln!(writer, ";    ai      aj      ak  funct     theta0         kt")?;
        for angle in &structure.angles {
            writeln!(
                writer,
                "{:>7} {:>7} {:>7} {:>6} {:>10.4} {:>10.4}",
                angle.atoms[0] + 1,
                angle.atoms[1] + 1,
                angle.atoms[2] + 1,
                1,
                angle.param.theta0,
                angle.param.k
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "[ dihedrals ]")?;
        writeln!(
            writer,
            ";    ai      aj      ak      al  funct         c0         c1         c2         c3         c4         c5"
        )?;
        for dihedral in &structure.dihedrals {
            let [i, j, k, l] = dihedral.atoms;
            write!(
                writer,
                "{:>7} {:>7} {:>7} {:>7} {:>6}",
                i + 1,
                j + 1,
                k + 1,
                l + 1,
                3
            )?;
            for c in dihedral.param.coefficients() {
                write!(writer, " {:>10.5}", c)?;
            }
            writeln!(writer)?;
        }
        writeln!(writer)?;

        writeln!(writer, "[ system ]")?;
        writeln!(writer, "{}", title)?;
        writeln!(writer)?;

        writeln!(writer, "[ molecules ]")?;
        writeln!(writer, "; Compound  #mols")?;
        writeln!(writer, "{}  1", MOLECULE_NAME)?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(
        structure: &Structure,
        title: &str,
        path: P,
    ) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, title, &mut writer)?;
        writer.flush()
    }
}
