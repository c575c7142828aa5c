use crate::core::builders::terminal::TerminalGroup;
use crate::core::io::ndx::IndexGroups;
use crate::core::models::atom::AtomRole;
use crate::core::models::system::MolecularSystem;
use tracing::debug;

/// Builds the index groups of every residue in `system`.
///
/// Each residue contributes `<Name>`, `<Name>_surface`, `<Name>_frozen`,
/// `<Name>_chains` and `<Name>_<terminal>`. The frozen group holds surface
/// atoms within `freeze_thickness` of the residue's outer face. A residue
/// whose surface lies below the middle of the system faces down, so its
/// outer face is its lowest surface atom; otherwise it is the highest.
pub fn generate(
    system: &MolecularSystem,
    terminal_group: TerminalGroup,
    freeze_thickness: f64,
) -> IndexGroups {
    let index_map = system.atom_index_map();
    let system_mid_z = system.bounding_box().map(|b| b.center().z).unwrap_or(0.0);
    let mut groups = IndexGroups::new();

    for (_, residue) in system.residues_iter() {
        let mut all = Vec::new();
        let mut surface = Vec::new();
        let mut chains = Vec::new();
        let mut terminal = Vec::new();
        let mut surface_z = Vec::new();

        for &atom_id in residue.atoms() {
            let (Some(atom), Some(&index)) = (system.atom(atom_id), index_map.get(&atom_id)) else {
                continue;
            };
            all.push(index);
            match atom.role {
                AtomRole::Surface => {
                    surface.push(index);
                    surface_z.push((index, atom.position.z));
                }
                AtomRole::Terminal => {
                    chains.push(index);
                    terminal.push(index);
                }
                role if role.is_chain() => chains.push(index),
                _ => {}
            }
        }

        let frozen = frozen_indices(&surface_z, system_mid_z, freeze_thickness);
        debug!(
            residue = %residue.name,
            atoms = all.len(),
            frozen = frozen.len(),
            "Generated index groups"
        );

        let name = &residue.name;
        groups.push(name.clone(), sorted(all));
        groups.push(format!("{}_surface", name), sorted(surface));
        groups.push(format!("{}_frozen", name), frozen);
        groups.push(format!("{}_chains", name), sorted(chains));
        groups.push(format!("{}_{}", name, terminal_group.name()), sorted(terminal));
    }

    groups
}

fn frozen_indices(surface_z: &[(usize, f64)], system_mid_z: f64, thickness: f64) -> Vec<usize> {
    if surface_z.is_empty() {
        return Vec::new();
    }
    let min_z = surface_z.iter().map(|&(_, z)| z).fold(f64::INFINITY, f64::min);
    let max_z = surface_z.iter().map(|&(_, z)| z).fold(f64::NEG_INFINITY, f64::max);
    let faces_down = (min_z + max_z) / 2.0 < system_mid_z;

    let frozen = surface_z
        .iter()
        .filter(|&&(_, z)| {
            if faces_down {
                z <= min_z + thickness
            } else {
                z >= max_z - thickness
            }
        })
        .map(|&(index, _)| index)
        .collect();
    sorted(frozen)
}

fn sorted(mut indices: Vec<usize>) -> Vec<usize> {
    indices.sort_unstable();
    indices
}
