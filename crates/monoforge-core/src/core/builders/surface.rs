use super::error::BuildError;
use crate::core::models::atom::{Atom, AtomRole};
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use nalgebra::{Point3, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Distance between neighboring silicon atoms of the lattice, in nm.
pub const SILICA_LATTICE_SPACING: f64 = 0.32;
/// Silicon-oxygen bond length, in nm.
pub const SI_O_BOND_LENGTH: f64 = 0.16;
/// Silicon atoms along each lateral edge of one surface tile.
pub const CELLS_PER_TILE: usize = 16;

const JITTER_AMPLITUDE: f64 = 0.015;
const SURFACE_RESIDUE_NAME: &str = "SIL";

/// A binding site on the top face of a surface.
///
/// `anchor` is the dangling oxygen that a chain head or a backfill hydrogen
/// bonds to, and `direction` is the unit vector pointing away from the bulk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Port {
    pub anchor: AtomId,
    pub direction: Vector3<f64>,
}

/// A slab of amorphous silica with binding sites on its upper face.
///
/// The slab is a periodic silicon lattice bridged by oxygens, roughened by a
/// small seeded displacement of every atom. The lower face sits at z = 0 and
/// the lateral box matches the lattice so that the slab tiles in x and y.
#[derive(Debug, Clone)]
pub struct SilicaInterface {
    system: MolecularSystem,
    ports: Vec<Port>,
    thickness: f64,
    seed: u64,
}

impl SilicaInterface {
    /// Builds a single-tile surface of the given thickness in nm.
    pub fn new(thickness: f64, seed: u64) -> Result<Self, BuildError> {
        Self::with_tiles(1, 1, thickness, seed)
    }

    /// Builds a surface made of `tile_x` by `tile_y` tiles.
    pub fn with_tiles(
        tile_x: usize,
        tile_y: usize,
        thickness: f64,
        seed: u64,
    ) -> Result<Self, BuildError> {
        if !thickness.is_finite() || thickness <= 0.0 {
            return Err(BuildError::InvalidThickness(thickness));
        }
        if tile_x == 0 || tile_y == 0 {
            return Err(BuildError::InvalidTiling { tile_x, tile_y });
        }

        let nx = CELLS_PER_TILE * tile_x;
        let ny = CELLS_PER_TILE * tile_y;
        let nz = (thickness / SILICA_LATTICE_SPACING).floor() as usize + 1;
        let a = SILICA_LATTICE_SPACING;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut system = MolecularSystem::new();
        let residue_id = system.add_residue(SURFACE_RESIDUE_NAME);

        let add = |system: &mut MolecularSystem,
                       rng: &mut ChaCha8Rng,
                       element: Element,
                       position: Point3<f64>|
         -> Result<AtomId, BuildError> {
            let atom = Atom::new(element, residue_id, position + jitter(rng))
                .with_role(AtomRole::Surface);
            system
                .add_atom_to_residue(residue_id, atom)
                .ok_or_else(|| BuildError::Internal("surface residue vanished".to_string()))
        };

        let index = |i: usize, j: usize, k: usize| (k * ny + j) * nx + i;
        let mut silicons = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let position = Point3::new(
                        (i as f64 + 0.5) * a,
                        (j as f64 + 0.5) * a,
                        k as f64 * a,
                    );
                    silicons.push(add(&mut system, &mut rng, Element::Si, position)?);
                }
            }
        }

        let lx = nx as f64 * a;
        let ly = ny as f64 * a;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let si = silicons[index(i, j, k)];
                    let z = k as f64 * a;

                    let x_bridge = Point3::new(((i + 1) as f64 * a) % lx, (j as f64 + 0.5) * a, z);
                    let o = add(&mut system, &mut rng, Element::O, x_bridge)?;
                    system.add_bond(si, o, BondOrder::Single);
                    system.add_bond(o, silicons[index((i + 1) % nx, j, k)], BondOrder::Single);

                    let y_bridge = Point3::new((i as f64 + 0.5) * a, ((j + 1) as f64 * a) % ly, z);
                    let o = add(&mut system, &mut rng, Element::O, y_bridge)?;
                    system.add_bond(si, o, BondOrder::Single);
                    system.add_bond(o, silicons[index(i, (j + 1) % ny, k)], BondOrder::Single);

                    if k + 1 < nz {
                        let z_bridge =
                            Point3::new((i as f64 + 0.5) * a, (j as f64 + 0.5) * a, z + 0.5 * a);
                        let o = add(&mut system, &mut rng, Element::O, z_bridge)?;
                        system.add_bond(si, o, BondOrder::Single);
                        system.add_bond(o, silicons[index(i, j, k + 1)], BondOrder::Single);
                    }
                }
            }
        }

        let mut ports = Vec::new();
        let top = nz - 1;
        let up = Vector3::z();
        for j in 0..ny {
            for i in 0..nx {
                if (i + j) % 2 != 0 {
                    continue;
                }
                let si = silicons[index(i, j, top)];
                let si_position = system
                    .atom(si)
                    .map(|atom| atom.position)
                    .ok_or_else(|| BuildError::Internal("missing surface silicon".to_string()))?;
                let o = add(
                    &mut system,
                    &mut rng,
                    Element::O,
                    si_position + up * SI_O_BOND_LENGTH,
                )?;
                system.add_bond(si, o, BondOrder::Single);
                ports.push(Port {
                    anchor: o,
                    direction: up,
                });
            }
        }

        let height = system
            .bounding_box()
            .map(|bb| bb.lengths().z)
            .unwrap_or_default();
        system.set_periodicity(Vector3::new(lx, ly, height));

        debug!(
            atoms = system.atom_count(),
            ports = ports.len(),
            layers = nz,
            "Built silica interface"
        );

        Ok(Self {
            system,
            ports,
            thickness,
            seed,
        })
    }

    pub fn system(&self) -> &MolecularSystem {
        &self.system
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

fn jitter(rng: &mut ChaCha8Rng) -> Vector3<f64> {
    Vector3::new(
        rng.gen_range(-JITTER_AMPLITUDE..=JITTER_AMPLITUDE),
        rng.gen_range(-JITTER_AMPLITUDE..=JITTER_AMPLITUDE),
        rng.gen_range(-JITTER_AMPLITUDE..=JITTER_AMPLITUDE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(system: &MolecularSystem, element: Element) -> usize {
        system
            .atoms_iter()
            .filter(|(_, a)| a.element == element)
            .count()
    }

    #[test]
    fn surface_has_expected_composition() {
        let surface = SilicaInterface::new(1.2, 12345).unwrap();
        let system = surface.system();

        // 1.2 nm gives four lattice layers of 16x16 silicons.
        let si = 16 * 16 * 4;
        let bridging_o = 16 * 16 * 4 * 2 + 16 * 16 * 3;
        let ports = 16 * 16 / 2;

        assert_eq!(count(system, Element::Si), si);
        assert_eq!(count(system, Element::O), bridging_o + ports);
        assert_eq!(surface.ports().len(), ports);
        assert_eq!(system.atom_count(), si + bridging_o + ports);
    }

    #[test]
    fn atoms_have_lattice_coordination() {
        let surface = SilicaInterface::new(0.5, 1).unwrap();
        let system = surface.system();
        for (id, atom) in system.atoms_iter() {
            let neighbors = system.get_bonded_neighbors(id).unwrap_or(&[]).len();
            match atom.element {
                Element::Si => assert!((4..=6).contains(&neighbors)),
                Element::O => assert!(neighbors == 1 || neighbors == 2),
                _ => panic!("unexpected element in surface"),
            }
        }
    }

    #[test]
    fn ports_point_up_from_the_top_face() {
        let surface = SilicaInterface::new(1.0, 3).unwrap();
        let system = surface.system();
        for port in surface.ports() {
            let anchor = system.atom(port.anchor).unwrap();
            assert_eq!(anchor.element, Element::O);
            assert_eq!(port.direction, Vector3::z());
            let neighbors = system.get_bonded_neighbors(port.anchor).unwrap();
            assert_eq!(neighbors.len(), 1);
            let silicon = system.atom(neighbors[0]).unwrap();
            assert_eq!(silicon.element, Element::Si);
            let rise = anchor.position.z - silicon.position.z;
            assert!((rise - SI_O_BOND_LENGTH).abs() <= 2.0 * JITTER_AMPLITUDE + 1e-12);
        }
    }

    #[test]
    fn same_seed_gives_identical_coordinates() {
        let a = SilicaInterface::new(1.2, 99).unwrap();
        let b = SilicaInterface::new(1.2, 99).unwrap();
        let pa: Vec<_> = a.system().atoms_iter().map(|(_, x)| x.position).collect();
        let pb: Vec<_> = b.system().atoms_iter().map(|(_, x)| x.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn different_seeds_give_different_coordinates() {
        let a = SilicaInterface::new(1.2, 1).unwrap();
        let b = SilicaInterface::new(1.2, 2).unwrap();
        let pa: Vec<_> = a.system().atoms_iter().map(|(_, x)| x.position).collect();
        let pb: Vec<_> = b.system().atoms_iter().map(|(_, x)| x.position).collect();
        assert_ne!(pa, pb);
    }

    #[test]
    fn lateral_box_matches_lattice() {
        let surface = SilicaInterface::with_tiles(2, 1, 0.4, 0).unwrap();
        let box_lengths = surface.system().periodicity();
        assert!((box_lengths.x - 32.0 * SILICA_LATTICE_SPACING).abs() < 1e-9);
        assert!((box_lengths.y - 16.0 * SILICA_LATTICE_SPACING).abs() < 1e-9);
        assert!(box_lengths.z > 0.0);
        assert_eq!(surface.ports().len(), 32 * 16 / 2);
    }

    #[test]
    fn rejects_invalid_dimensions() {
        assert_eq!(
            SilicaInterface::new(0.0, 1).unwrap_err(),
            BuildError::InvalidThickness(0.0)
        );
        assert!(SilicaInterface::new(f64::NAN, 1).is_err());
        assert_eq!(
            SilicaInterface::with_tiles(0, 1, 1.0, 1).unwrap_err(),
            BuildError::InvalidTiling {
                tile_x: 0,
                tile_y: 1
            }
        );
    }
}
