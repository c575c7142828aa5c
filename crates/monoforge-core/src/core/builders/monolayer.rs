use super::chain::ChainPrototype;
use super::error::BuildError;
use super::pattern::PatternType;
use super::surface::SilicaInterface;
use crate::core::models::atom::{Atom, AtomRole};
use crate::core::models::element::Element;
use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use crate::core::utils::geometry::{rotation_from_axis_angle, rotation_to_align};
use nalgebra::{Point3, Rotation3, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Distance from a port oxygen to the head silicon of an attached chain, in nm.
pub const PORT_SI_DISTANCE: f64 = 0.165;
/// Distance from a port oxygen to its backfill hydrogen, in nm.
pub const PORT_H_DISTANCE: f64 = 0.096;

const DEFAULT_MONOLAYER_NAME: &str = "Monolayer";

/// A surface with chains attached to a subset of its ports and every other
/// port capped with hydrogen. The whole monolayer is a single residue.
#[derive(Debug, Clone)]
pub struct SurfaceMonolayer {
    system: MolecularSystem,
    residue_id: ResidueId,
    chain_sites: Vec<usize>,
    backfilled: usize,
}

impl SurfaceMonolayer {
    pub fn builder<'a>(
        surface: &'a SilicaInterface,
        chain: &'a ChainPrototype,
    ) -> SurfaceMonolayerBuilder<'a> {
        SurfaceMonolayerBuilder {
            surface,
            chain,
            n_chains: 0,
            seed: 0,
            pattern: PatternType::default(),
            rotate: false,
            name: DEFAULT_MONOLAYER_NAME.to_string(),
        }
    }

    pub fn system(&self) -> &MolecularSystem {
        &self.system
    }

    pub fn name(&self) -> &str {
        self.system
            .residue(self.residue_id)
            .map(|r| r.name.as_str())
            .unwrap_or(DEFAULT_MONOLAYER_NAME)
    }

    pub fn set_name(&mut self, name: &str) {
        self.system.rename_residue(self.residue_id, name);
    }

    /// Port indices, in surface order, that received a chain.
    pub fn chain_sites(&self) -> &[usize] {
        &self.chain_sites
    }

    pub fn chain_count(&self) -> usize {
        self.chain_sites.len()
    }

    pub fn backfill_count(&self) -> usize {
        self.backfilled
    }
}

#[derive(Debug, Clone)]
pub struct SurfaceMonolayerBuilder<'a> {
    surface: &'a SilicaInterface,
    chain: &'a ChainPrototype,
    n_chains: usize,
    seed: u64,
    pattern: PatternType,
    rotate: bool,
    name: String,
}

impl<'a> SurfaceMonolayerBuilder<'a> {
    pub fn n_chains(mut self, n_chains: usize) -> Self {
        self.n_chains = n_chains;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn pattern(mut self, pattern: PatternType) -> Self {
        self.pattern = pattern;
        self
    }

    /// Spins every attached chain by a random angle about its port direction.
    pub fn rotate(mut self, rotate: bool) -> Self {
        self.rotate = rotate;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn build(self) -> Result<SurfaceMonolayer, BuildError> {
        let ports = self.surface.ports();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let sites = self.pattern.select(ports.len(), self.n_chains, &mut rng)?;

        let mut system = MolecularSystem::new();
        system.set_periodicity(self.surface.system().periodicity());
        let residue_id = system.add_residue(&self.name);
        let surface_map = system
            .merge_into_residue(self.surface.system(), residue_id)
            .ok_or_else(|| BuildError::Internal("monolayer residue vanished".to_string()))?;

        let mut next_site = sites.iter().peekable();
        let mut backfilled = 0;
        for (index, port) in ports.iter().enumerate() {
            let anchor = *surface_map
                .get(&port.anchor)
                .ok_or_else(|| BuildError::Internal("port anchor was not copied".to_string()))?;
            let anchor_position = system
                .atom(anchor)
                .map(|a| a.position)
                .ok_or_else(|| BuildError::Internal("port anchor was not copied".to_string()))?;
            let direction = port.direction.normalize();

            if next_site.peek() == Some(&&index) {
                next_site.next();
                let spin = if self.rotate {
                    rng.gen_range(0.0..360.0)
                } else {
                    0.0
                };
                let mut chain = self.chain.system().clone();
                let orientation = chain_orientation(&direction, spin);
                chain.rotate_about(&orientation, &Point3::origin());
                chain.translate(&(anchor_position.coords + direction * PORT_SI_DISTANCE));

                let chain_map = system
                    .merge_into_residue(&chain, residue_id)
                    .ok_or_else(|| BuildError::Internal("monolayer residue vanished".to_string()))?;
                let head = *chain_map
                    .get(&self.chain.head())
                    .ok_or_else(|| BuildError::Internal("chain head was not copied".to_string()))?;
                system.add_bond(anchor, head, BondOrder::Single);
            } else {
                let hydrogen = Atom::new(
                    Element::H,
                    residue_id,
                    anchor_position + direction * PORT_H_DISTANCE,
                )
                .with_role(AtomRole::Backfill);
                let hydrogen = system
                    .add_atom_to_residue(residue_id, hydrogen)
                    .ok_or_else(|| BuildError::Internal("monolayer residue vanished".to_string()))?;
                system.add_bond(anchor, hydrogen, BondOrder::Single);
                backfilled += 1;
            }
        }

        debug!(
            name = %self.name,
            chains = sites.len(),
            backfilled,
            atoms = system.atom_count(),
            "Built surface monolayer"
        );

        Ok(SurfaceMonolayer {
            system,
            residue_id,
            chain_sites: sites,
            backfilled,
        })
    }
}

/// Rotation taking the prototype axis (+z) onto `direction`, after spinning
/// the prototype by `spin_degrees` about its own axis.
fn chain_orientation(direction: &Vector3<f64>, spin_degrees: f64) -> Rotation3<f64> {
    let spin = rotation_from_axis_angle(&Vector3::z(), spin_degrees);
    let align = rotation_to_align(&Vector3::z(), direction).unwrap_or_else(|| {
        // Antiparallel: any half turn perpendicular to z works.
        rotation_from_axis_angle(&Vector3::x(), 180.0)
    });
    align * spin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builders::chain::Alkylsilane;
    use crate::core::builders::terminal::TerminalGroup;

    fn fixtures() -> (SilicaInterface, ChainPrototype) {
        let surface = SilicaInterface::new(0.5, 42).unwrap();
        let chain = Alkylsilane::new(4, TerminalGroup::Methyl).build().unwrap();
        (surface, chain)
    }

    #[test]
    fn places_chains_and_backfills_remaining_ports() {
        let (surface, chain) = fixtures();
        let monolayer = SurfaceMonolayer::builder(&surface, &chain)
            .n_chains(20)
            .seed(42)
            .build()
            .unwrap();

        let ports = surface.ports().len();
        assert_eq!(monolayer.chain_count(), 20);
        assert_eq!(monolayer.backfill_count(), ports - 20);
        assert_eq!(
            monolayer.system().atom_count(),
            surface.system().atom_count() + 20 * chain.atom_count() + (ports - 20)
        );
        assert_eq!(
            monolayer.system().atoms_by_role(AtomRole::Backfill).count(),
            ports - 20
        );
    }

    #[test]
    fn monolayer_is_a_single_named_residue() {
        let (surface, chain) = fixtures();
        let mut monolayer = SurfaceMonolayer::builder(&surface, &chain)
            .n_chains(5)
            .name("Bottom")
            .build()
            .unwrap();
        assert_eq!(monolayer.name(), "Bottom");
        assert_eq!(monolayer.system().residues_iter().count(), 1);

        monolayer.set_name("Top");
        assert_eq!(monolayer.name(), "Top");
        assert!(monolayer.system().find_residue_by_name("Top").is_some());
    }

    #[test]
    fn chain_heads_are_bonded_to_port_oxygens() {
        let (surface, chain) = fixtures();
        let monolayer = SurfaceMonolayer::builder(&surface, &chain)
            .n_chains(8)
            .pattern(PatternType::Grid)
            .build()
            .unwrap();
        let system = monolayer.system();

        let mut heads = 0;
        for (id, atom) in system.atoms_iter() {
            if atom.element != Element::Si || atom.role != AtomRole::Anchor {
                continue;
            }
            heads += 1;
            let surface_oxygen = system
                .get_bonded_neighbors(id)
                .unwrap()
                .iter()
                .filter_map(|n| system.atom(*n))
                .find(|n| n.role == AtomRole::Surface)
                .expect("head should be bonded to the surface");
            let distance = (atom.position - surface_oxygen.position).norm();
            assert!((distance - PORT_SI_DISTANCE).abs() < 1e-9);
        }
        assert_eq!(heads, 8);
    }

    #[test]
    fn same_seed_reproduces_site_selection() {
        let (surface, chain) = fixtures();
        let build = |seed| {
            SurfaceMonolayer::builder(&surface, &chain)
                .n_chains(30)
                .seed(seed)
                .rotate(true)
                .build()
                .unwrap()
        };
        let a = build(7);
        let b = build(7);
        let c = build(8);
        assert_eq!(a.chain_sites(), b.chain_sites());
        assert_ne!(a.chain_sites(), c.chain_sites());

        let pa: Vec<_> = a.system().atoms_iter().map(|(_, x)| x.position).collect();
        let pb: Vec<_> = b.system().atoms_iter().map(|(_, x)| x.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn zero_chains_backfills_every_port() {
        let (surface, chain) = fixtures();
        let monolayer = SurfaceMonolayer::builder(&surface, &chain).build().unwrap();
        assert_eq!(monolayer.chain_count(), 0);
        assert_eq!(monolayer.backfill_count(), surface.ports().len());
    }

    #[test]
    fn too_many_chains_is_an_error() {
        let (surface, chain) = fixtures();
        let available = surface.ports().len();
        let err = SurfaceMonolayer::builder(&surface, &chain)
            .n_chains(available + 1)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::TooManyChains {
                requested: available + 1,
                available
            }
        );
    }

    #[test]
    fn orientation_maps_z_onto_direction() {
        let direction = Vector3::new(0.0, 1.0, 0.0);
        let r = chain_orientation(&direction, 30.0);
        assert!((r * Vector3::z() - direction).norm() < 1e-9);
        let down = chain_orientation(&-Vector3::z(), 0.0);
        assert!((down * Vector3::z() + Vector3::z()).norm() < 1e-9);
    }
}
