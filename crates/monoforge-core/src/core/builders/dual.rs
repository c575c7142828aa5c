use super::error::BuildError;
use super::monolayer::SurfaceMonolayer;
use crate::core::models::system::{BoundingBox, MolecularSystem};
use crate::core::utils::geometry::rotation_from_axis_angle;
use nalgebra::Vector3;
use tracing::debug;

/// Two monolayers facing each other across a gap.
///
/// The bottom monolayer keeps its orientation. The top one is flipped upside
/// down, centered laterally over the bottom, and lifted so that the closest
/// atoms of the two are `separation` apart along z. The assembled system
/// starts at z = 0.
#[derive(Debug, Clone)]
pub struct DualSurface {
    system: MolecularSystem,
    separation: f64,
}

impl DualSurface {
    pub fn new(
        bottom: &SurfaceMonolayer,
        top: &SurfaceMonolayer,
        separation: f64,
    ) -> Result<Self, BuildError> {
        if !separation.is_finite() || separation < 0.0 {
            return Err(BuildError::InvalidSeparation(separation));
        }

        let bottom_box = bounds(bottom)?;
        let mut flipped = top.system().clone();
        let top_box = bounds(top)?;
        flipped.rotate_about(
            &rotation_from_axis_angle(&Vector3::x(), 180.0),
            &top_box.center(),
        );
        let flipped_box = flipped
            .bounding_box()
            .ok_or_else(|| BuildError::EmptyStructure(top.name().to_string()))?;

        let bottom_center = bottom_box.center();
        let flipped_center = flipped_box.center();
        flipped.translate(&Vector3::new(
            bottom_center.x - flipped_center.x,
            bottom_center.y - flipped_center.y,
            bottom_box.max.z + separation - flipped_box.min.z,
        ));

        let mut system = MolecularSystem::new();
        system.merge(bottom.system());
        system.merge(&flipped);

        let assembled = system
            .bounding_box()
            .ok_or_else(|| BuildError::EmptyStructure("dual surface".to_string()))?;
        system.translate(&Vector3::new(0.0, 0.0, -assembled.min.z));

        let lateral = bottom.system().periodicity();
        system.set_periodicity(Vector3::new(lateral.x, lateral.y, assembled.lengths().z));

        debug!(
            atoms = system.atom_count(),
            height = assembled.lengths().z,
            "Assembled dual surface"
        );

        Ok(Self { system, separation })
    }

    pub fn system(&self) -> &MolecularSystem {
        &self.system
    }

    pub fn into_system(self) -> MolecularSystem {
        self.system
    }

    pub fn separation(&self) -> f64 {
        self.separation
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.system.bounding_box()
    }

    /// Grows the periodic box by `delta` on each axis.
    pub fn extend_periodicity(&mut self, delta: &Vector3<f64>) {
        let periodicity = self.system.periodicity() + delta;
        self.system.set_periodicity(periodicity);
    }
}

fn bounds(monolayer: &SurfaceMonolayer) -> Result<BoundingBox, BuildError> {
    monolayer
        .system()
        .bounding_box()
        .ok_or_else(|| BuildError::EmptyStructure(monolayer.name().to_string()))
}
