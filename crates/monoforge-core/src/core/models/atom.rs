use super::element::Element;
use super::ids::ResidueId;
use nalgebra::Point3;

/// Represents the structural role of an atom within a monolayer system.
///
/// Builders tag every atom they create with a role so that later stages
/// (index group generation, diagnostics) can select atoms without having
/// to re-derive the connectivity of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Atom of the silica substrate, including surface oxygens.
    Surface,
    /// Silane head group atom that anchors a chain to the surface.
    Anchor,
    /// Atom of the chain backbone between the anchor and the terminal group.
    Backbone,
    /// Atom of the chain terminal group.
    Terminal,
    /// Hydrogen cap placed on an unused surface binding site.
    Backfill,
    /// Unknown or unclassified atom role.
    #[default]
    Other,
}

impl AtomRole {
    /// Returns `true` for atoms that belong to a deposited chain.
    pub fn is_chain(&self) -> bool {
        matches!(
            self,
            AtomRole::Anchor | AtomRole::Backbone | AtomRole::Terminal
        )
    }
}

/// Represents an atom of a monolayer system.
///
/// Positions are stored in nanometers. Force-field types, charges and masses
/// are not stored here; they live on the
/// [`Structure`](crate::core::forcefield::structure::Structure) produced by
/// applying a force field.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "Si", "C", "H").
    pub name: String,
    /// The chemical element of the atom.
    pub element: Element,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The structural role of the atom.
    pub role: AtomRole,
    /// The 3D coordinates of the atom in nanometers.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` named after its element symbol, with the
    /// [`AtomRole::Other`] role.
    ///
    /// # Arguments
    ///
    /// * `element` - The chemical element of the atom.
    /// * `residue_id` - The ID of the residue this atom belongs to.
    /// * `position` - The 3D coordinates of the atom in nanometers.
    pub fn new(element: Element, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: element.symbol().to_string(),
            element,
            residue_id,
            role: AtomRole::default(),
            position,
        }
    }

    /// Returns the atom with its role set, for builder-style construction.
    pub fn with_role(mut self, role: AtomRole) -> Self {
        self.role = role;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ResidueId;
    use nalgebra::Point3;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let residue_id = ResidueId::default();
        let atom = Atom::new(Element::Si, residue_id, Point3::new(1.0, 2.0, 3.0));

        assert_eq!(atom.name, "Si");
        assert_eq!(atom.element, Element::Si);
        assert_eq!(atom.residue_id, residue_id);
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.role, AtomRole::Other);
    }

    #[test]
    fn with_role_overrides_default_role() {
        let atom = Atom::new(Element::C, ResidueId::default(), Point3::origin())
            .with_role(AtomRole::Backbone);
        assert_eq!(atom.role, AtomRole::Backbone);
    }

    #[test]
    fn chain_roles_are_classified() {
        assert!(AtomRole::Anchor.is_chain());
        assert!(AtomRole::Backbone.is_chain());
        assert!(AtomRole::Terminal.is_chain());
        assert!(!AtomRole::Surface.is_chain());
        assert!(!AtomRole::Backfill.is_chain());
        assert!(!AtomRole::Other.is_chain());
    }
}
