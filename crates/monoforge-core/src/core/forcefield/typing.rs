use super::parameterization::ParameterizationError;
use super::params::{AtomTypeParam, Forcefield};
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct TypingRule {
    element: Element,
    neighbor_count: Option<usize>,
    requires: Vec<Element>,
    excludes: Vec<Element>,
}

impl TypingRule {
    fn compile(param: &AtomTypeParam) -> Result<Self, ParameterizationError> {
        let parse = |symbol: &String| {
            symbol
                .parse::<Element>()
                .map_err(|_| ParameterizationError::InvalidTypeRule {
                    type_name: param.name.clone(),
                    symbol: symbol.clone(),
                })
        };
        Ok(Self {
            element: parse(&param.element)?,
            neighbor_count: param.neighbor_count,
            requires: param.requires.iter().map(parse).collect::<Result<_, _>>()?,
            excludes: param.excludes.iter().map(parse).collect::<Result<_, _>>()?,
        })
    }

    fn matches(&self, element: Element, neighbors: &[Element]) -> bool {
        if element != self.element {
            return false;
        }
        if self.neighbor_count.is_some_and(|n| n != neighbors.len()) {
            return false;
        }
        if neighbors.iter().any(|n| self.excludes.contains(n)) {
            return false;
        }
        let mut available = neighbors.to_vec();
        self.requires.iter().all(|required| {
            match available.iter().position(|n| n == required) {
                Some(i) => {
                    available.swap_remove(i);
                    true
                }
                None => false,
            }
        })
    }
}

/// Assigns force field atom types by element and first-neighbor rules.
#[derive(Debug, Clone)]
pub struct AtomTyper {
    rules: Vec<TypingRule>,
}

impl AtomTyper {
    pub fn new(forcefield: &Forcefield) -> Result<Self, ParameterizationError> {
        let rules = forcefield
            .atom_types
            .iter()
            .map(TypingRule::compile)
            .collect::<Result<_, _>>()?;
        Ok(Self { rules })
    }

    /// Index of the first rule matching an atom with the given neighborhood.
    pub fn type_for(&self, element: Element, neighbors: &[Element]) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule.matches(element, neighbors))
    }

    /// Types every atom of `system`, returning the matched rule index per atom.
    pub fn assign(
        &self,
        system: &MolecularSystem,
    ) -> Result<HashMap<AtomId, usize>, ParameterizationError> {
        let mut assignment = HashMap::with_capacity(system.atom_count());
        for (index, atom_id) in system.ordered_atom_ids().into_iter().enumerate() {
            let Some(atom) = system.atom(atom_id) else {
                continue;
            };
            let neighbors: Vec<Element> = system
                .get_bonded_neighbors(atom_id)
                .unwrap_or(&[])
                .iter()
                .filter_map(|id| system.atom(*id).map(|a| a.element))
                .collect();
            let type_index = self.type_for(atom.element, &neighbors).ok_or_else(|| {
                let residue_name = system
                    .residue(atom.residue_id)
                    .map(|r| r.name.clone())
                    .unwrap_or_default();
                let mut symbols: Vec<&str> = neighbors.iter().map(|e| e.symbol()).collect();
                symbols.sort_unstable();
                ParameterizationError::UntypedAtom {
                    index: index + 1,
                    atom_name: atom.name.clone(),
                    residue_name,
                    neighbors: symbols.join(","),
                }
            })?;
            assignment.insert(atom_id, type_index);
        }
        Ok(assignment)
    }
}
