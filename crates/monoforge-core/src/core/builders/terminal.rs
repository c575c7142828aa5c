use super::error::BuildError;
use crate::core::models::element::Element;
use std::fmt;
use std::str::FromStr;

/// Chemical group capping the free end of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalGroup {
    /// -CH3
    Methyl,
    /// -OH
    Hydroxyl,
    /// -NH2
    Amino,
    /// -CF3
    Perfluoromethyl,
}

impl TerminalGroup {
    pub fn name(&self) -> &'static str {
        match self {
            TerminalGroup::Methyl => "methyl",
            TerminalGroup::Hydroxyl => "hydroxyl",
            TerminalGroup::Amino => "amino",
            TerminalGroup::Perfluoromethyl => "perfluoromethyl",
        }
    }

    /// Element of the atom bonded to the last backbone carbon.
    pub(crate) fn heavy_element(&self) -> Element {
        match self {
            TerminalGroup::Methyl | TerminalGroup::Perfluoromethyl => Element::C,
            TerminalGroup::Hydroxyl => Element::O,
            TerminalGroup::Amino => Element::N,
        }
    }

    /// Bond length in nm between the last backbone carbon and the heavy atom.
    pub(crate) fn heavy_bond_length(&self) -> f64 {
        match self {
            TerminalGroup::Methyl | TerminalGroup::Perfluoromethyl => 0.154,
            TerminalGroup::Hydroxyl => 0.143,
            TerminalGroup::Amino => 0.147,
        }
    }

    /// Substituents on the heavy atom: element, count, and bond length in nm.
    pub(crate) fn substituents(&self) -> (Element, usize, f64) {
        match self {
            TerminalGroup::Methyl => (Element::H, 3, 0.109),
            TerminalGroup::Hydroxyl => (Element::H, 1, 0.096),
            TerminalGroup::Amino => (Element::H, 2, 0.101),
            TerminalGroup::Perfluoromethyl => (Element::F, 3, 0.135),
        }
    }
}

impl FromStr for TerminalGroup {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "methyl" | "ch3" => Ok(TerminalGroup::Methyl),
            "hydroxyl" | "oh" => Ok(TerminalGroup::Hydroxyl),
            "amino" | "nh2" => Ok(TerminalGroup::Amino),
            "perfluoromethyl" | "cf3" => Ok(TerminalGroup::Perfluoromethyl),
            _ => Err(BuildError::UnknownTerminalGroup(s.to_string())),
        }
    }
}

impl fmt::Display for TerminalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
