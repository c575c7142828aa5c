use std::fmt;
use std::str::FromStr;

use super::error::EngineError;
use crate::core::builders::chain::{Alkylsilane, ChainPrototype};
use crate::core::builders::error::BuildError;
use crate::core::builders::terminal::TerminalGroup;

/// Chain chemistries that can be deposited on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backbone {
    Alkylsilane,
}

impl Backbone {
    pub fn name(&self) -> &'static str {
        match self {
            Backbone::Alkylsilane => "alkylsilane",
        }
    }

    /// Builds one chain prototype of this backbone.
    pub fn build_chain(
        &self,
        chain_length: usize,
        terminal_group: TerminalGroup,
    ) -> Result<ChainPrototype, BuildError> {
        match self {
            Backbone::Alkylsilane => Alkylsilane::new(chain_length, terminal_group).build(),
        }
    }
}

impl FromStr for Backbone {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alkylsilane" => Ok(Backbone::Alkylsilane),
            _ => Err(EngineError::UnknownBackbone(s.to_string())),
        }
    }
}

impl fmt::Display for Backbone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_backbone_case_insensitively() {
        assert_eq!("Alkylsilane".parse::<Backbone>().unwrap(), Backbone::Alkylsilane);
        assert_eq!(" alkylsilane ".parse::<Backbone>().unwrap(), Backbone::Alkylsilane);
        assert_eq!(Backbone::Alkylsilane.to_string(), "alkylsilane");
    }

    #[test]
    fn unknown_backbone_is_reported_by_name() {
        let err = "polyethylene".parse::<Backbone>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownBackbone(ref name) if name == "polyethylene"));
    }

    #[test]
    fn build_chain_delegates_to_alkylsilane() {
        let from_backbone = Backbone::Alkylsilane
            .build_chain(3, TerminalGroup::Methyl)
            .unwrap();
        let direct = Alkylsilane::new(3, TerminalGroup::Methyl).build().unwrap();
        assert_eq!(from_backbone.atom_count(), direct.atom_count());
    }

    #[test]
    fn build_chain_propagates_builder_errors() {
        assert_eq!(
            Backbone::Alkylsilane
                .build_chain(0, TerminalGroup::Methyl)
                .unwrap_err(),
            BuildError::EmptyChain
        );
    }
}
