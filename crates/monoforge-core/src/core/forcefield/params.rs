use crate::core::models::element::Element;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// The OPLS-AA subset shipped with the library.
pub const BUNDLED_FORCEFIELD_TOML: &str = include_str!("../../../resources/oplsaa.toml");

/// Class name that matches any atom class in angle and dihedral definitions.
pub const WILDCARD_CLASS: &str = "X";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CombiningRule {
    /// sigma_ij = sqrt(sigma_i sigma_j), epsilon_ij = sqrt(epsilon_i epsilon_j)
    #[default]
    Geometric,
    /// sigma_ij = (sigma_i + sigma_j) / 2, epsilon_ij = sqrt(epsilon_i epsilon_j)
    LorentzBerthelot,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GlobalParams {
    pub name: String,
    #[serde(default)]
    pub combining_rule: CombiningRule,
    #[serde(default = "default_fudge")]
    pub fudge_lj: f64,
    #[serde(default = "default_fudge")]
    pub fudge_qq: f64,
}

fn default_fudge() -> f64 {
    0.5
}

/// One typing rule plus the non-bonded parameters of the type it assigns.
///
/// A rule matches an atom when the element agrees, the neighbor count agrees
/// (if given), every element in `requires` can be paired with a distinct
/// bonded neighbor, and no bonded neighbor has an element in `excludes`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AtomTypeParam {
    pub name: String,
    pub class: String,
    pub element: String,
    pub charge: f64,
    pub mass: f64,
    /// nm
    pub sigma: f64,
    /// kJ/mol
    pub epsilon: f64,
    #[serde(default)]
    pub neighbor_count: Option<usize>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Harmonic bond, `k` in kJ/mol/nm^2 and `r0` in nm.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BondParam {
    pub classes: [String; 2],
    pub k: f64,
    pub r0: f64,
}

/// Harmonic angle, `k` in kJ/mol/rad^2 and `theta0` in degrees.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AngleParam {
    pub classes: [String; 3],
    pub k: f64,
    pub theta0: f64,
}

/// Ryckaert-Bellemans dihedral coefficients in kJ/mol.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DihedralParam {
    pub classes: [String; 4],
    #[serde(default)]
    pub c0: f64,
    #[serde(default)]
    pub c1: f64,
    #[serde(default)]
    pub c2: f64,
    #[serde(default)]
    pub c3: f64,
    #[serde(default)]
    pub c4: f64,
    #[serde(default)]
    pub c5: f64,
}

impl DihedralParam {
    pub fn coefficients(&self) -> [f64; 6] {
        [self.c0, self.c1, self.c2, self.c3, self.c4, self.c5]
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Forcefield {
    pub globals: GlobalParams,
    pub atom_types: Vec<AtomTypeParam>,
    #[serde(default)]
    pub bonds: Vec<BondParam>,
    #[serde(default)]
    pub angles: Vec<AngleParam>,
    #[serde(default)]
    pub dihedrals: Vec<DihedralParam>,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid force field '{path}': {message}")]
    Invalid { path: String, message: String },
}

impl Forcefield {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let origin = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: origin.clone(),
            source: e,
        })?;
        Self::from_toml_str(&content, &origin)
    }

    /// Parses and validates a force field. `origin` only labels errors.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ParamLoadError> {
        let forcefield: Forcefield =
            toml::from_str(content).map_err(|e| ParamLoadError::Toml {
                path: origin.to_string(),
                source: e,
            })?;
        forcefield.validate().map_err(|message| ParamLoadError::Invalid {
            path: origin.to_string(),
            message,
        })?;
        Ok(forcefield)
    }

    pub fn bundled() -> Result<Self, ParamLoadError> {
        Self::from_toml_str(BUNDLED_FORCEFIELD_TOML, "<bundled oplsaa.toml>")
    }

    pub fn atom_type(&self, name: &str) -> Option<&AtomTypeParam> {
        self.atom_types.iter().find(|t| t.name == name)
    }

    fn validate(&self) -> Result<(), String> {
        if self.atom_types.is_empty() {
            return Err("no atom types defined".to_string());
        }
        let mut names = HashSet::new();
        for atom_type in &self.atom_types {
            if !names.insert(atom_type.name.as_str()) {
                return Err(format!("duplicate atom type '{}'", atom_type.name));
            }
            let symbols = std::iter::once(&atom_type.element)
                .chain(&atom_type.requires)
                .chain(&atom_type.excludes);
            for symbol in symbols {
                symbol.parse::<Element>().map_err(|e| {
                    format!("atom type '{}': {}", atom_type.name, e)
                })?;
            }
            if atom_type.mass <= 0.0 {
                return Err(format!("atom type '{}' has non-positive mass", atom_type.name));
            }
        }
        for (key, value) in [
            ("fudge-lj", self.globals.fudge_lj),
            ("fudge-qq", self.globals.fudge_qq),
        ] {
            if value < 0.0 {
                return Err(format!("{} must not be negative", key));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"
        [globals]
        name = "mini"
        combining-rule = "lorentz-berthelot"

        [[atom-types]]
        name = "c_any"
        class = "CT"
        element = "C"
        charge = 0.0
        mass = 12.011
        sigma = 0.35
        epsilon = 0.276144

        [[bonds]]
        classes = ["CT", "CT"]
        k = 224262.4
        r0 = 0.1529

        [[dihedrals]]
        classes = ["X", "CT", "CT", "X"]
        c0 = 0.6276
        c3 = -2.5104
    "#;

    #[test]
    fn parses_minimal_forcefield_with_defaults() {
        let ff = Forcefield::from_toml_str(MINIMAL, "mini").unwrap();
        assert_eq!(ff.globals.name, "mini");
        assert_eq!(ff.globals.combining_rule, CombiningRule::LorentzBerthelot);
        assert_eq!(ff.globals.fudge_lj, 0.5);
        assert_eq!(ff.globals.fudge_qq, 0.5);
        assert_eq!(ff.atom_types.len(), 1);
        assert!(ff.atom_types[0].requires.is_empty());
        assert_eq!(ff.bonds[0].classes, ["CT".to_string(), "CT".to_string()]);
        assert!(ff.angles.is_empty());
        assert_eq!(
            ff.dihedrals[0].coefficients(),
            [0.6276, 0.0, 0.0, -2.5104, 0.0, 0.0]
        );
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ff.toml");
        fs::write(&path, MINIMAL).unwrap();
        let ff = Forcefield::load(&path).unwrap();
        assert!(ff.atom_type("c_any").is_some());
        assert!(ff.atom_type("missing").is_none());
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = Forcefield::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ParamLoadError::Io { .. })));
    }

    #[test]
    fn load_fails_for_malformed_toml() {
        let result = Forcefield::from_toml_str("this is not toml", "bad");
        assert!(matches!(result, Err(ParamLoadError::Toml { .. })));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let content = MINIMAL.replace("r0 = 0.1529", "r0 = 0.1529\nbogus = 1");
        let result = Forcefield::from_toml_str(&content, "bad");
        assert!(matches!(result, Err(ParamLoadError::Toml { .. })));
    }

    #[test]
    fn unknown_elements_are_rejected() {
        let content = MINIMAL.replace("element = \"C\"", "element = \"Xx\"");
        let result = Forcefield::from_toml_str(&content, "bad");
        assert!(matches!(result, Err(ParamLoadError::Invalid { .. })));
    }

    #[test]
    fn duplicate_type_names_are_rejected() {
        let duplicated = MINIMAL.to_string()
            + r#"
        [[atom-types]]
        name = "c_any"
        class = "CT"
        element = "C"
        charge = 0.0
        mass = 12.011
        sigma = 0.35
        epsilon = 0.276144
        "#;
        let result = Forcefield::from_toml_str(&duplicated, "dup");
        match result {
            Err(ParamLoadError::Invalid { message, .. }) => assert!(message.contains("c_any")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn bundled_forcefield_loads() {
        let ff = Forcefield::bundled().unwrap();
        assert_eq!(ff.globals.combining_rule, CombiningRule::Geometric);
        assert!(!ff.atom_types.is_empty());
        assert!(!ff.bonds.is_empty());
        assert!(!ff.angles.is_empty());
        assert!(!ff.dihedrals.is_empty());
    }
}
