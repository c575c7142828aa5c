use std::path::PathBuf;
use thiserror::Error;

/// Thickness of each silica slab, in nm.
pub const DEFAULT_SURFACE_THICKNESS: f64 = 1.2;
/// Gap between the two monolayers, in nm.
pub const DEFAULT_SEPARATION: f64 = 2.0;
/// The box is extended along z by this multiple of the assembled height.
pub const DEFAULT_BOX_EXTENSION_FACTOR: f64 = 5.0;
/// Depth of the frozen layer on each outer face, in nm.
pub const DEFAULT_FREEZE_THICKNESS: f64 = 0.5;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {value} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForcefieldConfig {
    pub forcefield_path: PathBuf,
    /// Fail on dihedrals without parameters instead of skipping them.
    pub strict_dihedrals: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyConfig {
    pub surface_thickness: f64,
    pub separation: f64,
    pub box_extension_factor: f64,
    pub freeze_thickness: f64,
    pub rotate_chains: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            surface_thickness: DEFAULT_SURFACE_THICKNESS,
            separation: DEFAULT_SEPARATION,
            box_extension_factor: DEFAULT_BOX_EXTENSION_FACTOR,
            freeze_thickness: DEFAULT_FREEZE_THICKNESS,
            rotate_chains: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitializationConfig {
    pub forcefield: ForcefieldConfig,
    pub assembly: AssemblyConfig,
}

impl InitializationConfig {
    pub fn builder() -> InitializationConfigBuilder {
        InitializationConfigBuilder::new()
    }
}

#[derive(Default)]
pub struct InitializationConfigBuilder {
    forcefield_path: Option<PathBuf>,
    strict_dihedrals: Option<bool>,
    surface_thickness: Option<f64>,
    separation: Option<f64>,
    box_extension_factor: Option<f64>,
    freeze_thickness: Option<f64>,
    rotate_chains: Option<bool>,
}

impl InitializationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forcefield_path(mut self, path: PathBuf) -> Self {
        self.forcefield_path = Some(path);
        self
    }
    pub fn strict_dihedrals(mut self, strict: bool) -> Self {
        self.strict_dihedrals = Some(strict);
        self
    }
    pub fn surface_thickness(mut self, thickness: f64) -> Self {
        self.surface_thickness = Some(thickness);
        self
    }
    pub fn separation(mut self, separation: f64) -> Self {
        self.separation = Some(separation);
        self
    }
    pub fn box_extension_factor(mut self, factor: f64) -> Self {
        self.box_extension_factor = Some(factor);
        self
    }
    pub fn freeze_thickness(mut self, thickness: f64) -> Self {
        self.freeze_thickness = Some(thickness);
        self
    }
    pub fn rotate_chains(mut self, rotate: bool) -> Self {
        self.rotate_chains = Some(rotate);
        self
    }

    pub fn build(self) -> Result<InitializationConfig, ConfigError> {
        let forcefield = ForcefieldConfig {
            forcefield_path: self
                .forcefield_path
                .ok_or(ConfigError::MissingParameter("forcefield_path"))?,
            strict_dihedrals: self.strict_dihedrals.unwrap_or(false),
        };

        let assembly = AssemblyConfig {
            surface_thickness: positive(
                "surface_thickness",
                self.surface_thickness.unwrap_or(DEFAULT_SURFACE_THICKNESS),
            )?,
            separation: non_negative("separation", self.separation.unwrap_or(DEFAULT_SEPARATION))?,
            box_extension_factor: non_negative(
                "box_extension_factor",
                self.box_extension_factor
                    .unwrap_or(DEFAULT_BOX_EXTENSION_FACTOR),
            )?,
            freeze_thickness: non_negative(
                "freeze_thickness",
                self.freeze_thickness.unwrap_or(DEFAULT_FREEZE_THICKNESS),
            )?,
            rotate_chains: self.rotate_chains.unwrap_or(false),
        };

        Ok(InitializationConfig {
            forcefield,
            assembly,
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            name,
            value,
            reason: "must be a positive number",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            name,
            value,
            reason: "must not be negative",
        })
    }
}
