use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use monoforge::engine::config as core_config;
use monoforge::engine::job::Project;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FileForcefieldConfig {
    path: Option<PathBuf>,
    strict_dihedrals: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FileAssemblyConfig {
    surface_thickness: Option<f64>,
    separation: Option<f64>,
    box_extension_factor: Option<f64>,
    freeze_thickness: Option<f64>,
    rotate_chains: Option<bool>,
}

/// Contents of `monoforge.toml`. Every key is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    forcefield: Option<FileForcefieldConfig>,
    assembly: Option<FileAssemblyConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `--config` if given, else `<project>/monoforge.toml` if it exists.
    pub fn discover(args: &RunArgs, project: &Project) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = project.config_path();
                if default_path.is_file() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resolves the final run configuration.
    ///
    /// Precedence is CLI flag, then `-S key=value`, then the file, then the
    /// built-in default. A relative `--forcefield` is taken from the working
    /// directory; relative paths from the file or `-S` from the project root.
    pub fn merge_with_cli(
        self,
        args: &RunArgs,
        project: &Project,
    ) -> Result<core_config::InitializationConfig> {
        let mut file_config = apply_set_values(self, &args.set_values)?;
        let ff = file_config.forcefield.take().unwrap_or_default();
        let assembly = file_config.assembly.take().unwrap_or_default();

        let forcefield_path = match (&args.forcefield, ff.path) {
            (Some(path), _) => std::path::absolute(path)?,
            (None, Some(path)) => resolve_from_root(project.root(), path),
            (None, None) => project.default_forcefield_path(),
        };

        let mut builder = core_config::InitializationConfig::builder()
            .forcefield_path(forcefield_path)
            .strict_dihedrals(args.strict_dihedrals || ff.strict_dihedrals.unwrap_or(false))
            .rotate_chains(args.rotate_chains || assembly.rotate_chains.unwrap_or(false));

        if let Some(value) = args.surface_thickness.or(assembly.surface_thickness) {
            builder = builder.surface_thickness(value);
        }
        if let Some(value) = args.separation.or(assembly.separation) {
            builder = builder.separation(value);
        }
        if let Some(value) = args.box_extension_factor.or(assembly.box_extension_factor) {
            builder = builder.box_extension_factor(value);
        }
        if let Some(value) = args.freeze_thickness.or(assembly.freeze_thickness) {
            builder = builder.freeze_thickness(value);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }
}

fn resolve_from_root(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "forcefield.path" => {
                config.forcefield.get_or_insert_with(Default::default).path =
                    Some(PathBuf::from(value_str.trim()));
            }
            "forcefield.strict-dihedrals" => {
                config
                    .forcefield
                    .get_or_insert_with(Default::default)
                    .strict_dihedrals = Some(parse_value(key, value_str, "boolean")?);
            }
            "assembly.surface-thickness" => {
                config
                    .assembly
                    .get_or_insert_with(Default::default)
                    .surface_thickness = Some(parse_value(key, value_str, "float")?);
            }
            "assembly.separation" => {
                config.assembly.get_or_insert_with(Default::default).separation =
                    Some(parse_value(key, value_str, "float")?);
            }
            "assembly.box-extension-factor" => {
                config
                    .assembly
                    .get_or_insert_with(Default::default)
                    .box_extension_factor = Some(parse_value(key, value_str, "float")?);
            }
            "assembly.freeze-thickness" => {
                config
                    .assembly
                    .get_or_insert_with(Default::default)
                    .freeze_thickness = Some(parse_value(key, value_str, "float")?);
            }
            "assembly.rotate-chains" => {
                config
                    .assembly
                    .get_or_insert_with(Default::default)
                    .rotate_chains = Some(parse_value(key, value_str, "boolean")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
