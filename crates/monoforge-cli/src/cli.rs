use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Monoforge Developers",
    version,
    about = "monoforge CLI - builds amorphous silica dual-monolayer systems and writes GROMACS and LAMMPS inputs for every job of a project.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of jobs to run in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Project root directory.
    #[arg(short, long, global = true, value_name = "DIR", default_value = ".")]
    pub project: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the workspace directory and install the bundled force field.
    Init,
    /// Add a job with the given statepoint.
    Add(AddArgs),
    /// List jobs and whether their outputs are complete.
    Status,
    /// Run the initialization workflow on incomplete (or selected) jobs.
    Run(RunArgs),
}

/// Statepoint of a new job.
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Number of CH2 units in each chain.
    #[arg(long, value_name = "INT")]
    pub chainlength: usize,

    #[arg(long, default_value = "alkylsilane")]
    pub backbone: String,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Chain placement pattern: random or grid.
    #[arg(long, default_value = "random")]
    pub pattern_type: String,

    /// Terminal group: methyl, hydroxyl, amino or perfluoromethyl.
    #[arg(long, default_value = "methyl")]
    pub terminal_group: String,

    /// Number of chains per monolayer.
    #[arg(short = 'n', value_name = "INT")]
    pub n: usize,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Run only the given job ids. Can be used multiple times.
    #[arg(long = "job", value_name = "ID")]
    pub jobs: Vec<String>,

    /// Also run jobs whose outputs are already complete.
    #[arg(long)]
    pub force: bool,

    /// Configuration file. Defaults to `<project>/monoforge.toml` when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Force Field Overrides ---
    /// Override the force-field parameter file. Relative paths are taken from
    /// the working directory.
    #[arg(long, value_name = "PATH")]
    pub forcefield: Option<PathBuf>,

    /// Fail on dihedrals without parameters instead of skipping them.
    #[arg(long)]
    pub strict_dihedrals: bool,

    // --- Assembly Overrides ---
    /// Thickness of each silica slab in nm.
    #[arg(long, value_name = "NM")]
    pub surface_thickness: Option<f64>,

    /// Gap between the two monolayers in nm.
    #[arg(long, value_name = "NM")]
    pub separation: Option<f64>,

    /// Extend the box along z by this multiple of the system height.
    #[arg(long, value_name = "FLOAT")]
    pub box_extension_factor: Option<f64>,

    /// Depth of the frozen surface layer in nm.
    #[arg(long, value_name = "NM")]
    pub freeze_thickness: Option<f64>,

    /// Spin every chain by a random angle about its attachment direction.
    #[arg(long)]
    pub rotate_chains: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S assembly.separation=1.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
