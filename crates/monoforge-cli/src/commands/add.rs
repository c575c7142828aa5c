use crate::cli::AddArgs;
use crate::error::{CliError, Result};
use monoforge::core::builders::pattern::PatternType;
use monoforge::core::builders::terminal::TerminalGroup;
use monoforge::engine::backbone::Backbone;
use monoforge::engine::job::{Job, Project, Statepoint};
use std::path::Path;
use tracing::info;

pub async fn run(root: &Path, args: AddArgs) -> Result<()> {
    let project = Project::open(root)?;
    let job = add_job(&project, args)?;
    println!("{}", job.id());
    Ok(())
}

/// Validates the statepoint names and creates the job.
pub fn add_job(project: &Project, args: AddArgs) -> Result<Job> {
    args.backbone.parse::<Backbone>()?;
    args.terminal_group
        .parse::<TerminalGroup>()
        .map_err(|e| CliError::Argument(e.to_string()))?;
    args.pattern_type
        .parse::<PatternType>()
        .map_err(|e| CliError::Argument(e.to_string()))?;
    if args.chainlength == 0 {
        return Err(CliError::Argument(
            "--chainlength must be at least 1".to_string(),
        ));
    }

    let statepoint = Statepoint {
        chainlength: args.chainlength,
        backbone: args.backbone,
        seed: args.seed,
        pattern_type: args.pattern_type,
        terminal_group: args.terminal_group,
        n: args.n,
    };
    let job = Job::create(project, statepoint)?;
    info!(job = %job.id(), "Added job");
    Ok(job)
}
