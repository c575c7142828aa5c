use crate::cli::RunArgs;
use crate::config::FileConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::BatchProgress;
use monoforge::engine::config::InitializationConfig;
use monoforge::engine::error::EngineError;
use monoforge::engine::job::{Job, Project};
use monoforge::engine::progress::ProgressReporter;
use monoforge::workflows::initialize::{self, InitializationReport};
use rayon::prelude::*;
use std::path::Path;
use tracing::{error, info};

pub type JobOutcome = (String, std::result::Result<InitializationReport, EngineError>);

pub async fn run(root: &Path, args: RunArgs) -> Result<()> {
    let project = Project::open(root)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = FileConfig::discover(&args, &project)?.merge_with_cli(&args, &project)?;

    let jobs = select_jobs(&project, &args)?;
    if jobs.is_empty() {
        println!("Nothing to do: every job is complete. Use --force to rerun.");
        return Ok(());
    }
    println!("Running {} job(s)...", jobs.len());

    let batch = BatchProgress::new(jobs.len() as u64);
    let outcomes = tokio::task::block_in_place(|| execute(&jobs, &config, &batch));
    batch.finish();

    summarize(&outcomes)
}

/// Named jobs when `--job` is given, otherwise every incomplete job (or
/// every job with `--force`).
pub fn select_jobs(project: &Project, args: &RunArgs) -> Result<Vec<Job>> {
    if !args.jobs.is_empty() {
        return args
            .jobs
            .iter()
            .map(|id| project.job(id).map_err(CliError::from))
            .collect();
    }
    Ok(project
        .jobs()?
        .into_iter()
        .filter(|job| args.force || !job.is_complete())
        .collect())
}

/// Runs every job on the rayon pool. Jobs only touch their own workspace.
pub fn execute(jobs: &[Job], config: &InitializationConfig, batch: &BatchProgress) -> Vec<JobOutcome> {
    jobs.par_iter()
        .map(|job| {
            let (pb, callback) = batch.job_callback(job.id());
            let reporter = ProgressReporter::with_callback(callback);
            let result = initialize::run(job, config, &reporter);
            batch.finish_job(&pb, job.id(), result.is_ok());
            (job.id().to_string(), result)
        })
        .collect()
}

fn summarize(outcomes: &[JobOutcome]) -> Result<()> {
    let mut failed = 0;
    for (id, result) in outcomes {
        match result {
            Ok(report) => info!(
                job = %id,
                atoms = report.atom_count,
                forcefield_applied = report.forcefield_applied,
                "Job finished"
            ),
            Err(e) => {
                failed += 1;
                error!(job = %id, "Job failed: {}", e);
                eprintln!("✗ {}: {}", id, e);
            }
        }
    }
    if failed > 0 {
        return Err(CliError::JobsFailed {
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use monoforge::engine::job::{OUTPUT_FILES, Statepoint};
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn statepoint(backbone: &str, seed: u64) -> Statepoint {
        Statepoint {
            chainlength: 2,
            backbone: backbone.to_string(),
            seed,
            pattern_type: "grid".to_string(),
            terminal_group: "hydroxyl".to_string(),
            n: 4,
        }
    }

    fn project_with_jobs(statepoints: &[Statepoint]) -> (TempDir, Project, Vec<Job>) {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let jobs = statepoints
            .iter()
            .map(|sp| Job::create(&project, sp.clone()).unwrap())
            .collect();
        (dir, project, jobs)
    }

    fn config(project: &Project) -> InitializationConfig {
        InitializationConfig::builder()
            .forcefield_path(project.default_forcefield_path())
            .build()
            .unwrap()
    }

    #[test]
    fn selection_skips_complete_jobs_unless_forced() {
        let (_dir, project, jobs) =
            project_with_jobs(&[statepoint("alkylsilane", 1), statepoint("alkylsilane", 2)]);
        for name in OUTPUT_FILES {
            fs::write(jobs[0].path(name), "").unwrap();
        }

        let pending = select_jobs(&project, &RunArgs::default()).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), jobs[1].id());

        let forced = RunArgs {
            force: true,
            ..Default::default()
        };
        assert_eq!(select_jobs(&project, &forced).unwrap().len(), 2);

        let named = RunArgs {
            jobs: vec![jobs[0].id().to_string()],
            ..Default::default()
        };
        let selected = select_jobs(&project, &named).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id(), jobs[0].id());

        let missing = RunArgs {
            jobs: vec!["nope".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            select_jobs(&project, &missing),
            Err(CliError::Project(_))
        ));
    }

    #[test]
    fn parallel_run_completes_jobs_and_reports_failures() {
        let (_dir, project, jobs) = project_with_jobs(&[
            statepoint("alkylsilane", 1),
            statepoint("alkylsilane", 2),
            statepoint("polystyrene", 3),
        ]);
        let batch = BatchProgress::hidden(jobs.len() as u64);
        let outcomes = execute(&jobs, &config(&project), &batch);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(batch.completed(), 3);
        assert!(jobs[0].is_complete());
        assert!(jobs[1].is_complete());
        assert!(!jobs[2].is_complete());
        assert!(matches!(
            outcomes[2].1,
            Err(EngineError::UnknownBackbone(_))
        ));

        assert!(matches!(
            summarize(&outcomes),
            Err(CliError::JobsFailed { failed: 1, total: 3 })
        ));
        assert!(summarize(&outcomes[..2]).is_ok());
    }
}
