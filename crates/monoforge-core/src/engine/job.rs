use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::forcefield::params::BUNDLED_FORCEFIELD_TOML;

pub const WORKSPACE_DIR: &str = "workspace";
pub const STATEPOINT_FILE: &str = "signac_statepoint.json";
pub const CONFIG_FILE: &str = "monoforge.toml";
/// Force-field location relative to the project root.
pub const DEFAULT_FORCEFIELD_PATH: &str = "forcefield/oplsaa.toml";

pub const GRO_FILE: &str = "init.gro";
pub const TOP_FILE: &str = "init.top";
pub const LAMMPS_FILE: &str = "init.lammps";
pub const NDX_FILE: &str = "init.ndx";
pub const OUTPUT_FILES: [&str; 4] = [GRO_FILE, TOP_FILE, LAMMPS_FILE, NDX_FILE];

#[derive(Debug, Error)]
pub enum JobError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid statepoint file '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("No workspace directory found at '{0}'; run `monoforge init` first")]
    MissingWorkspace(PathBuf),
    #[error("Job '{0}' not found")]
    JobNotFound(String),
    #[error("Job '{id}' already exists with a different statepoint")]
    StatepointConflict { id: String },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> JobError + '_ {
    move |source| JobError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Parameters of a single job. Read-only while an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statepoint {
    pub chainlength: usize,
    pub backbone: String,
    pub seed: u64,
    pub pattern_type: String,
    pub terminal_group: String,
    pub n: usize,
}

impl Statepoint {
    /// Readable job id, e.g. `alkylsilane-cl17-methyl-n100-random-s42`.
    pub fn id(&self) -> String {
        format!(
            "{}-cl{}-{}-n{}-{}-s{}",
            slug(&self.backbone),
            self.chainlength,
            slug(&self.terminal_group),
            self.n,
            slug(&self.pattern_type),
            self.seed
        )
    }
}

fn slug(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Job {
    id: String,
    statepoint: Statepoint,
    workspace: PathBuf,
}

impl Job {
    /// Creates the job directory and its statepoint file.
    ///
    /// Creating a job whose directory already holds the same statepoint
    /// returns the existing job.
    pub fn create(project: &Project, statepoint: Statepoint) -> Result<Self, JobError> {
        let id = statepoint.id();
        let workspace = project.workspace_dir().join(&id);
        let statepoint_path = workspace.join(STATEPOINT_FILE);

        if statepoint_path.is_file() {
            let existing = Self::open(&workspace)?;
            if existing.statepoint != statepoint {
                return Err(JobError::StatepointConflict { id });
            }
            debug!(job = %id, "Job already exists");
            return Ok(existing);
        }

        fs::create_dir_all(&workspace).map_err(io_err(&workspace))?;
        let json = serde_json::to_string_pretty(&statepoint).map_err(|source| JobError::Json {
            path: statepoint_path.clone(),
            source,
        })?;
        fs::write(&statepoint_path, json).map_err(io_err(&statepoint_path))?;
        info!(job = %id, "Created job");

        Ok(Self {
            id,
            statepoint,
            workspace,
        })
    }

    /// Opens the job stored in `workspace`. The id is the directory name.
    pub fn open(workspace: &Path) -> Result<Self, JobError> {
        let statepoint_path = workspace.join(STATEPOINT_FILE);
        let content = fs::read_to_string(&statepoint_path).map_err(io_err(&statepoint_path))?;
        let statepoint: Statepoint =
            serde_json::from_str(&content).map_err(|source| JobError::Json {
                path: statepoint_path.clone(),
                source,
            })?;
        let id = workspace
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| statepoint.id());

        Ok(Self {
            id,
            statepoint,
            workspace: workspace.to_path_buf(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn statepoint(&self) -> &Statepoint {
        &self.statepoint
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Path of a file inside the job workspace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.workspace.join(name)
    }

    pub fn is_complete(&self) -> bool {
        OUTPUT_FILES.iter().all(|name| self.path(name).is_file())
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Opens an existing project. The `workspace/` directory must exist.
    pub fn open(root: &Path) -> Result<Self, JobError> {
        let workspace = root.join(WORKSPACE_DIR);
        if !workspace.is_dir() {
            return Err(JobError::MissingWorkspace(workspace));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Creates the workspace directory and installs the bundled force field
    /// at its default location unless a file is already there.
    pub fn init(root: &Path) -> Result<Self, JobError> {
        let workspace = root.join(WORKSPACE_DIR);
        fs::create_dir_all(&workspace).map_err(io_err(&workspace))?;

        let forcefield = root.join(DEFAULT_FORCEFIELD_PATH);
        if !forcefield.exists() {
            if let Some(parent) = forcefield.parent() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
            fs::write(&forcefield, BUNDLED_FORCEFIELD_TOML).map_err(io_err(&forcefield))?;
            info!(path = %forcefield.display(), "Installed bundled force field");
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn default_forcefield_path(&self) -> PathBuf {
        self.root.join(DEFAULT_FORCEFIELD_PATH)
    }

    /// Every job in the workspace, sorted by id.
    pub fn jobs(&self) -> Result<Vec<Job>, JobError> {
        let workspace = self.workspace_dir();
        let mut jobs = Vec::new();
        for entry in fs::read_dir(&workspace).map_err(io_err(&workspace))? {
            let entry = entry.map_err(io_err(&workspace))?;
            let path = entry.path();
            if path.is_dir() && path.join(STATEPOINT_FILE).is_file() {
                jobs.push(Job::open(&path)?);
            }
        }
        jobs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(jobs)
    }

    pub fn job(&self, id: &str) -> Result<Job, JobError> {
        let path = self.workspace_dir().join(id);
        if !path.join(STATEPOINT_FILE).is_file() {
            return Err(JobError::JobNotFound(id.to_string()));
        }
        Job::open(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn statepoint(seed: u64) -> Statepoint {
        Statepoint {
            chainlength: 17,
            backbone: "Alkylsilane".to_string(),
            seed,
            pattern_type: "random".to_string(),
            terminal_group: "methyl".to_string(),
            n: 100,
        }
    }

    #[test]
    fn id_is_a_readable_slug() {
        assert_eq!(statepoint(42).id(), "alkylsilane-cl17-methyl-n100-random-s42");
        let mut odd = statepoint(1);
        odd.terminal_group = "CF3 group".to_string();
        assert_eq!(odd.id(), "alkylsilane-cl17-cf3_group-n100-random-s1");
    }

    #[test]
    fn statepoint_uses_plain_json_keys() {
        let json = serde_json::to_value(statepoint(3)).unwrap();
        for key in ["chainlength", "backbone", "seed", "pattern_type", "terminal_group", "n"] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn open_requires_workspace_directory() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Project::open(dir.path()),
            Err(JobError::MissingWorkspace(_))
        ));
        Project::init(dir.path()).unwrap();
        assert!(Project::open(dir.path()).is_ok());
    }

    #[test]
    fn init_installs_forcefield_without_overwriting() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let ff = project.default_forcefield_path();
        assert_eq!(fs::read_to_string(&ff).unwrap(), BUNDLED_FORCEFIELD_TOML);

        fs::write(&ff, "# edited").unwrap();
        Project::init(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&ff).unwrap(), "# edited");
    }

    #[test]
    fn create_is_idempotent_and_detects_conflicts() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let job = Job::create(&project, statepoint(7)).unwrap();
        assert!(job.path(STATEPOINT_FILE).is_file());
        let again = Job::create(&project, statepoint(7)).unwrap();
        assert_eq!(again.id(), job.id());
        assert_eq!(again.statepoint(), job.statepoint());

        let mut edited = statepoint(7);
        edited.backbone = "alkylsilane".to_string();
        assert!(matches!(
            Job::create(&project, edited),
            Err(JobError::StatepointConflict { .. })
        ));
    }

    #[test]
    fn jobs_are_listed_sorted_and_openable_by_id() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        Job::create(&project, statepoint(9)).unwrap();
        Job::create(&project, statepoint(10)).unwrap();
        fs::create_dir_all(project.workspace_dir().join("stray")).unwrap();

        let ids: Vec<String> = project.jobs().unwrap().iter().map(|j| j.id().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "alkylsilane-cl17-methyl-n100-random-s10".to_string(),
                "alkylsilane-cl17-methyl-n100-random-s9".to_string(),
            ]
        );

        let job = project.job(&ids[1]).unwrap();
        assert_eq!(job.statepoint().seed, 9);
        assert!(matches!(project.job("missing"), Err(JobError::JobNotFound(_))));
    }

    #[test]
    fn completion_requires_all_four_outputs() {
        let dir = tempdir().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let job = Job::create(&project, statepoint(1)).unwrap();
        assert!(!job.is_complete());
        for name in &OUTPUT_FILES[..3] {
            fs::write(job.path(name), "").unwrap();
        }
        assert!(!job.is_complete());
        fs::write(job.path(NDX_FILE), "").unwrap();
        assert!(job.is_complete());
    }
}
