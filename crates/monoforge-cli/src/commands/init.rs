use crate::error::Result;
use monoforge::engine::job::Project;
use std::path::Path;
use tracing::info;

pub async fn run(root: &Path) -> Result<()> {
    let project = Project::init(root)?;
    info!("Initialized project at {:?}", project.root());
    println!(
        "Initialized project in {}\n  workspace:  {}\n  forcefield: {}",
        project.root().display(),
        project.workspace_dir().display(),
        project.default_forcefield_path().display()
    );
    Ok(())
}
