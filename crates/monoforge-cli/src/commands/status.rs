use crate::error::Result;
use monoforge::engine::job::Project;
use std::path::Path;

pub async fn run(root: &Path) -> Result<()> {
    let project = Project::open(root)?;
    print!("{}", render(&project)?);
    Ok(())
}

/// One line per job followed by a summary line.
pub fn render(project: &Project) -> Result<String> {
    let jobs = project.jobs()?;
    let width = jobs.iter().map(|j| j.id().len()).max().unwrap_or(0);
    let mut out = String::new();
    let mut complete = 0;
    for job in &jobs {
        let state = if job.is_complete() {
            complete += 1;
            "complete"
        } else {
            "pending"
        };
        out.push_str(&format!("{:<width$}  {}\n", job.id(), state, width = width));
    }
    out.push_str(&format!("{} job(s), {} complete\n", jobs.len(), complete));
    Ok(out)
}
