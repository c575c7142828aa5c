use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use monoforge::engine::progress::{Progress, ProgressCallback};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Progress display for a batch of jobs: one overall bar plus a spinner per
/// running job.
#[derive(Clone)]
pub struct BatchProgress {
    mp: MultiProgress,
    overall: ProgressBar,
}

impl BatchProgress {
    pub fn new(total_jobs: u64) -> Self {
        Self::with_draw_target(total_jobs, ProgressDrawTarget::stderr())
    }

    pub fn hidden(total_jobs: u64) -> Self {
        Self::with_draw_target(total_jobs, ProgressDrawTarget::hidden())
    }

    fn with_draw_target(total_jobs: u64, target: ProgressDrawTarget) -> Self {
        let mp = MultiProgress::with_draw_target(target);
        let overall = mp.add(ProgressBar::new(total_jobs));
        overall.set_style(bar_style());
        overall.set_message("Jobs");
        Self { mp, overall }
    }

    /// Adds a spinner for `job_id` and returns the callback that drives it.
    pub fn job_callback(&self, job_id: &str) -> (ProgressBar, ProgressCallback<'static>) {
        let pb = self.mp.insert_before(&self.overall, ProgressBar::new_spinner());
        pb.set_style(spinner_style());
        pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        pb.set_message(job_id.to_string());

        let job_id = job_id.to_string();
        let bar = pb.clone();
        let callback: ProgressCallback<'static> = Box::new(move |progress: Progress| match progress {
            Progress::PhaseStart { name } => {
                bar.set_message(format!("{}: {}", job_id, name));
            }
            Progress::PhaseSkipped { name } => {
                bar.println(format!("  {}: skipped '{}', outputs exist", job_id, name));
            }
            Progress::FileWritten(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                bar.set_message(format!("{}: wrote {}", job_id, name));
            }
            Progress::Message(msg) => {
                bar.println(format!("  {}: {}", job_id, msg));
            }
            Progress::PhaseFinish
            | Progress::TaskStart { .. }
            | Progress::TaskIncrement
            | Progress::TaskFinish => {}
        });
        (pb, callback)
    }

    /// Removes the job spinner and advances the overall bar.
    pub fn finish_job(&self, pb: &ProgressBar, job_id: &str, ok: bool) {
        pb.finish_and_clear();
        self.mp.remove(pb);
        let mark = if ok { "✓" } else { "✗" };
        self.overall.println(format!("{} {}", mark, job_id));
        self.overall.inc(1);
    }

    pub fn finish(&self) {
        self.overall.finish();
    }

    pub fn completed(&self) -> u64 {
        self.overall.position()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<8} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key(
            "eta",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.1}s", state.eta().as_secs_f64());
            },
        )
        .progress_chars("##-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn callback_tracks_phases_and_files() {
        let batch = BatchProgress::hidden(2);
        let (pb, callback) = batch.job_callback("job-a");
        assert_eq!(pb.message(), "job-a");

        callback(Progress::PhaseStart {
            name: "Assembling system",
        });
        assert_eq!(pb.message(), "job-a: Assembling system");

        callback(Progress::FileWritten(PathBuf::from("/tmp/job-a/init.gro")));
        assert_eq!(pb.message(), "job-a: wrote init.gro");

        callback(Progress::PhaseFinish);
        assert_eq!(pb.message(), "job-a: wrote init.gro");
    }

    #[test]
    fn finishing_jobs_advances_overall_bar() {
        let batch = BatchProgress::hidden(2);
        let (pb_a, _) = batch.job_callback("job-a");
        let (pb_b, _) = batch.job_callback("job-b");

        batch.finish_job(&pb_a, "job-a", true);
        assert!(pb_a.is_finished());
        assert_eq!(batch.completed(), 1);

        batch.finish_job(&pb_b, "job-b", false);
        assert_eq!(batch.completed(), 2);
        batch.finish();
    }

    #[test]
    fn callbacks_can_run_on_worker_threads() {
        let batch = BatchProgress::hidden(1);
        let (pb, callback) = batch.job_callback("job-t");

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Writing index groups",
            });
        })
        .join()
        .unwrap();

        assert_eq!(pb.message(), "job-t: Writing index groups");
    }
}
