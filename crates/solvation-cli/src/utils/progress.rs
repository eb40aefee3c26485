use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use solvation::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Debug)]
struct PhaseDisplay {
    bar: ProgressBar,
    phase: Option<(&'static str, Instant)>,
}

/// Renders [`Progress`] events on stderr: a spinner per analysis phase, a frame bar
/// during shell detection and a timing line when each phase ends.
#[derive(Clone)]
pub struct CliProgressHandler {
    display: Arc<Mutex<PhaseDisplay>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// A handler that never draws, for `--quiet` runs.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        bar.finish_and_clear();
        Self {
            display: Arc::new(Mutex::new(PhaseDisplay { bar, phase: None })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let display = self.display.clone();

        Box::new(move |progress: Progress| {
            let Ok(mut display) = display.lock() else {
                warn!("Progress display lock was poisoned; dropping event.");
                return;
            };
            display.handle(progress);
        })
    }
}

impl PhaseDisplay {
    fn handle(&mut self, progress: Progress) {
        let bar = &self.bar;
        match progress {
            Progress::PhaseStart { name } => {
                bar.reset();
                bar.set_length(0);
                bar.set_style(spinner_style());
                bar.set_message(name);
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                self.phase = Some((name, Instant::now()));
            }
            Progress::PhaseFinish => {
                bar.disable_steady_tick();
                let line = match self.phase.take() {
                    Some((name, started)) => {
                        format!("✓ {name} ({:.2}s)", started.elapsed().as_secs_f64())
                    }
                    None => "✓ Done".to_string(),
                };
                bar.finish_with_message(line);
            }
            Progress::TaskStart { total_steps } => {
                bar.disable_steady_tick();
                bar.set_style(frame_bar_style());
                bar.set_length(total_steps);
                bar.set_position(0);
            }
            Progress::TaskIncrement => bar.inc(1),
            Progress::TaskFinish => {
                if let Some(length) = bar.length() {
                    bar.set_position(length);
                }
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
            }
            Progress::Message(msg) => bar.println(format!("  {msg}")),
        }
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn frame_bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:<18} [{bar:40.cyan/blue}] {pos}/{len} frames ({rate})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("rate", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let _ = write!(w, "{:.0} frames/s", state.per_sec());
        })
        .progress_chars("=> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn message(handler: &CliProgressHandler) -> String {
        handler.display.lock().unwrap().bar.message()
    }

    #[test]
    fn handler_starts_finished_with_no_phase() {
        let handler = CliProgressHandler::hidden();
        let display = handler.display.lock().unwrap();
        assert!(display.bar.is_finished());
        assert!(display.phase.is_none());
    }

    #[test]
    fn frame_bar_follows_shell_detection() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Shell detection",
        });
        assert_eq!(message(&handler), "Shell detection");

        callback(Progress::TaskStart { total_steps: 50 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        {
            let display = handler.display.lock().unwrap();
            assert_eq!(display.bar.length(), Some(50));
            assert_eq!(display.bar.position(), 2);
        }

        callback(Progress::TaskFinish);
        assert_eq!(handler.display.lock().unwrap().bar.position(), 50);

        callback(Progress::PhaseFinish);
        let display = handler.display.lock().unwrap();
        assert!(display.bar.is_finished());
        assert!(display.bar.message().starts_with("✓ Shell detection ("));
        assert!(display.phase.is_none());
    }

    #[test]
    fn finish_without_phase_reports_done() {
        let handler = CliProgressHandler::hidden();
        (handler.get_callback())(Progress::PhaseFinish);
        assert_eq!(message(&handler), "✓ Done");
    }

    #[test]
    fn callback_is_usable_from_worker_threads() {
        let handler = CliProgressHandler::hidden();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart { name: "residence" });
            callback(Progress::Message("4 shell records across 2 frames".into()));
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        assert!(message(&handler).starts_with("✓ residence"));
    }
}
