use crate::errors::CliError;
use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const FRAMES: [&str; 3] = [".  ", " . ", "  ."];
const FRAME_TIME: Duration = Duration::from_millis(200);

/// Animated status line for one build phase.
///
/// The animation runs on its own thread until [`finish`](Self::finish) (or
/// drop) clears the flag and joins it. Printing failures are ignored.
pub struct ProgressTicker {
    label: String,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub fn start(label: impl Into<String>, quiet: bool) -> Self {
        let label = label.into();
        let stop = Arc::new(AtomicBool::new(false));
        let handle = (!quiet).then(|| {
            let stop = stop.clone();
            let label = label.clone();
            std::thread::spawn(move || {
                let mut frame = 0;
                while !stop.load(Ordering::Relaxed) {
                    let mut stdout = std::io::stdout();
                    let _ = write!(stdout, "\r    {}{}", label, FRAMES[frame % FRAMES.len()]);
                    let _ = stdout.flush();
                    frame += 1;
                    std::thread::sleep(FRAME_TIME);
                }
            })
        });
        Self {
            label,
            stop,
            handle,
        }
    }

    pub fn finish(mut self, status: &str) {
        if self.halt() {
            println!("\r    {} {}{}", self.label, status, " ".repeat(FRAMES[0].len()));
        }
    }

    /// Stop the animation; returns whether one was running.
    fn halt(&mut self) -> bool {
        self.stop.store(true, Ordering::Relaxed);
        match self.handle.take() {
            Some(handle) => {
                let _ = handle.join();
                true
            }
            None => false,
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Run one phase behind a ticker, ending the line with its outcome.
pub fn phase<T>(
    label: &str,
    quiet: bool,
    work: impl FnOnce() -> Result<T, CliError>,
) -> Result<T, CliError> {
    tracing::info!("Phase: {}", label);
    let ticker = ProgressTicker::start(label, quiet);
    let result = work();
    match &result {
        Ok(_) => ticker.finish(&"> OK".bright_green().to_string()),
        Err(_) => ticker.finish(&"> FAILED".bright_red().to_string()),
    }
    result
}
