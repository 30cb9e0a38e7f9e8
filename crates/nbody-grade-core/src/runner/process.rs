//! Real simulator execution through `std::process`

use std::fs::File;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;
use wait_timeout::ChildExt;

use super::{Invocation, ProcessOutcome, Simulator};
use crate::error::{GradeError, Result};

/// How often a running child is checked for interruption
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for stderr to close once the child has exited. A
/// launcher's grandchildren can hold the pipe open after the child is gone.
const STDERR_GRACE: Duration = Duration::from_secs(1);

/// Spawns the simulator as a child process, stdout to the log file and
/// stderr captured separately.
#[derive(Debug, Clone, Default)]
pub struct ProcessSimulator {
    timeout: Option<Duration>,
    interrupted: Option<Arc<AtomicBool>>,
}

impl ProcessSimulator {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            interrupted: None,
        }
    }

    /// Kill the running child when `flag` becomes true
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(flag);
        self
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Wait for the child, honoring the timeout and the interrupt flag.
    /// Returns `None` when the time limit was hit.
    fn supervise(&self, child: &mut Child) -> Result<Option<std::process::ExitStatus>> {
        let start = Instant::now();

        loop {
            let slice = match self.timeout {
                Some(limit) => {
                    let remaining = limit.saturating_sub(start.elapsed());
                    if remaining.is_zero() {
                        return Ok(None);
                    }
                    remaining.min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };

            if let Some(status) = child
                .wait_timeout(slice)
                .map_err(|e| GradeError::Spawn {
                    program: "simulator".to_string(),
                    source: e,
                })?
            {
                return Ok(Some(status));
            }

            if self.is_interrupted() {
                return Err(GradeError::Interrupted);
            }
        }
    }
}

fn kill(child: &mut Child) {
    // The child may already have exited between the last poll and now.
    let _ = child.kill();
    let _ = child.wait();
}

impl Simulator for ProcessSimulator {
    fn run(&self, invocation: &Invocation) -> Result<ProcessOutcome> {
        let log = File::create(&invocation.stdout_path)
            .map_err(|e| GradeError::io("create log", &invocation.stdout_path, e))?;

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GradeError::Spawn {
                program: invocation.program.clone(),
                source: e,
            })?;

        debug!(pid = child.id(), "simulator started");

        // Drain stderr on its own thread so a chatty child cannot block on a
        // full pipe while we wait for it.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
            });
            rx
        });

        let status = match self.supervise(&mut child) {
            Ok(status) => status,
            Err(e) => {
                kill(&mut child);
                return Err(e);
            }
        };

        let Some(status) = status else {
            kill(&mut child);
            return Ok(ProcessOutcome::TimedOut {
                after: self.timeout.unwrap_or_default(),
            });
        };

        // The reader thread is detached if the pipe is still open after the
        // grace period.
        let stderr = stderr_reader
            .and_then(|rx| rx.recv_timeout(STDERR_GRACE).ok())
            .unwrap_or_default();

        // Killed by a signal: no exit code, treat as failure.
        let exit_code = status.code().unwrap_or(-1);
        debug!(exit_code, "simulator exited");

        Ok(ProcessOutcome::Exited { exit_code, stderr })
    }
}
