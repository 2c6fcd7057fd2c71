//! Cancellable fixed-rate worker thread.
//!
//! [`PeriodicTask`] owns at most one worker. `start` while running cancels the
//! old worker and joins it before the new one spawns, so a repeated resume
//! never leaves two clocks ticking. `stop` is safe to call any number of
//! times, and dropping the task stops it.
//!
//! # Timing
//!
//! Ticks are scheduled at fixed deadlines (`start + n * period`). If a tick
//! overruns by more than a full period the missed deadlines are skipped
//! rather than replayed in a burst.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

struct Worker {
    should_stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Handle to a periodic worker thread.
pub struct PeriodicTask {
    name: &'static str,
    period: Duration,
    worker: Option<Worker>,
}

impl PeriodicTask {
    pub const fn new(
        name: &'static str,
        period: Duration,
    ) -> Self {
        Self {
            name,
            period,
            worker: None,
        }
    }

    /// Run `tick` every period on a new thread, replacing any running worker.
    pub fn start<F>(
        &mut self,
        mut tick: F,
    ) -> Result<()>
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_running() {
            log::debug!("{}: restarting", self.name);
            self.stop();
        }

        let should_stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&should_stop);
        let period = self.period;

        let handle = thread::Builder::new()
            .name(self.name.to_string())
            .spawn(move || {
                let mut deadline = Instant::now();
                while !stop_flag.load(Ordering::Acquire) {
                    tick();

                    deadline += period;
                    let now = Instant::now();
                    if now > deadline + period {
                        deadline = now;
                    }
                    wait_until(deadline, &stop_flag);
                }
            })
            .map_err(|source| Error::ThreadSpawn {
                name: self.name,
                source,
            })?;

        log::debug!("{}: started, period {:?}", self.name, self.period);
        self.worker = Some(Worker { should_stop, handle });
        Ok(())
    }

    /// Stop the worker and wait for it to exit. No-op when not running.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.should_stop.store(true, Ordering::Release);
        worker.handle.thread().unpark();
        if worker.handle.join().is_err() {
            log::warn!("{}: worker panicked", self.name);
        } else {
            log::debug!("{}: stopped", self.name);
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool { self.worker.is_some() }

    #[inline]
    pub const fn name(&self) -> &'static str { self.name }

    #[inline]
    pub const fn period(&self) -> Duration { self.period }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) { self.stop(); }
}

/// Park until `deadline` or until `stop` is raised (the stopper unparks us).
fn wait_until(
    deadline: Instant,
    stop: &AtomicBool,
) {
    loop {
        if stop.load(Ordering::Acquire) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::park_timeout(deadline - now);
    }
}
