// SPDX-License-Identifier: GPL-3.0-only
//! Dedicated OS thread for the capture loop
//!
//! Device reads block, so capture never runs on the async runtime. The
//! thread owns everything the step closure captures (camera, display) and
//! drops it before exiting, which releases the hardware on that thread.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bound on the join performed when a controller is dropped
const DROP_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of one capture iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Continue,
    Stop,
}

/// How the capture thread ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The step closure returned [`LoopAction::Stop`]
    Finished,
    /// A stop was requested from outside
    Stopped,
}

/// Handle to a running capture thread
///
/// ```ignore
/// let mut controller = CaptureLoopController::start(
///     "thermal-capture",
///     move || capture.step(),
///     move |exit| shutdown.trigger(),
/// )?;
/// controller.stop();
/// ```
pub struct CaptureLoopController {
    handle: Option<JoinHandle<LoopExit>>,
    stop_requested: Arc<AtomicBool>,
    name: String,
}

impl CaptureLoopController {
    /// Spawn a thread calling `step` until it returns Stop or a stop is requested
    ///
    /// `on_exit` runs on the capture thread after the step closure and its
    /// captured state have been dropped. A stop request takes effect between
    /// iterations; an iteration blocked on the device finishes first.
    pub fn start<F, E>(name: &str, mut step: F, on_exit: E) -> io::Result<Self>
    where
        F: FnMut() -> LoopAction + Send + 'static,
        E: FnOnce(LoopExit) + Send + 'static,
    {
        let stop_requested = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop_requested);
        let thread_name = name.to_string();

        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            let mut iterations: u64 = 0;
            let exit = loop {
                if stop_flag.load(Ordering::SeqCst) {
                    break LoopExit::Stopped;
                }
                iterations += 1;
                if step() == LoopAction::Stop {
                    break LoopExit::Finished;
                }
            };

            drop(step);
            info!(name = %thread_name, ?exit, iterations, "Capture thread exiting");
            on_exit(exit);
            exit
        })?;

        info!(name, "Capture thread started");
        Ok(Self {
            handle: Some(handle),
            stop_requested,
            name: name.to_string(),
        })
    }

    /// Whether the thread is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the loop to stop after the current iteration
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Capture stop requested");
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    /// Request a stop and wait for the thread
    pub fn stop(&mut self) -> Option<LoopExit> {
        self.request_stop();
        self.join()
    }

    /// Request a stop and wait at most `timeout` for the thread
    ///
    /// A thread still blocked after the deadline is detached and left to
    /// finish on its own; None is returned in that case.
    pub fn stop_timeout(&mut self, timeout: Duration) -> Option<LoopExit> {
        self.request_stop();
        let deadline = Instant::now() + timeout;
        while self.is_running() {
            if Instant::now() >= deadline {
                warn!(name = %self.name, ?timeout, "Capture thread did not stop in time, detaching");
                self.handle = None;
                return None;
            }
            thread::sleep(Duration::from_millis(10));
        }
        self.join()
    }

    /// Wait for the thread to end
    ///
    /// Returns None if it was already joined or panicked.
    pub fn join(&mut self) -> Option<LoopExit> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(exit) => Some(exit),
            Err(_) => {
                warn!(name = %self.name, "Capture thread panicked");
                None
            }
        }
    }
}

impl Drop for CaptureLoopController {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop_timeout(DROP_JOIN_TIMEOUT);
        }
    }
}
