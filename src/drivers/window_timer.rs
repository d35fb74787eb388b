//! Periodic sampling-window timer.
//!
//! Fires [`EdgeLatch::on_window_tick_for`] every `window_ms`, restarting
//! the period whenever the latch's window phase changes.  On host targets
//! the timer is a dedicated thread sleeping between ticks; the callback
//! only touches the latch's atomics, so jitter in the sleep only shifts
//! window boundaries and never corrupts a count.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{info, warn};

use crate::error::Error;
use crate::events::EdgeLatch;

/// Sleep granularity while waiting for the next tick, so `stop()` returns
/// promptly even with long windows.
const POLL_SLICE_MS: u64 = 50;

pub struct WindowTimer {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl WindowTimer {
    /// Spawn the timer thread.
    pub fn start(latch: Arc<EdgeLatch>, window_ms: u32) -> Result<Self, Error> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let period = Duration::from_millis(u64::from(window_ms));

        let handle = thread::Builder::new()
            .name("window-timer".into())
            .spawn(move || {
                let slice = Duration::from_millis(POLL_SLICE_MS);
                while flag.load(Ordering::Acquire) {
                    let mut generation = latch.window_generation();
                    let mut waited = Duration::ZERO;
                    while waited < period {
                        if !flag.load(Ordering::Acquire) {
                            return;
                        }
                        let current = latch.window_generation();
                        if current != generation {
                            // Window restarted (re-arm): begin a full period.
                            generation = current;
                            waited = Duration::ZERO;
                        }
                        let step = slice.min(period - waited);
                        thread::sleep(step);
                        waited += step;
                    }
                    latch.on_window_tick_for(generation);
                }
            })
            .map_err(|_| Error::Init("window timer thread spawn failed"))?;

        info!("window timer: {window_ms} ms period started");
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the timer and join its thread.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("window timer thread panicked");
            }
        }
    }
}

impl Drop for WindowTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
