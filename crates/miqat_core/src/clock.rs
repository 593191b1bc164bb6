//! Detecting when "today" changes.
//!
//! [`DayTicker`] is the scheduled refresh task: a background thread that reads
//! a [`Clock`] on a fixed interval and reports each new calendar day over a
//! channel. The receiving side applies it to its session; no calendar state
//! crosses the thread boundary.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use parking_lot::{Condvar, Mutex};
use tracing::debug;

pub trait Clock: Send + 'static {
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDate + Send + 'static,
{
    fn today(&self) -> NaiveDate {
        self()
    }
}

/// Remembers the last observed day and reports only changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWatch {
    last: NaiveDate,
}

impl DayWatch {
    pub fn new(today: NaiveDate) -> Self {
        Self { last: today }
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    pub fn observe(&mut self, today: NaiveDate) -> Option<NaiveDate> {
        if today == self.last {
            return None;
        }
        self.last = today;
        Some(today)
    }
}

type Shutdown = Arc<(Mutex<bool>, Condvar)>;

pub struct DayTicker {
    shutdown: Shutdown,
    handle: Option<JoinHandle<()>>,
}

impl DayTicker {
    /// Starts polling `clock` every `interval`. `seen` is the day the caller
    /// already knows about; only later changes are sent.
    pub fn spawn<C: Clock>(
        clock: C,
        interval: Duration,
        seen: NaiveDate,
    ) -> (Self, Receiver<NaiveDate>) {
        let (tx, rx) = mpsc::channel();
        let shutdown: Shutdown = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Arc::clone(&shutdown);

        let handle = thread::spawn(move || {
            let mut watch = DayWatch::new(seen);
            loop {
                {
                    let (lock, cvar) = &*signal;
                    let mut stopped = lock.lock();
                    if !*stopped {
                        cvar.wait_for(&mut stopped, interval);
                    }
                    if *stopped {
                        break;
                    }
                }
                if let Some(day) = watch.observe(clock.today()) {
                    debug!(%day, "calendar day changed");
                    if tx.send(day).is_err() {
                        break;
                    }
                }
            }
        });

        (
            Self {
                shutdown,
                handle: Some(handle),
            },
            rx,
        )
    }

    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        let (lock, cvar) = &*self.shutdown;
        *lock.lock() = true;
        cvar.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DayTicker {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
