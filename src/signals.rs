//! Minimal signal handling.
//!
//! Per the concurrency model, handlers do nothing but set an atomic flag.
//! The main loop examines the flags once per tick at a known point.
//! Installed via `signal-hook`'s `flag::register`, mirroring the pattern
//! used by other Linux sensor/actuator daemons in this niche.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use signal_hook::consts::{SIGCHLD, SIGHUP, SIGINT, SIGTERM, SIGTSTP, SIGTTIN, SIGTTOU};
use signal_hook::flag;
use signal_hook::low_level;

/// Flags set by signal handlers, examined once per tick.
pub struct Signals {
    pub need_reload: Arc<AtomicBool>,
    pub should_terminate: Arc<AtomicBool>,
}

impl Signals {
    /// Install handlers for `SIGHUP` (reload), `SIGTERM`/`SIGINT`
    /// (terminate), and explicitly ignore `SIGCHLD`/`SIGTTIN`/`SIGTTOU`/
    /// `SIGTSTP` so a backgrounded or job-controlled shell can't stop or
    /// orphan the daemon unexpectedly.
    pub fn install() -> anyhow::Result<Self> {
        let need_reload = Arc::new(AtomicBool::new(false));
        let should_terminate = Arc::new(AtomicBool::new(false));

        flag::register(SIGHUP, Arc::clone(&need_reload))
            .context("registering SIGHUP handler")?;
        flag::register(SIGTERM, Arc::clone(&should_terminate))
            .context("registering SIGTERM handler")?;
        flag::register(SIGINT, Arc::clone(&should_terminate))
            .context("registering SIGINT handler")?;

        for sig in [SIGCHLD, SIGTTIN, SIGTTOU, SIGTSTP] {
            unsafe {
                low_level::register(sig, || {})
                    .context("registering ignored-signal handler")?;
            }
        }

        Ok(Self {
            need_reload,
            should_terminate,
        })
    }

    /// Check and clear the reload flag.
    pub fn take_reload(&self) -> bool {
        self.need_reload.swap(false, Ordering::SeqCst)
    }

    pub fn should_terminate(&self) -> bool {
        self.should_terminate.load(Ordering::SeqCst)
    }
}
