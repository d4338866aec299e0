//! # Task Supervisor
//!
//! The first application task. It owns the start-up sequence and afterwards
//! does the low-priority housekeeping.
//!
//! ## Sequence
//!
//! 1. **Splash**: clear, wait, show the banner, wait, clear and hide the
//!    cursor.
//! 2. **Start**: create every game task with the scheduler locked, so that
//!    the whole set becomes runnable at once when the lock is released.
//!    Failures are collected and reported once the scheduler runs again,
//!    because drawing may have to wait for the screen lock.
//! 3. **Housekeeping**, forever: refresh the status block, then walk the
//!    heartbeat LEDs.

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::config::{
    BANNER_X, BANNER_Y, DIAGNOSTIC_Y, HEARTBEAT_PERIOD_MS, LED_COUNT, MAX_TASKS, SCREEN_X_END,
    SCREEN_X_START, SPLASH_MS, STATUS_ENABLED, STATUS_TASKS_Y, STATUS_UPTIME_Y, STATUS_X,
};
use crate::error::KernelError;
use crate::kernel::{ticks_to_secs, Kernel};
use crate::screen::{Screen, Terminal};
use crate::sync::Backoff;
use crate::task::TaskConfig;

/// Splash banner, one entry per row starting at (`BANNER_X`, `BANNER_Y`).
pub const BANNER: [&str; 2] = ["rtpong, a preemptive real-time kernel on Cortex-M4", "PONG"];

/// One diagnostic line, at most a full screen row.
type Line = String<{ SCREEN_X_END as usize }>;

/// Heartbeat indicator. `index` runs from 1 to `LED_COUNT`.
pub trait StatusLed {
    fn toggle(&mut self, index: u8);
}

pub struct Supervisor<'a, K, T, B, L> {
    kernel: &'a K,
    screen: &'a Screen<T, B>,
    leds: L,
}

impl<'a, K, T, B, L> Supervisor<'a, K, T, B, L>
where
    K: Kernel,
    T: Terminal,
    B: Backoff,
    L: StatusLed,
{
    pub fn new(kernel: &'a K, screen: &'a Screen<T, B>, leds: L) -> Self {
        Self {
            kernel,
            screen,
            leds,
        }
    }

    /// Show the banner between two cleared screens.
    pub fn splash(&self) {
        self.screen.init();
        self.kernel.delay_ms(SPLASH_MS);

        for (row, text) in (BANNER_Y..).zip(BANNER) {
            if let Err(e) = self.screen.write_str(BANNER_X, row, text) {
                warn!("banner not drawn: {}", e);
            }
        }

        self.kernel.delay_ms(SPLASH_MS);
        self.screen.init();
        self.screen.cursor_hide();
    }

    /// Create `tasks` as one batch. Returns how many were created.
    pub fn start_tasks(&self, tasks: &'static [TaskConfig]) -> usize {
        let mut failures: Vec<(&'static str, KernelError), MAX_TASKS> = Vec::new();
        let mut started = 0;

        self.kernel.lock_scheduler();
        for config in tasks {
            match self.kernel.create_task(config) {
                Ok(id) => {
                    started += 1;
                    debug!("{} started as {}", config.name, id);
                }
                Err(e) => {
                    if failures.push((config.name, e)).is_err() {
                        error!("{} failed to start: {}", config.name, e);
                    }
                }
            }
        }
        self.kernel.unlock_scheduler();

        for (line, (name, e)) in failures.iter().enumerate() {
            error!("{} failed to start: {}", name, e);
            self.report(DIAGNOSTIC_Y - line as i32, name, *e);
        }

        info!("{} of {} tasks started", started, tasks.len());
        started
    }

    fn report(&self, row: i32, name: &str, e: KernelError) {
        let mut line = Line::new();
        // Overlong text is cut at the screen width.
        let _ = write!(line, "Error starting {} task: {}", name, e);
        if let Err(e) = self.screen.write_str(SCREEN_X_START, row, &line) {
            warn!("diagnostic not drawn: {}", e);
        }
    }

    /// Redraw task count and uptime in a single locked block.
    pub fn refresh_status(&self) {
        if !STATUS_ENABLED {
            return;
        }

        let tasks = self.kernel.task_count().min(99) as u8;
        let uptime = (ticks_to_secs(self.kernel.uptime_ticks()) % 1000) as u16;

        let drawn = self.screen.block(|pen| {
            pen.write_number(STATUS_X, STATUS_TASKS_Y, tasks)?;
            pen.write_number3(STATUS_X, STATUS_UPTIME_Y, uptime)
        });
        if let Err(e) = drawn {
            warn!("status not drawn: {}", e);
        }
    }

    /// Toggle each LED in turn, waiting `HEARTBEAT_PERIOD_MS` after each.
    pub fn heartbeat(&mut self) {
        for index in 1..=LED_COUNT {
            self.leds.toggle(index);
            self.kernel.delay_ms(HEARTBEAT_PERIOD_MS);
        }
    }

    /// The task body. Never returns.
    pub fn run(mut self, tasks: &'static [TaskConfig]) -> ! {
        self.splash();
        self.start_tasks(tasks);
        loop {
            self.refresh_status();
            self.heartbeat();
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
