//! # Kernel
//!
//! The scheduling services the application is written against. The game
//! tasks and the supervisor only ever see this trait; the firmware backs it
//! with the fixed-priority scheduler in [`crate::os`], the tests with
//! recording mocks.
//!
//! ## Startup Sequence (firmware)
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► os::init()          ← Reset scheduler, register idle task
//!         ├─► Os.create_task()    ← Register the supervisor
//!         └─► os::start()         ← Launch scheduler (no return)
//!               └─► supervisor
//!                     ├─► splash screen
//!                     ├─► lock_scheduler()
//!                     ├─► create_task() ×3  ← Ball, Paddle-Left, Paddle-Right
//!                     ├─► unlock_scheduler() ← Ball preempts from here on
//!                     └─► status + heartbeat loop
//! ```

use crate::config::TICK_HZ;
use crate::error::KernelError;
use crate::task::{TaskConfig, TaskId};

/// Task creation, timing and scheduler locking.
pub trait Kernel {
    /// Register a task. Once the scheduler runs, a task with higher priority
    /// than the caller starts immediately unless the scheduler is locked.
    fn create_task(&self, config: &'static TaskConfig) -> Result<TaskId, KernelError>;

    /// Suspend the calling task for at least `ms` milliseconds. This is the
    /// only point at which a task gives up the processor.
    fn delay_ms(&self, ms: u32);

    /// Stop preemption until the matching [`Kernel::unlock_scheduler`].
    /// Calls nest.
    fn lock_scheduler(&self);

    fn unlock_scheduler(&self);

    /// Number of registered tasks, idle task included.
    fn task_count(&self) -> usize;

    /// Ticks since the scheduler started.
    fn uptime_ticks(&self) -> u64;
}

/// Convert a delay to kernel ticks, rounding up. Never returns zero, so every
/// delay yields the processor for at least one tick.
pub const fn ms_to_ticks(ms: u32) -> u32 {
    let ticks = (ms as u64 * TICK_HZ as u64).div_ceil(1000);
    if ticks == 0 {
        1
    } else if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Convert ticks back to whole seconds.
pub const fn ticks_to_secs(ticks: u64) -> u64 {
    ticks / TICK_HZ as u64
}
