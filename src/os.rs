//! # Kernel Port
//!
//! Runs the [`Scheduler`] on the processor. The scheduler lives in a single
//! static behind a `critical_section::Mutex`; task code, SysTick and PendSV
//! all reach it through [`with_scheduler`].
//!
//! [`Os`] is the [`Kernel`] the application tasks are handed, and [`Sleep`]
//! is the screen-lock backoff that yields for one tick instead of spinning,
//! so a low-priority task holding the screen gets to finish its draw.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::arch;
use crate::config::{IDLE_PRIORITY, IDLE_STACK_SIZE};
use crate::error::KernelError;
use crate::kernel::{ms_to_ticks, Kernel};
use crate::scheduler::Scheduler;
use crate::sync::Backoff;
use crate::task::{Stack, TaskConfig, TaskId};

static SCHEDULER: Mutex<RefCell<Scheduler>> = Mutex::new(RefCell::new(Scheduler::new()));

static IDLE_STACK: Stack<IDLE_STACK_SIZE> = Stack::new();
static IDLE_TASK: TaskConfig = TaskConfig::new("Idle", idle, IDLE_PRIORITY, &IDLE_STACK);

fn idle() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

fn with_scheduler<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    critical_section::with(|cs| f(&mut SCHEDULER.borrow_ref_mut(cs)))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Reset the scheduler and register the idle task. Call once from `main`
/// before creating any task.
pub fn init() -> Result<(), KernelError> {
    with_scheduler(|scheduler| {
        *scheduler = Scheduler::new();
        scheduler.create_idle_task(&IDLE_TASK).map(|_| ())
    })?;
    info!("kernel initialised");
    Ok(())
}

/// Start ticking and switch to the highest-priority task. Never returns:
/// the first PendSV abandons the main stack.
pub fn start(mut cp: cortex_m::Peripherals) -> ! {
    arch::set_interrupt_priorities(&mut cp.SCB);
    // Safety: no task has run yet; a zero PSP tells PendSV there is nothing
    // to save.
    unsafe { cortex_m::register::psp::write(0) };
    arch::configure_systick(&mut cp.SYST);

    let tasks = with_scheduler(|scheduler| {
        scheduler.start();
        scheduler.task_count()
    });
    info!("scheduler started with {} tasks", tasks);

    arch::trigger_pendsv();
    loop {
        cortex_m::asm::wfi();
    }
}

/// Suspend the calling task for `ticks` ticks.
pub fn delay_ticks(ticks: u32) -> Result<(), KernelError> {
    with_scheduler(|scheduler| scheduler.delay_current(ticks))?;
    arch::trigger_pendsv();
    Ok(())
}

// ---------------------------------------------------------------------------
// Kernel services
// ---------------------------------------------------------------------------

/// The kernel as seen by tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Os;

impl Kernel for Os {
    fn create_task(&self, config: &'static TaskConfig) -> Result<TaskId, KernelError> {
        let (id, preempt) = with_scheduler(|scheduler| {
            scheduler
                .create_task(config)
                .map(|id| (id, scheduler.preemption_pending()))
        })?;
        if preempt {
            arch::trigger_pendsv();
        }
        Ok(id)
    }

    fn delay_ms(&self, ms: u32) {
        if let Err(e) = delay_ticks(ms_to_ticks(ms)) {
            warn!("delay of {} ms refused: {}", ms, e);
        }
    }

    fn lock_scheduler(&self) {
        with_scheduler(Scheduler::lock);
    }

    fn unlock_scheduler(&self) {
        if with_scheduler(Scheduler::unlock) {
            arch::trigger_pendsv();
        }
    }

    fn task_count(&self) -> usize {
        with_scheduler(|scheduler| scheduler.task_count())
    }

    fn uptime_ticks(&self) -> u64 {
        with_scheduler(|scheduler| scheduler.ticks())
    }
}

/// Screen-lock backoff for the firmware: give up the processor for a tick.
pub struct Sleep;

impl Backoff for Sleep {
    fn backoff() {
        // Refused while the scheduler is locked; spin instead.
        if delay_ticks(1).is_err() {
            core::hint::spin_loop();
        }
    }
}

// ---------------------------------------------------------------------------
// Exception entry points
// ---------------------------------------------------------------------------

/// Record the stack pointer of the task being switched out. Called from
/// PendSV with R4–R11 already stacked.
pub(crate) extern "C" fn save_context(psp: *mut u32) {
    with_scheduler(|scheduler| scheduler.save_context(psp));
}

/// Pick the next task and return its saved stack pointer. Called from PendSV.
pub(crate) extern "C" fn next_context() -> *mut u32 {
    with_scheduler(Scheduler::switch_context)
}

/// Advance time by one tick. Returns whether PendSV should be pended.
pub(crate) fn on_tick() -> bool {
    with_scheduler(Scheduler::tick)
}
