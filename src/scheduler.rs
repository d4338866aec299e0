//! # Scheduler
//!
//! Fixed-priority preemptive scheduling for a handful of static tasks.
//! Lower priority numbers run first; among equal priorities the task created
//! first wins.
//!
//! ## Scheduling Algorithm
//!
//! At each SysTick interrupt:
//! 1. **Advance time**: increment the tick counter
//! 2. **Wake sleepers**: every delayed task whose wake tick has arrived
//!    becomes Ready
//! 3. **Preempt**: if the scheduler is not locked and a Ready task outranks
//!    the running one, request a context switch (PendSV)
//!
//! A task gives up the processor voluntarily only through
//! [`Scheduler::delay_current`]. While the scheduler is locked no preemption
//! happens and delaying is refused; time keeps advancing.
//!
//! The scheduler itself is plain data. The Cortex-M port in [`crate::os`]
//! keeps it behind a critical section and drives it from the exception
//! handlers.

use crate::config::{IDLE_PRIORITY, MAX_TASKS, MIN_STACK_SIZE};
use crate::error::KernelError;
use crate::task::{TaskConfig, TaskControlBlock, TaskEntryFn, TaskId, TaskState};

// ---------------------------------------------------------------------------
// Scheduler struct
// ---------------------------------------------------------------------------

/// The central scheduler state.
///
/// ## Design Notes
///
/// - All tasks are stored inline in a fixed-size array (no heap)
/// - `current` is `None` until the first context switch
/// - The idle task is registered like any other task, at the reserved
///   lowest priority, so there is always something runnable
pub struct Scheduler {
    tasks: [TaskControlBlock; MAX_TASKS],
    task_count: usize,
    current: Option<usize>,
    tick_count: u64,
    lock_nesting: u8,
    started: bool,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            tasks: [TaskControlBlock::EMPTY; MAX_TASKS],
            task_count: 0,
            current: None,
            tick_count: 0,
            lock_nesting: 0,
            started: false,
        }
    }

    /// Register an application task.
    ///
    /// # Returns
    /// - `Ok(task_id)`: the index of the newly created task
    /// - `Err(ReservedPriority)`: the priority belongs to the idle task
    /// - `Err(StackTooSmall)` / `Err(TaskTableFull)`
    pub fn create_task(&mut self, config: &TaskConfig) -> Result<TaskId, KernelError> {
        if config.priority >= IDLE_PRIORITY {
            return Err(KernelError::ReservedPriority);
        }
        self.register(config)
    }

    /// Register the idle task, the only one allowed at `IDLE_PRIORITY`.
    pub fn create_idle_task(&mut self, config: &TaskConfig) -> Result<TaskId, KernelError> {
        self.register(config)
    }

    fn register(&mut self, config: &TaskConfig) -> Result<TaskId, KernelError> {
        if config.stack_size() < MIN_STACK_SIZE {
            return Err(KernelError::StackTooSmall);
        }
        if self.task_count >= MAX_TASKS {
            return Err(KernelError::TaskTableFull);
        }

        let id = self.task_count;
        self.tasks[id].init(id, config);

        // Safety: the stack is a 'static `Stack` of at least MIN_STACK_SIZE
        // bytes that no running task owns yet.
        self.tasks[id].stack_pointer = unsafe { init_task_stack(config.stack_top(), config.entry) };

        self.task_count += 1;
        debug!("created {} as {} at priority {}", config.name, TaskId(id), config.priority);
        Ok(TaskId(id))
    }

    /// Mark the scheduler as running. The first context switch picks the
    /// highest-priority ready task.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Called from the SysTick handler every tick.
    ///
    /// Returns `true` if a context switch should be requested.
    pub fn tick(&mut self) -> bool {
        self.tick_count += 1;

        for tcb in self.tasks[..self.task_count].iter_mut() {
            if tcb.state == TaskState::Delayed && tcb.wake_tick <= self.tick_count {
                tcb.state = TaskState::Ready;
            }
        }

        self.preemption_pending()
    }

    /// Put the running task to sleep for `ticks` ticks (at least one).
    ///
    /// The caller must then request a context switch.
    pub fn delay_current(&mut self, ticks: u32) -> Result<(), KernelError> {
        if self.is_locked() {
            return Err(KernelError::SchedulerLocked);
        }
        if let Some(current) = self.current {
            let tcb = &mut self.tasks[current];
            tcb.state = TaskState::Delayed;
            tcb.wake_tick = self.tick_count + u64::from(ticks.max(1));
        }
        Ok(())
    }

    pub fn lock(&mut self) {
        self.lock_nesting = self.lock_nesting.saturating_add(1);
    }

    /// Undo one [`Scheduler::lock`]. Returns `true` if leaving the last level
    /// uncovered a task that should preempt the caller.
    pub fn unlock(&mut self) -> bool {
        self.lock_nesting = self.lock_nesting.saturating_sub(1);
        self.preemption_pending()
    }

    pub fn is_locked(&self) -> bool {
        self.lock_nesting > 0
    }

    /// Whether a ready task outranks the running one and may take over now.
    pub fn preemption_pending(&self) -> bool {
        if !self.started || self.is_locked() {
            return false;
        }
        match (self.highest_ready(), self.current) {
            (Some(next), Some(current)) => {
                next != current || self.tasks[current].state != TaskState::Running
            }
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// The runnable task with the best (lowest) priority number.
    pub fn highest_ready(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, tcb) in self.tasks[..self.task_count].iter().enumerate() {
            if !tcb.is_runnable() {
                continue;
            }
            match best {
                Some(b) if self.tasks[b].priority <= tcb.priority => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Select the next task to run and make it current.
    ///
    /// If nothing is runnable the current task is kept.
    pub fn schedule(&mut self) -> Option<usize> {
        let next = self.highest_ready().or(self.current)?;

        if let Some(prev) = self.current {
            if prev != next && self.tasks[prev].state == TaskState::Running {
                self.tasks[prev].state = TaskState::Ready;
            }
        }
        self.tasks[next].state = TaskState::Running;
        self.current = Some(next);
        Some(next)
    }

    /// Store the stack pointer of the task being switched out.
    pub fn save_context(&mut self, psp: *mut u32) {
        if let Some(current) = self.current {
            self.tasks[current].stack_pointer = psp;
        }
    }

    /// Pick the next task and return the stack pointer to resume it from.
    pub fn switch_context(&mut self) -> *mut u32 {
        match self.schedule() {
            Some(next) => self.tasks[next].stack_pointer,
            None => core::ptr::null_mut(),
        }
    }

    pub fn current_task(&self) -> Option<TaskId> {
        self.current.map(TaskId)
    }

    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.tasks[..self.task_count].get(id.0).map(|tcb| tcb.state)
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn ticks(&self) -> u64 {
        self.tick_count
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Stack initialization helper
// ---------------------------------------------------------------------------

/// Number of words in the initial context frame.
pub const INITIAL_FRAME_WORDS: usize = 16;

/// xPSR with only the Thumb bit set.
pub const INITIAL_XPSR: u32 = 1 << 24;

/// Prepare a task's stack for its first context switch and return the
/// resulting stack pointer.
///
/// The Cortex-M4 hardware pushes an exception frame on interrupt entry. We
/// pre-populate this frame on the task's stack so that the first PendSV
/// "return" starts executing the task function.
///
/// ## Stack Layout (top = high address, growing down)
///
/// ```text
/// [Hardware stacked frame]
///   xPSR  (Thumb bit set)
///   PC    (task entry point)
///   LR    (task_exit)
///   R12   (0)
///   R3    (0)
///   R2    (0)
///   R1    (0)
///   R0    (0)
/// [Software saved context]
///   R11   (0)
///   ...
///   R4    (0)              <- returned stack pointer
/// ```
///
/// # Safety
/// `stack_top` must be one past the end of a writable region of at least
/// `INITIAL_FRAME_WORDS * 4 + 8` bytes that nothing else uses.
pub unsafe fn init_task_stack(stack_top: *mut u32, entry: TaskEntryFn) -> *mut u32 {
    // Align down to 8 bytes (AAPCS)
    let aligned_top = stack_top.wrapping_byte_sub(stack_top as usize & 0x07);
    let frame = aligned_top.wrapping_sub(INITIAL_FRAME_WORDS);

    let words: [u32; INITIAL_FRAME_WORDS] = [
        0, 0, 0, 0, 0, 0, 0, 0, // R4–R11
        0, 0, 0, 0, // R0–R3
        0, // R12
        task_exit as usize as u32, // LR
        entry as usize as u32, // PC
        INITIAL_XPSR,
    ];
    for (i, word) in words.iter().enumerate() {
        // Safety: within the region the caller vouched for.
        unsafe { frame.add(i).write(*word) };
    }

    frame
}

/// Fallback for tasks that return (they can't: entry is `fn() -> !`).
fn task_exit() -> ! {
    error!("task returned from its entry point");
    loop {
        core::hint::spin_loop();
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Stack;

    fn never() -> ! {
        loop {
            core::hint::spin_loop();
        }
    }

    macro_rules! task {
        ($name:literal, $prio:expr) => {{
            static STACK: Stack<512> = Stack::new();
            static CONFIG: TaskConfig = TaskConfig::new($name, never, $prio, &STACK);
            &CONFIG
        }};
    }

    /// Scheduler with idle, a low (20) and a high (4) priority task, started
    /// and switched to the first task.
    fn running_scheduler() -> (Scheduler, TaskId, TaskId, TaskId) {
        let mut s = Scheduler::new();
        let idle = s.create_idle_task(task!("Idle", IDLE_PRIORITY)).unwrap();
        let low = s.create_task(task!("Low", 20)).unwrap();
        let high = s.create_task(task!("High", 4)).unwrap();
        s.start();
        assert!(s.preemption_pending());
        s.switch_context();
        (s, idle, low, high)
    }

    #[test]
    fn test_highest_priority_runs_first() {
        let (s, _, _, high) = running_scheduler();
        assert_eq!(s.current_task(), Some(high));
        assert_eq!(s.state(high), Some(TaskState::Running));
        assert!(!s.preemption_pending());
    }

    #[test]
    fn test_delay_hands_over_to_next_priority() {
        let (mut s, _, low, high) = running_scheduler();
        s.delay_current(3).unwrap();
        assert_eq!(s.state(high), Some(TaskState::Delayed));
        s.switch_context();
        assert_eq!(s.current_task(), Some(low));
    }

    #[test]
    fn test_delayed_task_wakes_and_preempts() {
        let (mut s, _, low, high) = running_scheduler();
        s.delay_current(3).unwrap();
        s.switch_context();

        assert!(!s.tick());
        assert!(!s.tick());
        assert!(s.tick());
        assert_eq!(s.state(high), Some(TaskState::Ready));

        s.switch_context();
        assert_eq!(s.current_task(), Some(high));
        assert_eq!(s.state(low), Some(TaskState::Ready));
    }

    #[test]
    fn test_idle_runs_when_everything_sleeps() {
        let (mut s, idle, _, _) = running_scheduler();
        s.delay_current(10).unwrap();
        s.switch_context();
        s.delay_current(10).unwrap();
        s.switch_context();
        assert_eq!(s.current_task(), Some(idle));
    }

    #[test]
    fn test_lock_defers_preemption() {
        let (mut s, _, low, high) = running_scheduler();
        s.delay_current(1).unwrap();
        s.switch_context();
        assert_eq!(s.current_task(), Some(low));

        s.lock();
        s.lock();
        assert!(!s.tick());
        assert_eq!(s.state(high), Some(TaskState::Ready));
        assert!(!s.unlock());
        assert!(s.unlock());
    }

    #[test]
    fn test_delay_refused_while_locked() {
        let (mut s, _, _, high) = running_scheduler();
        s.lock();
        assert_eq!(s.delay_current(5), Err(KernelError::SchedulerLocked));
        assert_eq!(s.state(high), Some(TaskState::Running));
    }

    #[test]
    fn test_zero_delay_sleeps_one_tick() {
        let (mut s, _, _, high) = running_scheduler();
        s.delay_current(0).unwrap();
        s.switch_context();
        assert!(s.tick());
        assert_eq!(s.state(high), Some(TaskState::Ready));
    }

    #[test]
    fn test_equal_priority_first_created_wins() {
        let mut s = Scheduler::new();
        let first = s.create_task(task!("A", 5)).unwrap();
        s.create_task(task!("B", 5)).unwrap();
        assert_eq!(s.highest_ready(), Some(first.index()));
    }

    #[test]
    fn test_idle_priority_is_reserved() {
        let mut s = Scheduler::new();
        assert_eq!(
            s.create_task(task!("Sneaky", IDLE_PRIORITY)).err(),
            Some(KernelError::ReservedPriority)
        );
        assert_eq!(s.task_count(), 0);
    }

    #[test]
    fn test_small_stack_rejected() {
        static STACK: Stack<32> = Stack::new();
        static CONFIG: TaskConfig = TaskConfig::new("Tiny", never, 3, &STACK);
        let mut s = Scheduler::new();
        assert_eq!(s.create_task(&CONFIG).err(), Some(KernelError::StackTooSmall));
    }

    #[test]
    fn test_task_table_full() {
        let mut s = Scheduler::new();
        let config = task!("Many", 9);
        for _ in 0..MAX_TASKS {
            s.create_task(config).unwrap();
        }
        assert_eq!(s.create_task(config).err(), Some(KernelError::TaskTableFull));
        assert_eq!(s.task_count(), MAX_TASKS);
    }

    #[test]
    fn test_no_preemption_before_start() {
        let mut s = Scheduler::new();
        s.create_task(task!("Early", 4)).unwrap();
        assert!(!s.preemption_pending());
        assert!(!s.tick());
    }

    #[test]
    fn test_initial_stack_frame() {
        static STACK: Stack<256> = Stack::new();
        let sp = unsafe { init_task_stack(STACK.top(), never) };
        assert_eq!(STACK.top() as usize - sp as usize, INITIAL_FRAME_WORDS * 4);

        let frame = unsafe { core::slice::from_raw_parts(sp, INITIAL_FRAME_WORDS) };
        assert!(frame[..13].iter().all(|&w| w == 0));
        assert_eq!(frame[14], never as usize as u32);
        assert_eq!(frame[15], INITIAL_XPSR);
    }

    #[test]
    fn test_context_save_and_restore() {
        let (mut s, _, low, high) = running_scheduler();
        let fake_sp = 0x2000_1000 as *mut u32;
        s.delay_current(1).unwrap();
        s.save_context(fake_sp);
        s.switch_context();
        assert_eq!(s.current_task(), Some(low));

        assert!(s.tick());
        s.save_context(0x2000_2000 as *mut u32);
        assert_eq!(s.switch_context(), fake_sp);
        assert_eq!(s.current_task(), Some(high));
    }
}
