//! # Task Model
//!
//! Static task descriptors, their stacks, and the control block the
//! scheduler keeps per task. Everything here is statically allocated: a
//! [`TaskConfig`] is built in `const` context over a `'static` [`Stack`], and
//! the control blocks live in a fixed-size array inside the scheduler.

use core::cell::UnsafeCell;
use core::fmt;

/// Task entry point. Tasks never return.
pub type TaskEntryFn = fn() -> !;

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

/// A task stack of `LEN` bytes.
///
/// Aligned on 8 bytes as required by AAPCS. `LEN` must be a multiple of 8,
/// which is checked at compile time.
#[repr(align(8))]
pub struct Stack<const LEN: usize> {
    contents: UnsafeCell<[u8; LEN]>,
}

impl<const LEN: usize> Stack<LEN> {
    pub const fn new() -> Self {
        assert!(LEN % 8 == 0);
        Self {
            contents: UnsafeCell::new([0u8; LEN]),
        }
    }

    /// One past the highest address; the stack grows down from here.
    pub const fn top(&self) -> *mut u32 {
        // Safety: pointing one past the object is allowed, and a full
        // descending stack never writes at `top` itself.
        unsafe { self.contents.get().add(1) as *mut u32 }
    }

    pub const fn len(&self) -> usize {
        LEN
    }

    pub const fn is_empty(&self) -> bool {
        LEN == 0
    }
}

// Safety: a Stack only hands out raw pointers to itself. The memory is used by
// exactly one task, through the kernel.
unsafe impl<const LEN: usize> Sync for Stack<LEN> {}

impl<const LEN: usize> Default for Stack<LEN> {
    fn default() -> Self {
        Stack::new()
    }
}

// ---------------------------------------------------------------------------
// Task configuration (immutable)
// ---------------------------------------------------------------------------

/// Everything needed to create a task: name, entry point, fixed priority
/// (lower number = higher priority) and its statically reserved stack.
pub struct TaskConfig {
    pub name: &'static str,
    pub entry: TaskEntryFn,
    pub priority: u8,
    stack_top: *mut u32,
    stack_size: usize,
}

// Safety: the stack pointer is only dereferenced by the kernel when the task
// is created, inside its critical section.
unsafe impl Sync for TaskConfig {}

impl TaskConfig {
    pub const fn new<const N: usize>(
        name: &'static str,
        entry: TaskEntryFn,
        priority: u8,
        stack: &'static Stack<N>,
    ) -> Self {
        Self {
            name,
            entry,
            priority,
            stack_top: stack.top(),
            stack_size: N,
        }
    }

    pub const fn stack_top(&self) -> *mut u32 {
        self.stack_top
    }

    pub const fn stack_size(&self) -> usize {
        self.stack_size
    }
}

// ---------------------------------------------------------------------------
// Task identity and state
// ---------------------------------------------------------------------------

/// Index of a task in the scheduler's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "T{:03}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "T{=usize:03}", self.0);
    }
}

/// Execution state of a task.
///
/// ```text
///   ┌──────────┐     schedule()      ┌─────────┐
///   │  Ready   │ ──────────────────► │ Running │
///   └──────────┘ ◄────────────────── └─────────┘
///        ▲             preempt            │
///        │                                │ delay()
///        │         tick() >= wake        ▼
///        │                          ┌──────────┐
///        └───────────────────────── │ Delayed  │
///                                   └──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Free slot.
    Dormant,
    /// Runnable, waiting for the processor.
    Ready,
    /// Currently executing.
    Running,
    /// Sleeping until the tick count reaches its wake tick.
    Delayed,
}

// ---------------------------------------------------------------------------
// Task Control Block
// ---------------------------------------------------------------------------

/// Per-task scheduler state.
pub struct TaskControlBlock {
    pub id: usize,
    pub name: &'static str,
    pub priority: u8,
    pub state: TaskState,
    /// Tick at which a delayed task becomes ready again.
    pub wake_tick: u64,
    /// Saved process stack pointer. Updated on every context switch.
    pub stack_pointer: *mut u32,
}

// Safety: `stack_pointer` points into the task's own static stack and is only
// touched by the scheduler inside critical sections.
unsafe impl Send for TaskControlBlock {}

impl TaskControlBlock {
    /// An unallocated slot. Used to initialize the static array.
    pub const EMPTY: TaskControlBlock = TaskControlBlock {
        id: 0,
        name: "",
        priority: u8::MAX,
        state: TaskState::Dormant,
        wake_tick: 0,
        stack_pointer: core::ptr::null_mut(),
    };

    /// Take over a slot for a new task, ready to run. The stack frame is
    /// prepared separately by the scheduler.
    pub fn init(&mut self, id: usize, config: &TaskConfig) {
        self.id = id;
        self.name = config.name;
        self.priority = config.priority;
        self.state = TaskState::Ready;
        self.wake_tick = 0;
    }

    /// Ready or already running.
    #[inline]
    pub fn is_runnable(&self) -> bool {
        matches!(self.state, TaskState::Ready | TaskState::Running)
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn never() -> ! {
        loop {
            core::hint::spin_loop();
        }
    }

    static STACK: Stack<512> = Stack::new();
    static CONFIG: TaskConfig = TaskConfig::new("Ball", never, 4, &STACK);

    #[test]
    fn test_tcb_initialization() {
        let mut tcb = TaskControlBlock::EMPTY;
        assert_eq!(tcb.state, TaskState::Dormant);
        assert!(!tcb.is_runnable());

        tcb.init(2, &CONFIG);
        assert_eq!(tcb.id, 2);
        assert_eq!(tcb.name, "Ball");
        assert_eq!(tcb.priority, 4);
        assert_eq!(tcb.state, TaskState::Ready);
        assert!(tcb.is_runnable());
    }

    #[test]
    fn test_stack_top_is_one_past_the_end() {
        let top = STACK.top() as usize;
        let base = &STACK as *const Stack<512> as usize;
        assert_eq!(top - base, 512);
        assert_eq!(top % 8, 0);
    }

    #[test]
    fn test_config_records_stack() {
        assert_eq!(CONFIG.stack_size(), 512);
        assert_eq!(CONFIG.stack_top(), STACK.top());
    }

    #[test]
    fn test_task_id_display() {
        assert_eq!(TaskId(7).to_string(), "T007");
    }
}
