//! # Errors
//!
//! The two error kinds the system models. Neither is ever retried: the game
//! tasks drop failed draws, and the supervisor reports failed task creation
//! and carries on.

use core::fmt;

/// Renderer failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenError {
    /// The requested cell lies outside the screen. Nothing was written.
    OutOfBounds { x: i32, y: i32 },
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenError::OutOfBounds { x, y } => {
                write!(f, "cell ({}, {}) is outside the screen", x, y)
            }
        }
    }
}

/// Kernel failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KernelError {
    /// All `MAX_TASKS` control blocks are in use.
    TaskTableFull,
    /// The task's stack cannot hold the initial context frame.
    StackTooSmall,
    /// The priority is reserved for the idle task.
    ReservedPriority,
    /// The operation would block while the scheduler is locked.
    SchedulerLocked,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            KernelError::TaskTableFull => "task table full",
            KernelError::StackTooSmall => "stack too small",
            KernelError::ReservedPriority => "priority reserved for idle task",
            KernelError::SchedulerLocked => "scheduler locked",
        };
        f.write_str(msg)
    }
}
