//! # rtpong: Multitasking Terminal Pong
//!
//! A ball and two paddles drawn on a VT100 terminal by independent tasks
//! under a preemptive fixed-priority kernel for ARM Cortex-M4.
//!
//! ## Overview
//!
//! Every moving object is its own task. The tasks never talk to each other:
//! they only share the terminal, and the renderer serialises their writes so
//! that each cursor move stays glued to the glyph drawn after it.
//!
//! | Task         | Priority | Period  | Job                                |
//! |--------------|----------|---------|------------------------------------|
//! | Ball         | 4        | 75 ms   | Erase, steer, move, draw `*`       |
//! | Paddle-Left  | 5        | 75 ms   | Erase, move, draw six `\|` cells   |
//! | Paddle-Right | 6        | 75 ms   | Same for the right side            |
//! | Supervisor   | 20       | 500 ms  | Splash, task start, status, LEDs   |
//! | Idle         | 63       | -       | `wfi`                              |
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │   Ball · Paddle ×2 · Supervisor  (ball, paddle,        │
//! │                                   supervisor)          │
//! ├──────────────────────────┬─────────────────────────────┤
//! │  Renderer (screen.rs)    │  Input (input.rs)           │
//! │  ─ ScreenLock (sync.rs)  │  ─ steering / paddle moves  │
//! ├──────────────────────────┴─────────────────────────────┤
//! │           Kernel trait (kernel.rs)                     │
//! ├────────────────────────────────────────────────────────┤
//! │   Scheduler (scheduler.rs) · Task model (task.rs)      │
//! ├────────────────────────────────────────────────────────┤
//! │   Kernel port (os.rs) · Arch port (arch/cortex_m4.rs)  │
//! │   Board support (board.rs): UART, buttons, LEDs        │
//! ├────────────────────────────────────────────────────────┤
//! │         ARM Cortex-M4 Hardware (MPS2-AN386)            │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything above the kernel port is plain `core` code and is tested on
//! the host; the port, the arch layer and the board support are only built
//! for bare-metal ARM.
//!
//! ## Memory Model
//!
//! - **No heap**: all state is statically allocated
//! - **Fixed-size TCB array**: `[TaskControlBlock; MAX_TASKS]`
//! - **Per-task stacks**: `Stack<N>` statics referenced from `TaskConfig`
//! - **Critical sections**: `critical_section::with` around the scheduler

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod config;
pub mod error;
pub mod sync;
pub mod screen;
pub mod playfield;
pub mod input;
pub mod task;
pub mod scheduler;
pub mod kernel;
pub mod ball;
pub mod paddle;
pub mod supervisor;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod arch;
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod board;
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod os;
