//! # rtpong Firmware
//!
//! Wires the game tasks to the MPS2-AN386 peripherals and starts the kernel.
//!
//! | Task | Priority | Stack | Created by |
//! |------|----------|-------|------------|
//! | `supervisor_task` | 20 | 2 KiB | `main` |
//! | `ball_task` | 4 | 2 KiB | supervisor |
//! | `paddle_left_task` | 5 | 2 KiB | supervisor |
//! | `paddle_right_task` | 6 | 2 KiB | supervisor |
//!
//! `main` only creates the supervisor. The game tasks are created by the
//! supervisor after the splash screen, as one batch with the scheduler
//! locked.
//!
//! Build with `--no-default-features --features firmware` and run under
//! `qemu-system-arm -machine mps2-an386`; the terminal is UART0.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt_semihosting as _;
use panic_halt as _;

use rtpong::ball::BallTask;
use rtpong::board::{FpgaButtons, FpgaLeds, Uart};
use rtpong::config::{
    BALL_PRIORITY, PADDLE_LEFT_PRIORITY, PADDLE_RIGHT_PRIORITY, SUPERVISOR_PRIORITY,
    TASK_STACK_SIZE, UART_BASE,
};
use rtpong::kernel::Kernel;
use rtpong::os::{self, Os, Sleep};
use rtpong::paddle::PaddleTask;
use rtpong::playfield::Side;
use rtpong::screen::Screen;
use rtpong::supervisor::Supervisor;
use rtpong::task::{Stack, TaskConfig};

// ---------------------------------------------------------------------------
// Shared resources
// ---------------------------------------------------------------------------

// Safety: UART0 is driven only through this screen.
static SCREEN: Screen<Uart, Sleep> = Screen::new(unsafe { Uart::new(UART_BASE) });

static BUTTONS: FpgaButtons = FpgaButtons;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

static BALL_STACK: Stack<TASK_STACK_SIZE> = Stack::new();
static PADDLE_LEFT_STACK: Stack<TASK_STACK_SIZE> = Stack::new();
static PADDLE_RIGHT_STACK: Stack<TASK_STACK_SIZE> = Stack::new();
static SUPERVISOR_STACK: Stack<TASK_STACK_SIZE> = Stack::new();

/// The game tasks, in creation order.
static TASKS: [TaskConfig; 3] = [
    TaskConfig::new("Ball", ball_task, BALL_PRIORITY, &BALL_STACK),
    TaskConfig::new(
        "Paddle-Left",
        paddle_left_task,
        PADDLE_LEFT_PRIORITY,
        &PADDLE_LEFT_STACK,
    ),
    TaskConfig::new(
        "Paddle-Right",
        paddle_right_task,
        PADDLE_RIGHT_PRIORITY,
        &PADDLE_RIGHT_STACK,
    ),
];

static SUPERVISOR: TaskConfig = TaskConfig::new(
    "Supervisor",
    supervisor_task,
    SUPERVISOR_PRIORITY,
    &SUPERVISOR_STACK,
);

fn ball_task() -> ! {
    BallTask::new().run(&Os, &SCREEN, &BUTTONS)
}

fn paddle_left_task() -> ! {
    PaddleTask::new(Side::Left).run(&Os, &SCREEN, &BUTTONS)
}

fn paddle_right_task() -> ! {
    PaddleTask::new(Side::Right).run(&Os, &SCREEN, &BUTTONS)
}

fn supervisor_task() -> ! {
    Supervisor::new(&Os, &SCREEN, FpgaLeds).run(&TASKS)
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Bring up the UART, register the supervisor and hand over to the
/// scheduler. Does not return.
#[entry]
fn main() -> ! {
    let cp = cortex_m::Peripherals::take().expect("core peripherals already taken");

    // Safety: runs before any task, so nothing else touches UART0 yet.
    unsafe { Uart::new(UART_BASE) }.enable();

    os::init().expect("failed to initialise kernel");
    Os.create_task(&SUPERVISOR)
        .expect("failed to create supervisor task");

    os::start(cp)
}
