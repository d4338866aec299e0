//! # Configuration
//!
//! Compile-time constants governing the playfield, the game tasks, the kernel
//! and the board. All limits are fixed at compile time. No dynamic
//! allocation, nothing is configurable at runtime.

// ---------------------------------------------------------------------------
// Screen geometry
// ---------------------------------------------------------------------------

/// First drawable column.
pub const SCREEN_X_START: i32 = 1;

/// Last drawable column. Cursor addressing uses exactly two decimal digits,
/// so this must stay below 100.
pub const SCREEN_X_END: i32 = 80;

/// First drawable row.
pub const SCREEN_Y_START: i32 = 1;

/// Last drawable row. Same two-digit limit as [`SCREEN_X_END`].
pub const SCREEN_Y_END: i32 = 25;

// ---------------------------------------------------------------------------
// Playfield
// ---------------------------------------------------------------------------

/// Column of the left paddle.
pub const PADDLE_LEFT_X: i32 = 2;

/// Column of the right paddle.
pub const PADDLE_RIGHT_X: i32 = SCREEN_X_END - 2;

/// Row of the top cell of both paddles at start-up.
pub const PADDLE_Y_START: i32 = 10;

/// Number of cells in a paddle.
pub const PADDLE_LENGTH: i32 = 6;

/// Lowest row the top of a paddle may reach while keeping the whole paddle
/// on-screen.
pub const PADDLE_Y_MAX: i32 = SCREEN_Y_END - PADDLE_LENGTH + 1;

/// Ball start column (screen centre).
pub const BALL_X_START: i32 = SCREEN_X_END / 2;

/// Ball start row (screen centre).
pub const BALL_Y_START: i32 = SCREEN_Y_END / 2;

/// Glyph drawn for the ball.
pub const BALL_GLYPH: u8 = b'*';

/// Glyph drawn for each paddle cell.
pub const PADDLE_GLYPH: u8 = b'|';

/// Glyph used to erase.
pub const BLANK_GLYPH: u8 = b' ';

// ---------------------------------------------------------------------------
// Supervisor layout
// ---------------------------------------------------------------------------

/// Splash banner position.
pub const BANNER_X: i32 = 8;
pub const BANNER_Y: i32 = 8;

/// Status block column and rows.
pub const STATUS_X: i32 = 40;
pub const STATUS_TASKS_Y: i32 = 2;
pub const STATUS_UPTIME_Y: i32 = 3;

/// Whether the supervisor refreshes the status block at all.
pub const STATUS_ENABLED: bool = true;

/// Row used for task-creation diagnostics.
pub const DIAGNOSTIC_Y: i32 = SCREEN_Y_END;

/// Number of heartbeat LEDs toggled in turn by the supervisor.
pub const LED_COUNT: u8 = 8;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------

/// Ball task period.
pub const BALL_PERIOD_MS: u32 = 75;

/// Paddle task period.
pub const PADDLE_PERIOD_MS: u32 = 75;

/// Delay after each LED toggle in the supervisor loop.
pub const HEARTBEAT_PERIOD_MS: u32 = 500;

/// How long each splash phase stays on screen.
pub const SPLASH_MS: u32 = 2000;

// ---------------------------------------------------------------------------
// Task priorities (lower number = higher priority)
// ---------------------------------------------------------------------------

pub const BALL_PRIORITY: u8 = 4;
pub const PADDLE_LEFT_PRIORITY: u8 = 5;
pub const PADDLE_RIGHT_PRIORITY: u8 = 6;
pub const SUPERVISOR_PRIORITY: u8 = 20;

/// Reserved for the kernel's idle task; application tasks may not use it.
pub const IDLE_PRIORITY: u8 = 63;

// ---------------------------------------------------------------------------
// Kernel
// ---------------------------------------------------------------------------

/// Maximum number of tasks, idle task included. Bounds the static TCB array.
pub const MAX_TASKS: usize = 8;

/// SysTick frequency in Hz. Determines delay granularity.
pub const TICK_HZ: u32 = 1000;

/// Per-task stack size in bytes for the game tasks and the supervisor.
pub const TASK_STACK_SIZE: usize = 2048;

/// Stack size of the idle task, which only ever executes `wfi`.
pub const IDLE_STACK_SIZE: usize = 256;

/// Smallest stack the kernel accepts: the 16-word initial frame plus
/// headroom for the first call.
pub const MIN_STACK_SIZE: usize = 16 * 4 + 8;

/// Processor clock of the MPS2-AN386 FPGA image.
pub const SYSTEM_CLOCK_HZ: u32 = 25_000_000;

// ---------------------------------------------------------------------------
// Board (MPS2-AN386)
// ---------------------------------------------------------------------------

/// CMSDK APB UART0 base address; the terminal is attached here.
pub const UART_BASE: usize = 0x4000_4000;

/// UART baud rate.
pub const UART_BAUD: u32 = 115_200;

/// FPGA-IO block; LEDs at offset 0x00, buttons at offset 0x08.
pub const FPGAIO_BASE: usize = 0x4002_8000;

/// Button bits in the FPGA-IO button register.
pub const RIGHT_UP_MASK: u32 = 1 << 0;
pub const RIGHT_DOWN_MASK: u32 = 1 << 1;
pub const LEFT_UP_MASK: u32 = 1 << 2;
pub const LEFT_DOWN_MASK: u32 = 1 << 3;

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

const _: () = assert!(SCREEN_X_END < 100 && SCREEN_Y_END < 100);
const _: () = assert!(SCREEN_X_START >= 0 && SCREEN_Y_START >= 0);
const _: () = assert!(PADDLE_Y_MAX >= SCREEN_Y_START);
const _: () = assert!(PADDLE_Y_START >= SCREEN_Y_START && PADDLE_Y_START <= PADDLE_Y_MAX);
const _: () = assert!(BALL_PRIORITY < PADDLE_LEFT_PRIORITY);
const _: () = assert!(PADDLE_LEFT_PRIORITY < PADDLE_RIGHT_PRIORITY);
const _: () = assert!(PADDLE_RIGHT_PRIORITY < SUPERVISOR_PRIORITY);
const _: () = assert!(SUPERVISOR_PRIORITY < IDLE_PRIORITY);
const _: () = assert!(TASK_STACK_SIZE >= MIN_STACK_SIZE && IDLE_STACK_SIZE >= MIN_STACK_SIZE);
