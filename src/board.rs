//! # MPS2-AN386 Board Support
//!
//! The three peripherals the game touches, as memory-mapped registers:
//!
//! | Peripheral   | Base          | Used as                          |
//! |--------------|---------------|----------------------------------|
//! | CMSDK UART0  | `0x4000_4000` | [`Terminal`] for the VT100 stream |
//! | FPGA-IO LEDs | `0x4002_8000` | [`StatusLed`] heartbeat          |
//! | FPGA-IO keys | `0x4002_8008` | [`Buttons`] for the paddles      |
//!
//! All register access is volatile and polled; no interrupts are used.

use core::ptr;

use crate::config::{
    FPGAIO_BASE, LEFT_DOWN_MASK, LEFT_UP_MASK, RIGHT_DOWN_MASK, RIGHT_UP_MASK, SYSTEM_CLOCK_HZ,
    UART_BAUD,
};
use crate::input::{ButtonState, Buttons};
use crate::screen::Terminal;
use crate::supervisor::StatusLed;

// ---------------------------------------------------------------------------
// UART
// ---------------------------------------------------------------------------

const UART_DATA: usize = 0x00;
const UART_STATE: usize = 0x04;
const UART_CTRL: usize = 0x08;
const UART_BAUDDIV: usize = 0x10;

const UART_STATE_TX_FULL: u32 = 1 << 0;
const UART_CTRL_TX_ENABLE: u32 = 1 << 0;

/// Transmit side of a CMSDK APB UART.
pub struct Uart {
    base: usize,
}

impl Uart {
    /// # Safety
    /// `base` must be the address of a CMSDK UART that nothing else drives.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Program the baud divider and enable the transmitter.
    pub fn enable(&mut self) {
        self.write(UART_BAUDDIV, SYSTEM_CLOCK_HZ / UART_BAUD);
        self.write(UART_CTRL, UART_CTRL_TX_ENABLE);
    }

    fn read(&self, offset: usize) -> u32 {
        // Safety: in-range register of the UART this instance owns.
        unsafe { ptr::read_volatile((self.base + offset) as *const u32) }
    }

    fn write(&mut self, offset: usize, value: u32) {
        // Safety: as for `read`.
        unsafe { ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}

impl Terminal for Uart {
    fn write_byte(&mut self, byte: u8) {
        while self.read(UART_STATE) & UART_STATE_TX_FULL != 0 {
            core::hint::spin_loop();
        }
        self.write(UART_DATA, u32::from(byte));
    }
}

// ---------------------------------------------------------------------------
// FPGA-IO
// ---------------------------------------------------------------------------

const FPGAIO_LED: usize = 0x00;
const FPGAIO_BUTTON: usize = 0x08;

fn fpgaio(offset: usize) -> *mut u32 {
    (FPGAIO_BASE + offset) as *mut u32
}

/// The four push buttons, active high.
#[derive(Debug, Default)]
pub struct FpgaButtons;

impl Buttons for FpgaButtons {
    fn read(&self) -> ButtonState {
        // Safety: read-only status register.
        let bits = unsafe { ptr::read_volatile(fpgaio(FPGAIO_BUTTON)) };
        ButtonState {
            left_up: bits & LEFT_UP_MASK != 0,
            left_down: bits & LEFT_DOWN_MASK != 0,
            right_up: bits & RIGHT_UP_MASK != 0,
            right_down: bits & RIGHT_DOWN_MASK != 0,
        }
    }
}

/// The user LEDs. LED `n` is bit `n - 1`; the image only wires the low
/// bits, the rest read back as written.
#[derive(Debug, Default)]
pub struct FpgaLeds;

impl StatusLed for FpgaLeds {
    fn toggle(&mut self, index: u8) {
        let Some(bit) = index.checked_sub(1).filter(|bit| *bit < 32) else {
            return;
        };
        // Safety: only the supervisor owns the LED register.
        unsafe {
            let leds = ptr::read_volatile(fpgaio(FPGAIO_LED));
            ptr::write_volatile(fpgaio(FPGAIO_LED), leds ^ (1 << bit));
        }
    }
}
