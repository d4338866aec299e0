//! # Cortex-M4 Port Layer
//!
//! Hardware-specific code for the ARM Cortex-M4 (Thumb-2) processor:
//! SysTick configuration, exception priorities and the PendSV context
//! switch.
//!
//! ## Context Switch Mechanism
//!
//! The Cortex-M4 uses a split-stack model:
//! - **MSP** (Main Stack Pointer): used by `main` and exception handlers
//! - **PSP** (Process Stack Pointer): used by tasks in Thread mode
//!
//! On exception entry the hardware stacks R0–R3, R12, LR, PC and xPSR onto
//! the process stack. PendSV pushes R4–R11 below them, hands the resulting
//! stack pointer to the scheduler, and unwinds the next task's stack the same
//! way in reverse.
//!
//! A PSP of zero means no task has run yet; nothing is saved on that first
//! switch.
//!
//! ## Interrupt Priorities
//!
//! SysTick and PendSV both run at 0xFF, the lowest priority, so a context
//! switch never preempts another handler.

use core::arch::naked_asm;

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{SCB, SYST};
use cortex_m_rt::exception;

use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};
use crate::os;

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure SysTick to fire at `TICK_HZ` from the processor clock.
pub fn configure_systick(syst: &mut SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

// ---------------------------------------------------------------------------
// Interrupt priority configuration
// ---------------------------------------------------------------------------

/// Put PendSV and SysTick at the lowest exception priority.
pub fn set_interrupt_priorities(scb: &mut SCB) {
    // Safety: changing system handler priorities cannot break a
    // priority-based critical section; none is in use at start-up.
    unsafe {
        scb.set_priority(SystemHandler::PendSV, 0xFF);
        scb.set_priority(SystemHandler::SysTick, 0xFF);
    }
}

// ---------------------------------------------------------------------------
// PendSV trigger
// ---------------------------------------------------------------------------

/// Request a context switch. Taken as soon as no other handler is active.
#[inline]
pub fn trigger_pendsv() {
    SCB::set_pendsv();
    cortex_m::asm::dsb();
    cortex_m::asm::isb();
}

// ---------------------------------------------------------------------------
// PendSV handler (context switch)
// ---------------------------------------------------------------------------

/// Save the running task, ask the scheduler for the next one, resume it.
///
/// Only R0–R3 and R12 may be touched before R4–R11 have been stored; both
/// helpers are ordinary AAPCS functions and preserve R4–R11 themselves.
#[unsafe(no_mangle)]
#[unsafe(naked)]
unsafe extern "C" fn PendSV() {
    naked_asm!(
        "mrs r0, psp",
        "cbz r0, 1f",
        "stmdb r0!, {{r4-r11}}",
        "bl {save}",
        "1:",
        "bl {next}",
        "ldmia r0!, {{r4-r11}}",
        "msr psp, r0",
        // Thread mode, process stack
        "mov lr, #0xFFFFFFFD",
        "bx lr",
        save = sym os::save_context,
        next = sym os::next_context,
    );
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

#[exception]
fn SysTick() {
    if os::on_tick() {
        trigger_pendsv();
    }
}
