//! # Architecture Abstraction Layer
//!
//! Processor-specific support for the kernel. Only the Cortex-M4 port
//! exists; it is compiled for bare-metal ARM targets only.

pub mod cortex_m4;

pub use cortex_m4::{configure_systick, set_interrupt_priorities, trigger_pendsv};
