//! Flat system RAM (`Dram`) and the address-range dispatcher (`Bus`) that routes a hart's
//! loads and stores to it or to one of the MMIO peripherals.

mod bus;
mod dram;

pub use bus::Bus;
pub use dram::Dram;

/// The address DRAM starts at, matching QEMU's `virt` machine.
pub const DRAM_BASE: u64 = 0x8000_0000;
/// 128 MiB of guest RAM.
pub const DRAM_SIZE: u64 = 1024 * 1024 * 128;
/// The last valid DRAM address (inclusive).
pub const DRAM_END: u64 = DRAM_BASE + DRAM_SIZE - 1;
