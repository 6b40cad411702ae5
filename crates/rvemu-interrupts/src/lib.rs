//! The core-local interruptor (`Clint`) and the platform-level interrupt controller
//! (`Plic`), as seen through the narrow MMIO surface `xv6` actually drives.

mod clint;
mod plic;

pub use clint::Clint;
pub use plic::Plic;

/// Base address of the CLINT range.
pub const CLINT_BASE: u64 = 0x0200_0000;
/// Size of the CLINT range.
pub const CLINT_SIZE: u64 = 0x1_0000;
/// Last valid CLINT address (inclusive).
pub const CLINT_END: u64 = CLINT_BASE + CLINT_SIZE - 1;

/// `mtimecmp` register offset from [`CLINT_BASE`].
pub const CLINT_MTIMECMP: u64 = CLINT_BASE + 0x4000;
/// `mtime` register offset from [`CLINT_BASE`].
pub const CLINT_MTIME: u64 = CLINT_BASE + 0xbff8;

/// Base address of the PLIC range.
pub const PLIC_BASE: u64 = 0x0C00_0000;
/// Size of the PLIC range.
pub const PLIC_SIZE: u64 = 0x0400_0000;
/// Last valid PLIC address (inclusive).
pub const PLIC_END: u64 = PLIC_BASE + PLIC_SIZE - 1;

/// Interrupt-pending bitmap.
pub const PLIC_PENDING: u64 = PLIC_BASE + 0x1000;
/// Supervisor interrupt-enable bitmap.
pub const PLIC_SENABLE: u64 = PLIC_BASE + 0x2000;
/// Supervisor priority threshold.
pub const PLIC_SPRIORITY: u64 = PLIC_BASE + 0x20_1000;
/// Supervisor claim/complete register.
pub const PLIC_SCLAIM: u64 = PLIC_BASE + 0x20_1004;

/// The IRQ line the UART is wired to on the PLIC.
pub const UART_IRQ: u64 = 10;
/// The IRQ line the VirtIO block device is wired to on the PLIC.
pub const VIRTIO_IRQ: u64 = 1;
