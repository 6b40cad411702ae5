//! Shared vocabulary for the RISC-V emulator workspace: privilege modes, the
//! exception/interrupt taxonomy, and the `Device` contract every MMIO peripheral
//! implements. This crate has no I/O and no concurrency of its own; it exists so that
//! `rvemu-mem`, `rvemu-interrupts`, `rvemu-devices`, and `rvemu-cpu` can all speak the
//! same trap language without depending on each other.

mod device;
mod exception;
mod interrupt;
mod mode;
mod trap;

pub use device::Device;
pub use exception::Exception;
pub use interrupt::Interrupt;
pub use mode::Mode;
pub use trap::Trap;
