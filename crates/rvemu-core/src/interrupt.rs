use crate::trap::Trap;

/// The interrupt-pending bit (bit 63) that distinguishes interrupt causes from exception
/// causes in `xCAUSE`.
pub const MASK_INTERRUPT_BIT: u64 = 1 << 63;

/// An asynchronous interrupt. The exception code alone (without `MASK_INTERRUPT_BIT`)
/// matches the corresponding bit position in `mip`/`mie`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    SupervisorSoftware,
    MachineSoftware,
    SupervisorTimer,
    MachineTimer,
    SupervisorExternal,
    MachineExternal,
}

impl Interrupt {
    /// The bit position of this interrupt in `mip`/`mie`/`mideleg` (no interrupt-bit tag).
    pub fn bit(self) -> u64 {
        match self {
            Interrupt::SupervisorSoftware => 1,
            Interrupt::MachineSoftware => 3,
            Interrupt::SupervisorTimer => 5,
            Interrupt::MachineTimer => 7,
            Interrupt::SupervisorExternal => 9,
            Interrupt::MachineExternal => 11,
        }
    }

    /// The full `xCAUSE` encoding for this interrupt, with the interrupt bit set.
    pub fn code(self) -> u64 {
        self.bit() | MASK_INTERRUPT_BIT
    }
}

impl Trap for Interrupt {
    fn cause(&self) -> u64 {
        self.code()
    }

    fn value(&self) -> u64 {
        0
    }

    fn is_fatal(&self) -> bool {
        false
    }

    fn is_interrupt(&self) -> bool {
        true
    }
}
