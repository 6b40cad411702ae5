use crate::trap::Trap;

/// A synchronous exception, tagged with the value the trap handler records in `xTVAL`
/// (the faulting address, the raw instruction word, or the faulting PC, depending on kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    InstructionAddrMisaligned(u64),
    InstructionAccessFault(u64),
    IllegalInstruction(u64),
    Breakpoint(u64),
    LoadAddrMisaligned(u64),
    LoadAccessFault(u64),
    StoreAmoAddrMisaligned(u64),
    StoreAmoAccessFault(u64),
    EnvironmentCallFromUMode(u64),
    EnvironmentCallFromSMode(u64),
    EnvironmentCallFromMMode(u64),
    InstructionPageFault(u64),
    LoadPageFault(u64),
    StoreAmoPageFault(u64),
}

impl Exception {
    /// The RISC-V exception code (the value that lands in `xCAUSE`, bit 63 clear).
    pub fn code(self) -> u64 {
        match self {
            Exception::InstructionAddrMisaligned(_) => 0,
            Exception::InstructionAccessFault(_) => 1,
            Exception::IllegalInstruction(_) => 2,
            Exception::Breakpoint(_) => 3,
            Exception::LoadAddrMisaligned(_) => 4,
            Exception::LoadAccessFault(_) => 5,
            Exception::StoreAmoAddrMisaligned(_) => 6,
            Exception::StoreAmoAccessFault(_) => 7,
            Exception::EnvironmentCallFromUMode(_) => 8,
            Exception::EnvironmentCallFromSMode(_) => 9,
            Exception::EnvironmentCallFromMMode(_) => 11,
            Exception::InstructionPageFault(_) => 12,
            Exception::LoadPageFault(_) => 13,
            Exception::StoreAmoPageFault(_) => 15,
        }
    }
}

impl Trap for Exception {
    fn cause(&self) -> u64 {
        self.code()
    }

    fn value(&self) -> u64 {
        match *self {
            Exception::InstructionAddrMisaligned(v)
            | Exception::InstructionAccessFault(v)
            | Exception::IllegalInstruction(v)
            | Exception::Breakpoint(v)
            | Exception::LoadAddrMisaligned(v)
            | Exception::LoadAccessFault(v)
            | Exception::StoreAmoAddrMisaligned(v)
            | Exception::StoreAmoAccessFault(v)
            | Exception::EnvironmentCallFromUMode(v)
            | Exception::EnvironmentCallFromSMode(v)
            | Exception::EnvironmentCallFromMMode(v)
            | Exception::InstructionPageFault(v)
            | Exception::LoadPageFault(v)
            | Exception::StoreAmoPageFault(v) => v,
        }
    }

    fn is_fatal(&self) -> bool {
        matches!(
            self,
            Exception::InstructionAddrMisaligned(_)
                | Exception::InstructionAccessFault(_)
                | Exception::IllegalInstruction(_)
                | Exception::LoadAccessFault(_)
                | Exception::StoreAmoAddrMisaligned(_)
                | Exception::StoreAmoAccessFault(_)
        )
    }

    fn is_interrupt(&self) -> bool {
        false
    }
}
