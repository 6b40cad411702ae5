use rvemu_core::{Device, Exception};

use crate::{CLINT_MTIME, CLINT_MTIMECMP};

/// Two 64-bit cells, `mtime` and `mtimecmp`. `mtime` is not auto-incremented: no software
/// this emulator targets needs a timer-interrupt source, but the registers must round-trip.
#[derive(Debug, Default)]
pub struct Clint {
    mtime: u64,
    mtimecmp: u64,
}

impl Clint {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Device for Clint {
    fn load(&mut self, addr: u64, size: u64) -> Result<u64, Exception> {
        if size != 64 {
            return Err(Exception::LoadAccessFault(addr));
        }
        match addr {
            CLINT_MTIMECMP => Ok(self.mtimecmp),
            CLINT_MTIME => Ok(self.mtime),
            _ => Err(Exception::LoadAccessFault(addr)),
        }
    }

    fn store(&mut self, addr: u64, size: u64, value: u64) -> Result<(), Exception> {
        if size != 64 {
            return Err(Exception::StoreAmoAccessFault(addr));
        }
        match addr {
            CLINT_MTIMECMP => {
                self.mtimecmp = value;
                Ok(())
            }
            CLINT_MTIME => {
                self.mtime = value;
                Ok(())
            }
            _ => Err(Exception::StoreAmoAccessFault(addr)),
        }
    }
}
