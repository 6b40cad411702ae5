use rvemu_core::{Device, Exception};

use crate::{PLIC_PENDING, PLIC_SCLAIM, PLIC_SENABLE, PLIC_SPRIORITY};

/// The slice of the PLIC that `xv6` actually drives: one pending bitmap, one supervisor
/// enable bitmap, a priority threshold, and the claim/complete register. Real PLICs have a
/// priority register per interrupt source and enable/pending bitmaps per context; this model
/// collapses all of that down to the four registers the kernel touches.
#[derive(Debug, Default)]
pub struct Plic {
    pending: u64,
    senable: u64,
    spriority: u64,
    sclaim: u64,
}

impl Plic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Device for Plic {
    fn load(&mut self, addr: u64, size: u64) -> Result<u64, Exception> {
        if size != 32 {
            return Err(Exception::LoadAccessFault(addr));
        }
        let value = match addr {
            PLIC_PENDING => self.pending,
            PLIC_SENABLE => self.senable,
            PLIC_SPRIORITY => self.spriority,
            PLIC_SCLAIM => self.sclaim,
            _ => 0,
        };
        Ok(value)
    }

    fn store(&mut self, addr: u64, size: u64, value: u64) -> Result<(), Exception> {
        if size != 32 {
            return Err(Exception::StoreAmoAccessFault(addr));
        }
        match addr {
            PLIC_PENDING => self.pending = value,
            PLIC_SENABLE => self.senable = value,
            PLIC_SPRIORITY => self.spriority = value,
            PLIC_SCLAIM => self.sclaim = value,
            _ => {}
        }
        Ok(())
    }
}
