use rvemu_core::Exception;

use crate::{DRAM_BASE, DRAM_SIZE};

/// Flat, byte-addressable guest RAM. Sized once at construction; never resized.
pub struct Dram {
    memory: Vec<u8>,
}

impl Dram {
    /// Creates DRAM of [`DRAM_SIZE`] bytes, with `code` copied in at offset zero.
    pub fn new(code: Vec<u8>) -> Self {
        let mut memory = vec![0u8; DRAM_SIZE as usize];
        let len = code.len().min(memory.len());
        memory[..len].copy_from_slice(&code[..len]);
        Self { memory }
    }

    /// Reads `size` bits (8/16/32/64) starting at `addr`, little-endian, zero-extended to 64 bits.
    ///
    /// `addr` must already be known to lie within the DRAM range; the bus is responsible for
    /// that check.
    pub fn load(&self, addr: u64, size: u64) -> Result<u64, Exception> {
        if !matches!(size, 8 | 16 | 32 | 64) {
            return Err(Exception::LoadAccessFault(addr));
        }
        let nbytes = (size / 8) as usize;
        let index = (addr - DRAM_BASE) as usize;
        let mut value = 0u64;
        for i in 0..nbytes {
            value |= (self.memory[index + i] as u64) << (i * 8);
        }
        Ok(value)
    }

    /// Writes the low `size` bits of `value`, little-endian, starting at `addr`.
    pub fn store(&mut self, addr: u64, size: u64, value: u64) -> Result<(), Exception> {
        if !matches!(size, 8 | 16 | 32 | 64) {
            return Err(Exception::StoreAmoAccessFault(addr));
        }
        let nbytes = (size / 8) as usize;
        let index = (addr - DRAM_BASE) as usize;
        for i in 0..nbytes {
            self.memory[index + i] = ((value >> (i * 8)) & 0xff) as u8;
        }
        Ok(())
    }
}
