use crate::Exception;

/// Anything the bus can route a load/store to: DRAM, CLINT, PLIC, UART, or the VirtIO
/// block device. `size` is always in bits.
pub trait Device {
    fn load(&mut self, addr: u64, size: u64) -> Result<u64, Exception>;
    fn store(&mut self, addr: u64, size: u64, value: u64) -> Result<(), Exception>;
}
