use rvemu_core::{Device, Exception};
use rvemu_devices::{Uart, Virtio, DESC_NUM, UART_BASE, UART_END, VIRTIO_BASE, VIRTIO_END, VRING_DESC_SIZE};
use rvemu_interrupts::{Clint, Plic, CLINT_BASE, CLINT_END, PLIC_BASE, PLIC_END};

use crate::{Dram, DRAM_BASE, DRAM_END};

/// Routes a hart's loads and stores to DRAM or to whichever MMIO peripheral owns the address
/// range, and owns the peripherals themselves so that devices needing direct memory access
/// (the VirtIO block device) can be driven from here rather than from the CPU.
pub struct Bus {
    clint: Clint,
    plic: Plic,
    uart: Uart,
    virtio: Virtio,
    dram: Dram,
}

impl Bus {
    pub fn new(code: Vec<u8>, disk_image: Vec<u8>) -> Self {
        Self::with_uart(code, disk_image, Uart::new())
    }

    /// Like [`Bus::new`], but with a caller-supplied [`Uart`]. Used by tests that need to drive
    /// the UART through synthetic input/output rather than the host's real stdin/stdout.
    pub fn with_uart(code: Vec<u8>, disk_image: Vec<u8>, uart: Uart) -> Self {
        Self {
            clint: Clint::new(),
            plic: Plic::new(),
            uart,
            virtio: Virtio::new(disk_image),
            dram: Dram::new(code),
        }
    }

    pub fn load(&mut self, addr: u64, size: u64) -> Result<u64, Exception> {
        match addr {
            CLINT_BASE..=CLINT_END => self.clint.load(addr, size),
            PLIC_BASE..=PLIC_END => self.plic.load(addr, size),
            UART_BASE..=UART_END => self.uart.load(addr, size),
            VIRTIO_BASE..=VIRTIO_END => self.virtio.load(addr, size),
            DRAM_BASE..=DRAM_END => self.dram.load(addr, size),
            _ => Err(Exception::LoadAccessFault(addr)),
        }
    }

    pub fn store(&mut self, addr: u64, size: u64, value: u64) -> Result<(), Exception> {
        match addr {
            CLINT_BASE..=CLINT_END => self.clint.store(addr, size, value),
            PLIC_BASE..=PLIC_END => self.plic.store(addr, size, value),
            UART_BASE..=UART_END => self.uart.store(addr, size, value),
            VIRTIO_BASE..=VIRTIO_END => self.virtio.store(addr, size, value),
            DRAM_BASE..=DRAM_END => self.dram.store(addr, size, value),
            _ => Err(Exception::StoreAmoAccessFault(addr)),
        }
    }

    /// Whether the UART has received a byte since the last check. Clears the flag as a side
    /// effect, matching the edge-triggered semantics the PLIC expects.
    pub fn uart_is_interrupting(&self) -> bool {
        self.uart.is_interrupting()
    }

    /// Whether the VirtIO block device has been notified of a new request since the last check.
    pub fn virtio_is_interrupting(&mut self) -> bool {
        self.virtio.is_interrupting()
    }

    /// Walks the legacy virtqueue and performs the DMA copy it describes, then posts the
    /// completion to the used ring.
    ///
    /// Legacy block requests use exactly two descriptors: one carrying the
    /// `virtio_blk_outhdr` (request type and target sector) and one carrying the data buffer,
    /// chained by the first descriptor's `next` field. A third, status-byte descriptor exists
    /// in the spec but `xv6`'s driver never asks this emulator to inspect it.
    pub fn disk_access(&mut self) {
        let desc_addr = self.virtio.desc_addr();
        let avail_addr = desc_addr + 0x40;
        let used_addr = desc_addr + 4096;

        let offset = self
            .load(avail_addr.wrapping_add(1), 16)
            .expect("failed to read virtqueue avail offset");
        let index = self
            .load(avail_addr.wrapping_add(offset % DESC_NUM).wrapping_add(2), 16)
            .expect("failed to read virtqueue avail ring entry");

        let desc_addr0 = desc_addr + VRING_DESC_SIZE * index;
        let addr0 = self
            .load(desc_addr0, 64)
            .expect("failed to read descriptor 0 address field");
        // `VRingDesc` is { addr: u64, len: u32, flags: u16, next: u16 }; `next` sits at offset 14.
        let next0 = self
            .load(desc_addr0.wrapping_add(14), 16)
            .expect("failed to read descriptor 0 next field");

        let desc_addr1 = desc_addr + VRING_DESC_SIZE * next0;
        let addr1 = self
            .load(desc_addr1, 64)
            .expect("failed to read descriptor 1 address field");
        let len1 = self
            .load(desc_addr1.wrapping_add(8), 32)
            .expect("failed to read descriptor 1 length field");
        let flags1 = self
            .load(desc_addr1.wrapping_add(12), 16)
            .expect("failed to read descriptor 1 flags field");

        // `virtio_blk_outhdr` is { type: u32, reserved: u32, sector: u64 }; `sector` sits at offset 8.
        let sector = self
            .load(addr0.wrapping_add(8), 64)
            .expect("failed to read virtio_blk_outhdr sector field");

        const VIRTQ_DESC_F_WRITE: u64 = 0x2;
        if flags1 & VIRTQ_DESC_F_WRITE == 0 {
            // The descriptor is device-readable: the guest is writing to the disk.
            for i in 0..len1 as u64 {
                let data = self.load(addr1 + i, 8).expect("failed to read from dram");
                self.virtio.write_disk(sector * 512 + i, data);
            }
        } else {
            // The descriptor is device-writable: the guest is reading from the disk.
            for i in 0..len1 as u64 {
                let data = self.virtio.read_disk(sector * 512 + i);
                self.store(addr1 + i, 8, data).expect("failed to write to dram");
            }
        }

        // `UsedArea` is { flags: u16, idx: u16, ring: [VRingUsedElem; DESC_NUM] }; `idx` sits at offset 2.
        let new_id = self.virtio.next_used_id();
        self.store(used_addr.wrapping_add(2), 16, new_id % DESC_NUM)
            .expect("failed to post virtqueue completion");
    }
}
