use rvemu_core::{Device, Exception};

use crate::{
    QUEUE_NOTIFY_NONE, VIRTIO_DEVICE_FEATURES, VIRTIO_DEVICE_ID, VIRTIO_DRIVER_FEATURES,
    VIRTIO_GUEST_PAGE_SIZE, VIRTIO_MAGIC, VIRTIO_QUEUE_NOTIFY, VIRTIO_QUEUE_NUM,
    VIRTIO_QUEUE_NUM_MAX, VIRTIO_QUEUE_PFN, VIRTIO_QUEUE_SEL, VIRTIO_STATUS, VIRTIO_VENDOR_ID,
    VIRTIO_VERSION,
};

/// The legacy VirtIO-MMIO register file for a single block device, plus the backing disk image.
///
/// Queue processing (descriptor-chain walking and the DMA copy to/from guest RAM) is not on
/// this type: it needs simultaneous mutable access to this register file and to `Dram`, so it
/// lives on `rvemu-mem`'s `Bus` instead. This type only owns what a register file owns: the
/// fixed identification constants, the handful of registers the driver actually writes, and
/// the disk bytes that [`Virtio::read_disk`]/[`Virtio::write_disk`] address directly.
pub struct Virtio {
    id: u64,
    driver_features: u32,
    page_size: u32,
    queue_sel: u32,
    queue_num: u32,
    queue_pfn: u32,
    queue_notify: u32,
    status: u32,
    disk: Vec<u8>,
}

impl Virtio {
    /// Creates a block device backed by `disk_image`. An empty image is a valid, if useless,
    /// disk: booting without `-drive` should not fail to construct the machine.
    pub fn new(disk_image: Vec<u8>) -> Self {
        Self {
            id: 0,
            driver_features: 0,
            page_size: 0,
            queue_sel: 0,
            queue_num: 0,
            queue_pfn: 0,
            queue_notify: QUEUE_NOTIFY_NONE,
            status: 0,
            disk: disk_image,
        }
    }

    /// Returns true, and clears the pending notification, if the driver has notified a queue
    /// since the last call.
    pub fn is_interrupting(&mut self) -> bool {
        if self.queue_notify != QUEUE_NOTIFY_NONE {
            self.queue_notify = QUEUE_NOTIFY_NONE;
            return true;
        }
        false
    }

    /// Physical address of the virtqueue: `queue_pfn * page_size`.
    pub fn desc_addr(&self) -> u64 {
        self.queue_pfn as u64 * self.page_size as u64
    }

    /// Returns the next used-ring id, wrapping the way a `u16` ring index does.
    pub fn next_used_id(&mut self) -> u64 {
        self.id = self.id.wrapping_add(1);
        self.id
    }

    /// Reads one byte from the backing disk image. Out-of-range reads return 0: a sparse disk
    /// image shorter than the partition table claims should not panic the machine.
    pub fn read_disk(&self, addr: u64) -> u64 {
        self.disk.get(addr as usize).copied().unwrap_or(0) as u64
    }

    /// Writes one byte to the backing disk image, growing it if the guest writes past its
    /// current end.
    pub fn write_disk(&mut self, addr: u64, value: u64) {
        let addr = addr as usize;
        if addr >= self.disk.len() {
            self.disk.resize(addr + 1, 0);
        }
        self.disk[addr] = value as u8;
    }
}

impl Device for Virtio {
    fn load(&mut self, addr: u64, size: u64) -> Result<u64, Exception> {
        if size != 32 {
            return Err(Exception::LoadAccessFault(addr));
        }
        let value = match addr {
            VIRTIO_MAGIC => 0x7472_6976,
            VIRTIO_VERSION => 0x1,
            VIRTIO_DEVICE_ID => 0x2,
            VIRTIO_VENDOR_ID => 0x554d_4551,
            VIRTIO_DEVICE_FEATURES => 0,
            VIRTIO_DRIVER_FEATURES => self.driver_features as u64,
            VIRTIO_QUEUE_NUM_MAX => 8,
            VIRTIO_QUEUE_PFN => self.queue_pfn as u64,
            VIRTIO_STATUS => self.status as u64,
            _ => 0,
        };
        Ok(value)
    }

    fn store(&mut self, addr: u64, size: u64, value: u64) -> Result<(), Exception> {
        if size != 32 {
            return Err(Exception::StoreAmoAccessFault(addr));
        }
        let value = value as u32;
        match addr {
            VIRTIO_DEVICE_FEATURES => self.driver_features = value,
            VIRTIO_GUEST_PAGE_SIZE => self.page_size = value,
            VIRTIO_QUEUE_SEL => self.queue_sel = value,
            VIRTIO_QUEUE_NUM => self.queue_num = value,
            VIRTIO_QUEUE_PFN => self.queue_pfn = value,
            VIRTIO_QUEUE_NOTIFY => self.queue_notify = value,
            VIRTIO_STATUS => self.status = value,
            _ => {}
        }
        Ok(())
    }
}
