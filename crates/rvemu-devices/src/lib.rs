//! MMIO peripherals: a 16550-style UART with an asynchronous receive side, and a legacy
//! VirtIO-MMIO block device register file. Descriptor-chain walking for the block device
//! lives in `rvemu-mem`'s `Bus`, since it needs simultaneous access to this device and DRAM.

mod uart;
mod virtio;

pub use uart::Uart;
pub use virtio::Virtio;

/// Base address of the UART range.
pub const UART_BASE: u64 = 0x1000_0000;
/// Size of the UART range.
pub const UART_SIZE: u64 = 0x100;
/// Last valid UART address (inclusive).
pub const UART_END: u64 = UART_BASE + UART_SIZE - 1;

/// Receiver holding register (read) / transmitter holding register (write), both at offset 0.
pub const UART_RHR: u64 = UART_BASE;
/// Transmitter holding register, aliased with [`UART_RHR`] on write.
pub const UART_THR: u64 = UART_BASE;
/// Line status register.
pub const UART_LSR: u64 = UART_BASE + 5;

/// Set when a byte has been received and not yet read by the guest.
pub const MASK_UART_LSR_RX: u8 = 1;
/// Set whenever the transmitter is ready, which in this model is always.
pub const MASK_UART_LSR_TX: u8 = 1 << 5;

/// Base address of the VirtIO-MMIO range.
pub const VIRTIO_BASE: u64 = 0x1000_1000;
/// Size of the VirtIO-MMIO range.
pub const VIRTIO_SIZE: u64 = 0x1000;
/// Last valid VirtIO-MMIO address (inclusive).
pub const VIRTIO_END: u64 = VIRTIO_BASE + VIRTIO_SIZE - 1;

/// Number of descriptors in the legacy virtqueue. Must be a power of two.
pub const DESC_NUM: u64 = 8;
/// Size in bytes of one `VRingDesc` entry (addr: u64, len: u32, flags: u16, next: u16).
pub const VRING_DESC_SIZE: u64 = 16;

/// Always reads as `0x74726976` ("virt" in little-endian ASCII).
pub const VIRTIO_MAGIC: u64 = VIRTIO_BASE + 0x000;
/// Legacy interface version.
pub const VIRTIO_VERSION: u64 = VIRTIO_BASE + 0x004;
/// Device type; 2 is a block device.
pub const VIRTIO_DEVICE_ID: u64 = VIRTIO_BASE + 0x008;
/// Always reads as `0x554d4551` ("QEMU" in little-endian ASCII).
pub const VIRTIO_VENDOR_ID: u64 = VIRTIO_BASE + 0x00c;
/// Device feature bits, read-only from the driver's perspective.
pub const VIRTIO_DEVICE_FEATURES: u64 = VIRTIO_BASE + 0x010;
/// Driver feature bits, write-only.
pub const VIRTIO_DRIVER_FEATURES: u64 = VIRTIO_BASE + 0x020;
/// Guest page size, write-only.
pub const VIRTIO_GUEST_PAGE_SIZE: u64 = VIRTIO_BASE + 0x028;
/// Selects which queue the following registers refer to, write-only.
pub const VIRTIO_QUEUE_SEL: u64 = VIRTIO_BASE + 0x030;
/// Maximum size of the currently selected queue, read-only.
pub const VIRTIO_QUEUE_NUM_MAX: u64 = VIRTIO_BASE + 0x034;
/// Size of the currently selected queue, write-only.
pub const VIRTIO_QUEUE_NUM: u64 = VIRTIO_BASE + 0x038;
/// Physical page number of the currently selected queue, read and write.
pub const VIRTIO_QUEUE_PFN: u64 = VIRTIO_BASE + 0x040;
/// Notifies the device that the named queue has new buffers, write-only.
pub const VIRTIO_QUEUE_NOTIFY: u64 = VIRTIO_BASE + 0x050;
/// Device status flags, read and write. Writing zero resets the device.
pub const VIRTIO_STATUS: u64 = VIRTIO_BASE + 0x070;

/// Sentinel `queue_notify` value meaning "no queue has been notified since the last check".
const QUEUE_NOTIFY_NONE: u32 = 9999;
