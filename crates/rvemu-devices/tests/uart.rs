use rvemu_core::Device;
use rvemu_devices::{Uart, MASK_UART_LSR_TX, UART_LSR};

#[test]
fn transmitter_is_always_ready_on_reset() {
    let mut uart = Uart::new();
    let lsr = uart.load(UART_LSR, 8).unwrap();
    assert_eq!(lsr as u8 & MASK_UART_LSR_TX, MASK_UART_LSR_TX);
}

#[test]
fn non_byte_access_faults() {
    let mut uart = Uart::new();
    assert!(uart.load(UART_LSR, 32).is_err());
    assert!(uart.store(UART_LSR, 16, 0).is_err());
}

#[test]
fn writing_the_transmit_register_does_not_panic() {
    let mut uart = Uart::new();
    uart.store(rvemu_devices::UART_THR, 8, b'x' as u64).unwrap();
}

#[test]
fn no_interrupt_is_pending_on_reset() {
    let uart = Uart::new();
    assert!(!uart.is_interrupting());
}
