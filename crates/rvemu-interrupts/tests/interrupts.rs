use rvemu_core::Device;
use rvemu_interrupts::{
    Clint, Plic, CLINT_MTIME, CLINT_MTIMECMP, PLIC_PENDING, PLIC_SCLAIM, PLIC_SENABLE,
    PLIC_SPRIORITY,
};

#[test]
fn clint_registers_round_trip_at_64_bits() {
    let mut clint = Clint::new();
    clint.store(CLINT_MTIMECMP, 64, 0xdead_beef).unwrap();
    clint.store(CLINT_MTIME, 64, 0x1234).unwrap();
    assert_eq!(clint.load(CLINT_MTIMECMP, 64).unwrap(), 0xdead_beef);
    assert_eq!(clint.load(CLINT_MTIME, 64).unwrap(), 0x1234);
}

#[test]
fn clint_rejects_non_64_bit_access() {
    let mut clint = Clint::new();
    assert!(clint.load(CLINT_MTIME, 32).is_err());
    assert!(clint.store(CLINT_MTIME, 32, 1).is_err());
}

#[test]
fn clint_rejects_addresses_outside_its_two_registers() {
    let mut clint = Clint::new();
    assert!(clint.load(CLINT_MTIME + 8, 64).is_err());
}

#[test]
fn plic_registers_round_trip_at_32_bits() {
    let mut plic = Plic::new();
    plic.store(PLIC_PENDING, 32, 0b1010).unwrap();
    plic.store(PLIC_SENABLE, 32, 0b0101).unwrap();
    plic.store(PLIC_SPRIORITY, 32, 3).unwrap();
    plic.store(PLIC_SCLAIM, 32, 10).unwrap();

    assert_eq!(plic.load(PLIC_PENDING, 32).unwrap(), 0b1010);
    assert_eq!(plic.load(PLIC_SENABLE, 32).unwrap(), 0b0101);
    assert_eq!(plic.load(PLIC_SPRIORITY, 32).unwrap(), 3);
    assert_eq!(plic.load(PLIC_SCLAIM, 32).unwrap(), 10);
}

#[test]
fn plic_rejects_non_32_bit_access() {
    let mut plic = Plic::new();
    assert!(plic.load(PLIC_PENDING, 64).is_err());
    assert!(plic.store(PLIC_PENDING, 64, 1).is_err());
}

#[test]
fn plic_reads_zero_and_ignores_writes_outside_its_four_registers() {
    let mut plic = Plic::new();
    let stray = PLIC_PENDING + 4;
    assert_eq!(plic.load(stray, 32).unwrap(), 0);
    plic.store(stray, 32, 0xffff_ffff).unwrap();
    assert_eq!(plic.load(stray, 32).unwrap(), 0);
}
