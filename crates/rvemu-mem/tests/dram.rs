use proptest::prelude::*;
use rvemu_mem::{Dram, DRAM_BASE, DRAM_SIZE};

#[test]
fn code_is_loaded_at_the_base_address() {
    let dram = Dram::new(vec![0xef, 0xbe, 0xad, 0xde]);
    assert_eq!(dram.load(DRAM_BASE, 32).unwrap(), 0xdead_beef);
}

#[test]
fn stores_round_trip_through_loads_at_every_width() {
    let mut dram = Dram::new(Vec::new());
    for (size, value) in [(8, 0xab), (16, 0xabcd), (32, 0xdead_beef), (64, 0x1122_3344_5566_7788)] {
        dram.store(DRAM_BASE, size, value).unwrap();
        assert_eq!(dram.load(DRAM_BASE, size).unwrap(), value);
    }
}

#[test]
fn unsupported_widths_fault() {
    let dram = Dram::new(Vec::new());
    assert!(dram.load(DRAM_BASE, 24).is_err());
}

#[test]
fn oversized_binaries_are_truncated_rather_than_panicking() {
    let oversized = vec![0u8; (rvemu_mem::DRAM_SIZE + 16) as usize];
    let dram = Dram::new(oversized);
    assert_eq!(dram.load(rvemu_mem::DRAM_END - 7, 64).unwrap(), 0);
}

proptest! {
    #[test]
    fn a_32_bit_store_is_read_back_unchanged_at_any_aligned_offset(
        offset in 0u64..(DRAM_SIZE - 4),
        value: u32,
    ) {
        let mut dram = Dram::new(Vec::new());
        let addr = DRAM_BASE + offset;
        dram.store(addr, 32, value as u64).unwrap();
        prop_assert_eq!(dram.load(addr, 32).unwrap(), value as u64);
    }
}
