use rvemu_core::{Exception, Interrupt, Mode, Trap};

#[test]
fn exception_codes_match_the_riscv_priv_spec() {
    assert_eq!(Exception::InstructionAddrMisaligned(0).code(), 0);
    assert_eq!(Exception::InstructionAccessFault(0).code(), 1);
    assert_eq!(Exception::IllegalInstruction(0).code(), 2);
    assert_eq!(Exception::Breakpoint(0).code(), 3);
    assert_eq!(Exception::LoadAddrMisaligned(0).code(), 4);
    assert_eq!(Exception::LoadAccessFault(0).code(), 5);
    assert_eq!(Exception::StoreAmoAddrMisaligned(0).code(), 6);
    assert_eq!(Exception::StoreAmoAccessFault(0).code(), 7);
    assert_eq!(Exception::EnvironmentCallFromUMode(0).code(), 8);
    assert_eq!(Exception::EnvironmentCallFromSMode(0).code(), 9);
    assert_eq!(Exception::EnvironmentCallFromMMode(0).code(), 11);
    assert_eq!(Exception::InstructionPageFault(0).code(), 12);
    assert_eq!(Exception::LoadPageFault(0).code(), 13);
    assert_eq!(Exception::StoreAmoPageFault(0).code(), 15);
}

#[test]
fn exception_value_is_the_payload_regardless_of_kind() {
    assert_eq!(Exception::LoadAccessFault(0xdead_beef).value(), 0xdead_beef);
    assert_eq!(Exception::IllegalInstruction(0x1337).value(), 0x1337);
}

#[test]
fn fatal_exceptions_match_the_table_in_the_spec() {
    assert!(Exception::InstructionAddrMisaligned(0).is_fatal());
    assert!(Exception::InstructionAccessFault(0).is_fatal());
    assert!(Exception::IllegalInstruction(0).is_fatal());
    assert!(Exception::LoadAccessFault(0).is_fatal());
    assert!(Exception::StoreAmoAddrMisaligned(0).is_fatal());
    assert!(Exception::StoreAmoAccessFault(0).is_fatal());

    assert!(!Exception::Breakpoint(0).is_fatal());
    assert!(!Exception::LoadAddrMisaligned(0).is_fatal());
    assert!(!Exception::EnvironmentCallFromUMode(0).is_fatal());
    assert!(!Exception::EnvironmentCallFromSMode(0).is_fatal());
    assert!(!Exception::EnvironmentCallFromMMode(0).is_fatal());
    assert!(!Exception::InstructionPageFault(0).is_fatal());
    assert!(!Exception::LoadPageFault(0).is_fatal());
    assert!(!Exception::StoreAmoPageFault(0).is_fatal());
}

#[test]
fn interrupts_are_never_fatal_and_carry_no_trap_value() {
    for i in [
        Interrupt::SupervisorSoftware,
        Interrupt::MachineSoftware,
        Interrupt::SupervisorTimer,
        Interrupt::MachineTimer,
        Interrupt::SupervisorExternal,
        Interrupt::MachineExternal,
    ] {
        assert!(!i.is_fatal());
        assert_eq!(i.value(), 0);
        assert!(i.is_interrupt());
    }
}

#[test]
fn interrupt_codes_set_the_interrupt_bit_over_the_mip_bit_position() {
    assert_eq!(Interrupt::SupervisorSoftware.bit(), 1);
    assert_eq!(Interrupt::MachineSoftware.bit(), 3);
    assert_eq!(Interrupt::SupervisorTimer.bit(), 5);
    assert_eq!(Interrupt::MachineTimer.bit(), 7);
    assert_eq!(Interrupt::SupervisorExternal.bit(), 9);
    assert_eq!(Interrupt::MachineExternal.bit(), 11);

    for i in [Interrupt::SupervisorSoftware, Interrupt::MachineExternal] {
        assert_eq!(i.code(), i.bit() | (1 << 63));
    }
}

#[test]
fn privilege_modes_order_user_below_supervisor_below_machine() {
    assert!(Mode::User < Mode::Supervisor);
    assert!(Mode::Supervisor < Mode::Machine);
    assert!(Mode::User <= Mode::Supervisor);
}

#[test]
fn mode_bit_round_trip() {
    assert_eq!(Mode::from_bits(Mode::User.bits()), Mode::User);
    assert_eq!(Mode::from_bits(Mode::Supervisor.bits()), Mode::Supervisor);
    assert_eq!(Mode::from_bits(Mode::Machine.bits()), Mode::Machine);
    // Only the low two bits matter.
    assert_eq!(Mode::from_bits(0b1101), Mode::Machine);
}
