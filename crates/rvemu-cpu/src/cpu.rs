use rvemu_core::{Exception, Interrupt, Mode, Trap};
use rvemu_interrupts::{PLIC_SCLAIM, UART_IRQ, VIRTIO_IRQ};
use rvemu_mem::{Bus, DRAM_BASE, DRAM_END};

use crate::csr::{
    Csr, MASK_MEIP, MASK_MIE, MASK_MPIE, MASK_MPP, MASK_MPRV, MASK_MSIP, MASK_MTIP, MASK_SEIP,
    MASK_SIE, MASK_SPIE, MASK_SPP, MASK_SSIP, MASK_STIP, MCAUSE, MEPC, MIE, MIP, MSTATUS, MTVAL,
    MTVEC, SCAUSE, SEPC, SSTATUS, STVAL, STVEC,
};

/// ABI names for the 32 integer registers, used only for [`Cpu::dump_registers`].
pub const RVABI: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// A RISC-V hart: 32 integer registers, the program counter, the CSR file, the current
/// privilege mode, and the system bus it fetches and accesses memory through.
pub struct Cpu {
    regs: [u64; 32],
    pc: u64,
    bus: Bus,
    csr: Csr,
    mode: Mode,
}

impl Cpu {
    pub fn new(code: Vec<u8>, disk_image: Vec<u8>) -> Self {
        Self::with_bus(Bus::new(code, disk_image))
    }

    /// Like [`Cpu::new`], but with a caller-supplied [`Bus`]. Used by tests that need to drive
    /// the machine's UART through synthetic input/output, via [`rvemu_mem::Bus::with_uart`].
    pub fn with_bus(bus: Bus) -> Self {
        let mut regs = [0u64; 32];
        regs[2] = DRAM_END; // sp
        Self {
            regs,
            pc: DRAM_BASE,
            bus,
            csr: Csr::new(),
            mode: Mode::Machine,
        }
    }

    pub fn pc(&self) -> u64 {
        self.pc
    }

    pub fn reg(&self, index: usize) -> u64 {
        self.regs[index]
    }

    pub fn csr(&self, addr: usize) -> u64 {
        self.csr.load(addr)
    }

    /// Fetches, decodes, and executes instructions until the pc runs past the end of DRAM or a
    /// fatal exception is raised. Returns `true` if the hart halted cleanly (pc ran off the end
    /// of DRAM), `false` if it halted on a fatal exception.
    pub fn run(&mut self) -> bool {
        loop {
            match self.step() {
                StepOutcome::Continue => {}
                StepOutcome::Halted => return true,
                StepOutcome::FatalFault(_) => return false,
            }
        }
    }

    /// Fetches, decodes, and executes a single instruction, and services one pending
    /// interrupt if the instruction didn't itself trap.
    pub fn step(&mut self) -> StepOutcome {
        if self.pc > DRAM_END {
            tracing::info!(pc = %format_args!("{:#x}", self.pc), "pc ran past the end of dram, halting");
            return StepOutcome::Halted;
        }
        match self.fetch().and_then(|inst| self.execute(inst)) {
            Ok(new_pc) => {
                self.pc = new_pc;
                if let Some(interrupt) = self.check_pending_interrupt() {
                    self.handle_interrupt(interrupt);
                }
                StepOutcome::Continue
            }
            Err(exception) => {
                self.handle_exception(&exception);
                if exception.is_fatal() {
                    tracing::error!(
                        value = %format_args!("{:#x}", exception.value()),
                        "fatal exception, halting"
                    );
                    StepOutcome::FatalFault(exception)
                } else {
                    StepOutcome::Continue
                }
            }
        }
    }

    fn fetch(&mut self) -> Result<u32, Exception> {
        self.bus.load(self.pc, 32).map(|inst| inst as u32)
    }

    fn load(&mut self, addr: u64, size: u64) -> Result<u64, Exception> {
        self.bus.load(addr, size)
    }

    fn store(&mut self, addr: u64, size: u64, value: u64) -> Result<(), Exception> {
        self.bus.store(addr, size, value)
    }

    fn update_pc(&self) -> Result<u64, Exception> {
        Ok(self.pc + 4)
    }

    /// Decodes and executes one instruction, returning the next program counter.
    fn execute(&mut self, inst: u32) -> Result<u64, Exception> {
        let inst = inst as u64;
        let opcode = inst & 0x7f;
        let rd = ((inst >> 7) & 0x1f) as usize;
        let rs1 = ((inst >> 15) & 0x1f) as usize;
        let rs2 = ((inst >> 20) & 0x1f) as usize;
        let funct3 = (inst >> 12) & 0x7;
        let funct7 = (inst >> 25) & 0x7f;

        // x0 is hardwired to zero.
        self.regs[0] = 0;

        match opcode {
            0x03 => self.execute_load(inst, rd, rs1, funct3),
            0x0f => match funct3 {
                // A fence instruction does nothing: instructions execute sequentially and
                // there is only one hart, so there is nothing for it to order.
                0x0 => self.update_pc(),
                _ => Err(Exception::IllegalInstruction(inst)),
            },
            0x13 => self.execute_op_imm(inst, rd, rs1, funct3, funct7),
            0x17 => {
                // AUIPC
                let imm = (inst & 0xffff_f000) as i32 as i64 as u64;
                self.regs[rd] = self.pc.wrapping_add(imm);
                self.update_pc()
            }
            0x1b => self.execute_op_imm_32(inst, rd, rs1, funct3, funct7),
            0x23 => self.execute_store(inst, rs1, rs2, funct3),
            0x2f => self.execute_amo(inst, rd, rs1, rs2, funct3, funct7),
            0x33 => self.execute_op(inst, rd, rs1, rs2, funct3, funct7),
            0x37 => {
                // LUI
                self.regs[rd] = (inst & 0xffff_f000) as i32 as i64 as u64;
                self.update_pc()
            }
            0x3b => self.execute_op_32(inst, rd, rs1, rs2, funct3, funct7),
            0x63 => self.execute_branch(inst, rs1, rs2, funct3),
            0x67 => {
                // JALR
                let t = self.pc.wrapping_add(4);
                let imm = ((inst & 0xfff0_0000) as i32 as i64 >> 20) as u64;
                let new_pc = self.regs[rs1].wrapping_add(imm) & !1;
                self.regs[rd] = t;
                Ok(new_pc)
            }
            0x6f => {
                // JAL
                self.regs[rd] = self.pc.wrapping_add(4);
                // imm[20|10:1|11|19:12] = inst[31|30:21|20|19:12]
                let imm = (((inst & 0x8000_0000) as i32 as i64 >> 11) as u64)
                    | (inst & 0xff000)
                    | ((inst >> 9) & 0x800)
                    | ((inst >> 20) & 0x7fe);
                Ok(self.pc.wrapping_add(imm))
            }
            0x73 => self.execute_system(inst, rd, rs1, rs2, funct3, funct7),
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn execute_load(&mut self, inst: u64, rd: usize, rs1: usize, funct3: u64) -> Result<u64, Exception> {
        let offset = ((inst as i32) >> 20) as i64 as u64;
        let addr = self.regs[rs1].wrapping_add(offset);
        match funct3 {
            0x0 => {
                let val = self.load(addr, 8)?;
                self.regs[rd] = val as i8 as i64 as u64;
                self.update_pc()
            }
            0x1 => {
                let val = self.load(addr, 16)?;
                self.regs[rd] = val as i16 as i64 as u64;
                self.update_pc()
            }
            0x2 => {
                let val = self.load(addr, 32)?;
                self.regs[rd] = val as i32 as i64 as u64;
                self.update_pc()
            }
            0x3 => {
                let val = self.load(addr, 64)?;
                self.regs[rd] = val;
                self.update_pc()
            }
            0x4 => {
                let val = self.load(addr, 8)?;
                self.regs[rd] = val;
                self.update_pc()
            }
            0x5 => {
                let val = self.load(addr, 16)?;
                self.regs[rd] = val;
                self.update_pc()
            }
            0x6 => {
                let val = self.load(addr, 32)?;
                self.regs[rd] = val;
                self.update_pc()
            }
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn execute_store(&mut self, inst: u64, rs1: usize, rs2: usize, funct3: u64) -> Result<u64, Exception> {
        // imm[11:5|4:0] = inst[31:25|11:7]
        let imm = (((inst & 0xfe00_0000) as i32 as i64 >> 20) as u64) | ((inst >> 7) & 0x1f);
        let addr = self.regs[rs1].wrapping_add(imm);
        match funct3 {
            0x0 => {
                self.store(addr, 8, self.regs[rs2])?;
                self.update_pc()
            }
            0x1 => {
                self.store(addr, 16, self.regs[rs2])?;
                self.update_pc()
            }
            0x2 => {
                self.store(addr, 32, self.regs[rs2])?;
                self.update_pc()
            }
            0x3 => {
                self.store(addr, 64, self.regs[rs2])?;
                self.update_pc()
            }
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn execute_op_imm(
        &mut self,
        inst: u64,
        rd: usize,
        rs1: usize,
        funct3: u64,
        funct7: u64,
    ) -> Result<u64, Exception> {
        let imm = ((inst & 0xfff0_0000) as i32 as i64 >> 20) as u64;
        let shamt = (imm & 0x3f) as u32;
        match funct3 {
            0x0 => {
                self.regs[rd] = self.regs[rs1].wrapping_add(imm);
                self.update_pc()
            }
            0x1 => {
                self.regs[rd] = self.regs[rs1] << shamt;
                self.update_pc()
            }
            0x2 => {
                self.regs[rd] = if (self.regs[rs1] as i64) < (imm as i64) { 1 } else { 0 };
                self.update_pc()
            }
            0x3 => {
                self.regs[rd] = if self.regs[rs1] < imm { 1 } else { 0 };
                self.update_pc()
            }
            0x4 => {
                self.regs[rd] = self.regs[rs1] ^ imm;
                self.update_pc()
            }
            0x5 => match funct7 {
                0x00 => {
                    self.regs[rd] = self.regs[rs1] >> shamt;
                    self.update_pc()
                }
                0x20 => {
                    self.regs[rd] = ((self.regs[rs1] as i64) >> shamt) as u64;
                    self.update_pc()
                }
                _ => Err(Exception::IllegalInstruction(inst)),
            },
            0x6 => {
                self.regs[rd] = self.regs[rs1] | imm;
                self.update_pc()
            }
            0x7 => {
                self.regs[rd] = self.regs[rs1] & imm;
                self.update_pc()
            }
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn execute_op_imm_32(
        &mut self,
        inst: u64,
        rd: usize,
        rs1: usize,
        funct3: u64,
        funct7: u64,
    ) -> Result<u64, Exception> {
        let imm = ((inst as i32) >> 20) as i64 as u64;
        let shamt = (imm & 0x1f) as u32;
        match funct3 {
            0x0 => {
                self.regs[rd] = (self.regs[rs1].wrapping_add(imm) as i32) as i64 as u64;
                self.update_pc()
            }
            0x1 => {
                self.regs[rd] = ((self.regs[rs1] << shamt) as i32) as i64 as u64;
                self.update_pc()
            }
            0x5 => match funct7 {
                0x00 => {
                    self.regs[rd] = (((self.regs[rs1] as u32) >> shamt) as i32) as i64 as u64;
                    self.update_pc()
                }
                0x20 => {
                    self.regs[rd] = ((self.regs[rs1] as i32) >> shamt) as i64 as u64;
                    self.update_pc()
                }
                _ => Err(Exception::IllegalInstruction(inst)),
            },
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn execute_amo(
        &mut self,
        inst: u64,
        rd: usize,
        rs1: usize,
        rs2: usize,
        funct3: u64,
        funct7: u64,
    ) -> Result<u64, Exception> {
        let funct5 = (funct7 & 0b111_1100) >> 2;
        match (funct3, funct5) {
            (0x2, 0x00) => {
                // AMOADD.W
                let t = self.load(self.regs[rs1], 32)?;
                self.store(self.regs[rs1], 32, t.wrapping_add(self.regs[rs2]))?;
                self.regs[rd] = t;
                self.update_pc()
            }
            (0x3, 0x00) => {
                // AMOADD.D
                let t = self.load(self.regs[rs1], 64)?;
                self.store(self.regs[rs1], 64, t.wrapping_add(self.regs[rs2]))?;
                self.regs[rd] = t;
                self.update_pc()
            }
            (0x2, 0x01) => {
                // AMOSWAP.W
                let t = self.load(self.regs[rs1], 32)?;
                self.store(self.regs[rs1], 32, self.regs[rs2])?;
                self.regs[rd] = t;
                self.update_pc()
            }
            (0x3, 0x01) => {
                // AMOSWAP.D
                let t = self.load(self.regs[rs1], 64)?;
                self.store(self.regs[rs1], 64, self.regs[rs2])?;
                self.regs[rd] = t;
                self.update_pc()
            }
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn execute_op(
        &mut self,
        inst: u64,
        rd: usize,
        rs1: usize,
        rs2: usize,
        funct3: u64,
        funct7: u64,
    ) -> Result<u64, Exception> {
        // In RV64I only the low 6 bits of rs2 are used for a shift amount.
        let shamt = (self.regs[rs2] & 0x3f) as u32;
        match funct3 {
            0x0 => match funct7 {
                0x00 => {
                    self.regs[rd] = self.regs[rs1].wrapping_add(self.regs[rs2]);
                    self.update_pc()
                }
                0x01 => {
                    // MUL
                    self.regs[rd] = self.regs[rs1].wrapping_mul(self.regs[rs2]);
                    self.update_pc()
                }
                0x20 => {
                    self.regs[rd] = self.regs[rs1].wrapping_sub(self.regs[rs2]);
                    self.update_pc()
                }
                _ => Err(Exception::IllegalInstruction(inst)),
            },
            0x1 => {
                self.regs[rd] = self.regs[rs1] << shamt;
                self.update_pc()
            }
            0x2 => {
                self.regs[rd] = if (self.regs[rs1] as i64) < (self.regs[rs2] as i64) { 1 } else { 0 };
                self.update_pc()
            }
            0x3 => {
                self.regs[rd] = if self.regs[rs1] < self.regs[rs2] { 1 } else { 0 };
                self.update_pc()
            }
            0x4 => {
                self.regs[rd] = self.regs[rs1] ^ self.regs[rs2];
                self.update_pc()
            }
            0x5 => match funct7 {
                0x00 => {
                    self.regs[rd] = self.regs[rs1] >> shamt;
                    self.update_pc()
                }
                0x20 => {
                    self.regs[rd] = ((self.regs[rs1] as i64) >> shamt) as u64;
                    self.update_pc()
                }
                _ => Err(Exception::IllegalInstruction(inst)),
            },
            0x6 => {
                self.regs[rd] = self.regs[rs1] | self.regs[rs2];
                self.update_pc()
            }
            0x7 => {
                self.regs[rd] = self.regs[rs1] & self.regs[rs2];
                self.update_pc()
            }
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn execute_op_32(
        &mut self,
        inst: u64,
        rd: usize,
        rs1: usize,
        rs2: usize,
        funct3: u64,
        funct7: u64,
    ) -> Result<u64, Exception> {
        // The shift amount is rs2[4:0].
        let shamt = (self.regs[rs2] & 0x1f) as u32;
        match funct3 {
            0x0 => match funct7 {
                0x00 => {
                    // ADDW
                    self.regs[rd] = (self.regs[rs1].wrapping_add(self.regs[rs2]) as i32) as i64 as u64;
                    self.update_pc()
                }
                0x20 => {
                    // SUBW
                    self.regs[rd] = (self.regs[rs1].wrapping_sub(self.regs[rs2]) as i32) as i64 as u64;
                    self.update_pc()
                }
                _ => Err(Exception::IllegalInstruction(inst)),
            },
            0x1 => {
                if funct7 != 0x00 {
                    return Err(Exception::IllegalInstruction(inst));
                }
                // SLLW
                self.regs[rd] = (((self.regs[rs1] as u32) << shamt) as i32) as i64 as u64;
                self.update_pc()
            }
            0x5 => match funct7 {
                0x00 => {
                    // SRLW
                    self.regs[rd] = (((self.regs[rs1] as u32) >> shamt) as i32) as i64 as u64;
                    self.update_pc()
                }
                0x01 => {
                    // DIVU
                    self.regs[rd] = if self.regs[rs2] == 0 {
                        u64::MAX
                    } else {
                        self.regs[rs1] / self.regs[rs2]
                    };
                    self.update_pc()
                }
                0x20 => {
                    // SRAW
                    self.regs[rd] = ((self.regs[rs1] as i32) >> (shamt as i32)) as i64 as u64;
                    self.update_pc()
                }
                _ => Err(Exception::IllegalInstruction(inst)),
            },
            0x7 => {
                if funct7 == 0x01 {
                    // REMUW
                    self.regs[rd] = if self.regs[rs2] == 0 {
                        self.regs[rs1]
                    } else {
                        ((self.regs[rs1] as u32) % (self.regs[rs2] as u32)) as i32 as i64 as u64
                    };
                    self.update_pc()
                } else {
                    Err(Exception::IllegalInstruction(inst))
                }
            }
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn execute_branch(&mut self, inst: u64, rs1: usize, rs2: usize, funct3: u64) -> Result<u64, Exception> {
        // imm[12|10:5|4:1|11] = inst[31|30:25|11:8|7]
        let imm = (((inst & 0x8000_0000) as i32 as i64 >> 19) as u64)
            | ((inst & 0x80) << 4)
            | ((inst >> 20) & 0x7e0)
            | ((inst >> 7) & 0x1e);
        let taken = match funct3 {
            0x0 => self.regs[rs1] == self.regs[rs2],
            0x1 => self.regs[rs1] != self.regs[rs2],
            0x4 => (self.regs[rs1] as i64) < (self.regs[rs2] as i64),
            0x5 => (self.regs[rs1] as i64) >= (self.regs[rs2] as i64),
            0x6 => self.regs[rs1] < self.regs[rs2],
            0x7 => self.regs[rs1] >= self.regs[rs2],
            _ => return Err(Exception::IllegalInstruction(inst)),
        };
        if taken {
            Ok(self.pc.wrapping_add(imm))
        } else {
            self.update_pc()
        }
    }

    fn execute_system(
        &mut self,
        inst: u64,
        rd: usize,
        rs1: usize,
        rs2: usize,
        funct3: u64,
        funct7: u64,
    ) -> Result<u64, Exception> {
        let csr_addr = ((inst & 0xfff0_0000) >> 20) as usize;
        match funct3 {
            0x0 => {
                if rs1 == 0 && rd == 0 && rs2 == 0x0 && funct7 == 0x0 {
                    // ECALL: which exception fires depends on the privilege mode the trap
                    // handler needs to unwind back to.
                    Err(match self.mode {
                        Mode::User => Exception::EnvironmentCallFromUMode(self.pc),
                        Mode::Supervisor => Exception::EnvironmentCallFromSMode(self.pc),
                        Mode::Machine => Exception::EnvironmentCallFromMMode(self.pc),
                    })
                } else if rs1 == 0 && rd == 0 && rs2 == 0x1 && funct7 == 0x0 {
                    // EBREAK
                    Err(Exception::Breakpoint(self.pc))
                } else if rs2 == 0x2 && funct7 == 0x8 {
                    self.exec_sret()
                } else if rs2 == 0x2 && funct7 == 0x18 {
                    self.exec_mret()
                } else if funct7 == 0x9 {
                    // SFENCE.VMA: no-op, there is no TLB to flush.
                    self.update_pc()
                } else {
                    Err(Exception::IllegalInstruction(inst))
                }
            }
            0x1 => {
                // CSRRW
                let t = self.csr.load(csr_addr);
                self.csr.store(csr_addr, self.regs[rs1]);
                self.regs[rd] = t;
                self.update_pc()
            }
            0x2 => {
                // CSRRS
                let t = self.csr.load(csr_addr);
                self.csr.store(csr_addr, t | self.regs[rs1]);
                self.regs[rd] = t;
                self.update_pc()
            }
            0x3 => {
                // CSRRC
                let t = self.csr.load(csr_addr);
                self.csr.store(csr_addr, t & !self.regs[rs1]);
                self.regs[rd] = t;
                self.update_pc()
            }
            0x5 => {
                // CSRRWI
                let t = self.csr.load(csr_addr);
                self.csr.store(csr_addr, rs1 as u64);
                self.regs[rd] = t;
                self.update_pc()
            }
            0x6 => {
                // CSRRSI
                let t = self.csr.load(csr_addr);
                self.csr.store(csr_addr, t | rs1 as u64);
                self.regs[rd] = t;
                self.update_pc()
            }
            0x7 => {
                // CSRRCI
                let t = self.csr.load(csr_addr);
                self.csr.store(csr_addr, t & !(rs1 as u64));
                self.regs[rd] = t;
                self.update_pc()
            }
            _ => Err(Exception::IllegalInstruction(inst)),
        }
    }

    fn exec_sret(&mut self) -> Result<u64, Exception> {
        let sstatus = self.csr.load(SSTATUS);
        self.mode = Mode::from_bits((sstatus & MASK_SPP) >> 8);
        let spie = (sstatus & MASK_SPIE) >> 5;
        let mut sstatus = (sstatus & !MASK_SIE) | (spie << 1);
        sstatus |= MASK_SPIE;
        sstatus &= !MASK_SPP;
        self.csr.store(SSTATUS, sstatus);
        Ok(self.csr.load(SEPC) & !0b11)
    }

    fn exec_mret(&mut self) -> Result<u64, Exception> {
        let mstatus = self.csr.load(MSTATUS);
        self.mode = Mode::from_bits((mstatus & MASK_MPP) >> 11);
        let mpie = (mstatus & MASK_MPIE) >> 7;
        let mut mstatus = (mstatus & !MASK_MIE) | (mpie << 3);
        mstatus |= MASK_MPIE;
        mstatus &= !MASK_MPP;
        mstatus &= !MASK_MPRV;
        self.csr.store(MSTATUS, mstatus);
        Ok(self.csr.load(MEPC) & !0b11)
    }

    /// Traps into S-mode or M-mode for a synchronous exception. Steps follow the privileged
    /// spec's §3.1.7/§3.1.9/§3.1.14-16 for either trap target.
    fn handle_exception(&mut self, exception: &Exception) {
        let old_pc = self.pc;
        let old_mode = self.mode;
        let cause = exception.cause();
        let trap_in_s_mode = self.mode <= Mode::Supervisor && self.csr.is_medelegated(cause);
        let target = self.trap_target_csrs(trap_in_s_mode);

        self.pc = self.csr.load(target.tvec) & !0b11;
        self.csr.store(target.epc, old_pc);
        self.csr.store(target.cause, cause);
        self.csr.store(target.tval, exception.value());
        self.finish_trap_entry(&target, old_mode);
    }

    /// Traps into S-mode or M-mode for an asynchronous interrupt, honoring vectored mode.
    fn handle_interrupt(&mut self, interrupt: Interrupt) {
        let old_pc = self.pc;
        let old_mode = self.mode;
        let cause = interrupt.cause();
        let trap_in_s_mode = self.mode <= Mode::Supervisor && self.csr.is_midelegated(cause);
        let target = self.trap_target_csrs(trap_in_s_mode);

        let tvec = self.csr.load(target.tvec);
        let tvec_mode = tvec & 0b11;
        let tvec_base = tvec & !0b11;
        self.pc = if tvec_mode == 0 {
            tvec_base
        } else {
            // Vectored mode: interrupts land at `base + 4 * cause_without_the_interrupt_bit`.
            tvec_base + (cause & 0x3f) * 4
        };
        self.csr.store(target.epc, old_pc);
        self.csr.store(target.cause, cause);
        self.csr.store(target.tval, 0);
        self.finish_trap_entry(&target, old_mode);
    }

    fn finish_trap_entry(&mut self, target: &TrapTargetCsrs, old_mode: Mode) {
        let status = self.csr.load(target.status);
        let ie = (status & target.mask_ie) >> target.ie_bit;
        let mut status = (status & !target.mask_pie) | (ie << target.pie_bit);
        status &= !target.mask_ie;
        status = (status & !target.mask_pp) | (old_mode.bits() << target.pp_bit);
        self.csr.store(target.status, status);
    }

    fn trap_target_csrs(&mut self, trap_in_s_mode: bool) -> TrapTargetCsrs {
        if trap_in_s_mode {
            self.mode = Mode::Supervisor;
            TrapTargetCsrs {
                status: SSTATUS,
                tvec: STVEC,
                cause: SCAUSE,
                tval: STVAL,
                epc: SEPC,
                mask_pie: MASK_SPIE,
                pie_bit: 5,
                mask_ie: MASK_SIE,
                ie_bit: 1,
                mask_pp: MASK_SPP,
                pp_bit: 8,
            }
        } else {
            self.mode = Mode::Machine;
            TrapTargetCsrs {
                status: MSTATUS,
                tvec: MTVEC,
                cause: MCAUSE,
                tval: MTVAL,
                epc: MEPC,
                mask_pie: MASK_MPIE,
                pie_bit: 7,
                mask_ie: MASK_MIE,
                ie_bit: 3,
                mask_pp: MASK_MPP,
                pp_bit: 11,
            }
        }
    }

    /// Scans for a pending, enabled, undelegated interrupt and returns the highest-priority
    /// one, clearing its `mip` bit as a side effect. Also latches UART and VirtIO activity into
    /// `mip.SEIP` via the PLIC, since both devices raise their interrupt through the external
    /// interrupt line rather than a dedicated `mip` bit of their own.
    fn check_pending_interrupt(&mut self) -> Option<Interrupt> {
        if self.mode == Mode::Machine && self.csr.load(MSTATUS) & MASK_MIE == 0 {
            return None;
        }
        if self.mode == Mode::Supervisor && self.csr.load(SSTATUS) & MASK_SIE == 0 {
            return None;
        }

        if self.bus.uart_is_interrupting() {
            self.bus
                .store(PLIC_SCLAIM, 32, UART_IRQ)
                .expect("plic sclaim store cannot fail");
            self.csr.store(MIP, self.csr.load(MIP) | MASK_SEIP);
        } else if self.bus.virtio_is_interrupting() {
            self.bus.disk_access();
            self.bus
                .store(PLIC_SCLAIM, 32, VIRTIO_IRQ)
                .expect("plic sclaim store cannot fail");
            self.csr.store(MIP, self.csr.load(MIP) | MASK_SEIP);
        }

        // Multiple simultaneous M-mode interrupts are prioritized MEI > MSI > MTI > SEI > SSI > STI.
        let pending = self.csr.load(MIE) & self.csr.load(MIP);
        const PRIORITY: [(u64, Interrupt); 6] = [
            (MASK_MEIP, Interrupt::MachineExternal),
            (MASK_MSIP, Interrupt::MachineSoftware),
            (MASK_MTIP, Interrupt::MachineTimer),
            (MASK_SEIP, Interrupt::SupervisorExternal),
            (MASK_SSIP, Interrupt::SupervisorSoftware),
            (MASK_STIP, Interrupt::SupervisorTimer),
        ];
        for (mask, interrupt) in PRIORITY {
            if pending & mask != 0 {
                self.csr.store(MIP, self.csr.load(MIP) & !mask);
                return Some(interrupt);
            }
        }
        None
    }

    /// Dumps all 32 integer registers, four per line, for post-mortem debugging.
    pub fn dump_registers(&self) {
        let mut regs = self.regs;
        regs[0] = 0;
        for i in (0..32).step_by(4) {
            tracing::info!(
                "x{:<2}({:<4}) = {:<#18x}  x{:<2}({:<4}) = {:<#18x}  x{:<2}({:<4}) = {:<#18x}  x{:<2}({:<4}) = {:<#18x}",
                i, RVABI[i], regs[i],
                i + 1, RVABI[i + 1], regs[i + 1],
                i + 2, RVABI[i + 2], regs[i + 2],
                i + 3, RVABI[i + 3], regs[i + 3],
            );
        }
    }
}

/// The result of one [`Cpu::step`]: whether the hart is still running, halted cleanly, or
/// halted on a fatal fault. `rvemu-cli` maps the latter to a non-zero exit code.
#[derive(Debug)]
pub enum StepOutcome {
    Continue,
    Halted,
    FatalFault(Exception),
}

struct TrapTargetCsrs {
    status: usize,
    tvec: usize,
    cause: usize,
    tval: usize,
    epc: usize,
    mask_pie: u64,
    pie_bit: u64,
    mask_ie: u64,
    ie_bit: u64,
    mask_pp: u64,
    pp_bit: u64,
}
