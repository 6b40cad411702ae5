use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use rvemu_core::{Device, Exception};

use crate::{MASK_UART_LSR_RX, MASK_UART_LSR_TX, UART_LSR, UART_RHR, UART_SIZE, UART_THR};

struct Shared {
    registers: Mutex<[u8; UART_SIZE as usize]>,
    condvar: Condvar,
    interrupting: AtomicBool,
    writer: Mutex<Box<dyn Write + Send>>,
}

/// A 16550-style UART, reduced to the handful of registers `xv6` drives: the
/// receiver/transmitter holding register at offset 0 and the line status register at offset 5.
///
/// Input arrives on a background thread reading one byte at a time from whatever source
/// [`Uart::new`]/[`Uart::with_io`] was given, and handed to the guest through
/// [`MASK_UART_LSR_RX`]. The guest must read the pending byte before the thread will accept the
/// next one, so the two sides rendezvous on a condvar rather than the receive thread racing
/// ahead and silently dropping bytes.
pub struct Uart {
    shared: Arc<Shared>,
}

impl Uart {
    /// Spawns the background receive thread reading the host's stdin and returns the register
    /// file it feeds, writing transmitted bytes to the host's stdout.
    pub fn new() -> Self {
        Self::with_io(std::io::stdin(), std::io::stdout())
    }

    /// Like [`Uart::new`], but reads and writes through the given sources instead of the host's
    /// stdin/stdout. Used by tests that need to feed synthetic input or capture transmitted
    /// output without touching the process's real standard streams.
    pub fn with_io(reader: impl Read + Send + 'static, writer: impl Write + Send + 'static) -> Self {
        let shared = Arc::new(Shared {
            registers: Mutex::new([0u8; UART_SIZE as usize]),
            condvar: Condvar::new(),
            interrupting: AtomicBool::new(false),
            writer: Mutex::new(Box::new(writer)),
        });
        shared.registers.lock().unwrap()[(UART_LSR - UART_RHR) as usize] = MASK_UART_LSR_TX;

        let receiver = Arc::clone(&shared);
        thread::spawn(move || receive_loop(receiver, reader));

        Self { shared }
    }

    /// Consumes and clears the interrupt-pending flag, returning whether it was set.
    pub fn is_interrupting(&self) -> bool {
        self.shared.interrupting.swap(false, Ordering::SeqCst)
    }
}

impl Default for Uart {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for Uart {
    fn load(&mut self, addr: u64, size: u64) -> Result<u64, Exception> {
        if size != 8 {
            return Err(Exception::LoadAccessFault(addr));
        }
        let mut registers = self.shared.registers.lock().unwrap();
        let index = (addr - crate::UART_BASE) as usize;
        if index as u64 == UART_RHR - crate::UART_BASE {
            self.shared.condvar.notify_one();
            registers[(UART_LSR - crate::UART_BASE) as usize] &= !MASK_UART_LSR_RX;
            Ok(registers[index] as u64)
        } else {
            Ok(registers[index] as u64)
        }
    }

    fn store(&mut self, addr: u64, size: u64, value: u64) -> Result<(), Exception> {
        if size != 8 {
            return Err(Exception::StoreAmoAccessFault(addr));
        }
        let mut registers = self.shared.registers.lock().unwrap();
        let index = (addr - crate::UART_BASE) as usize;
        if index as u64 == UART_THR - crate::UART_BASE {
            let mut writer = self.shared.writer.lock().unwrap();
            writer.write_all(&[(value & 0xff) as u8]).ok();
            writer.flush().ok();
        } else {
            registers[index] = (value & 0xff) as u8;
        }
        Ok(())
    }
}

fn receive_loop(shared: Arc<Shared>, mut reader: impl Read) {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => {
                tracing::debug!("uart: input reached eof, receive thread exiting");
                return;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "uart: input read failed, receive thread exiting");
                return;
            }
        }

        let mut registers = shared.registers.lock().unwrap();
        let lsr_index = (UART_LSR - crate::UART_BASE) as usize;
        while registers[lsr_index] & MASK_UART_LSR_RX != 0 {
            registers = shared.condvar.wait(registers).unwrap();
        }
        let rhr_index = (UART_RHR - crate::UART_BASE) as usize;
        registers[rhr_index] = byte[0];
        registers[lsr_index] |= MASK_UART_LSR_RX;
        shared.interrupting.store(true, Ordering::SeqCst);
        shared.condvar.notify_one();
    }
}
