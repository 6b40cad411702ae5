/// Common shape shared by `Exception` and `Interrupt` so the trap handler in `rvemu-cpu`
/// can drive both through one recipe (see the module doc there): read the cause and trap
/// value, pick the delegation target, record state, and switch privilege.
pub trait Trap {
    /// The raw `xCAUSE` encoding, including the interrupt bit for interrupts.
    fn cause(&self) -> u64;
    /// The value recorded in `xTVAL` (always zero for interrupts).
    fn value(&self) -> u64;
    /// Whether the step loop should terminate if handling this trap makes no progress.
    fn is_fatal(&self) -> bool;
    /// Whether this is an asynchronous interrupt rather than a synchronous exception.
    fn is_interrupt(&self) -> bool;
}
