use std::path::PathBuf;

use clap::Parser;

/// A RV64IMA emulator capable of booting an `xv6`-class kernel.
#[derive(Debug, Parser)]
#[command(name = "rvemu", version, about)]
pub struct Cli {
    /// Kernel image to load at the start of guest RAM and begin executing.
    pub kernel: PathBuf,

    /// Disk image to back the VirtIO block device. Omit to boot without a disk.
    pub disk: Option<PathBuf>,

    /// Increase log verbosity. Repeatable: `-v` for info, `-vv` for debug, `-vvv` for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
