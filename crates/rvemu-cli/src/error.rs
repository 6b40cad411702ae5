use std::path::PathBuf;

/// Host-side failures that can keep the emulator from ever starting a hart: these are never
/// architectural (they have no `Exception`/`Interrupt` encoding), they're just "the file
/// wasn't there."
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read kernel image {path}")]
    ReadKernel {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read disk image {path}")]
    ReadDisk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
