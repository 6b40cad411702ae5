mod cli;
mod error;

use clap::Parser;
use error::CliError;

use cli::Cli;
use rvemu_cpu::Cpu;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(cli.log_filter()))
        .init();

    let code = std::fs::read(&cli.kernel).map_err(|source| CliError::ReadKernel {
        path: cli.kernel.clone(),
        source,
    })?;
    let disk_image = match &cli.disk {
        Some(path) => std::fs::read(path).map_err(|source| CliError::ReadDisk {
            path: path.clone(),
            source,
        })?,
        None => Vec::new(),
    };

    tracing::info!(kernel = %cli.kernel.display(), "booting");

    let mut cpu = Cpu::new(code, disk_image);
    let halted_cleanly = cpu.run();
    cpu.dump_registers();

    if !halted_cleanly {
        std::process::exit(1);
    }

    Ok(())
}
