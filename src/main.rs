use clap::Parser;
use mailshot::{init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _handle = init_logging(cli.log_level.into(), cli.log_file.as_deref())?;
    run(cli)?;
    Ok(())
}
