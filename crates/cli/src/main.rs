use clap::Parser;
use color_eyre::eyre::Result;

use args::Args;

mod args;
mod cmd;
mod logging;
mod metrics;

#[tokio::main]
pub async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let config = args.load_config()?;

    logging::init(config.logging.log_level, config.logging.log_format);

    cmd::start::run(config).await
}
