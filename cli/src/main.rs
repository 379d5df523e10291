use clap::Parser;
use infrastructure::config::Config;
use presentation::cli::{Cli, CliApp};
use shared::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity())?;

    let config = cli.apply_overrides(Config::load()?);
    let mut app = CliApp::new(&config)?;
    app.run(cli.command).await?;
    Ok(())
}
