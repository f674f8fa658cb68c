//! warden: security-gated tool execution and layered configuration for a
//! terminal coding assistant.

mod approver;
mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = commands::dispatch(&cli).await {
        if let Some(exit_err) = err.downcast_ref::<commands::ExitCodeError>() {
            if !exit_err.message.is_empty() {
                eprintln!("{}", exit_err.message);
            }
            std::process::exit(exit_err.code);
        }
        return Err(err);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warden=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warden=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
