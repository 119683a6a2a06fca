//! pagesmith binary entry point.

mod parser;
mod serve;

use clap::{CommandFactory, Parser};

use pagesmith_axum::bootstrap::{CorsConfig, ServerConfig};

use parser::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            llama_cli,
            models_dir,
            gpu_layers,
            static_dir,
            api_only,
            open,
        }) => {
            let config = ServerConfig {
                host,
                port,
                llama_cli,
                models_dir,
                gpu_layers,
                static_dir: (!api_only).then_some(static_dir),
                cors: CorsConfig::default(),
            };
            serve::run(config, open).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
