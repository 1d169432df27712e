use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tributary::app::AppContext;
use tributary::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compose { urls, meta } => {
            let ctx = AppContext::new(cli.config.as_deref())?;
            commands::compose(&ctx, &urls, &meta).await?;
        }
        Commands::Hash { url, headers } => {
            commands::hash(&url, &headers)?;
        }
    }

    Ok(())
}
