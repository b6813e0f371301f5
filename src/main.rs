mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so answers on stdout stay clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Build {
            corpus,
            db,
            mode,
            stage,
            dry_run,
        } => commands::build::run(&corpus, &db, mode, stage, dry_run)?,
        cli::Commands::Ask {
            question,
            db,
            format,
            no_llm,
            llm_provider,
            llm_model,
        } => {
            commands::ask::run(
                &question,
                &db,
                &format,
                no_llm,
                llm_provider.as_deref(),
                llm_model.as_deref(),
            )
            .await?
        }
    }

    Ok(())
}
