//! `paperdeck`: browse a shared whitepaper collection in the terminal,
//! seed it with sample data, or run one-shot searches.

mod providers;
mod search_cmd;
mod seed;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use paperdeck_core::Config;
use paperdeck_core::TopicCatalog;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "paperdeck", version, about = "Research-paper browser")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload the bundled sample whitepapers to the document store.
    Seed,
    /// Run one search against the hosted index and print the hits.
    Search(search_cmd::SearchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context(
        "paperdeck is not configured; set PAPERDECK_PROJECT_ID and PAPERDECK_API_KEY",
    )?;

    match cli.command {
        Some(Command::Seed) => seed::run(&config).await,
        Some(Command::Search(args)) => search_cmd::run(&config, args).await,
        None => {
            let providers = providers::build(&config)?;
            paperdeck_tui::run(
                config.collection_path(),
                providers,
                TopicCatalog::builtin(),
            )
            .await
            .map_err(|err| anyhow::anyhow!(err))
        }
    }
}
