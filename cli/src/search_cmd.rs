//! One-shot search from the terminal, bypassing the TUI.

use anyhow::Context;
use anyhow::bail;
use clap::Args;
use paperdeck_backend_client::AlgoliaClient;
use paperdeck_core::Config;
use paperdeck_core::Whitepaper;
use paperdeck_core::config::SEARCH_APP_ID_ENV;
use paperdeck_core::config::SEARCH_KEY_ENV;
use paperdeck_core::provider::SearchProvider;
use paperdeck_core::provider::SearchQuery;

use crate::providers;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query sent to the hosted index.
    pub term: String,

    /// Restrict hits to one topic category.
    #[arg(long)]
    pub topic: Option<String>,
}

pub async fn run(config: &Config, args: SearchArgs) -> anyhow::Result<()> {
    let Some(search_config) = &config.search else {
        bail!("search is unavailable; set {SEARCH_APP_ID_ENV} and {SEARCH_KEY_ENV}");
    };
    let client = AlgoliaClient::new(providers::http_client()?, search_config);
    let hits = client
        .search(&SearchQuery {
            term: args.term.clone(),
            topic: args.topic,
        })
        .await
        .context("search failed")?;

    if hits.is_empty() {
        println!("no hits for \"{}\"", args.term);
        return Ok(());
    }
    for paper in hits.into_iter().map(Whitepaper::from_hit) {
        let date = paper
            .publication_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        println!("{date}  [{}] {}", paper.topic, paper.title);
        if let Some(link) = &paper.link {
            println!("            {link}");
        }
    }
    Ok(())
}
