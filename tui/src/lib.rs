//! Terminal presentation layer for the whitepaper browser.
//!
//! The TUI owns no list logic: it sends intents to a
//! [`paperdeck_core::SessionHandle`] and renders whatever
//! [`paperdeck_core::DisplayState`] the session publishes.

mod app;
mod view;

pub use app::App;

use color_eyre::Result;
use paperdeck_core::ProviderSet;
use paperdeck_core::TopicCatalog;

/// Install the error hooks, take over the terminal, run the app until the
/// user quits, and restore the terminal.
pub async fn run(
    collection_path: String,
    providers: ProviderSet,
    catalog: TopicCatalog,
) -> Result<()> {
    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = App::new(collection_path, providers, catalog).run(terminal).await;
    ratatui::restore();
    result
}
