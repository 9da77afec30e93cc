//! Provider construction: the one place real network clients are built.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use paperdeck_backend_client::AlgoliaClient;
use paperdeck_backend_client::FirestoreClient;
use paperdeck_backend_client::IdentityClient;
use paperdeck_core::Config;
use paperdeck_core::ProviderSet;
use paperdeck_core::provider::SearchProvider;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("building the HTTP client")
}

pub fn build(config: &Config) -> anyhow::Result<ProviderSet> {
    let http = http_client()?;
    let identity = Arc::new(IdentityClient::new(
        http.clone(),
        config.store.api_key.clone(),
    ));
    let store = Arc::new(FirestoreClient::new(http.clone(), &config.store));
    let search = config
        .search
        .as_ref()
        .map(|search| Arc::new(AlgoliaClient::new(http, search)) as Arc<dyn SearchProvider>);
    Ok(ProviderSet {
        identity,
        store,
        search,
    })
}
