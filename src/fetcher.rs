use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::GatewayConfig;
use crate::item::{CanonicalItem, RawItem};
use crate::registry::{Registry, Source};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gateway returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed gateway response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("gateway reported an error: {0}")]
    Gateway(String),
    #[error("gateway response has no items")]
    MissingItems,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Option<Vec<RawItem>>,
}

/// How one source fared in a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub items: usize,
    pub error: Option<String>,
}

impl SourceReport {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of fetching the whole registry once.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Union of every source's items, registry order then gateway order.
    pub items: Vec<CanonicalItem>,
    /// One report per source, registry order.
    pub reports: Vec<SourceReport>,
}

pub struct Fetcher {
    client: Client,
    endpoint: String,
}

impl Fetcher {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Newsboard/1.0 (News Aggregator)")
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Fetch every source concurrently and wait for all of them.
    ///
    /// A failing source is logged and contributes no items; it never
    /// affects the others.
    pub async fn fetch_all(&self, registry: &Registry) -> FetchOutcome {
        info!("Fetching {} sources", registry.len());

        let results = join_all(registry.iter().map(|source| async move {
            (source, self.fetch_source(source).await)
        }))
        .await;

        let mut outcome = FetchOutcome::default();
        for (source, result) in results {
            match result {
                Ok(items) => {
                    info!("Fetched {} items from '{}'", items.len(), source.name);
                    outcome.reports.push(SourceReport {
                        name: source.name.clone(),
                        items: items.len(),
                        error: None,
                    });
                    outcome.items.extend(items);
                }
                Err(e) => {
                    error!("Failed to fetch source '{}': {}", source.name, e);
                    outcome.reports.push(SourceReport {
                        name: source.name.clone(),
                        items: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        outcome
    }

    pub async fn fetch_source(&self, source: &Source) -> Result<Vec<CanonicalItem>, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("rss_url", source.url.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        Self::parse_gateway_body(&body, &source.name)
    }

    /// Turn a gateway body into canonical items tagged with `source_name`.
    pub fn parse_gateway_body(
        body: &str,
        source_name: &str,
    ) -> Result<Vec<CanonicalItem>, FetchError> {
        let response: GatewayResponse = serde_json::from_str(body)?;

        if let Some(status) = response.status.as_deref() {
            if status != "ok" {
                return Err(FetchError::Gateway(
                    response.message.unwrap_or_else(|| status.to_string()),
                ));
            }
        }

        let raw_items = response.items.ok_or(FetchError::MissingItems)?;

        let mut items = Vec::with_capacity(raw_items.len());
        for raw in raw_items {
            let title = raw.title.clone().unwrap_or_default();
            match CanonicalItem::from_raw(raw, source_name) {
                Some(item) => items.push(item),
                None => warn!("Skipping entry with no link: {}", title),
            }
        }

        Ok(items)
    }
}
