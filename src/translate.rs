use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TranslationConfig;
use crate::item::{CanonicalItem, DisplayItem};

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("translation service returned HTTP {0}")]
    Status(StatusCode),
    #[error("malformed translation response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("translation service reported status {0}")]
    Rejected(String),
    #[error("translation service returned no text")]
    Empty,
}

/// How titles of one cycle are sent to the translation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationPolicy {
    /// One request at a time, in board order.
    Sequential,
    /// Up to `concurrency` requests in flight; results keep board order.
    #[default]
    Concurrent,
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
    #[serde(rename = "responseStatus", default)]
    response_status: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText", default)]
    translated_text: Option<String>,
}

pub struct Translator {
    client: Client,
    endpoint: String,
    langpair: String,
    policy: TranslationPolicy,
    concurrency: usize,
}

impl Translator {
    pub fn new(config: &TranslationConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Newsboard/1.0 (News Aggregator)")
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            langpair: format!("{}|{}", config.source_lang, config.target_lang),
            policy: config.policy,
            concurrency: config.concurrency.max(1),
        })
    }

    pub async fn try_translate(&self, text: &str) -> Result<String, TranslateError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", self.langpair.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status));
        }

        let body = response.text().await?;
        Self::parse_translation_body(&body)
    }

    /// Translate `text`, falling back to it unchanged on any failure.
    pub async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        match self.try_translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Translation failed, keeping original title '{}': {}", text, e);
                text.to_string()
            }
        }
    }

    /// Translate the titles of `items` under the configured policy.
    /// Output order always matches input order.
    pub async fn translate_all(&self, items: Vec<CanonicalItem>) -> Vec<DisplayItem> {
        debug!(
            "Translating {} titles ({:?}, langpair {})",
            items.len(),
            self.policy,
            self.langpair
        );

        match self.policy {
            TranslationPolicy::Sequential => {
                let mut translated = Vec::with_capacity(items.len());
                for item in items {
                    let title = self.translate(&item.title).await;
                    translated.push(DisplayItem::with_title(item, title));
                }
                translated
            }
            TranslationPolicy::Concurrent => {
                stream::iter(items)
                    .map(|item| async move {
                        let title = self.translate(&item.title).await;
                        DisplayItem::with_title(item, title)
                    })
                    .buffered(self.concurrency)
                    .collect()
                    .await
            }
        }
    }

    pub fn parse_translation_body(body: &str) -> Result<String, TranslateError> {
        let response: TranslationResponse = serde_json::from_str(body)?;

        if let Some(status) = response.response_status {
            let accepted = match &status {
                serde_json::Value::Number(n) => n.as_u64() == Some(200),
                serde_json::Value::String(s) => s == "200",
                _ => false,
            };
            if !accepted {
                return Err(TranslateError::Rejected(status.to_string()));
            }
        }

        response
            .response_data
            .and_then(|d| d.translated_text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(TranslateError::Empty)
    }
}
