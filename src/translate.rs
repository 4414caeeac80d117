use std::{num::NonZeroU32, sync::Arc, time::Duration};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, Serialize};

use crate::models::LanguageCode;

/// Source language sentinel asking the provider to detect it.
pub const AUTO_DETECT: &str = "auto";

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Http(#[from] wreq::Error),
    #[error("translation provider returned no text")]
    Empty,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target: &LanguageCode,
        source: &str,
    ) -> Result<String, TranslationError>;
}

/// Client for a LibreTranslate-compatible `/translate` endpoint.
pub struct HttpTranslator {
    client: wreq::Client,
    base_url: String,
    api_key: Option<String>,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpTranslator {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        rps: u32,
    ) -> Result<Self, TranslationError> {
        let client = wreq::Client::builder().timeout(Duration::from_secs(30)).build()?;
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN),
        )));
        Ok(Self { client, base_url, api_key, limiter })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        target: &LanguageCode,
        source: &str,
    ) -> Result<String, TranslationError> {
        self.limiter.until_ready().await;

        let url = format!("{}/translate", self.base_url.trim_end_matches('/'));
        let body = TranslateRequest {
            q: text,
            source,
            target: target.as_str(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let resp: TranslateResponse =
            self.client.post(url).json(&body).send().await?.error_for_status()?.json().await?;

        match resp.translated_text {
            Some(t) if !t.is_empty() || text.is_empty() => Ok(t),
            _ => {
                tracing::warn!(target_language = %target, "provider returned an empty translation");
                Err(TranslationError::Empty)
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
}
