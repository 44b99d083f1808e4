//! HTTP client for the partner affiliate gateway.
//!
//! Wraps `reqwest` with request signing, envelope checking, and per-record
//! validation. Every method makes exactly one attempt; callers that need
//! failure tolerance go through [`crate::RateLimitedFetcher`].

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use giftrank_core::PartnerCredentials;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;

use crate::error::PartnerError;
use crate::signing::{authorization, encode_component};
use crate::types::{DeeplinkItem, Envelope, SearchData, SearchProduct};

const DEFAULT_BASE_URL: &str = "https://api-gateway.coupang.com";
pub(crate) const SEARCH_PATH: &str = "/v2/providers/affiliate_open_api/apis/openapi/products/search";
pub(crate) const DEEPLINK_PATH: &str = "/v2/providers/affiliate_open_api/apis/openapi/v1/deeplink";

/// Client for the partner gateway.
///
/// Use [`PartnerClient::new`] for production or
/// [`PartnerClient::with_base_url`] to point at a mock server in tests.
pub struct PartnerClient {
    client: Client,
    credentials: PartnerCredentials,
    base_url: Url,
}

impl PartnerClient {
    /// Creates a client pointed at the production gateway.
    ///
    /// # Errors
    ///
    /// Returns [`PartnerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        credentials: PartnerCredentials,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PartnerError> {
        Self::with_base_url(credentials, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PartnerError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PartnerError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        credentials: PartnerCredentials,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PartnerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = base_url.trim_end_matches('/');
        let base_url = Url::parse(normalised).map_err(|e| PartnerError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            credentials,
            base_url,
        })
    }

    /// Searches partner products for `keyword`, returning at most `limit`
    /// validated records in result order.
    ///
    /// Records that fail validation are skipped.
    ///
    /// # Errors
    ///
    /// - [`PartnerError::Http`] on network failure.
    /// - [`PartnerError::UnexpectedStatus`] on a non-2xx response.
    /// - [`PartnerError::Deserialize`] if the envelope does not parse.
    /// - [`PartnerError::ApiError`] if `rCode` is not `"0"`.
    pub async fn search_products(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<SearchProduct>, PartnerError> {
        let query = Self::search_query(keyword, limit);
        let envelope: Envelope<SearchData> = self
            .send(Method::GET, SEARCH_PATH, &query, None, &format!("search(keyword={keyword})"))
            .await?;

        let raw = envelope.data.unwrap_or_default().product_data;
        let total = raw.len();
        let products: Vec<SearchProduct> =
            raw.into_iter().filter_map(SearchProduct::from_value).collect();

        if products.len() < total {
            tracing::debug!(
                keyword,
                total,
                kept = products.len(),
                "dropped malformed search records"
            );
        }

        Ok(products)
    }

    /// Converts canonical product URLs to deep links in one batch call.
    ///
    /// Returns `originalUrl → shortenUrl`. URLs the gateway did not convert
    /// are simply absent from the map. An empty input makes no request.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search_products`].
    pub async fn shorten_urls(
        &self,
        urls: &[String],
    ) -> Result<HashMap<String, String>, PartnerError> {
        if urls.is_empty() {
            return Ok(HashMap::new());
        }

        let body = serde_json::json!({ "coupangUrls": urls });
        let envelope: Envelope<Vec<serde_json::Value>> = self
            .send(
                Method::POST,
                DEEPLINK_PATH,
                "",
                Some(&body),
                &format!("deeplink({} urls)", urls.len()),
            )
            .await?;

        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| serde_json::from_value::<DeeplinkItem>(v).ok())
            .filter(|item| !item.shorten_url.trim().is_empty())
            .map(|item| (item.original_url, item.shorten_url))
            .collect())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&serde_json::Value>,
        context: &str,
    ) -> Result<Envelope<T>, PartnerError> {
        let url = self.endpoint(path, query)?;
        let auth = authorization(&self.credentials, method.as_str(), path, query, Utc::now())?;

        let mut request = self
            .client
            .request(method, url.clone())
            .header(reqwest::header::AUTHORIZATION, auth)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PartnerError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| PartnerError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;

        if !envelope.is_success() {
            return Err(PartnerError::ApiError {
                code: envelope.code(),
                message: envelope.r_message.clone().unwrap_or_default(),
            });
        }

        Ok(envelope)
    }

    /// Query string exactly as signed and sent.
    fn search_query(keyword: &str, limit: u32) -> String {
        format!("keyword={}&limit={limit}", encode_component(keyword))
    }

    fn endpoint(&self, path: &str, query: &str) -> Result<Url, PartnerError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let raw = if query.is_empty() {
            format!("{base}{path}")
        } else {
            format!("{base}{path}?{query}")
        };
        Url::parse(&raw).map_err(|e| PartnerError::InvalidBaseUrl {
            base_url: self.base_url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
