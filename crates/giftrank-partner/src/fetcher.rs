//! Rate-limited partner calls that log failures and degrade to empty results.

use std::collections::HashMap;

use crate::client::PartnerClient;
use crate::error::PartnerError;
use crate::rate_limit::RateLimiter;
use crate::types::SearchProduct;

/// Tokens reserved per keyword cycle: one search plus one potential deep-link
/// batch, taken up front whether or not the batch is needed.
pub const TOKENS_PER_KEYWORD: u32 = 2;

/// The two partner operations the collector depends on.
///
/// [`PartnerClient`] is the production implementation; tests substitute
/// in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait ProductSource {
    async fn search_products(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<SearchProduct>, PartnerError>;

    async fn shorten_urls(&self, urls: &[String])
        -> Result<HashMap<String, String>, PartnerError>;
}

impl ProductSource for PartnerClient {
    async fn search_products(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<SearchProduct>, PartnerError> {
        PartnerClient::search_products(self, keyword, limit).await
    }

    async fn shorten_urls(
        &self,
        urls: &[String],
    ) -> Result<HashMap<String, String>, PartnerError> {
        PartnerClient::shorten_urls(self, urls).await
    }
}

/// Gates a [`ProductSource`] behind a shared token budget and degrades every
/// failure to an empty result.
///
/// One fetcher is built per collection run and dropped when it ends.
pub struct RateLimitedFetcher<S> {
    source: S,
    limiter: RateLimiter,
    search_limit: u32,
}

impl<S: ProductSource> RateLimitedFetcher<S> {
    #[must_use]
    pub fn new(source: S, limiter: RateLimiter, search_limit: u32) -> Self {
        Self {
            source,
            limiter,
            search_limit,
        }
    }

    /// Blocks until the budget for one keyword cycle is available.
    pub async fn reserve_keyword_budget(&self) {
        self.limiter.acquire(TOKENS_PER_KEYWORD).await;
    }

    /// Searches `keyword`; any failure is logged and yields an empty list.
    pub async fn search(&self, keyword: &str) -> Vec<SearchProduct> {
        match self.source.search_products(keyword, self.search_limit).await {
            Ok(products) => {
                tracing::info!(keyword, found = products.len(), "partner search complete");
                products
            }
            Err(e) => {
                tracing::warn!(keyword, error = %e, "partner search failed; treating as empty");
                Vec::new()
            }
        }
    }

    /// Converts `urls` in one batch; any failure is logged and yields an
    /// empty mapping, leaving every product on its fallback URL.
    pub async fn shorten(&self, urls: &[String]) -> HashMap<String, String> {
        if urls.is_empty() {
            return HashMap::new();
        }
        match self.source.shorten_urls(urls).await {
            Ok(mapping) => {
                tracing::debug!(
                    requested = urls.len(),
                    converted = mapping.len(),
                    "deep-link batch complete"
                );
                mapping
            }
            Err(e) => {
                tracing::warn!(
                    requested = urls.len(),
                    error = %e,
                    "deep-link conversion failed; keeping fallback URLs"
                );
                HashMap::new()
            }
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }
}
