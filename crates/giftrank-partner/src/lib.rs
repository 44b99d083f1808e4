//! Partner affiliate API collaborator.
//!
//! Provides the HMAC-signed HTTP client for product search and deep-link
//! conversion, the shared token-bucket rate limiter, and the
//! [`RateLimitedFetcher`] that gates both calls behind one budget and turns
//! transport failures into empty results.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod rate_limit;
pub mod signing;
pub mod types;

pub use client::PartnerClient;
pub use error::PartnerError;
pub use fetcher::{ProductSource, RateLimitedFetcher, TOKENS_PER_KEYWORD};
pub use rate_limit::RateLimiter;
pub use types::{canonical_product_url, SearchProduct};
