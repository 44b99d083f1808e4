//! Partner gateway response types.
//!
//! Both endpoints wrap their payload in `{ rCode, rMessage, data }`; a call
//! succeeded only when `rCode` is `"0"`. Observed `rCode` values are strings,
//! but numeric codes are tolerated.
//!
//! Product records are parsed one at a time so a single malformed entry
//! (missing `productId`, unusable price, missing `rank`) drops that entry
//! only.

use giftrank_core::products::{deserialize_price, deserialize_product_id};
use giftrank_core::{Product, DEFAULT_CATEGORY_NAME};
use serde::Deserialize;

/// Canonical storefront URL for a product; the deep-link endpoint only
/// accepts URLs in this shape.
#[must_use]
pub fn canonical_product_url(product_id: &str) -> String {
    format!("https://www.coupang.com/vp/products/{product_id}")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope<T> {
    pub r_code: serde_json::Value,
    #[serde(default)]
    pub r_message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub(crate) fn code(&self) -> String {
        match &self.r_code {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn is_success(&self) -> bool {
        self.code() == "0"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchData {
    #[serde(default)]
    pub product_data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeeplinkItem {
    pub original_url: String,
    pub shorten_url: String,
}

/// One validated product from a keyword search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProduct {
    #[serde(deserialize_with = "deserialize_product_id")]
    pub product_id: String,
    pub product_name: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub product_price: u64,
    #[serde(default)]
    pub product_image: Option<String>,
    /// Listing URL as returned by search (often a tracking URL).
    #[serde(default)]
    pub product_url: Option<String>,
    /// 1-based position within this keyword's results.
    pub rank: u32,
    #[serde(default)]
    pub category_name: Option<String>,
}

impl SearchProduct {
    /// Parses one raw `productData` element, returning `None` for records that
    /// fail validation.
    pub(crate) fn from_value(value: serde_json::Value) -> Option<Self> {
        match serde_json::from_value::<SearchProduct>(value) {
            Ok(product) if product.rank > 0 && !product.product_name.trim().is_empty() => {
                Some(product)
            }
            Ok(product) => {
                tracing::debug!(product_id = %product.product_id, "skipping product with zero rank or blank name");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed product record");
                None
            }
        }
    }

    #[must_use]
    pub fn canonical_url(&self) -> String {
        canonical_product_url(&self.product_id)
    }

    /// URL to fall back to when no deep link is available.
    #[must_use]
    pub fn listing_url(&self) -> String {
        self.product_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map_or_else(|| self.canonical_url(), str::to_owned)
    }

    /// Converts into a catalog [`Product`] first surfaced by `keyword`.
    #[must_use]
    pub fn into_product(self, keyword: &str, url: String) -> Product {
        Product {
            product_id: self.product_id,
            name: self.product_name,
            price: self.product_price,
            image: self.product_image.unwrap_or_default(),
            url,
            rank: self.rank,
            keywords: vec![keyword.to_string()],
            category_name: self
                .category_name
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY_NAME.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_value_accepts_partner_record() {
        let product = SearchProduct::from_value(json!({
            "productId": 12345,
            "productName": "무선 이어폰",
            "productPrice": 39900,
            "productImage": "https://img.example/e.jpg",
            "productUrl": "https://link.coupang.com/re/AFF?pageKey=12345",
            "rank": 1,
            "categoryName": "디지털/가전",
            "isRocket": true
        }))
        .expect("valid record");
        assert_eq!(product.product_id, "12345");
        assert_eq!(product.rank, 1);
        assert_eq!(
            product.listing_url(),
            "https://link.coupang.com/re/AFF?pageKey=12345"
        );
    }

    #[test]
    fn from_value_rejects_missing_id_and_zero_rank() {
        assert!(SearchProduct::from_value(json!({
            "productName": "x", "productPrice": 1, "rank": 1
        }))
        .is_none());
        assert!(SearchProduct::from_value(json!({
            "productId": 1, "productName": "x", "productPrice": 1, "rank": 0
        }))
        .is_none());
    }

    #[test]
    fn listing_url_falls_back_to_canonical() {
        let product = SearchProduct::from_value(json!({
            "productId": "77", "productName": "x", "productPrice": 1, "rank": 2, "productUrl": ""
        }))
        .unwrap();
        assert_eq!(product.listing_url(), "https://www.coupang.com/vp/products/77");
    }

    #[test]
    fn into_product_defaults_category() {
        let product = SearchProduct::from_value(json!({
            "productId": 1, "productName": "x", "productPrice": 1, "rank": 3
        }))
        .unwrap()
        .into_product("가방", "https://u".to_string());
        assert_eq!(product.keywords, vec!["가방"]);
        assert_eq!(product.category_name, DEFAULT_CATEGORY_NAME);
        assert_eq!(product.rank, 3);
    }

    #[test]
    fn envelope_success_accepts_string_or_numeric_zero() {
        let s: Envelope<SearchData> = serde_json::from_value(json!({"rCode": "0"})).unwrap();
        let n: Envelope<SearchData> = serde_json::from_value(json!({"rCode": 0})).unwrap();
        let e: Envelope<SearchData> =
            serde_json::from_value(json!({"rCode": "400", "rMessage": "bad"})).unwrap();
        assert!(s.is_success());
        assert!(n.is_success());
        assert!(!e.is_success());
    }

    #[test]
    fn envelope_without_data_parses_for_any_payload() {
        let envelope: Envelope<DeeplinkItem> =
            serde_json::from_value(json!({"rCode": "0", "rMessage": ""})).unwrap();
        assert!(envelope.is_success());
        assert!(envelope.data.is_none());

        let with_data: Envelope<DeeplinkItem> = serde_json::from_value(json!({
            "rCode": "0",
            "data": {"originalUrl": "https://a", "shortenUrl": "https://b"}
        }))
        .unwrap();
        assert_eq!(with_data.data.map(|d| d.shorten_url).as_deref(), Some("https://b"));
    }
}
