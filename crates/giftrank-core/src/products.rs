//! Catalog product record and the ordered, id-indexed `Catalog`.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category label used when the partner API omits `categoryName`.
pub const DEFAULT_CATEGORY_NAME: &str = "기타";

/// A partner product surfaced by one or more trending keywords.
///
/// Field names follow the partner API so catalog snapshots stay readable by
/// anything that consumed the raw search payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Partner product ID. The API sends a number; stored as a string key.
    #[serde(deserialize_with = "deserialize_product_id")]
    pub product_id: String,
    #[serde(rename = "productName", default)]
    pub name: String,
    /// Price in KRW.
    #[serde(rename = "productPrice", default, deserialize_with = "deserialize_price")]
    pub price: u64,
    #[serde(rename = "productImage", default)]
    pub image: String,
    /// Deep link when one was ever obtained, otherwise the listing URL.
    /// Empty only in hand-edited or older snapshots.
    #[serde(rename = "productUrl", default)]
    pub url: String,
    /// Best (lowest) search position observed in the current run.
    #[serde(default)]
    pub rank: u32,
    /// Keywords that surfaced this product, in first-seen order.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_category_name")]
    pub category_name: String,
}

impl Product {
    /// Appends `keyword` unless it is already present. Returns `true` when the
    /// keyword was added.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        if self.keywords.iter().any(|k| k == keyword) {
            return false;
        }
        self.keywords.push(keyword.to_string());
        true
    }

    /// Keeps the better of the stored and observed rank. Returns `true` when
    /// the stored rank improved.
    pub fn observe_rank(&mut self, rank: u32) -> bool {
        if rank < self.rank {
            self.rank = rank;
            return true;
        }
        false
    }
}

fn default_category_name() -> String {
    DEFAULT_CATEGORY_NAME.to_string()
}

/// Accepts a product ID encoded as either a JSON number or a string.
///
/// # Errors
///
/// Fails when the value is neither, or is an empty string.
pub fn deserialize_product_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected product id as number or non-empty string, got {other}"
        ))),
    }
}

/// Accepts a non-negative price encoded as an integer, a float (rounded), or
/// a numeric string.
///
/// # Errors
///
/// Fails on negative, non-finite, or non-numeric values.
pub fn deserialize_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(price_from_f64)),
        serde_json::Value::String(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .and_then(price_from_f64),
        _ => None,
    };
    parsed.ok_or_else(|| serde::de::Error::custom(format!("invalid price: {value}")))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn price_from_f64(raw: f64) -> Option<u64> {
    (raw.is_finite() && raw >= 0.0).then(|| raw.round() as u64)
}

/// Product set keyed by `product_id`, preserving insertion order.
///
/// Serialized as a plain JSON array of [`Product`] records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from an ordered product list. When a product ID
    /// repeats, the first record wins and later ones are dropped.
    #[must_use]
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut catalog = Self::new();
        for product in products {
            let product_id = product.product_id.clone();
            if !catalog.insert(product) {
                tracing::warn!(product_id = %product_id, "duplicate product in catalog input; keeping first record");
            }
        }
        catalog
    }

    /// Inserts a product that is not yet present. Returns `false` (and leaves
    /// the catalog unchanged) when the ID is already known.
    pub fn insert(&mut self, product: Product) -> bool {
        if self.index.contains_key(&product.product_id) {
            return false;
        }
        self.index
            .insert(product.product_id.clone(), self.products.len());
        self.products.push(product);
        true
    }

    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.index.contains_key(product_id)
    }

    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.index.get(product_id).map(|&i| &self.products[i])
    }

    pub fn get_mut(&mut self, product_id: &str) -> Option<&mut Product> {
        self.index
            .get(product_id)
            .copied()
            .map(move |i| &mut self.products[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.products.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let products = Vec::<Product>::deserialize(deserializer)?;
        Ok(Self::from_products(products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, rank: u32) -> Product {
        Product {
            product_id: id.to_string(),
            name: format!("product {id}"),
            price: 10_000,
            image: String::new(),
            url: format!("https://www.coupang.com/vp/products/{id}"),
            rank,
            keywords: vec!["가방".to_string()],
            category_name: DEFAULT_CATEGORY_NAME.to_string(),
        }
    }

    #[test]
    fn add_keyword_ignores_duplicates_and_keeps_order() {
        let mut p = product("1", 1);
        assert!(p.add_keyword("지갑"));
        assert!(!p.add_keyword("가방"));
        assert!(!p.add_keyword("지갑"));
        assert_eq!(p.keywords, vec!["가방", "지갑"]);
    }

    #[test]
    fn observe_rank_keeps_minimum() {
        let mut p = product("1", 3);
        assert!(p.observe_rank(1));
        assert!(!p.observe_rank(2));
        assert_eq!(p.rank, 1);
    }

    #[test]
    fn catalog_insert_rejects_known_id() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(product("1", 1)));
        assert!(!catalog.insert(product("1", 5)));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("1").map(|p| p.rank), Some(1));
    }

    #[test]
    fn catalog_preserves_insertion_order() {
        let catalog = Catalog::from_products(vec![product("b", 1), product("a", 2), product("c", 3)]);
        let ids: Vec<&str> = catalog.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn product_deserializes_partner_shape_with_numeric_id() {
        let json = r#"{
            "productId": 7654321,
            "productName": "가죽 토트백",
            "productPrice": 59000,
            "productImage": "https://img.example/1.jpg",
            "productUrl": "https://link.coupang.com/a/abc",
            "rank": 2,
            "keywords": ["가방"]
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.product_id, "7654321");
        assert_eq!(p.price, 59_000);
        assert_eq!(p.category_name, DEFAULT_CATEGORY_NAME);
    }

    #[test]
    fn price_accepts_float_and_string() {
        #[derive(Deserialize)]
        struct Wrap {
            #[serde(deserialize_with = "deserialize_price")]
            price: u64,
        }
        let a: Wrap = serde_json::from_str(r#"{"price": 1999.6}"#).unwrap();
        let b: Wrap = serde_json::from_str(r#"{"price": "12,900"}"#).unwrap();
        assert_eq!(a.price, 2000);
        assert_eq!(b.price, 12_900);
        assert!(serde_json::from_str::<Wrap>(r#"{"price": -1}"#).is_err());
    }

    #[test]
    fn catalog_serializes_as_array() {
        let catalog = Catalog::from_products(vec![product("1", 1)]);
        let value = serde_json::to_value(&catalog).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["productId"], "1");
        assert_eq!(value[0]["categoryName"], DEFAULT_CATEGORY_NAME);
    }

    #[test]
    fn stored_record_without_url_or_rank_still_parses() {
        let p: Product =
            serde_json::from_str(r#"{"productId": "2", "productName": "머그컵", "productPrice": 9900}"#)
                .unwrap();
        assert_eq!(p.product_id, "2");
        assert!(p.url.is_empty());
        assert_eq!(p.rank, 0);
        assert!(serde_json::from_str::<Product>(r#"{"productName": "x"}"#).is_err());
    }
}
