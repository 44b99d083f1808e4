//! Product catalog snapshot (`products.json`).

use std::path::Path;

use giftrank_core::{Catalog, Product};

use crate::error::StoreError;
use crate::snapshot::{load_or_default, read_json, write_json_atomic};

/// Reads the catalog snapshot at `path`.
///
/// Records are parsed one at a time; a record that cannot be read (no
/// `productId`, unusable price) is skipped with a warning so the rest of the
/// stored deep links stay available.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read (including when it
/// does not exist) or [`StoreError::Parse`] if the top level is not a JSON
/// array.
pub fn read_catalog(path: &Path) -> Result<Catalog, StoreError> {
    let values: Vec<serde_json::Value> = read_json(path)?;
    let total = values.len();
    let products: Vec<Product> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(path = %path.display(), index, error = %e, "skipping unreadable catalog record");
                None
            }
        })
        .collect();

    let catalog = Catalog::from_products(products);
    tracing::debug!(
        path = %path.display(),
        total,
        products = catalog.len(),
        "loaded catalog snapshot"
    );
    Ok(catalog)
}

/// Reads the catalog snapshot, treating a missing or malformed file as an
/// empty catalog.
#[must_use]
pub fn load_catalog_or_default(path: &Path) -> Catalog {
    load_or_default(path, "catalog", read_catalog)
}

/// Overwrites the catalog snapshot at `path` in full.
///
/// # Errors
///
/// Returns [`StoreError::Io`] or [`StoreError::Serialize`] on failure; the
/// previous snapshot is left untouched in either case.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<(), StoreError> {
    write_json_atomic(path, catalog)?;
    tracing::info!(path = %path.display(), products = catalog.len(), "wrote catalog snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::snapshot::test_dir;

    fn product(id: &str, keywords: &[&str]) -> Product {
        Product {
            product_id: id.to_string(),
            name: format!("상품 {id}"),
            price: 25_000,
            image: format!("https://img.example/{id}.jpg"),
            url: format!("https://link.coupang.com/a/{id}"),
            rank: 2,
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            category_name: "패션잡화".to_string(),
        }
    }

    #[test]
    fn catalog_survives_write_then_read_in_order() {
        let dir = test_dir("catalog-rw");
        let path = dir.join("products.json");
        let catalog = Catalog::from_products(vec![
            product("9", &["가방", "지갑"]),
            product("3", &["텀블러"]),
        ]);

        write_catalog(&path, &catalog).unwrap();
        let back = read_catalog(&path).unwrap();

        assert_eq!(back, catalog);
        let ids: Vec<&str> = back.iter().map(|p| p.product_id.as_str()).collect();
        assert_eq!(ids, vec!["9", "3"]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_catalog_loads_empty() {
        let dir = test_dir("catalog-missing");
        let catalog = load_catalog_or_default(&dir.join("products.json"));
        assert!(catalog.is_empty());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn malformed_catalog_is_an_error_but_loads_empty() {
        let dir = test_dir("catalog-malformed");
        let path = dir.join("products.json");
        fs::write(&path, r#"{"products": []}"#).unwrap();

        assert!(matches!(read_catalog(&path), Err(StoreError::Parse { .. })));
        assert!(load_catalog_or_default(&path).is_empty());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unreadable_record_does_not_discard_the_rest() {
        let dir = test_dir("catalog-partial");
        let path = dir.join("products.json");
        fs::write(
            &path,
            r#"[
                {"productId": 1, "productName": "가방", "productPrice": 30000,
                 "productUrl": "https://link.coupang.com/a/x", "rank": 1, "keywords": ["가방"]},
                {"productId": 2, "productName": "지갑", "productPrice": 20000, "rank": 2},
                {"productName": "id 없음", "productPrice": 1000},
                "not a record"
            ]"#,
        )
        .unwrap();

        let catalog = load_catalog_or_default(&path);

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get("1").map(|p| p.url.as_str()),
            Some("https://link.coupang.com/a/x")
        );
        assert_eq!(catalog.get("2").map(|p| p.url.as_str()), Some(""));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn snapshot_uses_partner_field_names() {
        let dir = test_dir("catalog-fields");
        let path = dir.join("products.json");
        write_catalog(&path, &Catalog::from_products(vec![product("1", &["가방"])])).unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let record = &raw[0];
        assert_eq!(record["productId"], "1");
        assert_eq!(record["productName"], "상품 1");
        assert_eq!(record["productPrice"], 25_000);
        assert_eq!(record["keywords"][0], "가방");
        assert_eq!(record["categoryName"], "패션잡화");
        let _ = fs::remove_dir_all(dir);
    }
}
