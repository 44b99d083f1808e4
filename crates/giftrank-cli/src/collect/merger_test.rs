use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use giftrank_core::{Catalog, Product, DEFAULT_CATEGORY_NAME};
use giftrank_partner::{PartnerError, ProductSource, RateLimitedFetcher, RateLimiter, SearchProduct};

use super::*;

/// In-memory partner stand-in that records every call.
#[derive(Default)]
struct FakeSource {
    results: HashMap<String, Vec<SearchProduct>>,
    failing_searches: Vec<String>,
    fail_shorten: bool,
    /// Set when this keyword is searched, to simulate Ctrl-C mid-run.
    cancel_on: Option<(String, Arc<AtomicBool>)>,
    searches: RefCell<Vec<String>>,
    shorten_batches: RefCell<Vec<Vec<String>>>,
}

impl FakeSource {
    fn with(mut self, keyword: &str, products: Vec<SearchProduct>) -> Self {
        self.results.insert(keyword.to_string(), products);
        self
    }
}

impl ProductSource for FakeSource {
    async fn search_products(
        &self,
        keyword: &str,
        _limit: u32,
    ) -> Result<Vec<SearchProduct>, PartnerError> {
        self.searches.borrow_mut().push(keyword.to_string());
        if let Some((trigger, flag)) = &self.cancel_on {
            if trigger == keyword {
                flag.store(true, Ordering::SeqCst);
            }
        }
        if self.failing_searches.iter().any(|k| k == keyword) {
            return Err(PartnerError::UnexpectedStatus {
                status: 503,
                url: "http://gateway/search".to_string(),
            });
        }
        Ok(self.results.get(keyword).cloned().unwrap_or_default())
    }

    async fn shorten_urls(
        &self,
        urls: &[String],
    ) -> Result<HashMap<String, String>, PartnerError> {
        self.shorten_batches.borrow_mut().push(urls.to_vec());
        if self.fail_shorten {
            return Err(PartnerError::ApiError {
                code: "500".to_string(),
                message: "deeplink unavailable".to_string(),
            });
        }
        Ok(urls
            .iter()
            .map(|u| {
                let id = u.rsplit('/').next().unwrap_or_default();
                (u.clone(), format!("https://link.coupang.com/a/short{id}"))
            })
            .collect())
    }
}

fn hit(id: &str, rank: u32) -> SearchProduct {
    SearchProduct {
        product_id: id.to_string(),
        product_name: format!("상품 {id}"),
        product_price: 19_900,
        product_image: Some(format!("https://img.example/{id}.jpg")),
        product_url: Some(format!("https://link.coupang.com/re/AFF?pageKey={id}")),
        rank,
        category_name: Some("패션잡화".to_string()),
    }
}

fn stored(id: &str, url: &str, keywords: &[&str]) -> Product {
    Product {
        product_id: id.to_string(),
        name: format!("상품 {id}"),
        price: 19_900,
        image: String::new(),
        url: url.to_string(),
        rank: 4,
        keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        category_name: DEFAULT_CATEGORY_NAME.to_string(),
    }
}

fn fetcher(source: FakeSource) -> RateLimitedFetcher<FakeSource> {
    RateLimitedFetcher::new(source, RateLimiter::new(1_000, Duration::from_secs(1)), 5)
}

fn keywords(names: &[&str]) -> Vec<String> {
    names.iter().map(|k| (*k).to_string()).collect()
}

async fn run(
    fetcher: &RateLimitedFetcher<FakeSource>,
    reference: &Catalog,
    names: &[&str],
) -> MergeOutcome {
    merge_catalog(fetcher, reference, &keywords(names), &AtomicBool::new(false)).await
}

#[tokio::test]
async fn new_products_get_fresh_short_links_in_one_batch() {
    let fetcher = fetcher(FakeSource::default().with("가방", vec![hit("1", 1), hit("2", 2)]));

    let outcome = run(&fetcher, &Catalog::new(), &["가방"]).await;

    let batches = fetcher.source().shorten_batches.borrow();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0],
        vec![
            "https://www.coupang.com/vp/products/1".to_string(),
            "https://www.coupang.com/vp/products/2".to_string(),
        ]
    );
    assert_eq!(
        outcome.catalog.get("1").map(|p| p.url.as_str()),
        Some("https://link.coupang.com/a/short1")
    );
    assert_eq!(outcome.report.products_added, 2);
    assert_eq!(outcome.report.shortened_urls, 2);
    assert_eq!(outcome.report.shorten_batches, 1);
}

#[tokio::test]
async fn product_seen_by_several_keywords_is_shortened_once() {
    let fetcher = fetcher(
        FakeSource::default()
            .with("가방", vec![hit("1", 3), hit("2", 1)])
            .with("지갑", vec![hit("1", 1), hit("3", 2)])
            .with("선물", vec![hit("1", 2)]),
    );

    let outcome = run(&fetcher, &Catalog::new(), &["가방", "지갑", "선물"]).await;

    let batches = fetcher.source().shorten_batches.borrow();
    let mentions = batches
        .iter()
        .flatten()
        .filter(|u| u.ends_with("/products/1"))
        .count();
    assert_eq!(mentions, 1);
    // Third keyword surfaced nothing new, so no batch at all.
    assert_eq!(batches.len(), 2);

    let product = outcome.catalog.get("1").unwrap();
    assert_eq!(product.keywords, vec!["가방", "지갑", "선물"]);
    assert_eq!(product.rank, 1);
}

#[tokio::test]
async fn best_rank_is_kept_across_keywords() {
    let fetcher = fetcher(
        FakeSource::default()
            .with("A", vec![hit("p", 3)])
            .with("B", vec![hit("p", 1)])
            .with("C", vec![hit("p", 4)]),
    );

    let outcome = run(&fetcher, &Catalog::new(), &["A", "B", "C"]).await;

    assert_eq!(outcome.catalog.get("p").map(|p| p.rank), Some(1));
    assert_eq!(outcome.report.products_updated, 2);
}

#[tokio::test]
async fn reference_products_reuse_their_stored_url() {
    let reference = Catalog::from_products(vec![stored(
        "1",
        "https://link.coupang.com/a/old1",
        &["옛날키워드"],
    )]);
    let fetcher = fetcher(FakeSource::default().with("가방", vec![hit("1", 2), hit("9", 1)]));

    let outcome = run(&fetcher, &reference, &["가방"]).await;

    let batches = fetcher.source().shorten_batches.borrow();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0], vec!["https://www.coupang.com/vp/products/9".to_string()]);

    let reused = outcome.catalog.get("1").unwrap();
    assert_eq!(reused.url, "https://link.coupang.com/a/old1");
    // Keywords and rank come from this run only.
    assert_eq!(reused.keywords, vec!["가방"]);
    assert_eq!(reused.rank, 2);
    assert_eq!(outcome.report.reused_urls, 1);
}

#[tokio::test]
async fn products_not_surfaced_this_run_are_pruned() {
    let reference = Catalog::from_products(vec![
        stored("old", "https://link.coupang.com/a/old", &["가방"]),
        stored("1", "https://link.coupang.com/a/one", &["가방"]),
    ]);
    let fetcher = fetcher(FakeSource::default().with("가방", vec![hit("1", 1)]));

    let outcome = run(&fetcher, &reference, &["가방"]).await;

    assert!(!outcome.catalog.contains("old"));
    assert_eq!(outcome.catalog.len(), 1);
}

#[tokio::test]
async fn rerun_with_identical_results_is_idempotent() {
    let source = || {
        FakeSource::default()
            .with("가방", vec![hit("1", 2), hit("2", 1)])
            .with("지갑", vec![hit("1", 1), hit("3", 5)])
    };

    let first = run(&fetcher(source()), &Catalog::new(), &["가방", "지갑"]).await;
    let second_fetcher = fetcher(source());
    let second = run(&second_fetcher, &first.catalog, &["가방", "지갑"]).await;

    assert_eq!(second.catalog, first.catalog);
    assert!(second_fetcher.source().shorten_batches.borrow().is_empty());
    assert_eq!(second.report.reused_urls, 3);
}

#[tokio::test]
async fn duplicate_entries_in_one_response_fold_together() {
    let fetcher = fetcher(FakeSource::default().with("가방", vec![hit("1", 4), hit("1", 2)]));

    let outcome = run(&fetcher, &Catalog::new(), &["가방"]).await;

    let batches = fetcher.source().shorten_batches.borrow();
    assert_eq!(batches[0].len(), 1);
    let product = outcome.catalog.get("1").unwrap();
    assert_eq!(product.keywords, vec!["가방"]);
    assert_eq!(product.rank, 2);
    assert_eq!(outcome.catalog.len(), 1);
}

#[tokio::test]
async fn failed_search_degrades_to_empty_and_run_continues() {
    let source = FakeSource {
        failing_searches: vec!["가방".to_string()],
        ..FakeSource::default()
    }
    .with("지갑", vec![hit("7", 1)]);
    let fetcher = fetcher(source);

    let outcome = run(&fetcher, &Catalog::new(), &["가방", "지갑"]).await;

    assert_eq!(*fetcher.source().searches.borrow(), vec!["가방", "지갑"]);
    assert_eq!(outcome.report.keywords_processed, 2);
    assert_eq!(outcome.catalog.len(), 1);
}

#[tokio::test]
async fn failed_shortening_falls_back_to_listing_url() {
    let source = FakeSource {
        fail_shorten: true,
        ..FakeSource::default()
    }
    .with("가방", vec![hit("1", 1)]);
    let fetcher = fetcher(source);

    let outcome = run(&fetcher, &Catalog::new(), &["가방"]).await;

    assert_eq!(
        outcome.catalog.get("1").map(|p| p.url.as_str()),
        Some("https://link.coupang.com/re/AFF?pageKey=1")
    );
    assert_eq!(outcome.report.shortened_urls, 0);
}

#[tokio::test]
async fn cancellation_stops_before_the_next_keyword() {
    let flag = Arc::new(AtomicBool::new(false));
    let source = FakeSource {
        cancel_on: Some(("가방".to_string(), Arc::clone(&flag))),
        ..FakeSource::default()
    }
    .with("가방", vec![hit("1", 1)])
    .with("지갑", vec![hit("2", 1)]);
    let fetcher = fetcher(source);

    let outcome = merge_catalog(&fetcher, &Catalog::new(), &keywords(&["가방", "지갑"]), &flag).await;

    assert!(outcome.report.cancelled);
    assert_eq!(outcome.report.keywords_processed, 1);
    assert_eq!(*fetcher.source().searches.borrow(), vec!["가방"]);
}

#[tokio::test]
async fn already_cancelled_run_makes_no_calls() {
    let fetcher = fetcher(FakeSource::default().with("가방", vec![hit("1", 1)]));

    let outcome = merge_catalog(
        &fetcher,
        &Catalog::new(),
        &keywords(&["가방"]),
        &AtomicBool::new(true),
    )
    .await;

    assert!(outcome.report.cancelled);
    assert!(outcome.catalog.is_empty());
    assert!(fetcher.source().searches.borrow().is_empty());
}
