//! Incremental catalog merge for one collection run.
//!
//! Keywords are processed strictly in order. For each keyword the merger
//! reserves the rate-limit budget, searches, converts URLs for products never
//! seen before (one batch per keyword), and folds every result into the
//! run's catalog. The reference catalog from the previous run is only read,
//! to reuse URLs that were already converted.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use giftrank_core::{Catalog, Product};
use giftrank_partner::{ProductSource, RateLimitedFetcher, SearchProduct};

/// Counters for one run, logged when the run ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MergeReport {
    pub keywords_processed: usize,
    pub products_added: usize,
    /// Sightings that added a keyword or improved the rank of a product
    /// already collected in this run.
    pub products_updated: usize,
    pub shorten_batches: usize,
    pub shortened_urls: usize,
    pub reused_urls: usize,
    pub cancelled: bool,
}

pub(crate) struct MergeOutcome {
    pub catalog: Catalog,
    pub report: MergeReport,
}

struct CatalogMerger<'r> {
    reference: &'r Catalog,
    current: Catalog,
    report: MergeReport,
}

impl<'r> CatalogMerger<'r> {
    fn new(reference: &'r Catalog) -> Self {
        Self {
            reference,
            current: Catalog::new(),
            report: MergeReport::default(),
        }
    }

    fn is_known(&self, product_id: &str) -> bool {
        self.current.contains(product_id) || self.reference.contains(product_id)
    }

    /// Canonical URLs of results never seen in either catalog, one per
    /// product even if the response repeats it.
    fn urls_to_shorten(&self, results: &[SearchProduct]) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        results
            .iter()
            .filter(|p| !self.is_known(&p.product_id) && seen.insert(p.product_id.as_str()))
            .map(SearchProduct::canonical_url)
            .collect()
    }

    fn resolve_url(&mut self, result: &SearchProduct, shortened: &HashMap<String, String>) -> String {
        if let Some(short) = shortened.get(&result.canonical_url()) {
            self.report.shortened_urls += 1;
            return short.clone();
        }
        if let Some(previous) = self
            .reference
            .get(&result.product_id)
            .map(|p| p.url.trim())
            .filter(|u| !u.is_empty())
        {
            self.report.reused_urls += 1;
            return previous.to_string();
        }
        result.listing_url()
    }

    fn fold(&mut self, keyword: &str, result: SearchProduct, shortened: &HashMap<String, String>) {
        if let Some(existing) = self.current.get_mut(&result.product_id) {
            let added = existing.add_keyword(keyword);
            let improved = existing.observe_rank(result.rank);
            if added || improved {
                self.report.products_updated += 1;
                tracing::debug!(
                    product_id = %result.product_id,
                    keyword,
                    rank = existing.rank,
                    "updated product seen earlier in this run"
                );
            }
            return;
        }

        let url = self.resolve_url(&result, shortened);
        let product: Product = result.into_product(keyword, url);
        tracing::debug!(product_id = %product.product_id, keyword, rank = product.rank, "added product");
        self.current.insert(product);
        self.report.products_added += 1;
    }

    async fn merge_keyword<S: ProductSource>(
        &mut self,
        fetcher: &RateLimitedFetcher<S>,
        keyword: &str,
    ) {
        fetcher.reserve_keyword_budget().await;

        let results = fetcher.search(keyword).await;

        let urls = self.urls_to_shorten(&results);
        let shortened = if urls.is_empty() {
            HashMap::new()
        } else {
            self.report.shorten_batches += 1;
            fetcher.shorten(&urls).await
        };

        for result in results {
            self.fold(keyword, result, &shortened);
        }
        self.report.keywords_processed += 1;
    }
}

/// Runs the merge over `keywords` against `reference`.
///
/// `cancel` is checked before each keyword; once set, the run stops and the
/// report is marked cancelled. Callers must not persist a cancelled run.
pub(crate) async fn merge_catalog<S: ProductSource>(
    fetcher: &RateLimitedFetcher<S>,
    reference: &Catalog,
    keywords: &[String],
    cancel: &AtomicBool,
) -> MergeOutcome {
    let mut merger = CatalogMerger::new(reference);

    for (position, keyword) in keywords.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            tracing::warn!(
                processed = position,
                remaining = keywords.len() - position,
                "collection cancelled between keywords"
            );
            merger.report.cancelled = true;
            break;
        }
        tracing::info!(keyword = %keyword, position = position + 1, total = keywords.len(), "collecting keyword");
        merger.merge_keyword(fetcher, keyword).await;
    }

    MergeOutcome {
        catalog: merger.current,
        report: merger.report,
    }
}

#[cfg(test)]
#[path = "merger_test.rs"]
mod tests;
