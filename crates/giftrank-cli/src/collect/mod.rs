//! `collect` command: refresh the product catalog from the partner API.
//!
//! Loads the previous catalog as read-only reference, merges one keyword at a
//! time behind the shared rate limiter, and overwrites the snapshot only
//! after every keyword has been processed.

mod merger;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use giftrank_core::AppConfig;
use giftrank_partner::{PartnerClient, RateLimitedFetcher, RateLimiter, TOKENS_PER_KEYWORD};

use merger::{merge_catalog, MergeReport};

/// Resolves the keyword list for a run.
///
/// Explicit `--keyword` values win. Otherwise the ranking snapshot's keywords
/// are used, followed by any extra keywords from the collection file.
fn resolve_keywords(config: &AppConfig, overrides: &[String]) -> anyhow::Result<Vec<String>> {
    if !overrides.is_empty() {
        let mut keywords: Vec<String> = Vec::with_capacity(overrides.len());
        for keyword in overrides.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
            if !keywords.iter().any(|k| k == keyword) {
                keywords.push(keyword.to_string());
            }
        }
        return Ok(keywords);
    }

    let collection = giftrank_core::load_collection(&config.collection_path)?;
    let signals = giftrank_store::load_rank_signals_or_default(&config.rankings_path());
    Ok(collection.collection_keywords(&signals.unique_keywords()))
}

fn build_partner_client(config: &AppConfig) -> anyhow::Result<PartnerClient> {
    let credentials = config.partner_credentials()?;
    PartnerClient::with_base_url(
        credentials,
        config.partner_timeout_secs,
        &config.user_agent,
        &config.partner_base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build partner client: {e}"))
}

/// Sets the returned flag on the first Ctrl-C so the merge stops at the next
/// keyword boundary.
fn install_cancel_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping after the current keyword");
            handler_flag.store(true, Ordering::SeqCst);
        }
    });
    flag
}

fn log_report(report: &MergeReport, products: usize) {
    tracing::info!(
        keywords = report.keywords_processed,
        products,
        added = report.products_added,
        updated = report.products_updated,
        shorten_batches = report.shorten_batches,
        shortened = report.shortened_urls,
        reused = report.reused_urls,
        cancelled = report.cancelled,
        "collection run finished"
    );
}

/// Runs one collection pass and overwrites the catalog snapshot.
///
/// When `dry_run` is `true` the keyword plan is printed and neither the
/// partner API nor the snapshot is touched.
///
/// # Errors
///
/// Returns an error if the collection file is invalid, partner credentials
/// are missing (checked before any call), the client cannot be built, or the
/// snapshot cannot be written. Per-keyword partner failures are logged and
/// skipped, not propagated.
pub(crate) async fn run_collect(
    config: &AppConfig,
    keyword_overrides: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let keywords = resolve_keywords(config, keyword_overrides)?;
    if keywords.is_empty() {
        println!("no keywords to collect; run `rankings` first or pass --keyword");
        return Ok(());
    }

    if dry_run {
        let tokens = u64::try_from(keywords.len())
            .unwrap_or(u64::MAX)
            .saturating_mul(u64::from(TOKENS_PER_KEYWORD));
        let windows = tokens.div_ceil(u64::from(config.rate_limit_tokens.max(1)));
        println!(
            "dry-run: would collect {} keywords (≈{} rate-limit windows of {}s): [{}]",
            keywords.len(),
            windows,
            config.rate_limit_window_secs,
            keywords.join(", ")
        );
        return Ok(());
    }

    let client = build_partner_client(config)?;
    let catalog_path = config.catalog_path();
    let reference = giftrank_store::load_catalog_or_default(&catalog_path);
    tracing::info!(
        keywords = keywords.len(),
        reference_products = reference.len(),
        "starting collection run"
    );

    let limiter = RateLimiter::new(
        config.rate_limit_tokens,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    let fetcher = RateLimitedFetcher::new(client, limiter, config.search_limit);
    let cancel = install_cancel_flag();

    let outcome = merge_catalog(&fetcher, &reference, &keywords, &cancel).await;
    log_report(&outcome.report, outcome.catalog.len());

    if outcome.report.cancelled {
        println!(
            "collection cancelled after {} of {} keywords; snapshot left unchanged",
            outcome.report.keywords_processed,
            keywords.len()
        );
        return Ok(());
    }

    if outcome.catalog.is_empty() {
        tracing::warn!(
            reference_products = reference.len(),
            "run produced no products; keeping the previous snapshot"
        );
        println!("no products collected; snapshot left unchanged");
        return Ok(());
    }

    giftrank_store::write_catalog(&catalog_path, &outcome.catalog)?;
    println!(
        "collected {} products across {} keywords ({} new deep links, {} reused)",
        outcome.catalog.len(),
        outcome.report.keywords_processed,
        outcome.report.shortened_urls,
        outcome.report.reused_urls
    );
    Ok(())
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
