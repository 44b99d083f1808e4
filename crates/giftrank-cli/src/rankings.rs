//! `rankings` command: rebuild the keyword rank signal store.

use std::path::Path;

use giftrank_core::AppConfig;

/// Builds the rank signal store from the raw ranking export at `input` and
/// overwrites the ranking snapshot. The previous snapshot is never merged.
///
/// # Errors
///
/// Returns an error if the collection file is invalid, the input cannot be
/// read as a JSON array, or the snapshot cannot be written.
pub(crate) fn run_rankings(config: &AppConfig, input: &Path) -> anyhow::Result<()> {
    let collection = giftrank_core::load_collection(&config.collection_path)?;
    let records = giftrank_store::read_raw_records(input)?;
    let record_count = records.len();

    let signals = giftrank_core::build_rank_signals(
        records,
        collection.categories.as_slice(),
        chrono::Utc::now(),
    );
    if signals.is_empty() {
        anyhow::bail!(
            "no usable ranking records in {} ({record_count} read); snapshot left unchanged",
            input.display()
        );
    }

    giftrank_store::write_rank_signals(&config.rankings_path(), &signals)?;
    println!(
        "stored rankings for {} keywords from {record_count} records across {} categories",
        signals.len(),
        collection.categories.len()
    );
    Ok(())
}
