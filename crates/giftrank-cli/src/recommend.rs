//! `recommend` command: score the persisted snapshots for one user profile.

use std::collections::BTreeSet;

use giftrank_core::{AgeBand, AppConfig, Gender};
use giftrank_recommend::{recommend, RecommendOptions, Recommendation, UserProfile};
use serde::Serialize;

/// Number of top keywords echoed above the product table.
const KEYWORD_PREVIEW: usize = 5;

pub(crate) struct RecommendArgs {
    pub gender: Option<Gender>,
    pub age: Option<AgeBand>,
    pub interests: Vec<String>,
    pub budget: Option<u64>,
    pub top: usize,
    pub json: bool,
}

impl RecommendArgs {
    fn profile(&self) -> UserProfile {
        UserProfile {
            gender: self.gender,
            age: self.age,
            interests: self
                .interests
                .iter()
                .map(|i| i.trim())
                .filter(|i| !i.is_empty())
                .map(str::to_owned)
                .collect::<BTreeSet<_>>(),
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    profile: &'a UserProfile,
    #[serde(flatten)]
    recommendation: &'a Recommendation<'a>,
}

fn print_table(result: &Recommendation<'_>) {
    println!("{:<4}{:<16}REASONS", "#", "KEYWORD");
    for (i, keyword) in result.keywords.iter().take(KEYWORD_PREVIEW).enumerate() {
        let reasons: Vec<String> = keyword.reasons.iter().map(ToString::to_string).collect();
        println!(
            "{:<4}{:<16}{:.1} ({})",
            i + 1,
            keyword.keyword,
            keyword.score,
            reasons.join(", ")
        );
    }
    println!();

    println!("{:<4}{:<10}{:<12}{:<24}NAME", "#", "SCORE", "PRICE", "KEYWORDS");
    for (i, scored) in result.products.iter().enumerate() {
        let product = scored.product;
        println!(
            "{:<4}{:<10.1}{:<12}{:<24}{}",
            i + 1,
            scored.final_score,
            product.price,
            product.keywords.join(","),
            product.name
        );
        println!("    {}", product.url);
    }
}

/// Scores the catalog for the given profile and prints the top products.
///
/// Missing snapshots are treated as empty, so an unprimed data directory
/// prints an empty list rather than failing.
///
/// # Errors
///
/// Returns an error only if JSON output cannot be serialized.
pub(crate) fn run_recommend(config: &AppConfig, args: &RecommendArgs) -> anyhow::Result<()> {
    let signals = giftrank_store::load_rank_signals_or_default(&config.rankings_path());
    let catalog = giftrank_store::load_catalog_or_default(&config.catalog_path());
    let profile = args.profile();

    let options = RecommendOptions {
        weights: config.weights,
        budget: args.budget,
        limit: Some(args.top),
    };
    let result = recommend(&signals, &catalog, &profile, &options);

    if args.json {
        let output = JsonOutput {
            profile: &profile,
            recommendation: &result,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if result.products.is_empty() {
        println!(
            "no products to recommend{}; run `rankings` and `collect` first",
            args.budget
                .map(|b| format!(" within {b} KRW"))
                .unwrap_or_default()
        );
        return Ok(());
    }

    print_table(&result);
    Ok(())
}
