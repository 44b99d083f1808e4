//! One-call recommendation: keyword scoring, product scoring, then the budget filter.

use giftrank_core::{Catalog, RankSignals, ScoringWeights};
use serde::Serialize;

use crate::keywords::{score_keywords, ScoredKeyword};
use crate::products::{apply_budget, score_products, ScoredProduct};
use crate::profile::UserProfile;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendOptions {
    pub weights: ScoringWeights,
    /// Price ceiling in KRW, applied after scoring.
    pub budget: Option<u64>,
    /// Keep at most this many products after the budget filter.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    pub keywords: Vec<ScoredKeyword>,
    pub products: Vec<ScoredProduct<'a>>,
}

/// Runs keyword scoring, product scoring, and the budget filter in one pass.
#[must_use]
pub fn recommend<'a>(
    signals: &RankSignals,
    catalog: &'a Catalog,
    profile: &UserProfile,
    options: &RecommendOptions,
) -> Recommendation<'a> {
    let keywords = score_keywords(signals, profile);
    let scored = score_products(catalog, &keywords, &options.weights);
    let scored_count = scored.len();

    let mut products = apply_budget(scored, options.budget);
    if let Some(limit) = options.limit {
        products.truncate(limit);
    }

    tracing::debug!(
        keywords = keywords.len(),
        scored = scored_count,
        returned = products.len(),
        budget = ?options.budget,
        "recommendation complete"
    );

    Recommendation { keywords, products }
}
