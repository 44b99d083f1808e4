//! Stage B: product scoring against the ordered keyword list.

use std::collections::HashMap;

use giftrank_core::{Catalog, Product, ScoringWeights};
use serde::Serialize;

use crate::keywords::ScoredKeyword;

/// Search position past which a product earns no quality score.
pub const MAX_PRODUCT_RANK: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Sum of the scores of every recommended keyword the product carries.
    pub relevance: f64,
    pub quality: f64,
    /// How close to the top of the keyword list the product's best keyword is.
    pub diversity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredProduct<'a> {
    pub product: &'a Product,
    pub final_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// `max(0, MAX_PRODUCT_RANK − rank + 1)`; an unset (zero) rank scores 0.
fn quality_score(rank: u32) -> f64 {
    if rank == 0 {
        return 0.0;
    }
    f64::from((MAX_PRODUCT_RANK + 1).saturating_sub(rank))
}

#[allow(clippy::cast_precision_loss)]
fn diversity_bonus(total: usize, best_index: usize) -> f64 {
    total.saturating_sub(best_index) as f64
}

/// Scores every catalog product against `keywords` (Stage A output, in
/// order), highest score first. Ties keep catalog order.
#[must_use]
pub fn score_products<'a>(
    catalog: &'a Catalog,
    keywords: &[ScoredKeyword],
    weights: &ScoringWeights,
) -> Vec<ScoredProduct<'a>> {
    let mut lookup: HashMap<&str, (f64, usize)> = HashMap::with_capacity(keywords.len());
    for (index, keyword) in keywords.iter().enumerate() {
        lookup
            .entry(keyword.keyword.as_str())
            .or_insert((keyword.score, index));
    }
    let total = keywords.len();

    let mut scored: Vec<ScoredProduct<'a>> = catalog
        .iter()
        .map(|product| {
            let mut relevance = 0.0;
            let mut best_index: Option<usize> = None;
            for keyword in &product.keywords {
                if let Some(&(score, index)) = lookup.get(keyword.as_str()) {
                    relevance += score;
                    best_index = Some(best_index.map_or(index, |best| best.min(index)));
                }
            }

            let breakdown = ScoreBreakdown {
                relevance,
                quality: quality_score(product.rank),
                diversity: best_index.map_or(0.0, |best| diversity_bonus(total, best)),
            };
            let final_score = weights.relevance * breakdown.relevance
                + weights.quality * breakdown.quality
                + weights.diversity * breakdown.diversity;

            ScoredProduct {
                product,
                final_score,
                breakdown,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    scored
}

/// Drops products priced above `ceiling`, keeping the order of the rest.
/// `None` keeps everything.
#[must_use]
pub fn apply_budget(products: Vec<ScoredProduct<'_>>, ceiling: Option<u64>) -> Vec<ScoredProduct<'_>> {
    match ceiling {
        Some(ceiling) => products
            .into_iter()
            .filter(|p| p.product.price <= ceiling)
            .collect(),
        None => products,
    }
}
