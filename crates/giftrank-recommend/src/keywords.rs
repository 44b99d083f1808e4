//! Stage A: keyword scoring.
//!
//! Each keyword gets a content score from its overall ranks and a profile
//! score from how well its segment ranks match the user, blended by
//! [`ProfileWeights::profile_weight`].

use std::fmt;

use giftrank_core::{AgeBand, AgeGender, CategoryRank, Gender, KeywordRankEntry, RankSignals};
use serde::{Serialize, Serializer};

use crate::profile::{ProfileWeights, UserProfile};

/// Rank ceiling used to invert ranks into scores (`MAX_RANK − rank`).
pub const MAX_RANK: u32 = 21;

const RANK_SCALE: f64 = 2.5;
const AGE_GENDER_SCALE: f64 = 3.0;
const INTEREST_BONUS: f64 = 50.0;
const DEFAULT_CONTENT_SCORE: f64 = 5.0;
const MAX_REASONS: usize = 2;

/// Why a keyword was recommended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    InterestMatch { category: String },
    GenderRank { gender: Gender, rank: u32 },
    AgeRank { age: AgeBand, rank: u32 },
    AgeGenderRank { segment: AgeGender, rank: u32 },
    GeneralPopularity,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::InterestMatch { category } => write!(f, "'{category}' 관심사 일치"),
            Reason::GenderRank { gender, rank } => write!(f, "{gender} 랭킹: {rank}위"),
            Reason::AgeRank { age, rank } => write!(f, "{age} 랭킹: {rank}위"),
            Reason::AgeGenderRank { segment, rank } => {
                write!(f, "{} {} 랭킹: {rank}위", segment.gender, segment.age)
            }
            Reason::GeneralPopularity => f.write_str("일반 인기도 기반"),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredKeyword {
    pub keyword: String,
    pub score: f64,
    pub content_score: f64,
    pub profile_score: f64,
    /// At most two, deduplicated, in discovery order.
    pub reasons: Vec<Reason>,
}

fn inverted(rank: u32) -> f64 {
    f64::from(MAX_RANK) - f64::from(rank)
}

fn content_score(entry: &KeywordRankEntry) -> f64 {
    let (sum, count) = entry
        .rankings_by_category
        .values()
        .flatten()
        .filter_map(|c| c.overall)
        .fold((0.0, 0u32), |(sum, count), overall| (sum + inverted(overall), count + 1));

    if count == 0 {
        DEFAULT_CONTENT_SCORE
    } else {
        sum / f64::from(count) * RANK_SCALE
    }
}

/// Profile score for one category, pushing any matched signals onto
/// `reasons`.
fn category_profile_score(
    category: &str,
    ranks: &CategoryRank,
    profile: &UserProfile,
    weights: &ProfileWeights,
    reasons: &mut Vec<Reason>,
) -> f64 {
    let mut score = 0.0;

    if profile.interests.contains(category) {
        score += weights.interests * INTEREST_BONUS;
        reasons.push(Reason::InterestMatch {
            category: category.to_string(),
        });
    }

    if let Some(gender) = profile.gender {
        if let Some(&rank) = ranks.by_gender.get(&gender) {
            score += weights.gender * inverted(rank) * RANK_SCALE;
            reasons.push(Reason::GenderRank { gender, rank });
        }
    }

    if let Some(age) = profile.age {
        if let Some(&rank) = ranks.by_age.get(&age) {
            score += weights.age * inverted(rank) * RANK_SCALE;
            reasons.push(Reason::AgeRank { age, rank });
        }
    }

    if let (Some(gender), Some(age)) = (profile.gender, profile.age) {
        let segment = AgeGender::new(gender, age);
        if let Some(&rank) = ranks.by_age_gender.get(&segment) {
            score += weights.age_gender() * inverted(rank) * AGE_GENDER_SCALE;
            reasons.push(Reason::AgeGenderRank { segment, rank });
        }
    }

    score
}

fn score_entry(
    entry: &KeywordRankEntry,
    profile: &UserProfile,
    weights: &ProfileWeights,
) -> ScoredKeyword {
    let content = content_score(entry);

    let mut profile_score = 0.0_f64;
    let mut matched: Vec<Reason> = Vec::new();
    for (category, ranks) in &entry.rankings_by_category {
        let Some(ranks) = ranks else { continue };
        let category_score = category_profile_score(category, ranks, profile, weights, &mut matched);
        profile_score = profile_score.max(category_score);
    }

    let reasons = if profile_score == 0.0 {
        vec![Reason::GeneralPopularity]
    } else {
        let mut unique: Vec<Reason> = Vec::with_capacity(MAX_REASONS);
        for reason in matched {
            if unique.len() == MAX_REASONS {
                break;
            }
            if !unique.contains(&reason) {
                unique.push(reason);
            }
        }
        unique
    };

    let w = weights.profile_weight;
    ScoredKeyword {
        keyword: entry.keyword.clone(),
        score: (1.0 - w) * content + w * profile_score,
        content_score: content,
        profile_score,
        reasons,
    }
}

/// Scores every keyword in `signals` for `profile`, highest score first.
///
/// Ties keep the store's keyword order. Categories are visited in listed order.
#[must_use]
pub fn score_keywords(signals: &RankSignals, profile: &UserProfile) -> Vec<ScoredKeyword> {
    let weights = ProfileWeights::from_profile(profile);
    tracing::debug!(
        profile_weight = weights.profile_weight,
        keywords = signals.len(),
        "scoring keywords"
    );

    let mut scored: Vec<ScoredKeyword> = signals
        .entries()
        .iter()
        .map(|entry| score_entry(entry, profile, &weights))
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

#[cfg(test)]
#[path = "keywords_test.rs"]
mod tests;
