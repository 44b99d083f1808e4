//! User profile and the confidence-weighted blend derived from it.

use std::collections::BTreeSet;

use giftrank_core::{AgeBand, Gender};
use serde::{Deserialize, Serialize};

/// Smoothing constant `M` in `profile_weight = c / (c + M)`.
pub const SMOOTHING: f64 = 1.5;

/// A partial user profile. Every field may be absent; a profile with none of
/// them set is "cold" and yields pure popularity ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<AgeBand>,
    /// Interest categories, matched against ranking category names.
    #[serde(default)]
    pub interests: BTreeSet<String>,
}

impl UserProfile {
    #[must_use]
    pub fn is_cold(&self) -> bool {
        self.gender.is_none() && self.age.is_none() && self.interests.is_empty()
    }
}

/// Saturating confidence for `count` interests: `1 − 1/(1+count)`.
///
/// Zero interests give `0.0`; the value grows strictly with `count` and never
/// reaches `1.0`.
#[must_use]
pub fn interest_confidence(count: usize) -> f64 {
    let count = u32::try_from(count).map_or(f64::from(u32::MAX), f64::from);
    1.0 - 1.0 / (1.0 + count)
}

/// Blend weights computed once per profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileWeights {
    pub total_confidence: f64,
    /// Share of the final keyword score taken by the profile score.
    pub profile_weight: f64,
    pub gender: f64,
    pub age: f64,
    pub interests: f64,
}

impl ProfileWeights {
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        let gender_conf = if profile.gender.is_some() { 1.0 } else { 0.0 };
        let age_conf = if profile.age.is_some() { 1.0 } else { 0.0 };
        let interest_conf = interest_confidence(profile.interests.len());
        let total = gender_conf + age_conf + interest_conf;

        let share = |conf: f64| if total > 0.0 { conf / total } else { 0.0 };

        Self {
            total_confidence: total,
            profile_weight: total / (total + SMOOTHING),
            gender: share(gender_conf),
            age: share(age_conf),
            interests: share(interest_conf),
        }
    }

    /// Weight of the combined gender × age signal.
    #[must_use]
    pub fn age_gender(&self) -> f64 {
        (self.gender + self.age) / 2.0
    }
}
