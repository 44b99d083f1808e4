//! Keyword rank signal store.
//!
//! Raw records from the shopping-insight scraper arrive as one row per
//! `(keyword, category, gender filter, age filter)` observation. This module
//! folds them into one [`KeywordRankEntry`] per keyword with a typed
//! per-category breakdown. The store is rebuilt from scratch on every
//! collection run.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Index;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::segment::{AgeBand, AgeGender, Gender, Segment};

/// One raw observation from the ranking source.
///
/// Every field is optional at this boundary: scraping noise is filtered by
/// [`build_rank_signals`], not by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRankRecord {
    #[serde(default)]
    pub keyword: Option<String>,
    /// Usually a number; numeric strings are accepted too.
    #[serde(default)]
    pub rank: Option<serde_json::Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
}

/// Rank breakdown for one keyword within one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRank {
    pub overall: Option<u32>,
    #[serde(default)]
    pub by_gender: BTreeMap<Gender, u32>,
    #[serde(default)]
    pub by_age: BTreeMap<AgeBand, u32>,
    #[serde(default)]
    pub by_age_gender: BTreeMap<AgeGender, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRankEntry {
    pub keyword: String,
    /// Every known category is present; `None` means the keyword never ranked
    /// there.
    pub rankings_by_category: CategoryRankings,
    pub last_updated: DateTime<Utc>,
}

/// Per-category ranks for one keyword, kept in the order categories were
/// first listed: known categories first, then any the records introduced.
///
/// Serialized as a JSON object whose keys follow that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRankings {
    categories: Vec<(String, Option<CategoryRank>)>,
}

impl CategoryRankings {
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&Option<CategoryRank>> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, ranks)| ranks)
    }

    /// Slot for `category`, appended as `None` when not yet listed.
    pub fn slot_mut(&mut self, category: &str) -> &mut Option<CategoryRank> {
        let position = match self.categories.iter().position(|(name, _)| name == category) {
            Some(position) => position,
            None => {
                self.categories.push((category.to_string(), None));
                self.categories.len() - 1
            }
        };
        &mut self.categories[position].1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, Option<CategoryRank>)> {
        self.categories.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Option<CategoryRank>> {
        self.categories.iter().map(|(_, ranks)| ranks)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A repeated category keeps its first position and takes the later value.
impl FromIterator<(String, Option<CategoryRank>)> for CategoryRankings {
    fn from_iter<I: IntoIterator<Item = (String, Option<CategoryRank>)>>(iter: I) -> Self {
        let mut rankings = Self::default();
        for (category, ranks) in iter {
            *rankings.slot_mut(&category) = ranks;
        }
        rankings
    }
}

impl<'a> IntoIterator for &'a CategoryRankings {
    type Item = &'a (String, Option<CategoryRank>);
    type IntoIter = std::slice::Iter<'a, (String, Option<CategoryRank>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}

impl Index<&str> for CategoryRankings {
    type Output = Option<CategoryRank>;

    /// # Panics
    ///
    /// Panics when `category` is not listed.
    fn index(&self, category: &str) -> &Self::Output {
        match self.get(category) {
            Some(ranks) => ranks,
            None => panic!("category {category:?} not listed"),
        }
    }
}

impl Serialize for CategoryRankings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, ranks) in &self.categories {
            map.serialize_entry(category, ranks)?;
        }
        map.end()
    }
}

struct CategoryRankingsVisitor;

impl<'de> Visitor<'de> for CategoryRankingsVisitor {
    type Value = CategoryRankings;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of category name to rank breakdown")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut rankings = CategoryRankings::default();
        while let Some((category, ranks)) = access.next_entry::<String, Option<CategoryRank>>()? {
            *rankings.slot_mut(&category) = ranks;
        }
        Ok(rankings)
    }
}

impl<'de> Deserialize<'de> for CategoryRankings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CategoryRankingsVisitor)
    }
}

/// Which slot of a [`CategoryRank`] an observation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RankSlot {
    Overall,
    Gender(Gender),
    Age(AgeBand),
    AgeGender(AgeGender),
}

impl RankSlot {
    fn from_segments(gender: Segment<Gender>, age: Segment<AgeBand>) -> Self {
        match (gender, age) {
            (Segment::All, Segment::All) => RankSlot::Overall,
            (Segment::Only(g), Segment::All) => RankSlot::Gender(g),
            (Segment::All, Segment::Only(a)) => RankSlot::Age(a),
            (Segment::Only(g), Segment::Only(a)) => RankSlot::AgeGender(AgeGender::new(g, a)),
        }
    }
}

impl CategoryRank {
    fn record(&mut self, slot: RankSlot, rank: u32) {
        match slot {
            RankSlot::Overall => self.overall = Some(rank),
            RankSlot::Gender(g) => {
                self.by_gender.insert(g, rank);
            }
            RankSlot::Age(a) => {
                self.by_age.insert(a, rank);
            }
            RankSlot::AgeGender(key) => {
                self.by_age_gender.insert(key, rank);
            }
        }
    }
}

struct ValidRecord {
    keyword: String,
    rank: u32,
    category: String,
    slot: RankSlot,
}

fn parse_rank(value: &serde_json::Value) -> Option<u32> {
    let rank = match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|r| u32::try_from(r).ok()),
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }?;
    (rank > 0).then_some(rank)
}

fn validate(record: &RawRankRecord) -> Option<ValidRecord> {
    let keyword = record.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
    let rank = record.rank.as_ref().and_then(parse_rank)?;
    let category = record.category.as_deref().map(str::trim).filter(|c| !c.is_empty())?;
    let gender = Segment::<Gender>::parse(record.gender.as_deref()?).ok()?;
    let age = Segment::<AgeBand>::parse(record.age.as_deref()?).ok()?;

    Some(ValidRecord {
        keyword: keyword.to_string(),
        rank,
        category: category.to_string(),
        slot: RankSlot::from_segments(gender, age),
    })
}

/// Keyword rank entries in first-seen keyword order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankSignals {
    entries: Vec<KeywordRankEntry>,
    index: HashMap<String, usize>,
}

impl RankSignals {
    /// Wraps already-built entries (e.g. from a snapshot). Repeated keywords
    /// keep the first entry.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = KeywordRankEntry>) -> Self {
        let mut signals = Self::default();
        for entry in entries {
            if signals.index.contains_key(&entry.keyword) {
                continue;
            }
            signals
                .index
                .insert(entry.keyword.clone(), signals.entries.len());
            signals.entries.push(entry);
        }
        signals
    }

    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&KeywordRankEntry> {
        self.index.get(keyword).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn entries(&self) -> &[KeywordRankEntry] {
        &self.entries
    }

    /// Keywords in first-seen order; the default collection keyword list.
    #[must_use]
    pub fn unique_keywords(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.keyword.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RankSignals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RankSignals {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<KeywordRankEntry>::deserialize(deserializer)?;
        Ok(Self::from_entries(entries))
    }
}

/// Builds the rank signal store from raw scraper records.
///
/// Every entry gets a `None` slot for each of `categories` so scoring can
/// probe any category without existence checks. Records with a missing or
/// blank keyword, a missing/non-numeric/zero rank, a missing category, or an
/// unrecognized gender/age label are skipped. When the same slot is observed
/// twice the later record wins.
#[must_use]
pub fn build_rank_signals<I, C>(records: I, categories: &[C], now: DateTime<Utc>) -> RankSignals
where
    I: IntoIterator<Item = RawRankRecord>,
    C: AsRef<str>,
{
    let mut entries: Vec<KeywordRankEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for raw in records {
        let Some(record) = validate(&raw) else {
            skipped += 1;
            tracing::debug!(?raw, "skipping malformed rank record");
            continue;
        };

        let slot = *index.entry(record.keyword.clone()).or_insert_with(|| {
            let rankings_by_category = categories
                .iter()
                .map(|c| (c.as_ref().to_string(), None))
                .collect();
            entries.push(KeywordRankEntry {
                keyword: record.keyword.clone(),
                rankings_by_category,
                last_updated: now,
            });
            entries.len() - 1
        });

        entries[slot]
            .rankings_by_category
            .slot_mut(&record.category)
            .get_or_insert_with(CategoryRank::default)
            .record(record.slot, record.rank);
    }

    if skipped > 0 {
        tracing::info!(skipped, "skipped malformed rank records");
    }

    RankSignals { entries, index }
}

#[cfg(test)]
#[path = "rankings_test.rs"]
mod tests;
