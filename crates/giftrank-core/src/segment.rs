//! Audience segments used by the shopping-insight rankings.
//!
//! Rankings are published per gender, per age band, and per gender × age band.
//! The upstream source marks "no filter" with the sentinel label `전체` (or
//! `all`); that sentinel is parsed into [`Segment::All`] and never stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Sentinel labels meaning "every segment".
const ALL_LABELS: &[&str] = &["전체", "all", "ALL", "All"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind} label: {label:?}")]
pub struct SegmentParseError {
    pub kind: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "여성", alias = "female")]
    Female,
    #[serde(rename = "남성", alias = "male")]
    Male,
}

impl Gender {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "여성",
            Gender::Male => "남성",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = SegmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "여성" | "female" | "f" => Ok(Gender::Female),
            "남성" | "male" | "m" => Ok(Gender::Male),
            other => Err(SegmentParseError {
                kind: "gender",
                label: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "10대", alias = "10s")]
    Teens,
    #[serde(rename = "20대", alias = "20s")]
    Twenties,
    #[serde(rename = "30대", alias = "30s")]
    Thirties,
    #[serde(rename = "40대", alias = "40s")]
    Forties,
    #[serde(rename = "50대", alias = "50s")]
    Fifties,
    #[serde(rename = "60대 이상", alias = "60s")]
    SixtiesPlus,
}

impl AgeBand {
    pub const ALL: [AgeBand; 6] = [
        AgeBand::Teens,
        AgeBand::Twenties,
        AgeBand::Thirties,
        AgeBand::Forties,
        AgeBand::Fifties,
        AgeBand::SixtiesPlus,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Teens => "10대",
            AgeBand::Twenties => "20대",
            AgeBand::Thirties => "30대",
            AgeBand::Forties => "40대",
            AgeBand::Fifties => "50대",
            AgeBand::SixtiesPlus => "60대 이상",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeBand {
    type Err = SegmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(band) = AgeBand::ALL.into_iter().find(|b| b.label() == trimmed) {
            return Ok(band);
        }
        match trimmed {
            "10" | "10s" => Ok(AgeBand::Teens),
            "20" | "20s" => Ok(AgeBand::Twenties),
            "30" | "30s" => Ok(AgeBand::Thirties),
            "40" | "40s" => Ok(AgeBand::Forties),
            "50" | "50s" => Ok(AgeBand::Fifties),
            "60" | "60s" | "60+" | "60대" => Ok(AgeBand::SixtiesPlus),
            other => Err(SegmentParseError {
                kind: "age band",
                label: other.to_string(),
            }),
        }
    }
}

/// A segment filter as published by the ranking source: either the
/// unfiltered sentinel or one concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<T> {
    All,
    Only(T),
}

impl<T> Segment<T>
where
    T: FromStr<Err = SegmentParseError>,
{
    /// Parses a raw segment label, mapping the `전체`/`all` sentinel to
    /// [`Segment::All`].
    ///
    /// # Errors
    ///
    /// Returns [`SegmentParseError`] when the label is neither the sentinel
    /// nor a recognized value.
    pub fn parse(label: &str) -> Result<Self, SegmentParseError> {
        let trimmed = label.trim();
        if ALL_LABELS.contains(&trimmed) {
            return Ok(Segment::All);
        }
        trimmed.parse::<T>().map(Segment::Only)
    }
}

/// Combined gender × age band key, persisted as `"여성_20대"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgeGender {
    pub gender: Gender,
    pub age: AgeBand,
}

impl AgeGender {
    #[must_use]
    pub fn new(gender: Gender, age: AgeBand) -> Self {
        Self { gender, age }
    }
}

impl fmt::Display for AgeGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.gender, self.age)
    }
}

impl FromStr for AgeGender {
    type Err = SegmentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (gender, age) = s.split_once('_').ok_or_else(|| SegmentParseError {
            kind: "gender_age key",
            label: s.to_string(),
        })?;
        Ok(Self {
            gender: gender.parse()?,
            age: age.parse()?,
        })
    }
}

impl Serialize for AgeGender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgeGender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
