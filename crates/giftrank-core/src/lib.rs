//! Shared domain types and configuration for giftrank.
//!
//! Holds the keyword rank signal store, the product catalog model, typed
//! audience segments, and the environment/YAML configuration loaders used by
//! the collector and the recommender.

pub mod app_config;
pub mod collection;
pub mod config;
pub mod error;
pub mod products;
pub mod rankings;
pub mod segment;

pub use app_config::{AppConfig, Environment, PartnerCredentials, ScoringWeights};
pub use collection::{load_collection, CollectionFile, DEFAULT_CATEGORIES};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use products::{Catalog, Product, DEFAULT_CATEGORY_NAME};
pub use rankings::{
    build_rank_signals, CategoryRank, CategoryRankings, KeywordRankEntry, RankSignals, RawRankRecord,
};
pub use segment::{AgeBand, AgeGender, Gender, Segment, SegmentParseError};
