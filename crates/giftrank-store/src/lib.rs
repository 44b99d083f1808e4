//! JSON snapshot persistence for giftrank.
//!
//! The catalog and the ranking store are each persisted as one pretty-printed
//! JSON array, read in full at run start and overwritten in full at run end.
//! Writes go through a sibling `.tmp` file and a rename, so a crash mid-write
//! leaves the previous snapshot intact.

pub mod catalog;
pub mod error;
pub mod rankings;
mod snapshot;

pub use catalog::{load_catalog_or_default, read_catalog, write_catalog};
pub use error::StoreError;
pub use rankings::{
    load_rank_signals_or_default, read_rank_signals, read_raw_records, write_rank_signals,
};
