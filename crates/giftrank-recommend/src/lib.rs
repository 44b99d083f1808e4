//! Two-stage recommendation scoring for giftrank.
//!
//! Stage A ([`score_keywords`]) turns keyword rank signals and a partial user
//! profile into an ordered keyword list. Stage B ([`score_products`]) scores
//! catalog products against that list. Both stages are pure: missing data
//! degrades to default or zero contributions and nothing here can fail.

pub mod keywords;
pub mod pipeline;
pub mod products;
pub mod profile;

pub use keywords::{score_keywords, Reason, ScoredKeyword, MAX_RANK};
pub use pipeline::{recommend, RecommendOptions, Recommendation};
pub use products::{apply_budget, score_products, ScoreBreakdown, ScoredProduct, MAX_PRODUCT_RANK};
pub use profile::{interest_confidence, ProfileWeights, UserProfile, SMOOTHING};
