// Score Aggregator
// Implements: per-dimension means, canonical ordering, status tiers.

pub mod aggregate;
pub mod status;

pub use aggregate::{aggregate, ScoreMapping};
pub use status::{StatusThresholds, StatusTier};
