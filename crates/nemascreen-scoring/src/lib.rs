//! nemascreen-scoring — Replicate score aggregation and positive-call classification.
//!
//! Pure functions over already-materialized score lists: collapsing the
//! multiple scores recorded against one replicate to a single most
//! relevant score, ranking replicates against each other, and deciding
//! whether a strain/clone pairing qualifies as a validated hit or should
//! move into the secondary screen. Nothing here touches the database;
//! callers gather the inputs (including the set of single-replicate
//! experiments) and hand them in as data.

pub mod error;
pub mod relevance;
pub mod criteria;
pub mod organize;

pub use error::ScoringError;
pub use relevance::{average_score_weight, most_relevant_score, rank_across_replicates};
