use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    /// The most relevant of zero scores is undefined; callers must
    /// guarantee at least one score per replicate before reducing.
    #[error("cannot reduce an empty list of scores")]
    EmptyInput,
}
