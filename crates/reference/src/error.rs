use thiserror::Error;

/// Lookups that found nothing. These are expected outcomes of position
/// based queries, not failures of the index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("no reference origin found")]
    NoOriginFound,
    #[error("no reference target found")]
    NoTargetFound,
}
