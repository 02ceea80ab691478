use thiserror::Error;

/// Failure talking to the container runtime (local or registry inspection)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("Docker API error: {0}")]
    Api(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Registry returned no digest for {0}")]
    MissingDigest(String),
}

/// Failure fetching tags from the public tag-listing endpoint
#[derive(Debug, Error)]
pub enum TagLookupError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
