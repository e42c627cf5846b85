//! Error types for subgraph connectivity.

use drips_common::error::DripsError;

/// Errors that can occur while querying the indexing service.
#[derive(Debug)]
pub enum SubgraphError {
    /// HTTP transport failed
    Transport(String),
    /// The endpoint answered with a non-success status
    Status { code: u16 },
    /// A response field could not be parsed into its domain type
    Decode { field: String, reason: String },
    /// The GraphQL layer reported query errors
    Query { message: String },
}

impl std::fmt::Display for SubgraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubgraphError::Transport(msg) => write!(f, "Subgraph transport error: {}", msg),
            SubgraphError::Status { code } => {
                write!(f, "Subgraph responded with HTTP {}", code)
            }
            SubgraphError::Decode { field, reason } => {
                write!(f, "Failed to decode subgraph field '{}': {}", field, reason)
            }
            SubgraphError::Query { message } => write!(f, "Subgraph query error: {}", message),
        }
    }
}

impl std::error::Error for SubgraphError {}

impl From<reqwest::Error> for SubgraphError {
    fn from(err: reqwest::Error) -> Self {
        SubgraphError::Transport(err.to_string())
    }
}

impl From<SubgraphError> for DripsError {
    fn from(err: SubgraphError) -> Self {
        DripsError::DataSourceQueryFailure {
            reason: err.to_string(),
        }
    }
}
