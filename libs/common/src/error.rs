//! Error taxonomy for the Drips client SDK.

/// Errors raised by validation, cycle math, and estimation.
///
/// Every kind except `DataSourceQueryFailure` is raised synchronously at the
/// point of input inspection, before any partial work happens.
/// `DataSourceQueryFailure` originates at the account data source and is
/// propagated unchanged by the pure core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DripsError {
    /// A required input was absent or empty
    MissingArgument { name: &'static str },
    /// An input was present but outside the accepted range
    InvalidArgument { reason: String },
    /// A drips receiver entry failed validation
    InvalidDripsReceiver { reason: String },
    /// A splits receiver entry failed validation
    InvalidSplitsReceiver { reason: String },
    /// A value could not be interpreted as an EVM address
    InvalidAddress { value: String },
    /// The chain id is not in the supported network registry
    UnsupportedNetwork { chain_id: u64 },
    /// The account data source failed
    DataSourceQueryFailure { reason: String },
}

impl std::fmt::Display for DripsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DripsError::MissingArgument { name } => {
                write!(f, "Missing required argument: {}", name)
            }
            DripsError::InvalidArgument { reason } => write!(f, "Invalid argument: {}", reason),
            DripsError::InvalidDripsReceiver { reason } => {
                write!(f, "Invalid drips receiver: {}", reason)
            }
            DripsError::InvalidSplitsReceiver { reason } => {
                write!(f, "Invalid splits receiver: {}", reason)
            }
            DripsError::InvalidAddress { value } => write!(f, "Invalid address: {}", value),
            DripsError::UnsupportedNetwork { chain_id } => {
                write!(f, "Unsupported network: chain id {}", chain_id)
            }
            DripsError::DataSourceQueryFailure { reason } => {
                write!(f, "Data source query failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for DripsError {}
