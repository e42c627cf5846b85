//! Account data loading from the Drips subgraph and the estimation service
//! built on top of it.
//!
//! The pure estimation core lives in `drips-common`; this crate supplies
//! the asynchronous boundary: wire DTOs, the query client, and snapshot
//! ownership.

pub mod client;
pub mod error;
pub mod estimator;
pub mod types;

pub use client::{SubgraphClient, SubgraphClientConfig};
pub use error::SubgraphError;
pub use estimator::{AccountEstimator, AccountSource};
