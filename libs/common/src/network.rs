//! Per-chain protocol constants.
//!
//! These values must match the deployed contracts exactly; the estimation
//! engine and the canonicalizer both read them instead of hardcoding.

use alloy_primitives::U256;

use crate::error::DripsError;

/// Maximum drips receivers accepted in a single configuration
pub const MAX_DRIPS_RECEIVERS: usize = 100;

/// Maximum splits receivers accepted in a single configuration
pub const MAX_SPLITS_RECEIVERS: usize = 200;

/// Total weight a splits configuration distributes across its receivers
pub const TOTAL_SPLITS_WEIGHT: u32 = 1_000_000;

/// Protocol constants for one supported network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: &'static str,
    /// Length of one settlement cycle in seconds
    pub cycle_secs: u64,
    /// Fixed-point multiplier applied to amount-per-second values
    pub amt_per_sec_multiplier: u64,
    /// Cap on cycles counted by a single receive operation
    pub max_receivable_cycles: u32,
    /// Default subgraph endpoint for this network
    pub subgraph_url: &'static str,
}

impl NetworkConfig {
    pub fn multiplier(&self) -> U256 {
        U256::from(self.amt_per_sec_multiplier)
    }

    /// Convert a multiplier-scaled amount to whole token units, rounding down.
    ///
    /// Display-boundary helper; the estimation engine keeps amounts scaled.
    pub fn to_token_units(&self, scaled: U256) -> U256 {
        scaled / self.multiplier()
    }
}

pub static SUPPORTED_NETWORKS: &[NetworkConfig] = &[
    NetworkConfig {
        chain_id: 1,
        name: "mainnet",
        cycle_secs: 604_800,
        amt_per_sec_multiplier: 1_000_000_000,
        max_receivable_cycles: 1_000,
        subgraph_url: "https://api.thegraph.com/subgraphs/name/drips-network/drips-v2-on-ethereum",
    },
    NetworkConfig {
        chain_id: 5,
        name: "goerli",
        cycle_secs: 604_800,
        amt_per_sec_multiplier: 1_000_000_000,
        max_receivable_cycles: 1_000,
        subgraph_url: "https://api.thegraph.com/subgraphs/name/drips-network/drips-v2-on-goerli",
    },
    NetworkConfig {
        chain_id: 137,
        name: "polygon",
        cycle_secs: 604_800,
        amt_per_sec_multiplier: 1_000_000_000,
        max_receivable_cycles: 1_000,
        subgraph_url: "https://api.thegraph.com/subgraphs/name/drips-network/drips-v2-on-polygon",
    },
    NetworkConfig {
        chain_id: 80001,
        name: "mumbai",
        cycle_secs: 604_800,
        amt_per_sec_multiplier: 1_000_000_000,
        max_receivable_cycles: 1_000,
        subgraph_url: "https://api.thegraph.com/subgraphs/name/drips-network/drips-v2-on-mumbai",
    },
];

/// Look up the protocol constants for a chain id.
pub fn network_config(chain_id: u64) -> Result<&'static NetworkConfig, DripsError> {
    SUPPORTED_NETWORKS
        .iter()
        .find(|n| n.chain_id == chain_id)
        .ok_or(DripsError::UnsupportedNetwork { chain_id })
}
