//! Value objects produced and consumed by the estimation engine.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Funds already claimed out-of-band that must not be double counted.
///
/// The hash selects the squeezed history prefix of one sender;
/// `squeezed_at` is the instant up to which those funds were drained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqueezeExclusion {
    pub sender_user_id: U256,
    pub drips_history_hash: B256,
    pub squeezed_at: u64,
}

/// One incoming stream, aggregated per sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingStreamEstimate {
    pub sender_user_id: U256,
    pub token_address: Address,
    /// Combined rate of the sender's streams active at the estimation
    /// instant, multiplier-scaled
    pub amount_per_sec: U256,
    /// Accrued amount over the estimation window, multiplier-scaled
    pub estimated_amount: U256,
}

/// Projected balances for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEstimate {
    pub asset_id: U256,
    pub token_address: Address,
    /// Funds projected receivable, multiplier-scaled; a lower bound past
    /// the receivable-cycles horizon
    pub receivable_amount: U256,
    pub collectable_amount: Option<U256>,
    pub splittable_amount: Option<U256>,
    /// Funds left in the account's own outgoing configuration
    pub remaining_balance: Option<U256>,
    /// Incoming streams active at the estimation instant
    pub total_streams_count: u32,
    /// Ordered by descending estimated amount, ties by ascending sender id
    pub incoming_streams: Vec<IncomingStreamEstimate>,
}

/// Immutable result of one estimation pass.
///
/// Constructed fresh on every call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEstimate {
    pub user_id: U256,
    /// Unix seconds the estimate was computed for
    pub timestamp: u64,
    /// Per-asset estimates, ascending by asset id
    pub assets: Vec<AssetEstimate>,
}

impl AccountEstimate {
    pub fn asset(&self, asset_id: U256) -> Option<&AssetEstimate> {
        self.assets.iter().find(|a| a.asset_id == asset_id)
    }
}
