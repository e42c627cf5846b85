//! In-memory model of historical configuration-change events.
//!
//! The indexing service returns, per `(account, asset)` pair, the ordered
//! sequence of configuration updates the account performed. This module
//! holds those records after boundary parsing; all numeric fields are exact
//! integers, never floating point. History hashes are carried verbatim for
//! squeeze matching and are not recomputed locally.

use std::collections::HashSet;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::DripsError;
use crate::receivers::StreamConfig;

/// One receiver listed by a configuration update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripsReceiverSeenEvent {
    pub sender_user_id: U256,
    pub receiver_user_id: U256,
    pub config: StreamConfig,
}

/// One "account changed its outgoing configuration for an asset" record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripsSetEvent {
    pub sender_user_id: U256,
    pub asset_id: U256,
    /// Receivers active from this update on, in emission order
    pub receivers: Vec<DripsReceiverSeenEvent>,
    /// Hash chaining all set events for this (account, asset) pair
    pub drips_history_hash: B256,
    /// Account balance at the instant of the update, multiplier-scaled
    pub balance: U256,
    /// Unix seconds at which the balance funds this configuration no
    /// further; 0 marks a configuration with nothing left to stream
    pub max_end: u64,
    pub block_timestamp: u64,
}

/// Ordered set-event history for one (account, asset) pair, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfigHistory {
    pub events: Vec<DripsSetEvent>,
}

impl AssetConfigHistory {
    pub fn new(events: Vec<DripsSetEvent>) -> Self {
        Self { events }
    }

    /// The most recent configuration update, if any.
    pub fn latest(&self) -> Option<&DripsSetEvent> {
        self.events.last()
    }

    /// The account this history belongs to.
    pub fn sender_user_id(&self) -> Option<U256> {
        self.events.first().map(|e| e.sender_user_id)
    }

    /// Check that the history is oldest-first and internally consistent.
    pub fn validate(&self) -> Result<(), DripsError> {
        for pair in self.events.windows(2) {
            if pair[1].block_timestamp < pair[0].block_timestamp {
                return Err(DripsError::InvalidArgument {
                    reason: "set events must be ordered oldest first".to_string(),
                });
            }
            if pair[1].sender_user_id != pair[0].sender_user_id {
                return Err(DripsError::InvalidArgument {
                    reason: "set events in one history must share a sender".to_string(),
                });
            }
            if pair[1].asset_id != pair[0].asset_id {
                return Err(DripsError::InvalidArgument {
                    reason: "set events in one history must share an asset".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Everything needed to estimate one account's balances for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub asset_id: U256,
    pub token_address: Address,
    /// The account's own outgoing history; may be empty
    pub outgoing: AssetConfigHistory,
    /// One history per sender that has listed this account as a receiver
    pub incoming: Vec<AssetConfigHistory>,
    /// Funds already settled and awaiting split, when the source supplies it
    pub splittable: Option<U256>,
    /// Funds already split and awaiting collect, when the source supplies it
    pub collectable: Option<U256>,
    /// Unix seconds of the account's last receive or squeeze for this asset
    pub last_received_at: Option<u64>,
}

impl AssetSnapshot {
    fn validate(&self) -> Result<(), DripsError> {
        let expected = asset_id_to_address(self.asset_id)?;
        if expected != self.token_address {
            return Err(DripsError::InvalidArgument {
                reason: format!(
                    "token address {} does not match asset id {}",
                    self.token_address, self.asset_id
                ),
            });
        }

        self.outgoing.validate()?;
        if let Some(event) = self.outgoing.events.first() {
            if event.asset_id != self.asset_id {
                return Err(DripsError::InvalidArgument {
                    reason: "outgoing history asset does not match snapshot asset".to_string(),
                });
            }
        }

        for history in &self.incoming {
            history.validate()?;
            let first = history.events.first().ok_or_else(|| DripsError::InvalidArgument {
                reason: "incoming history must contain at least one event".to_string(),
            })?;
            if first.asset_id != self.asset_id {
                return Err(DripsError::InvalidArgument {
                    reason: "incoming history asset does not match snapshot asset".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Full account state for one chain, as fetched from the data source.
///
/// Owned exclusively by one estimator instance and replaced wholesale on
/// refresh, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub user_id: U256,
    pub chain_id: u64,
    pub assets: Vec<AssetSnapshot>,
}

impl AccountSnapshot {
    /// Check the whole snapshot before any estimation work starts.
    pub fn validate(&self) -> Result<(), DripsError> {
        let mut asset_ids = HashSet::with_capacity(self.assets.len());
        for asset in &self.assets {
            if !asset_ids.insert(asset.asset_id) {
                return Err(DripsError::InvalidArgument {
                    reason: format!("duplicate asset id {} in snapshot", asset.asset_id),
                });
            }
            asset.validate()?;
            if let Some(event) = asset.outgoing.events.first() {
                if event.sender_user_id != self.user_id {
                    return Err(DripsError::InvalidArgument {
                        reason: "outgoing history sender must match the account".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Unique senders across seen events, first occurrence wins, discovery
/// order preserved.
pub fn unique_senders<'a, I>(seen: I) -> Vec<U256>
where
    I: IntoIterator<Item = &'a DripsReceiverSeenEvent>,
{
    let mut known = HashSet::new();
    let mut out = Vec::new();
    for event in seen {
        if known.insert(event.sender_user_id) {
            out.push(event.sender_user_id);
        }
    }
    out
}

/// Derive the ERC-20 token address from an asset id.
///
/// Asset ids are token addresses widened to 160 bits; anything larger is
/// not a valid asset.
pub fn asset_id_to_address(asset_id: U256) -> Result<Address, DripsError> {
    if asset_id.bit_len() > 160 {
        return Err(DripsError::InvalidAddress {
            value: asset_id.to_string(),
        });
    }
    Ok(Address::from_slice(&asset_id.to_be_bytes::<32>()[12..]))
}

/// Widen an ERC-20 token address into its asset id.
pub fn address_to_asset_id(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}
