//! Off-chain projection of receivable and remaining balances.
//!
//! The engine replays an account's event history to estimate what the
//! on-chain receive and collect operations would credit at a given instant.
//! It performs no I/O, validates its whole input before computing anything,
//! and returns a freshly allocated result on every call.

pub mod types;

pub use types::{AccountEstimate, AssetEstimate, IncomingStreamEstimate, SqueezeExclusion};

use alloy_primitives::U256;

use crate::cycle::CycleInfo;
use crate::error::DripsError;
use crate::events::{AccountSnapshot, AssetConfigHistory, AssetSnapshot};
use crate::math::{accrued, window_overlap_secs};
use crate::network::NetworkConfig;

/// Estimate an account's balances from its event history.
///
/// Pure and idempotent; callers needing fresh data must refresh the
/// snapshot first. Amounts stay multiplier-scaled; conversion to whole
/// token units happens at the presentation boundary.
pub fn estimate_account(
    snapshot: &AccountSnapshot,
    cycle: &CycleInfo,
    network: &NetworkConfig,
    excluding_squeezes: &[SqueezeExclusion],
    now: u64,
) -> Result<AccountEstimate, DripsError> {
    snapshot.validate()?;
    if snapshot.chain_id != network.chain_id {
        return Err(DripsError::InvalidArgument {
            reason: format!(
                "snapshot chain id {} does not match network chain id {}",
                snapshot.chain_id, network.chain_id
            ),
        });
    }
    if cycle.cycle_duration_secs == 0 {
        return Err(DripsError::InvalidArgument {
            reason: "cycle duration must be greater than zero".to_string(),
        });
    }

    // Funds older than the receive-operation cycle cap are not counted;
    // past this horizon the estimate is a lower bound.
    let horizon_floor = cycle
        .current_cycle_start
        .saturating_sub(network.max_receivable_cycles as u64 * cycle.cycle_duration_secs);

    let mut assets: Vec<AssetEstimate> = snapshot
        .assets
        .iter()
        .map(|asset| estimate_asset(snapshot.user_id, asset, excluding_squeezes, horizon_floor, now))
        .collect();
    assets.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));

    tracing::debug!(
        user = %snapshot.user_id,
        assets = assets.len(),
        timestamp = now,
        "Account estimated"
    );

    Ok(AccountEstimate {
        user_id: snapshot.user_id,
        timestamp: now,
        assets,
    })
}

fn estimate_asset(
    user_id: U256,
    asset: &AssetSnapshot,
    squeezes: &[SqueezeExclusion],
    horizon_floor: u64,
    now: u64,
) -> AssetEstimate {
    let mut receivable = U256::ZERO;
    let mut incoming_streams = Vec::with_capacity(asset.incoming.len());
    let mut total_streams: u32 = 0;

    for history in &asset.incoming {
        let Some(sender) = history.sender_user_id() else {
            continue;
        };
        let squeeze_floor = squeeze_floor_for(history, sender, squeezes);
        let (estimated_amount, amount_per_sec, active_streams) = accrue_incoming(
            user_id,
            history,
            squeeze_floor,
            asset.last_received_at,
            horizon_floor,
            now,
        );

        if !estimated_amount.is_zero() || !amount_per_sec.is_zero() {
            incoming_streams.push(IncomingStreamEstimate {
                sender_user_id: sender,
                token_address: asset.token_address,
                amount_per_sec,
                estimated_amount,
            });
        }
        receivable = receivable.checked_add(estimated_amount).unwrap_or(U256::MAX);
        total_streams += active_streams;
    }

    incoming_streams.sort_by(|a, b| {
        b.estimated_amount
            .cmp(&a.estimated_amount)
            .then(a.sender_user_id.cmp(&b.sender_user_id))
    });

    tracing::debug!(
        asset = %asset.asset_id,
        senders = asset.incoming.len(),
        receivable = %receivable,
        streams = total_streams,
        "Asset estimated"
    );

    AssetEstimate {
        asset_id: asset.asset_id,
        token_address: asset.token_address,
        receivable_amount: receivable,
        collectable_amount: asset.collectable,
        splittable_amount: asset.splittable,
        remaining_balance: remaining_balance(&asset.outgoing, now),
        total_streams_count: total_streams,
        incoming_streams,
    }
}

/// Resolve squeeze exclusions against one sender's history.
///
/// Returns the index of the newest matched event and the instant up to
/// which funds of that prefix were already drained.
fn squeeze_floor_for(
    history: &AssetConfigHistory,
    sender: U256,
    squeezes: &[SqueezeExclusion],
) -> Option<(usize, u64)> {
    let mut floor: Option<(usize, u64)> = None;
    for squeeze in squeezes.iter().filter(|s| s.sender_user_id == sender) {
        let matched = history
            .events
            .iter()
            .position(|e| e.drips_history_hash == squeeze.drips_history_hash);
        if let Some(index) = matched {
            floor = Some(match floor {
                Some((i, at)) => (i.max(index), at.max(squeeze.squeezed_at)),
                None => (index, squeeze.squeezed_at),
            });
        }
    }
    floor
}

/// Accrue everything one sender streamed to `receiver` across its history.
///
/// Each event accrues independently over the window it was in force, so a
/// later update never retroactively changes amounts accrued under an
/// earlier one; overlapping windows after a balance top-up are additive.
fn accrue_incoming(
    receiver: U256,
    history: &AssetConfigHistory,
    squeeze_floor: Option<(usize, u64)>,
    last_received_at: Option<u64>,
    horizon_floor: u64,
    now: u64,
) -> (U256, U256, u32) {
    let mut total = U256::ZERO;
    let mut rate = U256::ZERO;
    let mut active_streams = 0u32;

    let events = &history.events;
    for (i, event) in events.iter().enumerate() {
        let superseded_at = events
            .get(i + 1)
            .map(|e| e.block_timestamp)
            .unwrap_or(u64::MAX);
        let funded_until = if event.max_end == 0 {
            event.block_timestamp
        } else {
            event.max_end
        };
        let event_close = superseded_at.min(funded_until);

        let mut event_open = event.block_timestamp.max(horizon_floor);
        if let Some(at) = last_received_at {
            event_open = event_open.max(at);
        }
        if let Some((index, at)) = squeeze_floor {
            if i <= index {
                event_open = event_open.max(at);
            }
        }

        let is_latest = i + 1 == events.len();
        for seen in event.receivers.iter().filter(|s| s.receiver_user_id == receiver) {
            let config = &seen.config;
            let start = if config.start == 0 {
                event.block_timestamp
            } else {
                config.start as u64
            };
            let end = if config.duration == 0 {
                u64::MAX
            } else {
                start.saturating_add(config.duration as u64)
            };

            let secs = window_overlap_secs(event_open, event_close.min(now), start, end);
            if secs > 0 {
                total = total
                    .checked_add(accrued(config.amount_per_sec, secs))
                    .unwrap_or(U256::MAX);
            }

            if is_latest && start <= now && now < end && now < event_close {
                rate = rate.checked_add(config.amount_per_sec).unwrap_or(U256::MAX);
                active_streams += 1;
            }
        }
    }

    (total, rate, active_streams)
}

/// Funds left in the account's own outgoing configuration.
///
/// `None` when the account never configured drips for the asset; zero once
/// `max_end` has passed.
fn remaining_balance(outgoing: &AssetConfigHistory, now: u64) -> Option<U256> {
    let latest = outgoing.latest()?;
    if latest.max_end != 0 && now >= latest.max_end {
        return Some(U256::ZERO);
    }

    let funded_until = if latest.max_end == 0 {
        latest.block_timestamp
    } else {
        latest.max_end
    };

    let mut spent = U256::ZERO;
    for seen in &latest.receivers {
        let config = &seen.config;
        let start = if config.start == 0 {
            latest.block_timestamp
        } else {
            config.start as u64
        };
        let end = if config.duration == 0 {
            u64::MAX
        } else {
            start.saturating_add(config.duration as u64)
        };

        let secs = window_overlap_secs(latest.block_timestamp, now.min(funded_until), start, end);
        spent = spent
            .checked_add(accrued(config.amount_per_sec, secs))
            .unwrap_or(U256::MAX);
    }

    Some(latest.balance.checked_sub(spent).unwrap_or(U256::ZERO))
}
