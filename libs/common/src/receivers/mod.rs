//! Receiver lists and their canonical on-chain ordering.
//!
//! The contracts reject configuration updates whose receiver lists are
//! unsorted or contain duplicates, so every list must pass through
//! [`canonicalize_drips_receivers`] or [`canonicalize_splits_receivers`]
//! before submission. Ordering uses 256-bit integer comparison; user ids
//! routinely exceed native integer precision.

pub mod stream_config;

pub use stream_config::StreamConfig;

use std::collections::HashSet;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::DripsError;
use crate::network::{MAX_DRIPS_RECEIVERS, MAX_SPLITS_RECEIVERS};

/// An account receiving a continuous per-second stream.
///
/// Identity is the `(user_id, config)` pair; the same user may appear with
/// several configs for concurrent `drip_id`-tagged streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripsReceiver {
    pub user_id: U256,
    pub config: StreamConfig,
}

/// An account receiving a weighted share of collected funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitsReceiver {
    pub user_id: U256,
    pub weight: u32,
}

/// Deduplicate, validate, and sort a drips receiver list into the exact
/// order the contracts require.
///
/// The input is never mutated; the result is deterministic for any
/// permutation of an equivalent input multiset.
pub fn canonicalize_drips_receivers(
    receivers: &[DripsReceiver],
) -> Result<Vec<DripsReceiver>, DripsError> {
    if receivers.len() > MAX_DRIPS_RECEIVERS {
        return Err(DripsError::InvalidArgument {
            reason: format!(
                "drips receiver count {} exceeds the maximum of {}",
                receivers.len(),
                MAX_DRIPS_RECEIVERS
            ),
        });
    }
    for receiver in receivers {
        receiver.config.validate()?;
    }

    let mut seen = HashSet::with_capacity(receivers.len());
    let mut out: Vec<DripsReceiver> = receivers
        .iter()
        .filter(|r| seen.insert((r.user_id, r.config.to_u256())))
        .copied()
        .collect();
    out.sort_by(|a, b| {
        (a.user_id, a.config.to_u256()).cmp(&(b.user_id, b.config.to_u256()))
    });
    Ok(out)
}

/// Deduplicate, validate, and sort a splits receiver list into the exact
/// order the contracts require.
pub fn canonicalize_splits_receivers(
    receivers: &[SplitsReceiver],
) -> Result<Vec<SplitsReceiver>, DripsError> {
    if receivers.len() > MAX_SPLITS_RECEIVERS {
        return Err(DripsError::InvalidArgument {
            reason: format!(
                "splits receiver count {} exceeds the maximum of {}",
                receivers.len(),
                MAX_SPLITS_RECEIVERS
            ),
        });
    }
    for receiver in receivers {
        if receiver.weight == 0 {
            return Err(DripsError::InvalidSplitsReceiver {
                reason: format!(
                    "weight must be greater than zero for user {}",
                    receiver.user_id
                ),
            });
        }
    }

    let mut seen = HashSet::with_capacity(receivers.len());
    let mut out: Vec<SplitsReceiver> = receivers
        .iter()
        .filter(|r| seen.insert((r.user_id, r.weight)))
        .copied()
        .collect();
    // The contracts order by user id alone; weight breaks ties between
    // duplicate-user entries so the result is permutation-independent.
    out.sort_by(|a, b| (a.user_id, a.weight).cmp(&(b.user_id, b.weight)));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drips(user_id: u64, amount_per_sec: u64) -> DripsReceiver {
        DripsReceiver {
            user_id: U256::from(user_id),
            config: StreamConfig {
                drip_id: 0,
                amount_per_sec: U256::from(amount_per_sec),
                start: 0,
                duration: 0,
            },
        }
    }

    fn splits(user_id: u64, weight: u32) -> SplitsReceiver {
        SplitsReceiver {
            user_id: U256::from(user_id),
            weight,
        }
    }

    #[test]
    fn test_drips_sorted_by_user_id() {
        let input = vec![drips(100, 1), drips(1, 1), drips(50, 1)];
        let out = canonicalize_drips_receivers(&input).unwrap();
        let ids: Vec<U256> = out.iter().map(|r| r.user_id).collect();
        assert_eq!(ids, vec![U256::from(1u8), U256::from(50u8), U256::from(100u8)]);
    }

    #[test]
    fn test_drips_sort_uses_big_integer_comparison() {
        // Above 2^64; string or float comparison would order these wrong
        let big = U256::from(10u8).pow(U256::from(30u8));
        let bigger = big + U256::from(2u8);
        let input = vec![
            DripsReceiver { user_id: bigger, ..drips(0, 1) },
            DripsReceiver { user_id: big, ..drips(0, 1) },
            drips(9, 1),
        ];
        let out = canonicalize_drips_receivers(&input).unwrap();
        let ids: Vec<U256> = out.iter().map(|r| r.user_id).collect();
        assert_eq!(ids, vec![U256::from(9u8), big, bigger]);
    }

    #[test]
    fn test_drips_config_breaks_user_id_ties() {
        let input = vec![drips(7, 20), drips(7, 10)];
        let out = canonicalize_drips_receivers(&input).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].config.amount_per_sec, U256::from(10u8));
        assert_eq!(out[1].config.amount_per_sec, U256::from(20u8));
    }

    #[test]
    fn test_drips_deduplicates_identical_entries() {
        let input = vec![drips(1, 5), drips(1, 5), drips(2, 1)];
        let out = canonicalize_drips_receivers(&input).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_drips_idempotent_and_order_independent() {
        let input = vec![drips(3, 1), drips(1, 2), drips(2, 1), drips(1, 2)];
        let mut permuted = input.clone();
        permuted.reverse();

        let once = canonicalize_drips_receivers(&input).unwrap();
        let twice = canonicalize_drips_receivers(&once).unwrap();
        let from_permutation = canonicalize_drips_receivers(&permuted).unwrap();

        assert_eq!(once, twice);
        assert_eq!(once, from_permutation);
    }

    #[test]
    fn test_drips_input_not_mutated() {
        let input = vec![drips(2, 1), drips(1, 1)];
        let before = input.clone();
        canonicalize_drips_receivers(&input).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn test_drips_count_boundary() {
        let max: Vec<DripsReceiver> = (0..100).map(|i| drips(i, 1)).collect();
        assert_eq!(canonicalize_drips_receivers(&max).unwrap().len(), 100);

        let over: Vec<DripsReceiver> = (0..101).map(|i| drips(i, 1)).collect();
        let err = canonicalize_drips_receivers(&over).unwrap_err();
        assert!(matches!(err, DripsError::InvalidArgument { .. }));
    }

    #[test]
    fn test_drips_zero_amount_rejected() {
        let err = canonicalize_drips_receivers(&[drips(1, 0)]).unwrap_err();
        assert!(matches!(err, DripsError::InvalidDripsReceiver { .. }));
    }

    #[test]
    fn test_splits_deduplication_example() {
        let input = vec![splits(1, 5), splits(1, 5), splits(2, 1)];
        let out = canonicalize_splits_receivers(&input).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].user_id, U256::from(1u8));
        assert_eq!(out[1].user_id, U256::from(2u8));
    }

    #[test]
    fn test_splits_duplicate_user_distinct_weights_kept() {
        let input = vec![splits(1, 10), splits(1, 5)];
        let out = canonicalize_splits_receivers(&input).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].weight, 5);
        assert_eq!(out[1].weight, 10);
    }

    #[test]
    fn test_splits_count_boundary() {
        let max: Vec<SplitsReceiver> = (0..200).map(|i| splits(i, 1)).collect();
        assert_eq!(canonicalize_splits_receivers(&max).unwrap().len(), 200);

        let over: Vec<SplitsReceiver> = (0..201).map(|i| splits(i, 1)).collect();
        let err = canonicalize_splits_receivers(&over).unwrap_err();
        assert!(matches!(err, DripsError::InvalidArgument { .. }));
    }

    #[test]
    fn test_splits_zero_weight_rejected() {
        let err = canonicalize_splits_receivers(&[splits(1, 0)]).unwrap_err();
        assert!(matches!(err, DripsError::InvalidSplitsReceiver { .. }));
    }

    #[test]
    fn test_splits_order_independent() {
        let input = vec![splits(5, 1), splits(3, 2), splits(4, 9)];
        let mut permuted = input.clone();
        permuted.rotate_left(1);
        assert_eq!(
            canonicalize_splits_receivers(&input).unwrap(),
            canonicalize_splits_receivers(&permuted).unwrap()
        );
    }
}
