//! Service-flow tests for the account estimator against an in-memory
//! account source; no network access required.

use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use drips_account_sync::{AccountEstimator, AccountSource, SubgraphError};
use drips_common::error::DripsError;
use drips_common::events::{
    asset_id_to_address, AccountSnapshot, AssetConfigHistory, AssetSnapshot,
    DripsReceiverSeenEvent, DripsSetEvent,
};
use drips_common::receivers::StreamConfig;

const NOW: u64 = 1_700_000_000;
const MULTIPLIER: u64 = 1_000_000_000;
const ASSET: u64 = 0xbeef;
const ME: u64 = 7;
const SENDER: u64 = 21;

#[derive(Debug)]
struct StubSource {
    snapshots: Mutex<Vec<AccountSnapshot>>,
}

impl StubSource {
    fn new(snapshots: Vec<AccountSnapshot>) -> Self {
        Self {
            snapshots: Mutex::new(snapshots),
        }
    }
}

#[async_trait]
impl AccountSource for StubSource {
    async fn fetch_account(
        &self,
        _user_id: U256,
        _chain_id: u64,
    ) -> Result<AccountSnapshot, SubgraphError> {
        let mut snapshots = self.snapshots.lock();
        if snapshots.is_empty() {
            return Err(SubgraphError::Transport("stub exhausted".to_string()));
        }
        Ok(snapshots.remove(0))
    }
}

fn snapshot_streaming_at(rate_units: u64) -> AccountSnapshot {
    let config = StreamConfig {
        drip_id: 0,
        amount_per_sec: U256::from(rate_units * MULTIPLIER),
        start: (NOW - 100) as u32,
        duration: 0,
    };
    let event = DripsSetEvent {
        sender_user_id: U256::from(SENDER),
        asset_id: U256::from(ASSET),
        receivers: vec![DripsReceiverSeenEvent {
            sender_user_id: U256::from(SENDER),
            receiver_user_id: U256::from(ME),
            config,
        }],
        drips_history_hash: B256::repeat_byte(1),
        balance: U256::from(1_000_000u64) * U256::from(MULTIPLIER),
        max_end: NOW + 1_000_000,
        block_timestamp: NOW - 100,
    };

    AccountSnapshot {
        user_id: U256::from(ME),
        chain_id: 1,
        assets: vec![AssetSnapshot {
            asset_id: U256::from(ASSET),
            token_address: asset_id_to_address(U256::from(ASSET)).unwrap(),
            outgoing: AssetConfigHistory::default(),
            incoming: vec![AssetConfigHistory::new(vec![event])],
            splittable: None,
            collectable: None,
            last_received_at: None,
        }],
    }
}

#[tokio::test]
async fn test_estimate_before_refresh_is_rejected() {
    let estimator = AccountEstimator::new(StubSource::new(vec![]), U256::from(ME), 1).unwrap();

    let err = estimator.estimate_at(&[], NOW).unwrap_err();
    assert_eq!(
        err,
        DripsError::MissingArgument {
            name: "account snapshot"
        }
    );
}

#[tokio::test]
async fn test_refresh_then_estimate() {
    let source = StubSource::new(vec![snapshot_streaming_at(1)]);
    let estimator = AccountEstimator::new(source, U256::from(ME), 1).unwrap();

    estimator.refresh().await.unwrap();
    let estimate = estimator.estimate_at(&[], NOW).unwrap();

    let asset = estimate.asset(U256::from(ASSET)).unwrap();
    assert_eq!(
        asset.receivable_amount,
        U256::from(100u64) * U256::from(MULTIPLIER)
    );
    assert_eq!(asset.total_streams_count, 1);
}

#[tokio::test]
async fn test_estimate_is_repeatable_without_refetch() {
    // The stub holds a single snapshot; a second fetch would fail, proving
    // estimate never refetches implicitly
    let source = StubSource::new(vec![snapshot_streaming_at(1)]);
    let estimator = AccountEstimator::new(source, U256::from(ME), 1).unwrap();

    estimator.refresh().await.unwrap();
    let first = estimator.estimate_at(&[], NOW).unwrap();
    let second = estimator.estimate_at(&[], NOW).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_refresh_replaces_snapshot_wholesale() {
    let source = StubSource::new(vec![snapshot_streaming_at(1), snapshot_streaming_at(3)]);
    let estimator = AccountEstimator::new(source, U256::from(ME), 1).unwrap();

    estimator.refresh().await.unwrap();
    let before = estimator.estimate_at(&[], NOW).unwrap();

    estimator.refresh().await.unwrap();
    let after = estimator.estimate_at(&[], NOW).unwrap();

    assert_eq!(
        before.assets[0].receivable_amount,
        U256::from(100u64) * U256::from(MULTIPLIER)
    );
    assert_eq!(
        after.assets[0].receivable_amount,
        U256::from(300u64) * U256::from(MULTIPLIER)
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let source = StubSource::new(vec![snapshot_streaming_at(1)]);
    let estimator = AccountEstimator::new(source, U256::from(ME), 1).unwrap();

    estimator.refresh().await.unwrap();
    let err = estimator.refresh().await.unwrap_err();
    assert!(matches!(err, DripsError::DataSourceQueryFailure { .. }));

    // The previous snapshot is still intact
    let estimate = estimator.estimate_at(&[], NOW).unwrap();
    assert_eq!(
        estimate.assets[0].receivable_amount,
        U256::from(100u64) * U256::from(MULTIPLIER)
    );
}

#[tokio::test]
async fn test_unsupported_chain_rejected_at_construction() {
    let err = AccountEstimator::new(StubSource::new(vec![]), U256::from(ME), 4_242).unwrap_err();
    assert_eq!(err, DripsError::UnsupportedNetwork { chain_id: 4_242 });
}
