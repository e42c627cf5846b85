//! Account estimation service.
//!
//! One `AccountEstimator` owns the snapshot for one (user, chain) pair.
//! `refresh` replaces the snapshot wholesale once the fetch completes;
//! `estimate` only reads what is already held and never refetches.

use alloy_primitives::U256;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use drips_common::cycle::cycle_info_at;
use drips_common::error::DripsError;
use drips_common::estimate::{estimate_account, AccountEstimate, SqueezeExclusion};
use drips_common::events::AccountSnapshot;
use drips_common::network::{network_config, NetworkConfig};

use crate::error::SubgraphError;

/// Boundary through which the engine receives account history.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Fetch a complete snapshot for one (user, chain) pair.
    async fn fetch_account(
        &self,
        user_id: U256,
        chain_id: u64,
    ) -> Result<AccountSnapshot, SubgraphError>;
}

#[derive(Debug)]
pub struct AccountEstimator<S: AccountSource> {
    source: S,
    user_id: U256,
    network: &'static NetworkConfig,
    snapshot: Mutex<Option<AccountSnapshot>>,
}

impl<S: AccountSource> AccountEstimator<S> {
    pub fn new(source: S, user_id: U256, chain_id: u64) -> Result<Self, DripsError> {
        let network = network_config(chain_id)?;
        Ok(Self {
            source,
            user_id,
            network,
            snapshot: Mutex::new(None),
        })
    }

    pub fn user_id(&self) -> U256 {
        self.user_id
    }

    pub fn network(&self) -> &'static NetworkConfig {
        self.network
    }

    /// Fetch a fresh snapshot and atomically replace the previous one.
    ///
    /// The old snapshot stays in place until the fetch has fully completed,
    /// so a concurrent `estimate` never sees a half-updated view.
    pub async fn refresh(&self) -> Result<(), DripsError> {
        let fresh = self
            .source
            .fetch_account(self.user_id, self.network.chain_id)
            .await?;

        *self.snapshot.lock() = Some(fresh);
        tracing::debug!(
            user = %self.user_id,
            chain = self.network.chain_id,
            "Account snapshot replaced"
        );
        Ok(())
    }

    /// Estimate from the held snapshot at the current wall-clock time.
    pub fn estimate(
        &self,
        excluding_squeezes: &[SqueezeExclusion],
    ) -> Result<AccountEstimate, DripsError> {
        self.estimate_at(excluding_squeezes, Utc::now().timestamp() as u64)
    }

    /// Estimate from the held snapshot at an explicit instant.
    pub fn estimate_at(
        &self,
        excluding_squeezes: &[SqueezeExclusion],
        now: u64,
    ) -> Result<AccountEstimate, DripsError> {
        let guard = self.snapshot.lock();
        let snapshot = guard.as_ref().ok_or(DripsError::MissingArgument {
            name: "account snapshot",
        })?;

        let cycle = cycle_info_at(self.network.chain_id, now)?;
        estimate_account(snapshot, &cycle, self.network, excluding_squeezes, now)
    }
}
