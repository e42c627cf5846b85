//! Settlement cycle math.
//!
//! Cycles are fixed-length epochs anchored at the unix epoch; streamed funds
//! become receivable once the cycle they accrued in has ended. Cycle info is
//! stateless and recomputed on demand.

use chrono::{DateTime, Utc};

use crate::error::DripsError;
use crate::network::network_config;

/// Boundaries of the settlement cycle containing one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleInfo {
    /// Unix seconds at which the current cycle began
    pub current_cycle_start: u64,
    /// Unix seconds at which the next cycle begins
    pub next_cycle_start: u64,
    pub cycle_duration_secs: u64,
}

impl CycleInfo {
    pub fn current_cycle_start_date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.current_cycle_start as i64, 0)
    }

    pub fn next_cycle_start_date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.next_cycle_start as i64, 0)
    }
}

/// Cycle boundaries for a chain at the current wall-clock time.
pub fn cycle_info(chain_id: u64) -> Result<CycleInfo, DripsError> {
    cycle_info_at(chain_id, Utc::now().timestamp() as u64)
}

/// Cycle boundaries for a chain at an explicit instant.
pub fn cycle_info_at(chain_id: u64, now: u64) -> Result<CycleInfo, DripsError> {
    let network = network_config(chain_id)?;
    let secs = network.cycle_secs;
    let current_cycle_start = now - (now % secs);

    Ok(CycleInfo {
        current_cycle_start,
        next_cycle_start: current_cycle_start + secs,
        cycle_duration_secs: secs,
    })
}
