//! Packed stream configuration.
//!
//! The contracts store one receiver's configuration as a single 256-bit
//! integer. Layout, most significant bits first:
//!
//! | bits     | field            |
//! |----------|------------------|
//! | 224..256 | `drip_id`        |
//! | 64..224  | `amount_per_sec` |
//! | 32..64   | `start`          |
//! | 0..32    | `duration`       |
//!
//! Packing and unpacking are lossless for every valid configuration.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::DripsError;

const AMT_PER_SEC_BITS: usize = 160;
const AMT_PER_SEC_SHIFT: usize = 64;
const START_SHIFT: usize = 32;
const DRIP_ID_SHIFT: usize = 224;

/// Configuration of one outgoing stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Tag distinguishing concurrent streams to the same receiver
    pub drip_id: u32,
    /// Tokens per second, fixed-point scaled by the network multiplier
    pub amount_per_sec: U256,
    /// Unix seconds; 0 schedules the stream to begin when the update executes
    pub start: u32,
    /// Seconds; 0 streams until the balance runs out
    pub duration: u32,
}

impl StreamConfig {
    /// Check the invariants the contracts enforce on a receiver config.
    pub fn validate(&self) -> Result<(), DripsError> {
        if self.amount_per_sec.is_zero() {
            return Err(DripsError::InvalidDripsReceiver {
                reason: "amount_per_sec must be greater than zero".to_string(),
            });
        }
        if self.amount_per_sec.bit_len() > AMT_PER_SEC_BITS {
            return Err(DripsError::InvalidDripsReceiver {
                reason: format!(
                    "amount_per_sec {} does not fit the packed {}-bit lane",
                    self.amount_per_sec, AMT_PER_SEC_BITS
                ),
            });
        }
        Ok(())
    }

    /// Pack into the on-chain 256-bit representation.
    pub fn to_u256(&self) -> U256 {
        (U256::from(self.drip_id) << DRIP_ID_SHIFT)
            | (self.amount_per_sec << AMT_PER_SEC_SHIFT)
            | (U256::from(self.start) << START_SHIFT)
            | U256::from(self.duration)
    }

    /// Unpack from the on-chain 256-bit representation.
    pub fn from_u256(packed: U256) -> Self {
        let mask32 = U256::from(u32::MAX);
        let amt_mask = (U256::from(1u8) << AMT_PER_SEC_BITS) - U256::from(1u8);

        Self {
            drip_id: (packed >> DRIP_ID_SHIFT).to::<u32>(),
            amount_per_sec: (packed >> AMT_PER_SEC_SHIFT) & amt_mask,
            start: ((packed >> START_SHIFT) & mask32).to::<u32>(),
            duration: (packed & mask32).to::<u32>(),
        }
    }
}
