//! Wire types returned by the Drips subgraph.
//!
//! All numeric fields arrive as strings and are parsed into
//! arbitrary-precision integers here, at the boundary; nothing downstream
//! touches the raw representations.

use alloy_primitives::{B256, U256};
use serde::Deserialize;

use drips_common::events::{DripsReceiverSeenEvent, DripsSetEvent};
use drips_common::receivers::StreamConfig;

use crate::error::SubgraphError;

/// A `dripsSetEvents` entity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DripsSetEventDto {
    pub user_id: String,
    pub asset_id: String,
    pub drips_history_hash: String,
    pub balance: String,
    pub max_end: String,
    pub block_timestamp: String,
    #[serde(default)]
    pub drips_receiver_seen_events: Vec<DripsReceiverSeenEventDto>,
}

/// A `dripsReceiverSeenEvents` entity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DripsReceiverSeenEventDto {
    pub sender_user_id: String,
    pub receiver_user_id: String,
    /// Packed stream configuration as a decimal 256-bit integer
    pub config: String,
}

/// A `receivedDripsEvents` entity; only the checkpoint fields are needed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedDripsEventDto {
    pub asset_id: String,
    pub block_timestamp: String,
}

pub(crate) fn parse_u256(field: &str, value: &str) -> Result<U256, SubgraphError> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(trimmed, 10),
    };
    parsed.map_err(|e| SubgraphError::Decode {
        field: field.to_string(),
        reason: format!("{} (value '{}')", e, value),
    })
}

pub(crate) fn parse_u64(field: &str, value: &str) -> Result<u64, SubgraphError> {
    value.trim().parse::<u64>().map_err(|e| SubgraphError::Decode {
        field: field.to_string(),
        reason: format!("{} (value '{}')", e, value),
    })
}

pub(crate) fn parse_b256(field: &str, value: &str) -> Result<B256, SubgraphError> {
    value.trim().parse::<B256>().map_err(|e| SubgraphError::Decode {
        field: field.to_string(),
        reason: format!("{} (value '{}')", e, value),
    })
}

impl TryFrom<&DripsReceiverSeenEventDto> for DripsReceiverSeenEvent {
    type Error = SubgraphError;

    fn try_from(dto: &DripsReceiverSeenEventDto) -> Result<Self, Self::Error> {
        Ok(DripsReceiverSeenEvent {
            sender_user_id: parse_u256("senderUserId", &dto.sender_user_id)?,
            receiver_user_id: parse_u256("receiverUserId", &dto.receiver_user_id)?,
            config: StreamConfig::from_u256(parse_u256("config", &dto.config)?),
        })
    }
}

impl TryFrom<&DripsSetEventDto> for DripsSetEvent {
    type Error = SubgraphError;

    fn try_from(dto: &DripsSetEventDto) -> Result<Self, Self::Error> {
        let receivers = dto
            .drips_receiver_seen_events
            .iter()
            .map(DripsReceiverSeenEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DripsSetEvent {
            sender_user_id: parse_u256("userId", &dto.user_id)?,
            asset_id: parse_u256("assetId", &dto.asset_id)?,
            receivers,
            drips_history_hash: parse_b256("dripsHistoryHash", &dto.drips_history_hash)?,
            balance: parse_u256("balance", &dto.balance)?,
            max_end: parse_u64("maxEnd", &dto.max_end)?,
            block_timestamp: parse_u64("blockTimestamp", &dto.block_timestamp)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_event_dto_maps_to_domain() {
        let json = r#"{
            "userId": "42",
            "assetId": "1461501637330902918203684832716283019655932542975",
            "dripsHistoryHash": "0x0101010101010101010101010101010101010101010101010101010101010101",
            "balance": "5000000000",
            "maxEnd": "1700000000",
            "blockTimestamp": "1690000000",
            "dripsReceiverSeenEvents": [
                {"senderUserId": "42", "receiverUserId": "7", "config": "18446744073709551616"}
            ]
        }"#;
        let dto: DripsSetEventDto = serde_json::from_str(json).unwrap();
        let event = DripsSetEvent::try_from(&dto).unwrap();

        assert_eq!(event.sender_user_id, U256::from(42u8));
        assert_eq!(event.max_end, 1_700_000_000);
        assert_eq!(event.receivers.len(), 1);
        // 2^64 packs to amount_per_sec == 1
        assert_eq!(event.receivers[0].config.amount_per_sec, U256::from(1u8));
    }

    #[test]
    fn test_set_event_dto_without_seen_events() {
        let json = r#"{
            "userId": "1",
            "assetId": "2",
            "dripsHistoryHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "balance": "0",
            "maxEnd": "0",
            "blockTimestamp": "10"
        }"#;
        let dto: DripsSetEventDto = serde_json::from_str(json).unwrap();
        let event = DripsSetEvent::try_from(&dto).unwrap();
        assert!(event.receivers.is_empty());
    }

    #[test]
    fn test_non_numeric_balance_fails_decode() {
        let dto = DripsSetEventDto {
            user_id: "1".into(),
            asset_id: "2".into(),
            drips_history_hash:
                "0x0000000000000000000000000000000000000000000000000000000000000000".into(),
            balance: "not-a-number".into(),
            max_end: "0".into(),
            block_timestamp: "10".into(),
            drips_receiver_seen_events: vec![],
        };
        let err = DripsSetEvent::try_from(&dto).unwrap_err();
        assert!(matches!(err, SubgraphError::Decode { ref field, .. } if field == "balance"));
    }

    #[test]
    fn test_truncated_hash_fails_decode() {
        let dto = DripsSetEventDto {
            user_id: "1".into(),
            asset_id: "2".into(),
            drips_history_hash: "0x0101".into(),
            balance: "0".into(),
            max_end: "0".into(),
            block_timestamp: "10".into(),
            drips_receiver_seen_events: vec![],
        };
        let err = DripsSetEvent::try_from(&dto).unwrap_err();
        assert!(
            matches!(err, SubgraphError::Decode { ref field, .. } if field == "dripsHistoryHash")
        );
    }

    #[test]
    fn test_parse_u256_accepts_hex_and_decimal() {
        assert_eq!(parse_u256("f", "255").unwrap(), U256::from(255u8));
        assert_eq!(parse_u256("f", "0xff").unwrap(), U256::from(255u8));
    }
}
