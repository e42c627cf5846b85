//! Subgraph query client.
//!
//! A thin fetch layer over the indexing service: POSTs GraphQL documents,
//! retries transient failures with linear backoff, and assembles complete
//! account snapshots from the individual entity queries.

use std::collections::BTreeMap;
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{json, Value};

use drips_common::events::{
    asset_id_to_address, unique_senders, AccountSnapshot, AssetConfigHistory, AssetSnapshot,
    DripsReceiverSeenEvent, DripsSetEvent,
};
use drips_common::network::NetworkConfig;

use crate::error::SubgraphError;
use crate::estimator::AccountSource;
use crate::types::{
    parse_u256, parse_u64, DripsReceiverSeenEventDto, DripsSetEventDto, ReceivedDripsEventDto,
};

const DRIPS_SET_EVENTS_BY_USER_QUERY: &str = r#"
query dripsSetEvents($userId: String!) {
  dripsSetEvents(where: {userId: $userId}, orderBy: blockTimestamp, orderDirection: asc, first: 1000) {
    userId
    assetId
    dripsHistoryHash
    balance
    maxEnd
    blockTimestamp
    dripsReceiverSeenEvents {
      senderUserId
      receiverUserId
      config
    }
  }
}"#;

const SEEN_EVENTS_BY_RECEIVER_QUERY: &str = r#"
query dripsReceiverSeenEvents($receiverUserId: String!) {
  dripsReceiverSeenEvents(where: {receiverUserId: $receiverUserId}, first: 1000) {
    senderUserId
    receiverUserId
    config
  }
}"#;

const RECEIVED_EVENTS_BY_USER_QUERY: &str = r#"
query receivedDripsEvents($userId: String!) {
  receivedDripsEvents(where: {userId: $userId}, orderBy: blockTimestamp, orderDirection: asc, first: 1000) {
    assetId
    blockTimestamp
  }
}"#;

#[derive(Debug, Clone)]
pub struct SubgraphClientConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
}

impl SubgraphClientConfig {
    pub fn for_network(network: &NetworkConfig) -> Self {
        Self {
            url: network.subgraph_url.to_string(),
            timeout_secs: 30,
            retry_attempts: 3,
        }
    }
}

#[derive(Clone)]
pub struct SubgraphClient {
    client: reqwest::Client,
    url: String,
    retry_attempts: u32,
}

impl SubgraphClient {
    pub fn new(config: SubgraphClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            url: config.url,
            retry_attempts: config.retry_attempts.max(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn query(&self, query: &'static str, variables: Value) -> Result<Value, SubgraphError> {
        let body = json!({ "query": query, "variables": variables });

        let mut last_error = None;
        for attempt in 1..=self.retry_attempts {
            match self.try_query(&body).await {
                Ok(data) => return Ok(data),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        retries = self.retry_attempts,
                        error = %e,
                        "Subgraph query attempt failed"
                    );
                    last_error = Some(e);
                    if attempt < self.retry_attempts {
                        tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| SubgraphError::Transport("all retry attempts failed".to_string())))
    }

    async fn try_query(&self, body: &Value) -> Result<Value, SubgraphError> {
        let response = self.client.post(&self.url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(SubgraphError::Status {
                code: response.status().as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        if let Some(errors) = payload.get("errors").and_then(|e| e.as_array()) {
            if let Some(first) = errors.first() {
                let message = first
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown query error");
                return Err(SubgraphError::Query {
                    message: message.to_string(),
                });
            }
        }

        payload.get("data").cloned().ok_or_else(|| SubgraphError::Decode {
            field: "data".to_string(),
            reason: "missing response data".to_string(),
        })
    }

    fn entities<T: serde::de::DeserializeOwned>(
        data: &Value,
        field: &str,
    ) -> Result<Vec<T>, SubgraphError> {
        let value = data.get(field).cloned().ok_or_else(|| SubgraphError::Decode {
            field: field.to_string(),
            reason: "field absent from response".to_string(),
        })?;
        serde_json::from_value(value).map_err(|e| SubgraphError::Decode {
            field: field.to_string(),
            reason: e.to_string(),
        })
    }

    /// All configuration updates one account ever performed, oldest first.
    pub async fn drips_set_events_by_user(
        &self,
        user_id: U256,
    ) -> Result<Vec<DripsSetEventDto>, SubgraphError> {
        let data = self
            .query(
                DRIPS_SET_EVENTS_BY_USER_QUERY,
                json!({ "userId": user_id.to_string() }),
            )
            .await?;
        Self::entities(&data, "dripsSetEvents")
    }

    /// Every time any sender listed this account as a receiver.
    pub async fn seen_events_by_receiver(
        &self,
        receiver_user_id: U256,
    ) -> Result<Vec<DripsReceiverSeenEventDto>, SubgraphError> {
        let data = self
            .query(
                SEEN_EVENTS_BY_RECEIVER_QUERY,
                json!({ "receiverUserId": receiver_user_id.to_string() }),
            )
            .await?;
        Self::entities(&data, "dripsReceiverSeenEvents")
    }

    /// Receive checkpoints for the account, oldest first.
    pub async fn received_events_by_user(
        &self,
        user_id: U256,
    ) -> Result<Vec<ReceivedDripsEventDto>, SubgraphError> {
        let data = self
            .query(
                RECEIVED_EVENTS_BY_USER_QUERY,
                json!({ "userId": user_id.to_string() }),
            )
            .await?;
        Self::entities(&data, "receivedDripsEvents")
    }
}

struct AssetAccumulator {
    outgoing: Vec<DripsSetEvent>,
    incoming: BTreeMap<U256, Vec<DripsSetEvent>>,
    last_received_at: Option<u64>,
}

impl AssetAccumulator {
    fn new() -> Self {
        Self {
            outgoing: Vec::new(),
            incoming: BTreeMap::new(),
            last_received_at: None,
        }
    }
}

#[async_trait]
impl AccountSource for SubgraphClient {
    async fn fetch_account(
        &self,
        user_id: U256,
        chain_id: u64,
    ) -> Result<AccountSnapshot, SubgraphError> {
        // Discover who has ever streamed to this account
        let seen_dtos = self.seen_events_by_receiver(user_id).await?;
        let seen: Vec<DripsReceiverSeenEvent> = seen_dtos
            .iter()
            .map(DripsReceiverSeenEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let senders = unique_senders(seen.iter());

        tracing::debug!(
            user = %user_id,
            chain = chain_id,
            senders = senders.len(),
            "Assembling account snapshot"
        );

        let mut per_asset: BTreeMap<U256, AssetAccumulator> = BTreeMap::new();

        // Each sender's full per-asset history; an asset is relevant as soon
        // as any of the sender's events lists this account
        for sender in senders {
            let dtos = self.drips_set_events_by_user(sender).await?;
            let mut by_asset: BTreeMap<U256, Vec<DripsSetEvent>> = BTreeMap::new();
            for dto in &dtos {
                let event = DripsSetEvent::try_from(dto)?;
                by_asset.entry(event.asset_id).or_default().push(event);
            }
            for (asset_id, events) in by_asset {
                let lists_me = events
                    .iter()
                    .flat_map(|e| e.receivers.iter())
                    .any(|s| s.receiver_user_id == user_id);
                if lists_me {
                    per_asset
                        .entry(asset_id)
                        .or_insert_with(AssetAccumulator::new)
                        .incoming
                        .insert(sender, events);
                }
            }
        }

        // The account's own outgoing histories
        for dto in &self.drips_set_events_by_user(user_id).await? {
            let event = DripsSetEvent::try_from(dto)?;
            per_asset
                .entry(event.asset_id)
                .or_insert_with(AssetAccumulator::new)
                .outgoing
                .push(event);
        }

        // Receive checkpoints; the query is oldest-first, keep the newest
        for dto in &self.received_events_by_user(user_id).await? {
            let asset_id = parse_u256("assetId", &dto.asset_id)?;
            let timestamp = parse_u64("blockTimestamp", &dto.block_timestamp)?;
            if let Some(acc) = per_asset.get_mut(&asset_id) {
                acc.last_received_at = Some(acc.last_received_at.map_or(timestamp, |t| t.max(timestamp)));
            }
        }

        let mut assets = Vec::with_capacity(per_asset.len());
        for (asset_id, acc) in per_asset {
            let token_address =
                asset_id_to_address(asset_id).map_err(|e| SubgraphError::Decode {
                    field: "assetId".to_string(),
                    reason: e.to_string(),
                })?;
            assets.push(AssetSnapshot {
                asset_id,
                token_address,
                outgoing: AssetConfigHistory::new(acc.outgoing),
                incoming: acc.incoming.into_values().map(AssetConfigHistory::new).collect(),
                // Computing these needs contract view calls; left to callers
                splittable: None,
                collectable: None,
                last_received_at: acc.last_received_at,
            });
        }

        Ok(AccountSnapshot {
            user_id,
            chain_id,
            assets,
        })
    }
}
