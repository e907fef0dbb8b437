//! Pending event pool.
//!
//! Events that could not be matched to a known message are kept here, keyed
//! by the lookup the not-yet-known counterpart will be queried with. The pool
//! does no matching of its own.

use crate::{
    address::Padded,
    events::{Event, EventData},
    metrics,
    store::HashStore,
};
use alloy::primitives::{B256, U256};
use anyhow::Context;
use std::sync::Arc;

pub const SEND_BUCKET: &str = "send";
pub const UPDATE_BUCKET: &str = "update";
pub const RELAY_BUCKET: &str = "relay";
pub const RECEIVE_BUCKET: &str = "receive";
pub const PROCESS_BUCKET: &str = "process";

#[derive(Clone)]
pub struct EventPool {
    store: Arc<dyn HashStore>,
}

impl EventPool {
    pub fn new(store: Arc<dyn HashStore>) -> Self {
        Self { store }
    }

    /// Store an event under the key of its kind. Update and relay buckets
    /// keep a de-duplicated list, other buckets keep the last event.
    /// Dispatch events are never pooled.
    pub async fn store_event(&self, event: &Event) -> anyhow::Result<()> {
        let value = serde_json::to_string(event).context("serialize pooled event")?;
        match &event.data {
            EventData::BridgeSend(data) => {
                let key = send_key(data.to_domain, &data.to_id, data.amount, event.block);
                self.store.hset(SEND_BUCKET, &key, value).await?;
            }
            EventData::HomeUpdate(data) => {
                let key = root_key(data.home_domain, data.old_root);
                self.append_unique(UPDATE_BUCKET, &key, value).await?;
            }
            EventData::ReplicaUpdate(data) => {
                let key = root_key(data.home_domain, data.old_root);
                self.append_unique(RELAY_BUCKET, &key, value).await?;
            }
            EventData::BridgeReceive(data) => {
                let key = receive_key(data.origin(), data.nonce(), event.domain);
                self.store.hset(RECEIVE_BUCKET, &key, value).await?;
            }
            EventData::Process(data) => {
                self.store
                    .hset(PROCESS_BUCKET, &data.message_hash.to_string(), value)
                    .await?;
            }
            EventData::Dispatch(_) => return Ok(()),
        }
        metrics::EVENTS_BUFFERED_TOTAL
            .with_label_values(&[event.kind().as_str()])
            .inc();
        Ok(())
    }

    async fn append_unique(&self, bucket: &str, key: &str, value: String) -> anyhow::Result<()> {
        if !self.store.hexists(bucket, key).await? {
            let raw = serde_json::to_string(&[value])?;
            return self.store.hset(bucket, key, raw).await;
        }
        let mut values: Vec<String> = match self.store.hget(bucket, key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("corrupted pool entry {bucket}/{key}"))?,
            None => Vec::new(),
        };
        if values.contains(&value) {
            tracing::debug!(bucket, key, "duplicate event dropped");
            return Ok(());
        }
        values.push(value);
        let raw = serde_json::to_string(&values)?;
        self.store.hset(bucket, key, raw).await
    }

    pub async fn get_send(
        &self,
        destination: u32,
        recipient: &Padded,
        amount: U256,
        block: u64,
    ) -> anyhow::Result<Option<Event>> {
        self.get_one(SEND_BUCKET, &send_key(destination, recipient, amount, block)).await
    }

    pub async fn get_update(&self, origin: u32, root: B256) -> anyhow::Result<Vec<Event>> {
        self.get_many(UPDATE_BUCKET, &root_key(origin, root)).await
    }

    pub async fn get_relay(&self, origin: u32, root: B256) -> anyhow::Result<Vec<Event>> {
        self.get_many(RELAY_BUCKET, &root_key(origin, root)).await
    }

    pub async fn get_receive(
        &self,
        origin: u32,
        nonce: u32,
        destination: u32,
    ) -> anyhow::Result<Option<Event>> {
        self.get_one(RECEIVE_BUCKET, &receive_key(origin, nonce, destination)).await
    }

    pub async fn get_process(&self, message_hash: B256) -> anyhow::Result<Option<Event>> {
        self.get_one(PROCESS_BUCKET, &message_hash.to_string()).await
    }

    async fn get_one(&self, bucket: &str, key: &str) -> anyhow::Result<Option<Event>> {
        self.store
            .hget(bucket, key)
            .await?
            .map(|raw| {
                serde_json::from_str(&raw)
                    .with_context(|| format!("corrupted pool entry {bucket}/{key}"))
            })
            .transpose()
    }

    async fn get_many(&self, bucket: &str, key: &str) -> anyhow::Result<Vec<Event>> {
        let Some(raw) = self.store.hget(bucket, key).await? else {
            return Ok(Vec::new());
        };
        let values: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("corrupted pool entry {bucket}/{key}"))?;
        values
            .iter()
            .map(|value| {
                serde_json::from_str(value)
                    .with_context(|| format!("corrupted pool entry {bucket}/{key}"))
            })
            .collect()
    }
}

fn send_key(destination: u32, recipient: &Padded, amount: U256, block: u64) -> String {
    format!("{destination};{};{amount};{block}", recipient.pretty())
}

fn root_key(origin: u32, root: B256) -> String {
    format!("{origin};{root}")
}

fn receive_key(origin: u32, nonce: u32, destination: u32) -> String {
    format!("{origin};{nonce};{destination}")
}
