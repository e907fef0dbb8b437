use super::{HashStore, MessageStore};
use crate::{address::Padded, record::MessageRecord};
use alloy::primitives::{B256, U256};
use anyhow::anyhow;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, btree_map::Entry};

/// Message store kept in process memory, ordered by message hash.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<BTreeMap<String, MessageRecord>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    fn find(&self, predicate: impl Fn(&MessageRecord) -> bool) -> Option<MessageRecord> {
        self.messages.read().values().find(|r| predicate(r)).cloned()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert_message(&self, record: &MessageRecord) -> anyhow::Result<()> {
        match self.messages.write().entry(record.message_hash.clone()) {
            Entry::Occupied(_) => Err(anyhow!(
                "message {} already exists",
                record.message_hash
            )),
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(())
            }
        }
    }

    async fn update_message(&self, record: &MessageRecord) -> anyhow::Result<()> {
        self.messages
            .write()
            .insert(record.message_hash.clone(), record.clone());
        Ok(())
    }

    async fn get_message_by_hash(
        &self,
        message_hash: B256,
    ) -> anyhow::Result<Option<MessageRecord>> {
        Ok(self
            .messages
            .read()
            .get(&message_hash.to_string())
            .cloned())
    }

    async fn get_messages_by_origin_and_root(
        &self,
        origin: u32,
        root: B256,
    ) -> anyhow::Result<Vec<MessageRecord>> {
        let root = root.to_string();
        Ok(self
            .messages
            .read()
            .values()
            .filter(|r| r.origin == origin && r.root == root)
            .cloned()
            .collect())
    }

    async fn get_message_by_send_values(
        &self,
        destination: u32,
        recipient: &Padded,
        amount: U256,
        block: u64,
    ) -> anyhow::Result<Option<MessageRecord>> {
        let recipient = recipient.pretty();
        let amount = amount.to_string();
        Ok(self.find(|r| {
            r.destination == destination
                && r.dispatch_block == block
                && r.recipient.as_ref() == Some(&recipient)
                && r.amount.as_ref() == Some(&amount)
        }))
    }

    async fn get_message_by_origin_nonce_and_destination(
        &self,
        origin: u32,
        nonce: u32,
        destination: u32,
    ) -> anyhow::Result<Option<MessageRecord>> {
        Ok(self.find(|r| r.origin == origin && r.nonce == nonce && r.destination == destination))
    }

    async fn get_all_messages(
        &self,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<MessageRecord>> {
        Ok(self
            .messages
            .read()
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHashStore {
    inner: DashMap<(String, String), String>,
}

impl InMemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl HashStore for InMemoryHashStore {
    async fn hset(&self, bucket: &str, key: &str, value: String) -> anyhow::Result<()> {
        self.inner
            .insert((bucket.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn hget(&self, bucket: &str, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .inner
            .get(&(bucket.to_string(), key.to_string()))
            .map(|v| v.value().clone()))
    }

    async fn hexists(&self, bucket: &str, key: &str) -> anyhow::Result<bool> {
        Ok(self
            .inner
            .contains_key(&(bucket.to_string(), key.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(hash: u8, origin: u32, root: u8) -> MessageRecord {
        MessageRecord {
            origin,
            destination: 2000,
            nonce: hash as u32,
            root: B256::repeat_byte(root).to_string(),
            message_hash: B256::repeat_byte(hash).to_string(),
            leaf_index: "0x0".into(),
            body: "0x".into(),
            dispatch_block: 10,
            dispatched_at: 1,
            updated_at: 0,
            relayed_at: 0,
            received_at: 0,
            processed_at: 0,
            sender: None,
            tx: None,
            state: 0,
            msg_type: 0,
            internal_sender: Padded::ZERO.pretty(),
            internal_recipient: Padded::ZERO.pretty(),
            recipient: None,
            amount: None,
            allow_fast: false,
            details_hash: None,
            token_domain: None,
            token_id: None,
            gas_at_dispatch: "0x0".into(),
            gas_at_update: "0x0".into(),
            gas_at_relay: "0x0".into(),
            gas_at_receive: "0x0".into(),
            gas_at_process: "0x0".into(),
            sent: false,
            updated: false,
            relayed: false,
            received: false,
            processed: false,
            confirm_at: 0,
        }
    }

    #[tokio::test]
    async fn duplicate_insert_fails_and_update_upserts() {
        let store = InMemoryMessageStore::new();
        let mut message = record(1, 1000, 0xaa);
        store.insert_message(&message).await.unwrap();
        assert!(store.insert_message(&message).await.is_err());

        message.state = 2;
        store.update_message(&message).await.unwrap();
        let stored = store
            .get_message_by_hash(B256::repeat_byte(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.state, 2);

        store.update_message(&record(2, 1000, 0xaa)).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn finds_every_message_sharing_a_root() {
        let store = InMemoryMessageStore::new();
        for (hash, origin, root) in [(1, 1000, 0xaa), (2, 1000, 0xaa), (3, 1000, 0xbb), (4, 3000, 0xaa)] {
            store.insert_message(&record(hash, origin, root)).await.unwrap();
        }
        let found = store
            .get_messages_by_origin_and_root(1000, B256::repeat_byte(0xaa))
            .await
            .unwrap();
        let nonces: Vec<_> = found.iter().map(|r| r.nonce).collect();
        assert_eq!(nonces, vec![1, 2]);
    }

    #[tokio::test]
    async fn pagination_is_stable() {
        let store = InMemoryMessageStore::new();
        for hash in 1..=5u8 {
            store.insert_message(&record(hash, 1000, 0xaa)).await.unwrap();
        }
        let first = store.get_all_messages(2, 0).await.unwrap();
        let second = store.get_all_messages(2, 2).await.unwrap();
        let third = store.get_all_messages(2, 4).await.unwrap();
        let nonces: Vec<_> = first
            .iter()
            .chain(&second)
            .chain(&third)
            .map(|r| r.nonce)
            .collect();
        assert_eq!(nonces, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn hash_store_buckets_are_independent() {
        let store = InMemoryHashStore::new();
        store.hset("update", "k", "a".into()).await.unwrap();
        assert!(store.hexists("update", "k").await.unwrap());
        assert!(!store.hexists("relay", "k").await.unwrap());
        assert_eq!(store.hget("relay", "k").await.unwrap(), None);

        store.hset("update", "k", "b".into()).await.unwrap();
        assert_eq!(store.hget("update", "k").await.unwrap().as_deref(), Some("b"));
    }
}
