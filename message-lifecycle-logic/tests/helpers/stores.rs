use alloy::primitives::{B256, U256};
use async_trait::async_trait;
use message_lifecycle_logic::{
    HashStore, InMemoryHashStore, InMemoryMessageStore, MessageRecord, MessageStore, Padded,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

/// Message store that tracks how many updates are in flight at once and can
/// be told to fail every update.
#[derive(Default)]
pub struct InstrumentedMessageStore {
    pub inner: InMemoryMessageStore,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_updates: AtomicBool,
}

impl InstrumentedMessageStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_updates() -> Arc<Self> {
        let store = Self::default();
        store.fail_updates.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageStore for InstrumentedMessageStore {
    async fn insert_message(&self, record: &MessageRecord) -> anyhow::Result<()> {
        self.inner.insert_message(record).await
    }

    async fn update_message(&self, record: &MessageRecord) -> anyhow::Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            anyhow::bail!("connection reset while updating {}", record.message_hash);
        }
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        let result = self.inner.update_message(record).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn get_message_by_hash(
        &self,
        message_hash: B256,
    ) -> anyhow::Result<Option<MessageRecord>> {
        self.inner.get_message_by_hash(message_hash).await
    }

    async fn get_messages_by_origin_and_root(
        &self,
        origin: u32,
        root: B256,
    ) -> anyhow::Result<Vec<MessageRecord>> {
        self.inner.get_messages_by_origin_and_root(origin, root).await
    }

    async fn get_message_by_send_values(
        &self,
        destination: u32,
        recipient: &Padded,
        amount: U256,
        block: u64,
    ) -> anyhow::Result<Option<MessageRecord>> {
        self.inner
            .get_message_by_send_values(destination, recipient, amount, block)
            .await
    }

    async fn get_message_by_origin_nonce_and_destination(
        &self,
        origin: u32,
        nonce: u32,
        destination: u32,
    ) -> anyhow::Result<Option<MessageRecord>> {
        self.inner
            .get_message_by_origin_nonce_and_destination(origin, nonce, destination)
            .await
    }

    async fn get_all_messages(
        &self,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<MessageRecord>> {
        self.inner.get_all_messages(limit, offset).await
    }
}

/// Hash store whose writes always fail.
#[derive(Default)]
pub struct ReadOnlyHashStore {
    inner: InMemoryHashStore,
}

#[async_trait]
impl HashStore for ReadOnlyHashStore {
    async fn hset(&self, bucket: &str, key: &str, _value: String) -> anyhow::Result<()> {
        anyhow::bail!("store is read only, refused {bucket}/{key}")
    }

    async fn hget(&self, bucket: &str, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.hget(bucket, key).await
    }

    async fn hexists(&self, bucket: &str, key: &str) -> anyhow::Result<bool> {
        self.inner.hexists(bucket, key).await
    }
}
