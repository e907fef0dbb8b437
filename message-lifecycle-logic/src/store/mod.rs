//! Storage seams of the consumer: the message gateway and the key/value
//! store backing the pending event pool.

mod memory;

pub use memory::{InMemoryHashStore, InMemoryMessageStore};

use crate::{address::Padded, record::MessageRecord};
use alloy::primitives::{B256, U256};
use async_trait::async_trait;

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fails if a message with the same hash already exists.
    async fn insert_message(&self, record: &MessageRecord) -> anyhow::Result<()>;

    /// Upsert by message hash.
    async fn update_message(&self, record: &MessageRecord) -> anyhow::Result<()>;

    async fn get_message_by_hash(&self, message_hash: B256)
        -> anyhow::Result<Option<MessageRecord>>;

    async fn get_messages_by_origin_and_root(
        &self,
        origin: u32,
        root: B256,
    ) -> anyhow::Result<Vec<MessageRecord>>;

    async fn get_message_by_send_values(
        &self,
        destination: u32,
        recipient: &Padded,
        amount: U256,
        block: u64,
    ) -> anyhow::Result<Option<MessageRecord>>;

    async fn get_message_by_origin_nonce_and_destination(
        &self,
        origin: u32,
        nonce: u32,
        destination: u32,
    ) -> anyhow::Result<Option<MessageRecord>>;

    /// Page through all messages in a stable order.
    async fn get_all_messages(&self, limit: u64, offset: u64)
        -> anyhow::Result<Vec<MessageRecord>>;
}

/// Hash-map-of-hash-maps primitive. Values are opaque strings.
#[async_trait]
pub trait HashStore: Send + Sync {
    async fn hset(&self, bucket: &str, key: &str, value: String) -> anyhow::Result<()>;

    async fn hget(&self, bucket: &str, key: &str) -> anyhow::Result<Option<String>>;

    async fn hexists(&self, bucket: &str, key: &str) -> anyhow::Result<bool>;
}
