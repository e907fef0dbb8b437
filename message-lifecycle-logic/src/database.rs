use crate::{
    address::Padded,
    error::LifecycleError,
    record::MessageRecord,
    store::{HashStore, MessageStore},
};
use alloy::primitives::{B256, U256};
use async_trait::async_trait;
use message_lifecycle_entity::{messages, pending_events};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, Iterable, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, prelude::Expr, sea_query::OnConflict,
};
use std::sync::Arc;

/// Postgres gateway for messages and the pending event pool.
#[derive(Clone)]
pub struct LifecycleDatabase {
    pub db: Arc<DatabaseConnection>,
}

impl LifecycleDatabase {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn count_messages(&self) -> anyhow::Result<u64> {
        Ok(messages::Entity::find().count(self.db.as_ref()).await?)
    }

    async fn find_one(
        &self,
        query: sea_orm::Select<messages::Entity>,
    ) -> anyhow::Result<Option<MessageRecord>> {
        let model = query.one(self.db.as_ref()).await.inspect_err(|e| {
            tracing::error!(err =? e, "Failed to fetch message");
        })?;
        Ok(model.map(MessageRecord::try_from).transpose()?)
    }
}

#[async_trait]
impl MessageStore for LifecycleDatabase {
    async fn insert_message(&self, record: &MessageRecord) -> anyhow::Result<()> {
        let model = messages::ActiveModel::from(record.clone());
        messages::Entity::insert(model)
            .exec(self.db.as_ref())
            .await
            .inspect_err(|e| {
                tracing::error!(err =? e, message_hash = %record.message_hash, "Failed to insert message");
            })?;
        Ok(())
    }

    async fn update_message(&self, record: &MessageRecord) -> anyhow::Result<()> {
        let model = messages::ActiveModel::from(record.clone());
        let update_columns = messages::Column::iter()
            .filter(|column| !matches!(column, messages::Column::MessageHash));
        messages::Entity::insert(model)
            .on_conflict(
                OnConflict::column(messages::Column::MessageHash)
                    .update_columns(update_columns)
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await
            .inspect_err(|e| {
                tracing::error!(err =? e, message_hash = %record.message_hash, "Failed to update message");
            })?;
        Ok(())
    }

    async fn get_message_by_hash(
        &self,
        message_hash: B256,
    ) -> anyhow::Result<Option<MessageRecord>> {
        self.find_one(messages::Entity::find_by_id(message_hash.to_string()))
            .await
    }

    async fn get_messages_by_origin_and_root(
        &self,
        origin: u32,
        root: B256,
    ) -> anyhow::Result<Vec<MessageRecord>> {
        let models = messages::Entity::find()
            .filter(messages::Column::Origin.eq(origin as i64))
            .filter(messages::Column::Root.eq(root.to_string()))
            .all(self.db.as_ref())
            .await
            .inspect_err(|e| {
                tracing::error!(err =? e, origin, root = %root, "Failed to fetch messages by root");
            })?;
        Ok(models
            .into_iter()
            .map(MessageRecord::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn get_message_by_send_values(
        &self,
        destination: u32,
        recipient: &Padded,
        amount: U256,
        block: u64,
    ) -> anyhow::Result<Option<MessageRecord>> {
        self.find_one(
            messages::Entity::find()
                .filter(messages::Column::Destination.eq(destination as i64))
                .filter(messages::Column::Recipient.eq(recipient.pretty()))
                .filter(messages::Column::Amount.eq(amount.to_string()))
                .filter(messages::Column::DispatchBlock.eq(block as i64)),
        )
        .await
    }

    async fn get_message_by_origin_nonce_and_destination(
        &self,
        origin: u32,
        nonce: u32,
        destination: u32,
    ) -> anyhow::Result<Option<MessageRecord>> {
        self.find_one(
            messages::Entity::find()
                .filter(messages::Column::Origin.eq(origin as i64))
                .filter(messages::Column::Nonce.eq(nonce as i64))
                .filter(messages::Column::Destination.eq(destination as i64)),
        )
        .await
    }

    async fn get_all_messages(
        &self,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<MessageRecord>> {
        let models = messages::Entity::find()
            .order_by_asc(messages::Column::MessageHash)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .inspect_err(|e| {
                tracing::error!(err =? e, limit, offset, "Failed to fetch messages page");
            })?;
        Ok(models
            .into_iter()
            .map(MessageRecord::try_from)
            .collect::<Result<_, _>>()?)
    }
}

#[async_trait]
impl HashStore for LifecycleDatabase {
    async fn hset(&self, bucket: &str, key: &str, value: String) -> anyhow::Result<()> {
        let model = pending_events::ActiveModel {
            bucket: ActiveValue::Set(bucket.to_string()),
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value),
            ..Default::default()
        };
        pending_events::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([pending_events::Column::Bucket, pending_events::Column::Key])
                    .update_column(pending_events::Column::Value)
                    .value(pending_events::Column::UpdatedAt, Expr::current_timestamp())
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await
            .inspect_err(|e| {
                tracing::error!(err =? e, bucket, key, "Failed to store pending event");
            })?;
        Ok(())
    }

    async fn hget(&self, bucket: &str, key: &str) -> anyhow::Result<Option<String>> {
        let model = pending_events::Entity::find_by_id((bucket.to_string(), key.to_string()))
            .one(self.db.as_ref())
            .await
            .inspect_err(|e| {
                tracing::error!(err =? e, bucket, key, "Failed to fetch pending event");
            })?;
        Ok(model.map(|m| m.value))
    }

    async fn hexists(&self, bucket: &str, key: &str) -> anyhow::Result<bool> {
        let count = pending_events::Entity::find()
            .filter(pending_events::Column::Bucket.eq(bucket))
            .filter(pending_events::Column::Key.eq(key))
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }
}

impl From<MessageRecord> for messages::ActiveModel {
    fn from(record: MessageRecord) -> Self {
        messages::ActiveModel {
            message_hash: ActiveValue::Set(record.message_hash),
            origin: ActiveValue::Set(record.origin as i64),
            destination: ActiveValue::Set(record.destination as i64),
            nonce: ActiveValue::Set(record.nonce as i64),
            root: ActiveValue::Set(record.root),
            leaf_index: ActiveValue::Set(record.leaf_index),
            body: ActiveValue::Set(record.body),
            dispatch_block: ActiveValue::Set(record.dispatch_block as i64),
            dispatched_at: ActiveValue::Set(record.dispatched_at as i64),
            updated_at: ActiveValue::Set(record.updated_at as i64),
            relayed_at: ActiveValue::Set(record.relayed_at as i64),
            received_at: ActiveValue::Set(record.received_at as i64),
            processed_at: ActiveValue::Set(record.processed_at as i64),
            sender: ActiveValue::Set(record.sender),
            tx: ActiveValue::Set(record.tx),
            state: ActiveValue::Set(record.state),
            msg_type: ActiveValue::Set(record.msg_type),
            internal_sender: ActiveValue::Set(record.internal_sender),
            internal_recipient: ActiveValue::Set(record.internal_recipient),
            recipient: ActiveValue::Set(record.recipient),
            amount: ActiveValue::Set(record.amount),
            allow_fast: ActiveValue::Set(record.allow_fast),
            details_hash: ActiveValue::Set(record.details_hash),
            token_domain: ActiveValue::Set(record.token_domain.map(i64::from)),
            token_id: ActiveValue::Set(record.token_id),
            gas_at_dispatch: ActiveValue::Set(record.gas_at_dispatch),
            gas_at_update: ActiveValue::Set(record.gas_at_update),
            gas_at_relay: ActiveValue::Set(record.gas_at_relay),
            gas_at_receive: ActiveValue::Set(record.gas_at_receive),
            gas_at_process: ActiveValue::Set(record.gas_at_process),
            sent: ActiveValue::Set(record.sent),
            updated: ActiveValue::Set(record.updated),
            relayed: ActiveValue::Set(record.relayed),
            received: ActiveValue::Set(record.received),
            processed: ActiveValue::Set(record.processed),
            confirm_at: ActiveValue::Set(record.confirm_at as i64),
        }
    }
}

impl TryFrom<messages::Model> for MessageRecord {
    type Error = LifecycleError;

    fn try_from(model: messages::Model) -> Result<Self, Self::Error> {
        Ok(MessageRecord {
            origin: column("origin", model.origin)?,
            destination: column("destination", model.destination)?,
            nonce: column("nonce", model.nonce)?,
            root: model.root,
            leaf_index: model.leaf_index,
            body: model.body,
            dispatch_block: column("dispatch_block", model.dispatch_block)?,
            dispatched_at: column("dispatched_at", model.dispatched_at)?,
            updated_at: column("updated_at", model.updated_at)?,
            relayed_at: column("relayed_at", model.relayed_at)?,
            received_at: column("received_at", model.received_at)?,
            processed_at: column("processed_at", model.processed_at)?,
            sender: model.sender,
            tx: model.tx,
            state: model.state,
            msg_type: model.msg_type,
            internal_sender: model.internal_sender,
            internal_recipient: model.internal_recipient,
            recipient: model.recipient,
            amount: model.amount,
            allow_fast: model.allow_fast,
            details_hash: model.details_hash,
            token_domain: model
                .token_domain
                .map(|domain| column("token_domain", domain))
                .transpose()?,
            token_id: model.token_id,
            gas_at_dispatch: model.gas_at_dispatch,
            gas_at_update: model.gas_at_update,
            gas_at_relay: model.gas_at_relay,
            gas_at_receive: model.gas_at_receive,
            gas_at_process: model.gas_at_process,
            sent: model.sent,
            updated: model.updated,
            relayed: model.relayed,
            received: model.received,
            processed: model.processed,
            confirm_at: column("confirm_at", model.confirm_at)?,
            message_hash: model.message_hash,
        })
    }
}

fn column<T: TryFrom<i64>>(name: &str, value: i64) -> Result<T, LifecycleError> {
    T::try_from(value)
        .map_err(|_| LifecycleError::InvalidRecord(format!("{name} out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        consumer::Consumer,
        context::DomainsContext,
        events::{Event, EventData, ProcessData},
        settings::ConsumerSettings,
        test_utils::init_db,
    };
    use alloy::primitives::Bytes;
    use pretty_assertions::assert_eq;

    fn process_event(hash: B256) -> Event {
        Event {
            domain: 2000,
            block: 1,
            timestamp: 100,
            tx: B256::repeat_byte(0xee),
            gas_used: U256::from(1u64),
            data: EventData::Process(ProcessData {
                message_hash: hash,
                success: true,
                return_data: Bytes::new(),
            }),
        }
    }

    #[tokio::test]
    #[ignore = "Needs database to run"]
    async fn pending_events_upsert() {
        let guard = init_db("lifecycle_pending_events_upsert").await;
        let db = LifecycleDatabase::new(guard.client());

        assert!(!db.hexists("process", "k").await.unwrap());
        db.hset("process", "k", "a".into()).await.unwrap();
        db.hset("process", "k", "b".into()).await.unwrap();
        assert!(db.hexists("process", "k").await.unwrap());
        assert_eq!(db.hget("process", "k").await.unwrap().as_deref(), Some("b"));
        assert_eq!(db.hget("update", "k").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "Needs database to run"]
    async fn consumer_over_postgres_applies_pooled_process() {
        let guard = init_db("lifecycle_consumer_over_postgres").await;
        let db = Arc::new(LifecycleDatabase::new(guard.client()));
        let consumer = Consumer::new(
            db.clone(),
            db.clone(),
            Arc::new(DomainsContext::default()),
            ConsumerSettings::default(),
        );

        let hash = B256::repeat_byte(0x42);
        let dispatch = Event {
            domain: 1000,
            block: 1,
            timestamp: 50,
            tx: B256::repeat_byte(0xdd),
            gas_used: U256::from(1u64),
            data: EventData::Dispatch(crate::events::DispatchData {
                message_hash: hash,
                leaf_index: U256::from(0u64),
                destination_and_nonce: crate::events::pack(2000, 1),
                committed_root: B256::repeat_byte(0x01),
                message: Bytes::from(vec![0u8; 80]),
            }),
        };

        consumer
            .consume(&[process_event(hash), dispatch.clone()])
            .await
            .unwrap();
        consumer.consume(&[dispatch]).await.unwrap();

        let record = db.get_message_by_hash(hash).await.unwrap().unwrap();
        assert_eq!(record.state, 4);
        assert!(record.processed);
        assert!(!record.updated);
        assert_eq!(db.count_messages().await.unwrap(), 1);
        assert_eq!(consumer.stats().await.unwrap().total.processed, 1);
    }
}
