use crate::{
    context::ProtocolContext,
    error::LifecycleError,
    events::{DispatchData, Event, EventData, ProcessData, ReceiveData, SendData, UpdateData},
    message::{Message, MessageIdentity},
    metrics,
    pool::EventPool,
    record::MessageRecord,
    settings::ConsumerSettings,
    stats::{Statistics, StatisticsCollector},
    store::{HashStore, MessageStore},
};
use alloy::primitives::B256;
use anyhow::Context;
use parking_lot::Mutex;
use std::{collections::BTreeSet, fmt, sync::Arc};
use tokio::sync::{Semaphore, broadcast};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Dispatched,
    Updated,
    Relayed,
    Received,
    Processed,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::Dispatched => "dispatched",
            NotificationKind::Updated => "updated",
            NotificationKind::Relayed => "relayed",
            NotificationKind::Received => "received",
            NotificationKind::Processed => "processed",
        };
        f.write_str(s)
    }
}

/// Emitted whenever a message is created or actually advances its state.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: Message,
    pub event: Event,
}

/// Drives message lifecycles from batches of protocol events.
///
/// Events that can not be matched to a known message are kept in the
/// [`EventPool`] and applied as soon as the message shows up or advances.
pub struct Consumer {
    store: Arc<dyn MessageStore>,
    pool: EventPool,
    ctx: Arc<dyn ProtocolContext>,
    write_limit: Semaphore,
    notifications: broadcast::Sender<Notification>,
    domains: Mutex<BTreeSet<u32>>,
    stats_batch_size: u64,
}

impl Consumer {
    pub fn new(
        store: Arc<dyn MessageStore>,
        hash_store: Arc<dyn HashStore>,
        ctx: Arc<dyn ProtocolContext>,
        settings: ConsumerSettings,
    ) -> Self {
        let (notifications, _) = broadcast::channel(settings.notification_capacity.max(1));
        let domains = ctx.domains().into_iter().collect();
        Self {
            store,
            pool: EventPool::new(hash_store),
            ctx,
            write_limit: Semaphore::new(settings.write_concurrency.max(1)),
            notifications,
            domains: Mutex::new(domains),
            stats_batch_size: settings.stats_batch_size.max(1),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn domains(&self) -> Vec<u32> {
        self.domains.lock().iter().copied().collect()
    }

    pub async fn message(&self, message_hash: B256) -> anyhow::Result<Option<Message>> {
        let record = self.store.get_message_by_hash(message_hash).await?;
        Ok(self.rehydrate(record)?)
    }

    /// Consume a batch strictly in the given order. Each event is handled to
    /// completion, including its writes, before the next one starts.
    pub async fn consume(&self, events: &[Event]) -> anyhow::Result<()> {
        let total = events.len();
        tracing::debug!(total, "consuming events");

        for (consumed, event) in events.iter().enumerate() {
            metrics::EVENTS_CONSUMED_TOTAL
                .with_label_values(&[event.kind().as_str()])
                .inc();
            let result = match &event.data {
                EventData::Dispatch(data) => self.dispatched(event, data).await,
                EventData::HomeUpdate(data) => self.home_update(event, data).await,
                EventData::ReplicaUpdate(data) => self.replica_update(event, data).await,
                EventData::Process(data) => self.process(event, data).await,
                EventData::BridgeSend(data) => self.bridge_send(event, data).await,
                EventData::BridgeReceive(data) => self.bridge_receive(event, data).await,
            };
            result.with_context(|| {
                format!(
                    "failed to consume {} event from domain {} (tx {})",
                    event.kind(),
                    event.domain,
                    event.tx
                )
            })?;
            tracing::debug!(consumed = consumed + 1, total, "consumed event");
        }

        tracing::info!(total, "events batch consumed");
        Ok(())
    }

    async fn dispatched(&self, event: &Event, data: &DispatchData) -> anyhow::Result<()> {
        self.domains.lock().insert(event.domain);

        if self
            .store
            .get_message_by_hash(data.message_hash)
            .await?
            .is_some()
        {
            tracing::debug!(message_hash = %data.message_hash, "message already dispatched");
            return Ok(());
        }

        let identity = MessageIdentity {
            origin: event.domain,
            destination: data.destination(),
            nonce: data.nonce(),
            root: data.committed_root,
            message_hash: data.message_hash,
            leaf_index: data.leaf_index,
            body: data.message.clone(),
            dispatch_block: event.block,
        };
        if !self.ctx.is_known_domain(identity.destination) {
            tracing::warn!(
                message_hash = %identity.message_hash,
                destination = identity.destination,
                "message dispatched to unknown domain"
            );
        }
        let mut message = Message::new(identity, event.timestamp, self.ctx.as_ref());
        message.gas_used.dispatch = event.gas_used;
        message.tx = Some(event.tx);
        tracing::debug!(
            message_hash = %message.hash(),
            kind = message.kind().as_str(),
            "created message"
        );
        self.notify(NotificationKind::Dispatched, &message, event);

        self.check_and_update_all(&mut message).await?;
        self.store
            .insert_message(&message.to_record(self.ctx.as_ref()))
            .await
    }

    async fn home_update(&self, event: &Event, data: &UpdateData) -> anyhow::Result<()> {
        let messages = self
            .store
            .get_messages_by_origin_and_root(data.home_domain, data.old_root)
            .await?;

        // Stored even when applicable: messages dispatched under this root
        // later on still need it.
        self.pool.store_event(event).await?;

        if messages.is_empty() {
            tracing::debug!(
                origin = data.home_domain,
                root = %data.old_root,
                "no message found for update event"
            );
            return Ok(());
        }

        self.fan_out(messages, event, |message, event| {
            message.update(event).then_some(NotificationKind::Updated)
        })
        .await
    }

    async fn replica_update(&self, event: &Event, data: &UpdateData) -> anyhow::Result<()> {
        let messages = self
            .store
            .get_messages_by_origin_and_root(data.home_domain, data.old_root)
            .await?;

        self.pool.store_event(event).await?;

        if messages.is_empty() {
            tracing::debug!(
                origin = data.home_domain,
                root = %data.old_root,
                "no message found for replica update event"
            );
            return Ok(());
        }

        self.fan_out(messages, event, |message, event| {
            message.relay(event).then_some(NotificationKind::Relayed)
        })
        .await
    }

    /// Apply a root-wide event to every message sharing the root, concurrently.
    async fn fan_out<F>(
        &self,
        records: Vec<MessageRecord>,
        event: &Event,
        apply: F,
    ) -> anyhow::Result<()>
    where
        F: Fn(&mut Message, &Event) -> Option<NotificationKind>,
    {
        let apply = &apply;
        let tasks = records.into_iter().map(|record| async move {
            let mut message = Message::from_record(&record, self.ctx.as_ref())?;
            if let Some(kind) = apply(&mut message, event) {
                self.notify(kind, &message, event);
            }
            self.check_and_update_all(&mut message).await?;
            self.update_message(&message).await?;
            Ok::<_, anyhow::Error>(())
        });
        futures::future::try_join_all(tasks).await?;
        Ok(())
    }

    async fn process(&self, event: &Event, data: &ProcessData) -> anyhow::Result<()> {
        let record = self.store.get_message_by_hash(data.message_hash).await?;
        match self.rehydrate(record)? {
            Some(mut message) => {
                self.apply_process(&mut message, event);
                self.check_and_update_all(&mut message).await?;
                self.update_message(&message).await
            }
            None => {
                self.pool.store_event(event).await?;
                tracing::debug!(
                    message_hash = %data.message_hash,
                    "no message found for process event"
                );
                Ok(())
            }
        }
    }

    async fn bridge_send(&self, event: &Event, data: &SendData) -> anyhow::Result<()> {
        let record = self
            .store
            .get_message_by_send_values(data.to_domain, &data.to_id, data.amount, event.block)
            .await?;
        match self.rehydrate(record)? {
            Some(mut message) => {
                message.record_send(event, data)?;
                self.check_and_update_all(&mut message).await?;
                self.update_message(&message).await
            }
            None => {
                self.pool.store_event(event).await?;
                tracing::debug!(
                    destination = data.to_domain,
                    recipient = %data.to_id,
                    amount = %data.amount,
                    "no message found for bridge send event"
                );
                Ok(())
            }
        }
    }

    async fn bridge_receive(&self, event: &Event, data: &ReceiveData) -> anyhow::Result<()> {
        let record = self
            .store
            .get_message_by_origin_nonce_and_destination(data.origin(), data.nonce(), event.domain)
            .await?;
        match self.rehydrate(record)? {
            Some(message) if !message.is_transfer() => {
                tracing::debug!(
                    message_hash = %message.hash(),
                    kind = message.kind().as_str(),
                    "bridge receive ignored for non-transfer message"
                );
                Ok(())
            }
            Some(mut message) => {
                self.apply_receive(&mut message, event);
                self.check_and_update_all(&mut message).await?;
                self.update_message(&message).await
            }
            None => {
                self.pool.store_event(event).await?;
                tracing::debug!(
                    origin = data.origin(),
                    nonce = data.nonce(),
                    "no message found for bridge receive event"
                );
                Ok(())
            }
        }
    }

    /// Look up pooled events for every transition the message has not
    /// observed yet and apply the ones found. Send and receive only exist
    /// for transfer messages.
    async fn check_and_update_all(&self, message: &mut Message) -> anyhow::Result<()> {
        let origin = message.identity.origin;
        let root = message.identity.root;

        if !message.checkbox.sent && message.is_transfer() {
            self.check_and_update_send(message).await?;
        }

        if !message.checkbox.updated {
            for event in self.pool.get_update(origin, root).await? {
                if message.update(&event) {
                    self.notify(NotificationKind::Updated, message, &event);
                }
            }
        }

        if !message.checkbox.relayed {
            for event in self.pool.get_relay(origin, root).await? {
                if message.relay(&event) {
                    self.notify(NotificationKind::Relayed, message, &event);
                }
            }
        }

        if !message.checkbox.received && message.is_transfer() {
            let destination = message.identity.destination;
            let nonce = message.identity.nonce;
            if let Some(event) = self.pool.get_receive(origin, nonce, destination).await? {
                self.apply_receive(message, &event);
            }
        }

        if !message.checkbox.processed {
            if let Some(event) = self.pool.get_process(message.hash()).await? {
                self.apply_process(message, &event);
            }
        }

        Ok(())
    }

    async fn check_and_update_send(&self, message: &mut Message) -> anyhow::Result<()> {
        let transfer = message
            .transfer()
            .ok_or_else(|| LifecycleError::NotTransfer(message.hash().to_string()))?;
        let pooled = self
            .pool
            .get_send(
                message.identity.destination,
                &transfer.recipient,
                transfer.amount,
                message.identity.dispatch_block,
            )
            .await?;
        if let Some(event) = pooled {
            if let EventData::BridgeSend(data) = &event.data {
                message.record_send(&event, data)?;
            }
        }
        Ok(())
    }

    fn apply_receive(&self, message: &mut Message, event: &Event) {
        if message.receive(event) {
            self.notify(NotificationKind::Received, message, event);
        }
    }

    fn apply_process(&self, message: &mut Message, event: &Event) {
        if message.process(event) {
            self.notify(NotificationKind::Processed, message, event);
        }
    }

    async fn update_message(&self, message: &Message) -> anyhow::Result<()> {
        let _permit = self
            .write_limit
            .acquire()
            .await
            .context("write limiter closed")?;
        self.store
            .update_message(&message.to_record(self.ctx.as_ref()))
            .await
    }

    fn rehydrate(&self, record: Option<MessageRecord>) -> Result<Option<Message>, LifecycleError> {
        record
            .map(|record| Message::from_record(&record, self.ctx.as_ref()))
            .transpose()
    }

    fn notify(&self, kind: NotificationKind, message: &Message, event: &Event) {
        // No subscribers is fine.
        let _ = self.notifications.send(Notification {
            kind,
            message: message.clone(),
            event: event.clone(),
        });
    }

    /// Count all persisted messages by origin domain and state.
    pub async fn stats(&self) -> anyhow::Result<Statistics> {
        let mut collector = StatisticsCollector::new(self.domains());
        let batch_size = self.stats_batch_size;
        let mut offset = 0;
        loop {
            let page = self.store.get_all_messages(batch_size, offset).await?;
            page.iter().for_each(|record| collector.contribute(record));
            if (page.len() as u64) < batch_size {
                break;
            }
            offset += batch_size;
        }
        Ok(collector.finish())
    }
}
