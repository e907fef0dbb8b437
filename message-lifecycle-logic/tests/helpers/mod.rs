#![allow(dead_code)]

mod stores;

pub use stores::{InstrumentedMessageStore, ReadOnlyHashStore};

use alloy::primitives::{B256, Bytes, U256};
use message_lifecycle_logic::{
    Consumer, ConsumerSettings, DomainSettings, DomainsContext, Event, EventData, HashStore,
    InMemoryHashStore, InMemoryMessageStore, MessageRecord, MessageStore, Padded,
    body::{Envelope, GovernanceAction, TransferMessage},
    events::{DispatchData, ProcessData, ReceiveData, SendData, UpdateData, pack},
};
use std::sync::Arc;

pub const ORIGIN: u32 = 1000;
pub const DESTINATION: u32 = 2000;
pub const OPTIMISTIC_SECONDS: u64 = 1800;

pub fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn bridge_router() -> Padded {
    Padded::from_slice(&[0xb1; 20]).unwrap()
}

pub fn governance_router() -> Padded {
    Padded::from_slice(&[0x60; 20]).unwrap()
}

pub fn context() -> DomainsContext {
    DomainsContext::new(vec![
        DomainSettings {
            domain: ORIGIN,
            name: "origin".into(),
            bridge_router: Some(bridge_router()),
            governance_router: Some(governance_router()),
            optimistic_seconds: Some(OPTIMISTIC_SECONDS),
        },
        DomainSettings {
            domain: DESTINATION,
            name: "destination".into(),
            bridge_router: None,
            governance_router: Some(governance_router()),
            optimistic_seconds: Some(OPTIMISTIC_SECONDS),
        },
    ])
    .unwrap()
}

pub struct TestConsumer {
    pub consumer: Consumer,
    pub store: Arc<InMemoryMessageStore>,
    pub pool: Arc<InMemoryHashStore>,
}

/// Consumer over arbitrary stores with the test domains configured.
pub fn consumer_with(
    store: Arc<dyn MessageStore>,
    hash_store: Arc<dyn HashStore>,
    write_concurrency: usize,
) -> Consumer {
    init_logs();
    Consumer::new(
        store,
        hash_store,
        Arc::new(context()),
        ConsumerSettings {
            write_concurrency,
            stats_batch_size: 2,
            notification_capacity: 64,
        },
    )
}

impl TestConsumer {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryMessageStore::new());
        let pool = Arc::new(InMemoryHashStore::new());
        let consumer = consumer_with(store.clone(), pool.clone(), 2);
        Self {
            consumer,
            store,
            pool,
        }
    }

    pub async fn consume(&self, events: &[Event]) {
        self.consumer.consume(events).await.unwrap();
    }

    pub async fn record(&self, spec: &MessageSpec) -> Option<MessageRecord> {
        self.store.get_message_by_hash(spec.hash).await.unwrap()
    }
}

/// Everything needed to produce the events of one message's lifecycle.
#[derive(Debug, Clone)]
pub struct MessageSpec {
    pub nonce: u32,
    pub root: B256,
    pub hash: B256,
    pub dispatch_block: u64,
    pub dispatch_tx: B256,
    pub body: Bytes,
    pub recipient: Padded,
    pub amount: U256,
}

impl MessageSpec {
    pub fn transfer(nonce: u32, root: u8) -> Self {
        let recipient = Padded::from_slice(&[0x70 + nonce as u8; 20]).unwrap();
        let amount = U256::from(1_000u64 * (nonce as u64 + 1));
        let inner = TransferMessage {
            token_domain: ORIGIN,
            token_id: Padded::from_slice(&[0x7e; 20]).unwrap(),
            recipient,
            amount,
            allow_fast: false,
            details_hash: B256::repeat_byte(0xde),
        }
        .encode();
        Self::with_body(nonce, root, bridge_router(), inner, recipient, amount)
    }

    pub fn governance(nonce: u32, root: u8) -> Self {
        let inner = GovernanceAction::Batch {
            batch_hash: B256::repeat_byte(0xba),
        }
        .encode();
        Self::with_body(
            nonce,
            root,
            governance_router(),
            inner,
            Padded::ZERO,
            U256::ZERO,
        )
    }

    fn with_body(
        nonce: u32,
        root: u8,
        sender: Padded,
        inner: Bytes,
        recipient: Padded,
        amount: U256,
    ) -> Self {
        let body = Envelope {
            origin: ORIGIN,
            sender,
            nonce,
            destination: DESTINATION,
            recipient: bridge_router(),
            body: inner,
        }
        .encode();
        let mut hash = [0u8; 32];
        hash[0] = 0x4d;
        hash[28..].copy_from_slice(&nonce.to_be_bytes());
        Self {
            nonce,
            root: B256::repeat_byte(root),
            hash: B256::from(hash),
            dispatch_block: 100 + nonce as u64,
            dispatch_tx: B256::repeat_byte(0x10 + nonce as u8),
            body,
            recipient,
            amount,
        }
    }

    pub fn dispatch(&self) -> Event {
        Event {
            domain: ORIGIN,
            block: self.dispatch_block,
            timestamp: 1_000,
            tx: self.dispatch_tx,
            gas_used: U256::from(90_000u64),
            data: EventData::Dispatch(DispatchData {
                message_hash: self.hash,
                leaf_index: U256::from(self.nonce),
                destination_and_nonce: pack(DESTINATION, self.nonce),
                committed_root: self.root,
                message: self.body.clone(),
            }),
        }
    }

    pub fn send(&self) -> Event {
        Event {
            domain: ORIGIN,
            block: self.dispatch_block,
            timestamp: 1_000,
            tx: self.dispatch_tx,
            gas_used: U256::from(90_000u64),
            data: EventData::BridgeSend(SendData {
                token: Padded::from_slice(&[0x7e; 20]).unwrap(),
                from: sender_of(self.nonce),
                to_domain: DESTINATION,
                to_id: self.recipient,
                amount: self.amount,
                fast_liquidity_enabled: false,
            }),
        }
    }

    pub fn receive(&self) -> Event {
        Event {
            domain: DESTINATION,
            block: 600,
            timestamp: 5_000,
            tx: B256::repeat_byte(0xe0),
            gas_used: U256::from(70_000u64),
            data: EventData::BridgeReceive(ReceiveData {
                origin_and_nonce: pack(ORIGIN, self.nonce),
                token: Padded::from_slice(&[0x7e; 20]).unwrap(),
                recipient: self.recipient,
                liquidity_provider: Padded::ZERO,
                amount: self.amount,
            }),
        }
    }

    pub fn process(&self) -> Event {
        Event {
            domain: DESTINATION,
            block: 600,
            timestamp: 5_000,
            tx: B256::repeat_byte(0xe0),
            gas_used: U256::from(120_000u64),
            data: EventData::Process(ProcessData {
                message_hash: self.hash,
                success: true,
                return_data: Bytes::new(),
            }),
        }
    }
}

pub fn sender_of(nonce: u32) -> Padded {
    Padded::from_slice(&[0x50 + nonce as u8; 20]).unwrap()
}

pub fn home_update(root: u8) -> Event {
    Event {
        domain: ORIGIN,
        block: 200,
        timestamp: 2_000,
        tx: B256::repeat_byte(0xa0),
        gas_used: U256::from(50_000u64),
        data: EventData::HomeUpdate(update_data(root)),
    }
}

pub fn replica_update(root: u8) -> Event {
    replica_update_on(DESTINATION, root, 3_000)
}

/// Relay of `root` to the replica living on `domain`.
pub fn replica_update_on(domain: u32, root: u8, timestamp: u64) -> Event {
    Event {
        domain,
        block: 300,
        timestamp,
        tx: B256::repeat_byte(0xb0),
        gas_used: U256::from(60_000u64 + timestamp),
        data: EventData::ReplicaUpdate(update_data(root)),
    }
}

fn update_data(root: u8) -> UpdateData {
    UpdateData {
        home_domain: ORIGIN,
        old_root: B256::repeat_byte(root),
        new_root: B256::repeat_byte(root.wrapping_add(1)),
        signature: Bytes::from_static(&[0x51; 65]),
    }
}
