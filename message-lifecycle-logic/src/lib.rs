pub mod address;
pub mod body;
pub mod consumer;
pub mod context;
mod database;
pub mod error;
pub mod events;
pub mod message;
pub mod metrics;
pub mod pool;
pub mod record;
pub mod settings;
pub mod stats;
pub mod store;
#[cfg(test)]
pub mod test_utils;

pub use address::Padded;
pub use consumer::{Consumer, Notification, NotificationKind};
pub use context::{DomainsContext, ProtocolContext};
pub use database::LifecycleDatabase;
pub use error::LifecycleError;
pub use events::{Event, EventData, EventKind};
pub use message::{Message, MessageState, PayloadKind};
pub use record::MessageRecord;
pub use settings::{ConsumerSettings, DomainSettings, Settings};
pub use stats::Statistics;
pub use store::{HashStore, InMemoryHashStore, InMemoryMessageStore, MessageStore};
