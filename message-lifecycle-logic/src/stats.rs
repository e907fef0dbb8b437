use crate::{message::MessageState, record::MessageRecord};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub dispatched: u64,
    pub updated: u64,
    pub relayed: u64,
    pub received: u64,
    pub processed: u64,
}

impl StateCounts {
    fn add(&mut self, state: MessageState) {
        let counter = match state {
            MessageState::Dispatched => &mut self.dispatched,
            MessageState::Updated => &mut self.updated,
            MessageState::Relayed => &mut self.relayed,
            MessageState::Received => &mut self.received,
            MessageState::Processed => &mut self.processed,
        };
        *counter += 1;
    }

    pub fn total(&self) -> u64 {
        self.dispatched + self.updated + self.relayed + self.received + self.processed
    }
}

/// Message counts by current state, overall and per origin domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: StateCounts,
    pub domains: BTreeMap<u32, StateCounts>,
}

#[derive(Debug, Default)]
pub struct StatisticsCollector {
    stats: Statistics,
}

impl StatisticsCollector {
    /// Known domains are reported even when they have no messages.
    pub fn new(domains: impl IntoIterator<Item = u32>) -> Self {
        Self {
            stats: Statistics {
                total: StateCounts::default(),
                domains: domains
                    .into_iter()
                    .map(|domain| (domain, StateCounts::default()))
                    .collect(),
            },
        }
    }

    pub fn contribute(&mut self, record: &MessageRecord) {
        let Ok(state) = MessageState::try_from(record.state) else {
            tracing::warn!(
                message_hash = %record.message_hash,
                state = record.state,
                "skipping message with unknown state"
            );
            return;
        };
        self.stats.total.add(state);
        self.stats
            .domains
            .entry(record.origin)
            .or_default()
            .add(state);
    }

    pub fn finish(self) -> Statistics {
        self.stats
    }
}
