use crate::address::Padded;
use alloy::primitives::{B256, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A protocol log, as handed to the consumer by the chain scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Domain of the chain that emitted the log.
    pub domain: u32,
    pub block: u64,
    /// Unix seconds of the block.
    pub timestamp: u64,
    pub tx: B256,
    pub gas_used: U256,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum EventData {
    Dispatch(DispatchData),
    HomeUpdate(UpdateData),
    ReplicaUpdate(UpdateData),
    Process(ProcessData),
    BridgeSend(SendData),
    BridgeReceive(ReceiveData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchData {
    pub message_hash: B256,
    pub leaf_index: U256,
    /// Destination domain in the high 32 bits, nonce in the low 32 bits.
    pub destination_and_nonce: u64,
    pub committed_root: B256,
    pub message: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateData {
    /// Domain of the home the update was signed for. For replica updates this
    /// is the origin domain of the replicated tree.
    pub home_domain: u32,
    pub old_root: B256,
    pub new_root: B256,
    pub signature: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessData {
    pub message_hash: B256,
    pub success: bool,
    pub return_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendData {
    pub token: Padded,
    pub from: Padded,
    pub to_domain: u32,
    pub to_id: Padded,
    pub amount: U256,
    pub fast_liquidity_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveData {
    /// Origin domain in the high 32 bits, nonce in the low 32 bits.
    pub origin_and_nonce: u64,
    pub token: Padded,
    pub recipient: Padded,
    pub liquidity_provider: Padded,
    pub amount: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Dispatch,
    HomeUpdate,
    ReplicaUpdate,
    Process,
    BridgeSend,
    BridgeReceive,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Dispatch => "dispatch",
            EventKind::HomeUpdate => "home_update",
            EventKind::ReplicaUpdate => "replica_update",
            EventKind::Process => "process",
            EventKind::BridgeSend => "bridge_send",
            EventKind::BridgeReceive => "bridge_receive",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EventData {
    pub fn kind(&self) -> EventKind {
        match self {
            EventData::Dispatch(_) => EventKind::Dispatch,
            EventData::HomeUpdate(_) => EventKind::HomeUpdate,
            EventData::ReplicaUpdate(_) => EventKind::ReplicaUpdate,
            EventData::Process(_) => EventKind::Process,
            EventData::BridgeSend(_) => EventKind::BridgeSend,
            EventData::BridgeReceive(_) => EventKind::BridgeReceive,
        }
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.data.kind()
    }
}

impl DispatchData {
    pub fn destination(&self) -> u32 {
        split_packed(self.destination_and_nonce).0
    }

    pub fn nonce(&self) -> u32 {
        split_packed(self.destination_and_nonce).1
    }
}

impl ReceiveData {
    pub fn origin(&self) -> u32 {
        split_packed(self.origin_and_nonce).0
    }

    pub fn nonce(&self) -> u32 {
        split_packed(self.origin_and_nonce).1
    }
}

pub fn split_packed(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, value as u32)
}

pub fn pack(high: u32, low: u32) -> u64 {
    ((high as u64) << 32) | low as u64
}
