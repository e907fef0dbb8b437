use serde::{Deserialize, Serialize};

/// Flat representation of a message as it is persisted and served.
///
/// Hashes, roots, leaf index, body and gas values are `0x`-prefixed hex.
/// Amounts are decimal strings, addresses are pretty-printed and timestamps
/// are unix seconds (`0` until observed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub origin: u32,
    pub destination: u32,
    pub nonce: u32,
    pub root: String,
    pub message_hash: String,
    pub leaf_index: String,
    pub body: String,
    pub dispatch_block: u64,
    pub dispatched_at: u64,
    pub updated_at: u64,
    pub relayed_at: u64,
    pub received_at: u64,
    pub processed_at: u64,
    pub sender: Option<String>,
    pub tx: Option<String>,
    pub state: i32,
    pub msg_type: i32,
    pub internal_sender: String,
    pub internal_recipient: String,
    pub recipient: Option<String>,
    pub amount: Option<String>,
    pub allow_fast: bool,
    pub details_hash: Option<String>,
    pub token_domain: Option<u32>,
    pub token_id: Option<String>,
    pub gas_at_dispatch: String,
    pub gas_at_update: String,
    pub gas_at_relay: String,
    pub gas_at_receive: String,
    pub gas_at_process: String,
    pub sent: bool,
    pub updated: bool,
    pub relayed: bool,
    pub received: bool,
    pub processed: bool,
    pub confirm_at: u64,
}
