use crate::{
    address::Padded,
    body::{GovernanceAction, TransferMessage},
    context::ProtocolContext,
    error::LifecycleError,
    events::{Event, SendData},
    metrics,
    record::MessageRecord,
};
use alloy::primitives::{B256, Bytes, U256};
use std::{fmt, str::FromStr};

/// Lifecycle state of a message. Ordering follows the protocol flow and a
/// message never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum MessageState {
    Dispatched = 0,
    Updated = 1,
    Relayed = 2,
    Received = 3,
    Processed = 4,
}

impl MessageState {
    pub const ALL: [MessageState; 5] = [
        MessageState::Dispatched,
        MessageState::Updated,
        MessageState::Relayed,
        MessageState::Received,
        MessageState::Processed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageState::Dispatched => "dispatched",
            MessageState::Updated => "updated",
            MessageState::Relayed => "relayed",
            MessageState::Received => "received",
            MessageState::Processed => "processed",
        }
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for MessageState {
    type Error = LifecycleError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        MessageState::ALL
            .into_iter()
            .find(|state| *state as i32 == value)
            .ok_or_else(|| LifecycleError::InvalidRecord(format!("unknown state code {value}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PayloadKind {
    None = 0,
    Transfer = 1,
    Governance = 2,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::None => "empty",
            PayloadKind::Transfer => "transfer",
            PayloadKind::Governance => "governance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    None,
    Transfer(TransferMessage),
    Governance(GovernanceAction),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::None => PayloadKind::None,
            Payload::Transfer(_) => PayloadKind::Transfer,
            Payload::Governance(_) => PayloadKind::Governance,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timings {
    pub dispatched_at: u64,
    pub updated_at: u64,
    pub relayed_at: u64,
    pub received_at: u64,
    pub processed_at: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GasUsed {
    pub dispatch: U256,
    pub update: U256,
    pub relay: U256,
    pub receive: U256,
    pub process: U256,
}

/// Which transitions have been observed, regardless of the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checkbox {
    pub sent: bool,
    pub updated: bool,
    pub relayed: bool,
    pub received: bool,
    pub processed: bool,
}

/// Immutable identity of a dispatched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIdentity {
    pub origin: u32,
    pub destination: u32,
    pub nonce: u32,
    pub root: B256,
    pub message_hash: B256,
    pub leaf_index: U256,
    pub body: Bytes,
    pub dispatch_block: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub identity: MessageIdentity,
    pub internal_sender: Padded,
    pub internal_recipient: Padded,
    pub payload: Payload,
    pub state: MessageState,
    pub timings: Timings,
    pub gas_used: GasUsed,
    pub checkbox: Checkbox,
    pub sender: Option<Padded>,
    pub tx: Option<B256>,
}

impl Message {
    pub fn new(identity: MessageIdentity, dispatched_at: u64, ctx: &dyn ProtocolContext) -> Self {
        let (internal_sender, internal_recipient, payload) = match ctx
            .decode_envelope(&identity.body)
        {
            Ok(envelope) => {
                let payload =
                    classify_payload(ctx, identity.origin, &envelope.sender, &envelope.body);
                (envelope.sender, envelope.recipient, payload)
            }
            Err(err) => {
                tracing::warn!(
                    message_hash = %identity.message_hash,
                    err = %err,
                    "failed to decode message envelope"
                );
                (Padded::ZERO, Padded::ZERO, Payload::None)
            }
        };

        Self {
            identity,
            internal_sender,
            internal_recipient,
            payload,
            state: MessageState::Dispatched,
            timings: Timings {
                dispatched_at,
                ..Default::default()
            },
            gas_used: GasUsed::default(),
            checkbox: Checkbox::default(),
            sender: None,
            tx: None,
        }
    }

    pub fn hash(&self) -> B256 {
        self.identity.message_hash
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self.payload, Payload::Transfer(_))
    }

    pub fn transfer(&self) -> Option<&TransferMessage> {
        match &self.payload {
            Payload::Transfer(transfer) => Some(transfer),
            _ => None,
        }
    }

    pub fn allow_fast(&self) -> bool {
        self.transfer().is_some_and(|t| t.allow_fast)
    }

    /// Timestamp after which the message can be processed on the destination.
    pub fn confirm_at(&self, ctx: &dyn ProtocolContext) -> u64 {
        if self.timings.relayed_at == 0 {
            return 0;
        }
        match ctx.optimistic_seconds(self.identity.destination) {
            Some(window) if window > 0 => self.timings.relayed_at + window,
            _ => 0,
        }
    }

    pub fn update(&mut self, event: &Event) -> bool {
        self.timings.updated_at = event.timestamp;
        self.gas_used.update = event.gas_used;
        self.checkbox.updated = true;
        self.advance(MessageState::Updated)
    }

    /// Relays to replicas on other domains share the root but do not concern
    /// this message and leave it untouched.
    pub fn relay(&mut self, event: &Event) -> bool {
        if event.domain != self.identity.destination {
            return false;
        }
        self.timings.relayed_at = event.timestamp;
        self.gas_used.relay = event.gas_used;
        self.checkbox.relayed = true;
        self.advance(MessageState::Relayed)
    }

    pub fn receive(&mut self, event: &Event) -> bool {
        self.timings.received_at = event.timestamp;
        self.gas_used.receive = event.gas_used;
        self.checkbox.received = true;
        self.advance(MessageState::Received)
    }

    pub fn process(&mut self, event: &Event) -> bool {
        self.timings.processed_at = event.timestamp;
        self.gas_used.process = event.gas_used;
        self.checkbox.processed = true;
        self.advance(MessageState::Processed)
    }

    /// Attach the bridge send that produced this message. Does not change the state.
    pub fn record_send(&mut self, event: &Event, data: &SendData) -> Result<(), LifecycleError> {
        if !self.is_transfer() {
            return Err(LifecycleError::NotTransfer(self.hash().to_string()));
        }
        self.sender = Some(data.from);
        self.tx = Some(event.tx);
        self.checkbox.sent = true;
        Ok(())
    }

    fn advance(&mut self, target: MessageState) -> bool {
        if self.state < target {
            tracing::debug!(
                message_hash = %self.hash(),
                from = %self.state,
                to = %target,
                "message state advanced"
            );
            self.state = target;
            metrics::TRANSITIONS_TOTAL
                .with_label_values(&[target.as_str()])
                .inc();
            true
        } else {
            tracing::debug!(
                message_hash = %self.hash(),
                state = %self.state,
                target = %target,
                "message already at or past target state"
            );
            false
        }
    }

    pub fn to_record(&self, ctx: &dyn ProtocolContext) -> MessageRecord {
        let transfer = self.transfer();
        MessageRecord {
            origin: self.identity.origin,
            destination: self.identity.destination,
            nonce: self.identity.nonce,
            root: self.identity.root.to_string(),
            message_hash: self.identity.message_hash.to_string(),
            leaf_index: format!("{:#x}", self.identity.leaf_index),
            body: format!("0x{}", hex::encode(&self.identity.body)),
            dispatch_block: self.identity.dispatch_block,
            dispatched_at: self.timings.dispatched_at,
            updated_at: self.timings.updated_at,
            relayed_at: self.timings.relayed_at,
            received_at: self.timings.received_at,
            processed_at: self.timings.processed_at,
            sender: self.sender.map(|s| s.pretty()),
            tx: self.tx.map(|tx| tx.to_string()),
            state: self.state as i32,
            msg_type: self.kind() as i32,
            internal_sender: self.internal_sender.pretty(),
            internal_recipient: self.internal_recipient.pretty(),
            recipient: transfer.map(|t| t.recipient.pretty()),
            amount: transfer.map(|t| t.amount.to_string()),
            allow_fast: self.allow_fast(),
            details_hash: transfer.map(|t| t.details_hash.to_string()),
            token_domain: transfer.map(|t| t.token_domain),
            token_id: transfer.map(|t| t.token_id.pretty()),
            gas_at_dispatch: format!("{:#x}", self.gas_used.dispatch),
            gas_at_update: format!("{:#x}", self.gas_used.update),
            gas_at_relay: format!("{:#x}", self.gas_used.relay),
            gas_at_receive: format!("{:#x}", self.gas_used.receive),
            gas_at_process: format!("{:#x}", self.gas_used.process),
            sent: self.checkbox.sent,
            updated: self.checkbox.updated,
            relayed: self.checkbox.relayed,
            received: self.checkbox.received,
            processed: self.checkbox.processed,
            confirm_at: self.confirm_at(ctx),
        }
    }

    /// Rebuild a message from its record. The payload is decoded again from
    /// the body against the current context.
    pub fn from_record(
        record: &MessageRecord,
        ctx: &dyn ProtocolContext,
    ) -> Result<Self, LifecycleError> {
        let identity = MessageIdentity {
            origin: record.origin,
            destination: record.destination,
            nonce: record.nonce,
            root: parse_field("root", &record.root)?,
            message_hash: parse_field("messageHash", &record.message_hash)?,
            leaf_index: parse_field("leafIndex", &record.leaf_index)?,
            body: parse_field("body", &record.body)?,
            dispatch_block: record.dispatch_block,
        };
        let mut message = Message::new(identity, record.dispatched_at, ctx);

        message.timings.updated_at = record.updated_at;
        message.timings.relayed_at = record.relayed_at;
        message.timings.received_at = record.received_at;
        message.timings.processed_at = record.processed_at;

        message.gas_used = GasUsed {
            dispatch: parse_field("gasAtDispatch", &record.gas_at_dispatch)?,
            update: parse_field("gasAtUpdate", &record.gas_at_update)?,
            relay: parse_field("gasAtRelay", &record.gas_at_relay)?,
            receive: parse_field("gasAtReceive", &record.gas_at_receive)?,
            process: parse_field("gasAtProcess", &record.gas_at_process)?,
        };

        message.checkbox = Checkbox {
            sent: record.sent,
            updated: record.updated,
            relayed: record.relayed,
            received: record.received,
            processed: record.processed,
        };

        message.sender = record
            .sender
            .as_deref()
            .map(|s| parse_field("sender", s))
            .transpose()?;
        message.tx = record
            .tx
            .as_deref()
            .map(|s| parse_field("tx", s))
            .transpose()?;
        message.state = MessageState::try_from(record.state)?;

        Ok(message)
    }
}

fn classify_payload(
    ctx: &dyn ProtocolContext,
    origin: u32,
    sender: &Padded,
    body: &[u8],
) -> Payload {
    if ctx.bridge_router(origin).as_ref() == Some(sender) {
        match ctx.decode_transfer(body) {
            Ok(transfer) => return Payload::Transfer(transfer),
            Err(err) => tracing::debug!(err = %err, "bridge router message is not a transfer"),
        }
    } else if ctx.governance_router(origin).as_ref() == Some(sender) {
        match ctx.decode_governance(body) {
            Ok(action) => return Payload::Governance(action),
            Err(err) => tracing::debug!(err = %err, "governance router message is not an action"),
        }
    }
    Payload::None
}

fn parse_field<T>(field: &str, value: &str) -> Result<T, LifecycleError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| LifecycleError::InvalidRecord(format!("{field}: {e}")))
}
