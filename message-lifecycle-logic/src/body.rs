//! Decoders for the packed message formats carried by dispatched messages.
//!
//! All integers are big-endian. Every decoder returns either a fully
//! populated value or a [`DecodeError`].

use crate::address::Padded;
use alloy::primitives::{B256, Bytes, U256};

pub const ENVELOPE_HEADER_LEN: usize = 76;
pub const TRANSFER_BODY_LEN: usize = 133;

const ACTION_TRANSFER: u8 = 3;
const ACTION_FAST_TRANSFER: u8 = 4;

const GOVERNANCE_BATCH: u8 = 1;
const GOVERNANCE_TRANSFER_GOVERNOR: u8 = 2;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{kind}: expected at least {expected} bytes, got {actual}")]
    TooShort {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{kind}: expected exactly {expected} bytes, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{kind}: unknown action type {action}")]
    UnknownAction { kind: &'static str, action: u8 },
}

/// Message envelope: `origin | sender | nonce | destination | recipient | body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub origin: u32,
    pub sender: Padded,
    pub nonce: u32,
    pub destination: u32,
    pub recipient: Padded,
    pub body: Bytes,
}

impl Envelope {
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        if raw.len() < ENVELOPE_HEADER_LEN {
            return Err(DecodeError::TooShort {
                kind: "envelope",
                expected: ENVELOPE_HEADER_LEN,
                actual: raw.len(),
            });
        }
        let mut reader = Reader::new(raw);
        Ok(Self {
            origin: reader.u32(),
            sender: reader.padded(),
            nonce: reader.u32(),
            destination: reader.u32(),
            recipient: reader.padded(),
            body: Bytes::copy_from_slice(reader.rest()),
        })
    }

    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(ENVELOPE_HEADER_LEN + self.body.len());
        out.extend_from_slice(&self.origin.to_be_bytes());
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(&self.nonce.to_be_bytes());
        out.extend_from_slice(&self.destination.to_be_bytes());
        out.extend_from_slice(self.recipient.as_bytes());
        out.extend_from_slice(&self.body);
        out.into()
    }
}

/// Token transfer carried by a bridge router message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMessage {
    pub token_domain: u32,
    pub token_id: Padded,
    pub recipient: Padded,
    pub amount: U256,
    pub allow_fast: bool,
    pub details_hash: B256,
}

impl TransferMessage {
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        if raw.len() != TRANSFER_BODY_LEN {
            return Err(DecodeError::InvalidLength {
                kind: "transfer",
                expected: TRANSFER_BODY_LEN,
                actual: raw.len(),
            });
        }
        let mut reader = Reader::new(raw);
        let token_domain = reader.u32();
        let token_id = reader.padded();
        let allow_fast = match reader.u8() {
            ACTION_TRANSFER => false,
            ACTION_FAST_TRANSFER => true,
            action => {
                return Err(DecodeError::UnknownAction {
                    kind: "transfer",
                    action,
                })
            }
        };
        Ok(Self {
            token_domain,
            token_id,
            allow_fast,
            recipient: reader.padded(),
            amount: U256::from_be_slice(reader.take(32)),
            details_hash: B256::from_slice(reader.take(32)),
        })
    }

    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(TRANSFER_BODY_LEN);
        out.extend_from_slice(&self.token_domain.to_be_bytes());
        out.extend_from_slice(self.token_id.as_bytes());
        out.push(if self.allow_fast {
            ACTION_FAST_TRANSFER
        } else {
            ACTION_TRANSFER
        });
        out.extend_from_slice(self.recipient.as_bytes());
        out.extend_from_slice(&self.amount.to_be_bytes::<32>());
        out.extend_from_slice(self.details_hash.as_slice());
        out.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GovernanceAction {
    Batch { batch_hash: B256 },
    TransferGovernor { domain: u32, governor: Padded },
}

impl GovernanceAction {
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let Some((action, rest)) = raw.split_first() else {
            return Err(DecodeError::TooShort {
                kind: "governance",
                expected: 1,
                actual: 0,
            });
        };
        let expect_len = |expected: usize| {
            if rest.len() == expected {
                Ok(())
            } else {
                Err(DecodeError::InvalidLength {
                    kind: "governance",
                    expected: expected + 1,
                    actual: raw.len(),
                })
            }
        };
        let mut reader = Reader::new(rest);
        match *action {
            GOVERNANCE_BATCH => {
                expect_len(32)?;
                Ok(Self::Batch {
                    batch_hash: B256::from_slice(reader.take(32)),
                })
            }
            GOVERNANCE_TRANSFER_GOVERNOR => {
                expect_len(36)?;
                Ok(Self::TransferGovernor {
                    domain: reader.u32(),
                    governor: reader.padded(),
                })
            }
            action => Err(DecodeError::UnknownAction {
                kind: "governance",
                action,
            }),
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(37);
        match self {
            Self::Batch { batch_hash } => {
                out.push(GOVERNANCE_BATCH);
                out.extend_from_slice(batch_hash.as_slice());
            }
            Self::TransferGovernor { domain, governor } => {
                out.push(GOVERNANCE_TRANSFER_GOVERNOR);
                out.extend_from_slice(&domain.to_be_bytes());
                out.extend_from_slice(governor.as_bytes());
            }
        }
        out.into()
    }
}

// Callers check lengths up front, so reads never run past the end.
struct Reader<'a> {
    raw: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(raw: &'a [u8]) -> Self {
        Self { raw }
    }

    fn take(&mut self, n: usize) -> &'a [u8] {
        let (head, tail) = self.raw.split_at(n);
        self.raw = tail;
        head
    }

    fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    fn u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4));
        u32::from_be_bytes(buf)
    }

    fn padded(&mut self) -> Padded {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(self.take(32));
        Padded::from(B256::from(buf))
    }

    fn rest(self) -> &'a [u8] {
        self.raw
    }
}
