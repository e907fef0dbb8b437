use crate::{
    address::Padded,
    body::{DecodeError, Envelope, GovernanceAction, TransferMessage},
    error::LifecycleError,
    settings::{DomainSettings, load_domains_from_file},
};
use std::{collections::BTreeMap, path::Path};

/// Protocol configuration the consumer resolves messages against.
pub trait ProtocolContext: Send + Sync {
    fn bridge_router(&self, domain: u32) -> Option<Padded>;

    fn governance_router(&self, domain: u32) -> Option<Padded>;

    /// Optimistic confirmation window of a destination domain, in seconds.
    fn optimistic_seconds(&self, domain: u32) -> Option<u64>;

    fn is_known_domain(&self, domain: u32) -> bool;

    fn domains(&self) -> Vec<u32>;

    fn decode_envelope(&self, raw: &[u8]) -> Result<Envelope, DecodeError> {
        Envelope::decode(raw)
    }

    fn decode_transfer(&self, body: &[u8]) -> Result<TransferMessage, DecodeError> {
        TransferMessage::decode(body)
    }

    fn decode_governance(&self, body: &[u8]) -> Result<GovernanceAction, DecodeError> {
        GovernanceAction::decode(body)
    }
}

/// Context built from the configured domain list.
#[derive(Debug, Clone, Default)]
pub struct DomainsContext {
    domains: BTreeMap<u32, DomainSettings>,
}

impl DomainsContext {
    pub fn new(domains: Vec<DomainSettings>) -> Result<Self, LifecycleError> {
        let mut map = BTreeMap::new();
        for domain in domains {
            let id = domain.domain;
            if map.insert(id, domain).is_some() {
                return Err(LifecycleError::InvalidConfig(format!(
                    "domain {id} is configured more than once"
                )));
            }
        }
        Ok(Self { domains: map })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let domains = load_domains_from_file(path)?;
        Ok(Self::new(domains)?)
    }

    pub fn domain_name(&self, domain: u32) -> Option<&str> {
        self.domains.get(&domain).map(|d| d.name.as_str())
    }
}

impl ProtocolContext for DomainsContext {
    fn bridge_router(&self, domain: u32) -> Option<Padded> {
        self.domains.get(&domain)?.bridge_router
    }

    fn governance_router(&self, domain: u32) -> Option<Padded> {
        self.domains.get(&domain)?.governance_router
    }

    fn optimistic_seconds(&self, domain: u32) -> Option<u64> {
        self.domains.get(&domain)?.optimistic_seconds
    }

    fn is_known_domain(&self, domain: u32) -> bool {
        self.domains.contains_key(&domain)
    }

    fn domains(&self) -> Vec<u32> {
        self.domains.keys().copied().collect()
    }
}
