use crate::address::Padded;
use anyhow::Context;
use blockscout_service_launcher::{
    database::DatabaseSettings, launcher::ConfigSettings, tracing::TracingSettings,
};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub domains_config: PathBuf,
    #[serde(default)]
    pub consumer: ConsumerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub tracing: TracingSettings,
}

impl ConfigSettings for Settings {
    const SERVICE_NAME: &'static str = "MESSAGE_LIFECYCLE";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConsumerSettings {
    /// Upper bound on concurrent message update writes.
    pub write_concurrency: usize,
    /// Page size of the statistics scan.
    pub stats_batch_size: u64,
    pub notification_capacity: usize,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            write_concurrency: 10,
            stats_batch_size: 10_000,
            notification_capacity: 1024,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DomainSettings {
    pub domain: u32,
    pub name: String,
    #[serde(default)]
    pub bridge_router: Option<Padded>,
    #[serde(default)]
    pub governance_router: Option<Padded>,
    /// Accepts either a number or a numeric string.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub optimistic_seconds: Option<u64>,
}

/// Load and deserialize domains from a JSON file
pub fn load_domains_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<DomainSettings>> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read domains config file: {:?}", path.as_ref()))?;

    let domains: Vec<DomainSettings> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse domains config JSON: {:?}", path.as_ref()))?;

    Ok(domains)
}
