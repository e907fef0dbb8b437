use anyhow::Context;
use blockscout_service_launcher::{database, launcher::ConfigSettings};
use message_lifecycle_logic::{Consumer, DomainsContext, LifecycleDatabase, Settings};
use std::sync::Arc;

const SERVICE_NAME: &str = "collect_stats";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let settings = Settings::build().expect("failed to read config");
    blockscout_service_launcher::tracing::init_logs(
        SERVICE_NAME,
        &settings.tracing,
        &Default::default(),
    )?;

    let ctx = Arc::new(DomainsContext::from_file(&settings.domains_config)?);

    let db = {
        let mut database_settings = settings.database;
        // Script must be run only on already setup database.
        database_settings.create_database = false;
        database_settings.run_migrations = false;
        database::initialize_postgres::<migration::Migrator>(&database_settings)
            .await
            .context("initialize database")?
    };
    let db = Arc::new(LifecycleDatabase::new(Arc::new(db)));

    let consumer = Consumer::new(db.clone(), db.clone(), ctx.clone(), settings.consumer);
    let stats = consumer.stats().await.context("collect statistics")?;
    for (domain, counts) in &stats.domains {
        tracing::info!(
            domain,
            name = ctx.domain_name(*domain).unwrap_or("unknown"),
            messages = counts.total(),
            "domain statistics"
        );
    }

    let stored = db.count_messages().await.context("count messages")?;
    if stored != stats.total.total() {
        tracing::warn!(
            stored,
            counted = stats.total.total(),
            "messages changed while collecting statistics"
        );
    }
    tracing::info!(
        messages = stats.total.total(),
        domains = stats.domains.len(),
        "statistics collected"
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
