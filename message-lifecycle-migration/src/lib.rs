pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_messages;
mod m20240601_000002_create_pending_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_messages::Migration),
            Box::new(m20240601_000002_create_pending_events::Migration),
        ]
    }
    fn migration_table_name() -> DynIden {
        Alias::new("message_lifecycle_migrations").into_iden()
    }
}
