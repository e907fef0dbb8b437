use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PendingEvents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PendingEvents::Bucket).string().not_null())
                    .col(ColumnDef::new(PendingEvents::Key).string().not_null())
                    .col(ColumnDef::new(PendingEvents::Value).text().not_null())
                    .col(
                        ColumnDef::new(PendingEvents::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PendingEvents::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(PendingEvents::Bucket)
                            .col(PendingEvents::Key),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PendingEvents {
    Table,
    Bucket,
    Key,
    Value,
    CreatedAt,
    UpdatedAt,
}
