use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::MessageHash)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::Origin).big_integer().not_null())
                    .col(ColumnDef::new(Messages::Destination).big_integer().not_null())
                    .col(ColumnDef::new(Messages::Nonce).big_integer().not_null())
                    .col(ColumnDef::new(Messages::Root).string().not_null())
                    .col(ColumnDef::new(Messages::LeafIndex).string().not_null())
                    .col(ColumnDef::new(Messages::Body).text().not_null())
                    .col(ColumnDef::new(Messages::DispatchBlock).big_integer().not_null())
                    .col(ColumnDef::new(Messages::DispatchedAt).big_integer().not_null())
                    .col(ColumnDef::new(Messages::UpdatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Messages::RelayedAt).big_integer().not_null())
                    .col(ColumnDef::new(Messages::ReceivedAt).big_integer().not_null())
                    .col(ColumnDef::new(Messages::ProcessedAt).big_integer().not_null())
                    .col(ColumnDef::new(Messages::Sender).string())
                    .col(ColumnDef::new(Messages::Tx).string())
                    .col(ColumnDef::new(Messages::State).integer().not_null())
                    .col(ColumnDef::new(Messages::MsgType).integer().not_null())
                    .col(ColumnDef::new(Messages::InternalSender).string().not_null())
                    .col(ColumnDef::new(Messages::InternalRecipient).string().not_null())
                    .col(ColumnDef::new(Messages::Recipient).string())
                    .col(ColumnDef::new(Messages::Amount).string())
                    .col(
                        ColumnDef::new(Messages::AllowFast)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Messages::DetailsHash).string())
                    .col(ColumnDef::new(Messages::TokenDomain).big_integer())
                    .col(ColumnDef::new(Messages::TokenId).string())
                    .col(ColumnDef::new(Messages::GasAtDispatch).string().not_null())
                    .col(ColumnDef::new(Messages::GasAtUpdate).string().not_null())
                    .col(ColumnDef::new(Messages::GasAtRelay).string().not_null())
                    .col(ColumnDef::new(Messages::GasAtReceive).string().not_null())
                    .col(ColumnDef::new(Messages::GasAtProcess).string().not_null())
                    .col(ColumnDef::new(Messages::Sent).boolean().not_null().default(false))
                    .col(ColumnDef::new(Messages::Updated).boolean().not_null().default(false))
                    .col(ColumnDef::new(Messages::Relayed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Messages::Received).boolean().not_null().default(false))
                    .col(ColumnDef::new(Messages::Processed).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Messages::ConfirmAt)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("messages_origin_root_index")
                    .table(Messages::Table)
                    .col(Messages::Origin)
                    .col(Messages::Root)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("messages_origin_nonce_destination_index")
                    .table(Messages::Table)
                    .col(Messages::Origin)
                    .col(Messages::Nonce)
                    .col(Messages::Destination)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("messages_send_values_index")
                    .table(Messages::Table)
                    .col(Messages::Destination)
                    .col(Messages::Recipient)
                    .col(Messages::Amount)
                    .col(Messages::DispatchBlock)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
enum Messages {
    Table,
    MessageHash,
    Origin,
    Destination,
    Nonce,
    Root,
    LeafIndex,
    Body,
    DispatchBlock,
    DispatchedAt,
    UpdatedAt,
    RelayedAt,
    ReceivedAt,
    ProcessedAt,
    Sender,
    Tx,
    State,
    MsgType,
    InternalSender,
    InternalRecipient,
    Recipient,
    Amount,
    AllowFast,
    DetailsHash,
    TokenDomain,
    TokenId,
    GasAtDispatch,
    GasAtUpdate,
    GasAtRelay,
    GasAtReceive,
    GasAtProcess,
    Sent,
    Updated,
    Relayed,
    Received,
    Processed,
    ConfirmAt,
}
