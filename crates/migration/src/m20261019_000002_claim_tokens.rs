use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClaimTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClaimTokens::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClaimTokens::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ClaimTokens::Email).string().not_null())
                    .col(
                        ColumnDef::new(ClaimTokens::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClaimTokens::ExpiresAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClaimTokens::UsedAt).big_integer())
                    .col(
                        ColumnDef::new(ClaimTokens::TargetCount)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_claim_tokens_email")
                    .table(ClaimTokens::Table)
                    .col(ClaimTokens::Email)
                    .to_owned(),
            )
            .await?;

        // Used by the expired-token sweep.
        manager
            .create_index(
                Index::create()
                    .name("idx_claim_tokens_expires_at")
                    .table(ClaimTokens::Table)
                    .col(ClaimTokens::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClaimTokenTargets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClaimTokenTargets::ClaimTokenId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClaimTokenTargets::StartupId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ClaimTokenTargets::ClaimTokenId)
                            .col(ClaimTokenTargets::StartupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claim_token_targets_claim_token_id")
                            .from(ClaimTokenTargets::Table, ClaimTokenTargets::ClaimTokenId)
                            .to(ClaimTokens::Table, ClaimTokens::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // No foreign key to startups: target rows must outlive a deleted listing
        // so the token can be recognised as pointing at something gone.
        manager
            .create_index(
                Index::create()
                    .name("idx_claim_token_targets_startup_id")
                    .table(ClaimTokenTargets::Table)
                    .col(ClaimTokenTargets::StartupId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(
                Index::drop()
                    .name("idx_claim_token_targets_startup_id")
                    .to_owned(),
            )
            .await;

        manager
            .drop_table(Table::drop().table(ClaimTokenTargets::Table).to_owned())
            .await?;

        let _ = manager
            .drop_index(Index::drop().name("idx_claim_tokens_expires_at").to_owned())
            .await;
        let _ = manager
            .drop_index(Index::drop().name("idx_claim_tokens_email").to_owned())
            .await;

        manager
            .drop_table(Table::drop().table(ClaimTokens::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClaimTokens {
    Table,
    Id,
    Token,
    Email,
    CreatedAt,
    ExpiresAt,
    UsedAt,
    TargetCount,
}

#[derive(DeriveIden)]
enum ClaimTokenTargets {
    Table,
    ClaimTokenId,
    StartupId,
}
