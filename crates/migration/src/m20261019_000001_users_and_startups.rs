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
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Startups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Startups::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Startups::Name).string().not_null())
                    .col(ColumnDef::new(Startups::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Startups::FounderEmail).string().not_null())
                    .col(
                        ColumnDef::new(Startups::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Startups::OwnerId).string())
                    .col(ColumnDef::new(Startups::OwnedAt).big_integer())
                    .col(ColumnDef::new(Startups::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Startups::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_startups_owner_id")
                            .from(Startups::Table, Startups::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Claim requests look listings up by founder email.
        manager
            .create_index(
                Index::create()
                    .name("idx_startups_founder_email")
                    .table(Startups::Table)
                    .col(Startups::FounderEmail)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_startups_owner_id")
                    .table(Startups::Table)
                    .col(Startups::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(Index::drop().name("idx_startups_owner_id").to_owned())
            .await;
        let _ = manager
            .drop_index(Index::drop().name("idx_startups_founder_email").to_owned())
            .await;

        manager
            .drop_table(Table::drop().table(Startups::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Startups {
    Table,
    Id,
    Name,
    Slug,
    FounderEmail,
    Status,
    OwnerId,
    OwnedAt,
    CreatedAt,
    UpdatedAt,
}
