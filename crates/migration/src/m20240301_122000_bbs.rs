//! Listings. `rubric_id` is nullable but protected: a rubric cannot be
//! deleted while a listing still points at it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Bbs {
    Table,
    Id,
    Kind,
    RubricId,
    Title,
    Content,
    PriceMinor,
    Published,
    UpdatedAt,
    Photo,
}

#[derive(Iden)]
enum Rubrics {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bbs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bbs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Bbs::Kind)
                            .string_len(1)
                            .not_null()
                            .default("s"),
                    )
                    .col(ColumnDef::new(Bbs::RubricId).integer())
                    .col(ColumnDef::new(Bbs::Title).string_len(50).not_null())
                    .col(ColumnDef::new(Bbs::Content).text())
                    .col(ColumnDef::new(Bbs::PriceMinor).big_integer())
                    .col(ColumnDef::new(Bbs::Published).timestamp().not_null())
                    .col(ColumnDef::new(Bbs::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Bbs::Photo).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bbs-rubric_id")
                            .from(Bbs::Table, Bbs::RubricId)
                            .to(Rubrics::Table, Rubrics::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bbs-published")
                    .table(Bbs::Table)
                    .col(Bbs::Published)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bbs-rubric_id")
                    .table(Bbs::Table)
                    .col(Bbs::RubricId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bbs::Table).to_owned())
            .await
    }
}
