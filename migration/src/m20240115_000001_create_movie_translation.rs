use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MovieTranslation::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieTranslation::Id))
                    .col(big_integer(MovieTranslation::MovieId))
                    .col(string(MovieTranslation::LanguageCode))
                    .col(text(MovieTranslation::Fields))
                    .col(big_integer(MovieTranslation::TranslatedAt))
                    .to_owned(),
            )
            .await?;

        // One cache entry per (movie, language); upserts target this index.
        manager
            .create_index(
                Index::create()
                    .name("idx_movie_translation_unique")
                    .table(MovieTranslation::Table)
                    .col(MovieTranslation::MovieId)
                    .col(MovieTranslation::LanguageCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_movie_translation_unique")
                    .table(MovieTranslation::Table)
                    .to_owned(),
            )
            .await?;
        manager.drop_table(Table::drop().table(MovieTranslation::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum MovieTranslation {
    Table,
    Id,
    MovieId,
    LanguageCode,
    Fields,
    TranslatedAt,
}
