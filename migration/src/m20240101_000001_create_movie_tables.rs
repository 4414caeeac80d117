use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(big_integer(Movie::Id).primary_key())
                    .col(boolean(Movie::Adult))
                    .col(string(Movie::BackdropPath))
                    .col(text(Movie::GenreIds))
                    .col(string(Movie::OriginalLanguage))
                    .col(string(Movie::OriginalTitle))
                    .col(text(Movie::Overview))
                    .col(double(Movie::Popularity))
                    .col(string(Movie::PosterPath))
                    .col(string(Movie::ReleaseDate))
                    .col(string(Movie::Title))
                    .col(boolean(Movie::Video))
                    .col(double(Movie::VoteAverage))
                    .col(big_integer(Movie::VoteCount))
                    .col(big_integer(Movie::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieCast::Table)
                    .if_not_exists()
                    .col(big_integer(MovieCast::MovieId))
                    .col(string(MovieCast::ActorName))
                    .col(string(MovieCast::RoleName))
                    .col(text(MovieCast::RoleDescription))
                    .primary_key(Index::create().col(MovieCast::MovieId).col(MovieCast::ActorName))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_cast_role")
                    .table(MovieCast::Table)
                    .col(MovieCast::MovieId)
                    .col(MovieCast::RoleName)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MovieCast::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Adult,
    BackdropPath,
    GenreIds,
    OriginalLanguage,
    OriginalTitle,
    Overview,
    Popularity,
    PosterPath,
    ReleaseDate,
    Title,
    Video,
    VoteAverage,
    VoteCount,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MovieCast {
    Table,
    MovieId,
    ActorName,
    RoleName,
    RoleDescription,
}
