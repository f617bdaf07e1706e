use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ── Create genres table ──
        manager
            .create_table(
                Table::create()
                    .table(Genres::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Genres::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Genres::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Genres::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Genres::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ── Create movies table ──
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movies::Title).string().not_null())
                    .col(ColumnDef::new(Movies::Overview).text().not_null())
                    .col(ColumnDef::new(Movies::Rating).float().not_null())
                    .col(ColumnDef::new(Movies::AgeRating).string().not_null())
                    .col(ColumnDef::new(Movies::GenreId).integer().not_null())
                    .col(ColumnDef::new(Movies::ReleaseDate).date().not_null())
                    .col(ColumnDef::new(Movies::Runtime).integer().not_null())
                    .col(ColumnDef::new(Movies::Casters).string().not_null())
                    .col(ColumnDef::new(Movies::Director).string().not_null())
                    .col(ColumnDef::new(Movies::Writer).string().not_null())
                    .col(
                        ColumnDef::new(Movies::IsPremium)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Movies::PosterUrl).text().not_null())
                    .col(ColumnDef::new(Movies::TrailerUrl).text().not_null())
                    .col(ColumnDef::new(Movies::VideoUrl).text().not_null())
                    .col(ColumnDef::new(Movies::DeletedAt).timestamp().null())
                    .col(ColumnDef::new(Movies::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Movies::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_genre_id")
                            .from(Movies::Table, Movies::GenreId)
                            .to(Genres::Table, Genres::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genres::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Genres {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Movies {
    Table,
    Id,
    Title,
    Overview,
    Rating,
    AgeRating,
    GenreId,
    ReleaseDate,
    Runtime,
    Casters,
    Director,
    Writer,
    IsPremium,
    PosterUrl,
    TrailerUrl,
    VideoUrl,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}
