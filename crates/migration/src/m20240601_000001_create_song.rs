//! Create `song` table.
//!
//! Names are unique; the index backs both the duplicate lookup and the
//! constraint that catches racing writers.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(song_table()).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_song_name_unique")
                    .table(Song::Table)
                    .col(Song::Name)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Song::Table).to_owned()).await
    }
}

/// Name and path are unbounded `text`; `plays` can never go negative.
fn song_table() -> TableCreateStatement {
    Table::create()
        .table(Song::Table)
        .if_not_exists()
        .col(uuid(Song::Id).primary_key())
        .col(text(Song::Name))
        .col(text(Song::Path))
        .col(big_integer(Song::Plays).default(0).check(Expr::col(Song::Plays).gte(0)))
        .col(timestamp_with_time_zone(Song::CreatedAt))
        .col(timestamp_with_time_zone(Song::UpdatedAt))
        .to_owned()
}

#[derive(DeriveIden)]
enum Song {
    Table,
    Id,
    Name,
    Path,
    Plays,
    CreatedAt,
    UpdatedAt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_columns_have_no_length_cap() {
        let sql = song_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#""name" text NOT NULL"#), "{sql}");
        assert!(sql.contains(r#""path" text NOT NULL"#), "{sql}");
        assert!(!sql.contains("varchar"), "{sql}");
    }
}
