//! Migrator for the song store. Applied by the persistence gateway on every
//! connect, so a fresh database gets its table and name index at startup.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_song;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240601_000001_create_song::Migration)]
    }
}
