use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use models::{db::DbGateway, song};

use crate::errors::ServiceError;
use crate::songs::domain::{NewSong, Song, SongChanges};
use crate::songs::repository::SongRepository;

/// SeaORM-backed repository reading the connection from the gateway on
/// every call, so a disconnect is observed immediately.
pub struct SeaOrmSongRepository {
    gateway: Arc<DbGateway>,
}

impl SeaOrmSongRepository {
    pub fn new(gateway: Arc<DbGateway>) -> Self {
        Self { gateway }
    }

    fn db(&self) -> Result<Arc<DatabaseConnection>, ServiceError> {
        self.gateway.handle().ok_or(ServiceError::StoreUnavailable)
    }
}

#[async_trait::async_trait]
impl SongRepository for SeaOrmSongRepository {
    fn is_available(&self) -> bool {
        self.gateway.is_connected()
    }

    async fn list(&self) -> Result<Vec<Song>, ServiceError> {
        let db = self.db()?;
        song::Entity::find().all(&*db).await.map_err(ServiceError::from_db)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>, ServiceError> {
        let db = self.db()?;
        song::Entity::find_by_id(id).one(&*db).await.map_err(ServiceError::from_db)
    }

    async fn find_by_name(&self, name: &str, excluding: Option<Uuid>) -> Result<Option<Song>, ServiceError> {
        let db = self.db()?;
        let mut query = song::Entity::find().filter(song::Column::Name.eq(name));
        if let Some(id) = excluding {
            query = query.filter(song::Column::Id.ne(id));
        }
        query.one(&*db).await.map_err(ServiceError::from_db)
    }

    async fn insert(&self, new: NewSong) -> Result<Uuid, ServiceError> {
        let db = self.db()?;
        let id = Uuid::new_v4();
        let am = song::ActiveModel {
            id: Set(id),
            name: Set(new.name),
            path: Set(new.path),
            plays: Set(new.plays),
            created_at: Set(new.created_at),
            updated_at: Set(new.updated_at),
        };
        song::Entity::insert(am).exec(&*db).await.map_err(ServiceError::from_db)?;
        Ok(id)
    }

    async fn update(&self, id: Uuid, changes: SongChanges) -> Result<u64, ServiceError> {
        let db = self.db()?;
        let mut am = <song::ActiveModel as ActiveModelTrait>::default();
        if let Some(name) = changes.name { am.name = Set(name); }
        if let Some(path) = changes.path { am.path = Set(path); }
        if let Some(plays) = changes.plays { am.plays = Set(plays); }
        am.updated_at = Set(changes.updated_at);
        let res = song::Entity::update_many()
            .set(am)
            .filter(song::Column::Id.eq(id))
            .exec(&*db)
            .await
            .map_err(ServiceError::from_db)?;
        Ok(res.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, ServiceError> {
        let db = self.db()?;
        let res = song::Entity::delete_by_id(id).exec(&*db).await.map_err(ServiceError::from_db)?;
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::test_support::connected_gateway;

    fn new_song(name: &str, plays: i64) -> NewSong {
        let now = chrono::Utc::now().into();
        NewSong { name: name.into(), path: "/music/a.mp3".into(), plays, created_at: now, updated_at: now }
    }

    #[tokio::test]
    async fn insert_find_update_delete() -> Result<(), anyhow::Error> {
        let repo = SeaOrmSongRepository::new(connected_gateway().await?);

        let id = repo.insert(new_song("Waltz", 3)).await?;
        let found = repo.find_by_id(id).await?.expect("inserted row");
        assert_eq!(found.name, "Waltz");
        assert_eq!(found.plays, 3);

        let by_name = repo.find_by_name("Waltz", None).await?;
        assert_eq!(by_name.map(|s| s.id), Some(id));
        assert!(repo.find_by_name("Waltz", Some(id)).await?.is_none());
        assert!(repo.find_by_name("waltz", None).await?.is_none());

        let changes = SongChanges { name: None, path: None, plays: Some(9), updated_at: chrono::Utc::now().into() };
        assert_eq!(repo.update(id, changes).await?, 1);
        let updated = repo.find_by_id(id).await?.expect("updated row");
        assert_eq!(updated.plays, 9);
        assert_eq!(updated.name, "Waltz");
        assert_eq!(updated.path, "/music/a.mp3");

        assert_eq!(repo.delete(id).await?, 1);
        assert_eq!(repo.delete(id).await?, 0);
        assert!(repo.find_by_id(id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unique_index_reports_duplicate_name() -> Result<(), anyhow::Error> {
        let repo = SeaOrmSongRepository::new(connected_gateway().await?);
        repo.insert(new_song("Nocturne", 0)).await?;
        let err = repo.insert(new_song("Nocturne", 0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
        Ok(())
    }

    #[tokio::test]
    async fn long_name_and_path_round_trip() -> Result<(), anyhow::Error> {
        let repo = SeaOrmSongRepository::new(connected_gateway().await?);
        let name = "n".repeat(300);
        let path = format!("/music/{}.flac", "p".repeat(2048));
        let mut song = new_song(&name, 1);
        song.path = path.clone();

        let id = repo.insert(song).await?;
        let found = repo.find_by_id(id).await?.expect("inserted row");
        assert_eq!(found.name, name);
        assert_eq!(found.path, path);
        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_row_touches_nothing() -> Result<(), anyhow::Error> {
        let repo = SeaOrmSongRepository::new(connected_gateway().await?);
        let changes = SongChanges { name: Some("x".into()), path: None, plays: None, updated_at: chrono::Utc::now().into() };
        assert_eq!(repo.update(Uuid::new_v4(), changes).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn disconnected_gateway_is_unavailable() -> Result<(), anyhow::Error> {
        let gateway = connected_gateway().await?;
        let repo = SeaOrmSongRepository::new(Arc::clone(&gateway));
        assert!(repo.is_available());

        gateway.disconnect().await?;
        assert!(!repo.is_available());
        let err = repo.list().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        Ok(())
    }
}
