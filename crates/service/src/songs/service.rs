use std::sync::Arc;

use chrono::Utc;
use models::song::{parse_plays, trimmed, validate_required};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{parse_id, DeletedSong, NewSong, Song, SongChanges, SongInput};
use super::repository::SongRepository;
use crate::errors::ServiceError;

/// Application service holding the song rules: field validation, name
/// uniqueness and the existence checks in front of every write.
pub struct SongService {
    repo: Arc<dyn SongRepository>,
}

impl SongService {
    pub fn new(repo: Arc<dyn SongRepository>) -> Self {
        Self { repo }
    }

    pub fn store_available(&self) -> bool {
        self.repo.is_available()
    }

    fn ensure_store(&self) -> Result<(), ServiceError> {
        if self.repo.is_available() { Ok(()) } else { Err(ServiceError::StoreUnavailable) }
    }

    async fn existing(&self, raw_id: &str) -> Result<Song, ServiceError> {
        let id = parse_id(raw_id).ok_or(ServiceError::InvalidId)?;
        self.repo.find_by_id(id).await?.ok_or(ServiceError::NotFound)
    }

    async fn ensure_unique(&self, name: &str, excluding: Option<Uuid>) -> Result<(), ServiceError> {
        match self.repo.find_by_name(name, excluding).await? {
            Some(_) => Err(ServiceError::DuplicateName),
            None => Ok(()),
        }
    }

    async fn reread(&self, id: Uuid) -> Result<Song, ServiceError> {
        self.repo.find_by_id(id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<Song>, ServiceError> {
        self.ensure_store()?;
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Song, ServiceError> {
        self.ensure_store()?;
        self.existing(id).await
    }

    /// Create a song from `name`, `path` and an optional `plays` (default 0).
    ///
    /// # Examples
    /// ```
    /// use service::songs::{domain::SongInput, repository::mock::MockSongRepository, SongService};
    /// use std::sync::Arc;
    /// let svc = SongService::new(Arc::new(MockSongRepository::default()));
    /// let input = SongInput { name: Some(" Waltz ".into()), path: Some("/music/waltz.mp3".into()), plays: None };
    /// let rt = tokio::runtime::Runtime::new().unwrap();
    /// let song = rt.block_on(svc.create(input)).unwrap();
    /// assert_eq!(song.name, "Waltz");
    /// assert_eq!(song.plays, 0);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: SongInput) -> Result<Song, ServiceError> {
        self.ensure_store()?;
        let (name, path) = validate_required(input.name.as_deref(), input.path.as_deref())
            .map_err(|_| ServiceError::MissingFields)?;
        let plays = match &input.plays {
            Some(v) => parse_plays(v).map_err(|_| ServiceError::InvalidPlays)?,
            None => 0,
        };
        self.ensure_unique(&name, None).await?;

        let now = Utc::now().fixed_offset();
        let id = self
            .repo
            .insert(NewSong { name, path, plays, created_at: now, updated_at: now })
            .await?;
        info!(song_id = %id, "song_created");
        self.reread(id).await
    }

    /// Full replacement of `name` and `path`; `plays` keeps its prior value
    /// when omitted.
    #[instrument(skip(self, input))]
    pub async fn replace(&self, id: &str, input: SongInput) -> Result<Song, ServiceError> {
        self.ensure_store()?;
        let current = self.existing(id).await?;
        let (name, path) = validate_required(input.name.as_deref(), input.path.as_deref())
            .map_err(|_| ServiceError::MissingFields)?;
        let plays = match &input.plays {
            Some(v) => parse_plays(v).map_err(|_| ServiceError::InvalidPlays)?,
            None => current.plays,
        };
        self.ensure_unique(&name, Some(current.id)).await?;

        let changes = SongChanges {
            name: Some(name),
            path: Some(path),
            plays: Some(plays),
            updated_at: Utc::now().fixed_offset(),
        };
        self.repo.update(current.id, changes).await?;
        info!(song_id = %current.id, "song_replaced");
        self.reread(current.id).await
    }

    /// Partial update. Present fields are validated in order name, path,
    /// plays; `updatedAt` is refreshed even when nothing else changes.
    #[instrument(skip(self, input))]
    pub async fn patch(&self, id: &str, input: SongInput) -> Result<Song, ServiceError> {
        self.ensure_store()?;
        let current = self.existing(id).await?;

        let name = match input.name.as_deref() {
            Some(raw) => {
                let name = trimmed(raw).ok_or(ServiceError::EmptyField("name"))?;
                self.ensure_unique(&name, Some(current.id)).await?;
                Some(name)
            }
            None => None,
        };
        let path = match input.path.as_deref() {
            Some(raw) => Some(trimmed(raw).ok_or(ServiceError::EmptyField("path"))?),
            None => None,
        };
        let plays = match &input.plays {
            Some(v) => Some(parse_plays(v).map_err(|_| ServiceError::InvalidPlays)?),
            None => None,
        };

        let changes = SongChanges { name, path, plays, updated_at: Utc::now().fixed_offset() };
        self.repo.update(current.id, changes).await?;
        info!(song_id = %current.id, "song_patched");
        self.reread(current.id).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<DeletedSong, ServiceError> {
        self.ensure_store()?;
        let current = self.existing(id).await?;
        let deleted_count = self.repo.delete(current.id).await?;
        if deleted_count == 0 {
            warn!(song_id = %current.id, "song vanished before delete");
        } else {
            info!(song_id = %current.id, "song_deleted");
        }
        Ok(DeletedSong { deleted_song: current, deleted_count })
    }
}
