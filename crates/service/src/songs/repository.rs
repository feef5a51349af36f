use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{NewSong, Song, SongChanges};
use crate::errors::ServiceError;

/// Repository abstraction over the song collection.
///
/// Each method is a single store operation; no method combines a check
/// with a write.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Whether the underlying store handle is currently published.
    fn is_available(&self) -> bool;

    async fn list(&self) -> Result<Vec<Song>, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>, ServiceError>;
    /// Exact, case-sensitive lookup, optionally skipping one id.
    async fn find_by_name(&self, name: &str, excluding: Option<Uuid>) -> Result<Option<Song>, ServiceError>;
    /// Insert and return the store-assigned id.
    async fn insert(&self, song: NewSong) -> Result<Uuid, ServiceError>;
    /// Apply changes; returns the number of rows touched.
    async fn update(&self, id: Uuid, changes: SongChanges) -> Result<u64, ServiceError>;
    /// Hard delete; returns the number of rows removed.
    async fn delete(&self, id: Uuid) -> Result<u64, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Mutex, MutexGuard};

    pub struct MockSongRepository {
        songs: Mutex<Vec<Song>>, // insertion order
        available: AtomicBool,
    }

    impl Default for MockSongRepository {
        fn default() -> Self {
            Self { songs: Mutex::new(Vec::new()), available: AtomicBool::new(true) }
        }
    }

    impl MockSongRepository {
        /// Simulate the store handle appearing or going away.
        pub fn set_available(&self, available: bool) {
            self.available.store(available, Ordering::SeqCst);
        }

        /// Remove a row behind the service's back.
        pub fn remove_raw(&self, id: Uuid) -> bool {
            match self.songs.lock() {
                Ok(mut songs) => {
                    let before = songs.len();
                    songs.retain(|s| s.id != id);
                    songs.len() != before
                }
                Err(_) => false,
            }
        }

        fn rows(&self) -> Result<MutexGuard<'_, Vec<Song>>, ServiceError> {
            if !self.is_available() {
                return Err(ServiceError::StoreUnavailable);
            }
            self.songs.lock().map_err(|_| ServiceError::Db("mock store poisoned".into()))
        }
    }

    #[async_trait]
    impl SongRepository for MockSongRepository {
        fn is_available(&self) -> bool {
            self.available.load(Ordering::SeqCst)
        }

        async fn list(&self) -> Result<Vec<Song>, ServiceError> {
            Ok(self.rows()?.clone())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>, ServiceError> {
            Ok(self.rows()?.iter().find(|s| s.id == id).cloned())
        }

        async fn find_by_name(&self, name: &str, excluding: Option<Uuid>) -> Result<Option<Song>, ServiceError> {
            Ok(self
                .rows()?
                .iter()
                .find(|s| s.name == name && Some(s.id) != excluding)
                .cloned())
        }

        async fn insert(&self, song: NewSong) -> Result<Uuid, ServiceError> {
            let mut songs = self.rows()?;
            // mirrors the unique index on name
            if songs.iter().any(|s| s.name == song.name) {
                return Err(ServiceError::DuplicateName);
            }
            let id = Uuid::new_v4();
            songs.push(Song {
                id,
                name: song.name,
                path: song.path,
                plays: song.plays,
                created_at: song.created_at,
                updated_at: song.updated_at,
            });
            Ok(id)
        }

        async fn update(&self, id: Uuid, changes: SongChanges) -> Result<u64, ServiceError> {
            let mut songs = self.rows()?;
            if let Some(name) = &changes.name {
                if songs.iter().any(|s| &s.name == name && s.id != id) {
                    return Err(ServiceError::DuplicateName);
                }
            }
            let Some(song) = songs.iter_mut().find(|s| s.id == id) else {
                return Ok(0);
            };
            if let Some(name) = changes.name { song.name = name; }
            if let Some(path) = changes.path { song.path = path; }
            if let Some(plays) = changes.plays { song.plays = plays; }
            song.updated_at = changes.updated_at;
            Ok(1)
        }

        async fn delete(&self, id: Uuid) -> Result<u64, ServiceError> {
            let mut songs = self.rows()?;
            let before = songs.len();
            songs.retain(|s| s.id != id);
            Ok((before - songs.len()) as u64)
        }
    }
}
