//! Service layer holding the song domain rules on top of `models`.
//! - Validation, name uniqueness and CRUD flow live here, not in handlers.
//! - Persistence is reached only through the `SongRepository` seam.
//! - Failures carry an explicit `ErrorKind` for callers to switch on.

pub mod errors;
pub mod songs;
#[cfg(test)]
pub mod test_support;
