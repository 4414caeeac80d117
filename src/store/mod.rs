//! Record store seams for the Movies and CastMembers collections.
//!
//! Every method is one remote round trip; none of them is atomic with respect
//! to another call. `merge_translation` is the only operation that touches a
//! nested key, and it must do so without reading the rest of the mapping.

use async_trait::async_trait;

use crate::models::{
    CastMember, CastQuery, LanguageCode, Movie, MovieId, MoviePatch, TranslatedFields,
};

mod memory;
mod sql;

pub use memory::MemoryStore;
pub use sql::SqlStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("corrupt stored record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt stored record: {0}")]
    Invalid(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn get(&self, id: MovieId) -> StoreResult<Option<Movie>>;

    async fn list(&self) -> StoreResult<Vec<Movie>>;

    /// Full overwrite, including the `translations` mapping.
    async fn put(&self, movie: &Movie) -> StoreResult<()>;

    /// Overwrites the named top-level fields; `translations` is never touched.
    /// Updating an absent id is a no-op.
    async fn update(&self, id: MovieId, patch: &MoviePatch) -> StoreResult<()>;

    async fn delete(&self, id: MovieId) -> StoreResult<()>;

    /// Sets `translations[language]` alone, leaving other languages intact.
    async fn merge_translation(
        &self,
        id: MovieId,
        language: &LanguageCode,
        fields: &TranslatedFields,
    ) -> StoreResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CastStore: Send + Sync {
    /// Range query on the movie partition. `filter.actor_name` is a prefix on
    /// the sort key, `filter.role_name` a prefix on the role index.
    async fn query(&self, movie_id: MovieId, filter: &CastQuery) -> StoreResult<Vec<CastMember>>;

    async fn put_member(&self, member: &CastMember) -> StoreResult<()>;
}
