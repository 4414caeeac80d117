use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CastStore, MovieStore, StoreResult};
use crate::models::{
    CastMember, CastQuery, LanguageCode, Movie, MovieId, MoviePatch, TranslatedFields,
};

/// Process-local store with the same contract as [`super::SqlStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    movies: RwLock<BTreeMap<MovieId, Movie>>,
    cast: RwLock<BTreeMap<(MovieId, String), CastMember>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn get(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        Ok(self.movies.read().await.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.movies.read().await.values().cloned().collect())
    }

    async fn put(&self, movie: &Movie) -> StoreResult<()> {
        self.movies.write().await.insert(movie.id, movie.clone());
        Ok(())
    }

    async fn update(&self, id: MovieId, patch: &MoviePatch) -> StoreResult<()> {
        if let Some(movie) = self.movies.write().await.get_mut(&id) {
            movie.apply(patch);
        }
        Ok(())
    }

    async fn delete(&self, id: MovieId) -> StoreResult<()> {
        self.movies.write().await.remove(&id);
        Ok(())
    }

    async fn merge_translation(
        &self,
        id: MovieId,
        language: &LanguageCode,
        fields: &TranslatedFields,
    ) -> StoreResult<()> {
        if let Some(movie) = self.movies.write().await.get_mut(&id) {
            movie
                .translations
                .get_or_insert_with(BTreeMap::new)
                .insert(language.clone(), fields.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl CastStore for MemoryStore {
    async fn query(&self, movie_id: MovieId, filter: &CastQuery) -> StoreResult<Vec<CastMember>> {
        let cast = self.cast.read().await;
        let rows = cast
            .values()
            .filter(|m| m.movie_id == movie_id)
            .filter(|m| filter.actor_name.as_deref().is_none_or(|p| m.actor_name.starts_with(p)))
            .filter(|m| filter.role_name.as_deref().is_none_or(|p| m.role_name.starts_with(p)))
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn put_member(&self, member: &CastMember) -> StoreResult<()> {
        let key = (member.movie_id, member.actor_name.clone());
        self.cast.write().await.insert(key, member.clone());
        Ok(())
    }
}
