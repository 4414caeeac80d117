use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{DeleteMovie, EditMovie, Movie, MovieId, NewMovie},
    store::MovieStore,
};

/// CRUD over the Movies collection. Inputs arrive as raw JSON and are
/// validated into typed requests before any store call.
#[derive(Clone)]
pub struct MovieService {
    store: Arc<dyn MovieStore>,
}

impl MovieService {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self { store }
    }

    pub async fn get_movie(&self, id: MovieId) -> AppResult<Movie> {
        self.store.get(id).await?.ok_or(AppError::NotFound(id))
    }

    pub async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        Ok(self.store.list().await?)
    }

    pub async fn add_movie(&self, candidate: Value) -> AppResult<Movie> {
        let movie = NewMovie::from_value(candidate)?.into_inner();
        debug!(movie_id = %movie.id, "adding movie");
        self.store.put(&movie).await?;
        Ok(movie)
    }

    pub async fn edit_movie(&self, request: Value) -> AppResult<Movie> {
        let EditMovie { id, patch } = EditMovie::from_value(request)?;

        if self.store.get(id).await?.is_none() {
            return Err(AppError::NotFound(id));
        }

        if !patch.is_empty() {
            debug!(movie_id = %id, "editing movie");
            self.store.update(id, &patch).await?;
        }

        // A concurrent delete between the update and this read surfaces as NotFound.
        self.get_movie(id).await
    }

    /// Deleting an absent id succeeds; cast members are left in place.
    pub async fn delete_movie(&self, request: Value) -> AppResult<()> {
        let DeleteMovie { id } = DeleteMovie::from_value(request)?;
        debug!(movie_id = %id, "deleting movie");
        self.store.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use serde_json::json;

    use super::*;
    use crate::{
        models::tests::{movie_json, sample_movie},
        store::{MemoryStore, MockMovieStore, StoreError},
    };

    fn service() -> MovieService {
        MovieService::new(Arc::new(MemoryStore::new()))
    }

    fn id(n: i64) -> MovieId {
        MovieId::try_from(n).unwrap()
    }

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let svc = service();
        let created = svc.add_movie(movie_json(10)).await.unwrap();
        assert_eq!(created, sample_movie(10));

        let loaded = svc.get_movie(id(10)).await.unwrap();
        assert_eq!(loaded.id, id(10));
        assert_eq!(loaded, created);
        assert!(loaded.translations.is_none());
    }

    #[tokio::test]
    async fn add_overwrites_existing_record() {
        let svc = service();
        svc.add_movie(movie_json(10)).await.unwrap();

        let mut body = movie_json(10);
        body["title"] = json!("Remastered");
        svc.add_movie(body).await.unwrap();

        assert_eq!(svc.get_movie(id(10)).await.unwrap().title, "Remastered");
        assert_eq!(svc.list_movies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_candidate_never_reaches_the_store() {
        let svc = MovieService::new(Arc::new(MockMovieStore::new()));
        let mut body = movie_json(10);
        body["popularity"] = json!("high");

        assert!(matches!(svc.add_movie(body).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn add_rejects_unknown_fields_instead_of_dropping_them() {
        let svc = service();
        let mut body = movie_json(10);
        body["director"] = json!("Someone");

        assert!(matches!(svc.add_movie(body).await, Err(AppError::Validation(_))));
        assert!(matches!(svc.get_movie(id(10)).await, Err(AppError::NotFound(_))));

        let created = svc.add_movie(movie_json(10)).await.unwrap();
        assert_eq!(serde_json::to_value(&created).unwrap(), movie_json(10));
    }

    #[tokio::test]
    async fn absent_ids_are_not_found() {
        let svc = service();
        assert!(matches!(svc.get_movie(id(404)).await, Err(AppError::NotFound(i)) if i == id(404)));
        assert!(matches!(
            svc.edit_movie(json!({ "id": 404, "title": "X" })).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn edit_changes_only_the_given_field() {
        let store = Arc::new(MemoryStore::new());
        let fr = crate::models::LanguageCode::try_from("fr".to_string()).unwrap();
        let fields = crate::models::TranslatedFields::from([("title".into(), "La Nuit".into())]);
        let original = sample_movie(5).with_translation(fr, fields);
        store.put(&original).await.unwrap();

        let svc = MovieService::new(store);
        let edited = svc.edit_movie(json!({ "id": 5, "title": "X" })).await.unwrap();

        assert_eq!(edited.title, "X");
        assert_eq!(Movie { title: original.title.clone(), ..edited.clone() }, original);
        assert_eq!(svc.get_movie(id(5)).await.unwrap(), edited);
    }

    #[tokio::test]
    async fn empty_patch_skips_the_update() {
        let mut store = MockMovieStore::new();
        store.expect_get().with(eq(id(5))).times(2).returning(|_| Ok(Some(sample_movie(5))));
        store.expect_update().never();

        let svc = MovieService::new(Arc::new(store));
        assert_eq!(svc.edit_movie(json!({ "id": 5 })).await.unwrap(), sample_movie(5));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let svc = service();
        svc.add_movie(movie_json(3)).await.unwrap();
        svc.delete_movie(json!({ "id": 3 })).await.unwrap();

        assert!(matches!(svc.get_movie(id(3)).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent_but_requires_an_id() {
        let svc = service();
        svc.delete_movie(json!({ "id": 77 })).await.unwrap();
        svc.delete_movie(json!({ "id": 77 })).await.unwrap();

        assert!(matches!(svc.delete_movie(json!({})).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let mut store = MockMovieStore::new();
        store
            .expect_list()
            .returning(|| Err(StoreError::Invalid("bad row".into())));

        let svc = MovieService::new(Arc::new(store));
        let err = svc.list_movies().await.unwrap_err();
        assert_eq!(err.classification(), crate::error::Classification::ServerError);
    }
}
