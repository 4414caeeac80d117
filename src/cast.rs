use std::sync::Arc;

use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{CastMember, CastQuery, MovieId, MovieWithCast},
    store::{CastStore, MovieStore},
};

/// Joins a movie read with its cast. The two reads are independent; nothing
/// ties them to the same point in time.
#[derive(Clone)]
pub struct CastAggregator {
    movies: Arc<dyn MovieStore>,
    cast: Arc<dyn CastStore>,
}

impl CastAggregator {
    pub fn new(movies: Arc<dyn MovieStore>, cast: Arc<dyn CastStore>) -> Self {
        Self { movies, cast }
    }

    pub async fn get_movie_with_cast(
        &self,
        movie_id: MovieId,
        include_cast: bool,
    ) -> AppResult<MovieWithCast> {
        let movie = self.movies.get(movie_id).await?.ok_or(AppError::NotFound(movie_id))?;

        let cast = if include_cast {
            let members = self.cast.query(movie_id, &CastQuery::default()).await?;
            debug!(movie_id = %movie_id, members = members.len(), "loaded cast");
            Some(members)
        } else {
            None
        };

        Ok(MovieWithCast { movie, cast })
    }

    /// Cast listing for a movie id; an unknown movie simply has no cast.
    pub async fn list_cast(
        &self,
        movie_id: MovieId,
        filter: &CastQuery,
    ) -> AppResult<Vec<CastMember>> {
        Ok(self.cast.query(movie_id, filter).await?)
    }
}
