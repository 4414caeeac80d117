//! Per-language translation cache stored inside the movie record.
//!
//! For a given (movie, language) the entry is either absent, being computed
//! by an in-flight request, or cached. Nothing tracks the in-flight
//! state: two requests for the same uncached language both call the provider,
//! and the later write wins for that one key.
//!
//! Writes go through [`MovieStore::merge_translation`], which replaces only
//! `translations[language]`. Writing the whole mapping back from the snapshot
//! read at the start of the request would drop languages cached concurrently
//! by other requests.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::{LanguageCode, Movie, MovieId, TranslatedFields},
    store::MovieStore,
    translate::{AUTO_DETECT, TranslationError, Translator},
};

#[derive(Clone)]
pub struct TranslationCache {
    store: Arc<dyn MovieStore>,
    translator: Arc<dyn Translator>,
    max_concurrent: usize,
}

impl TranslationCache {
    pub fn new(
        store: Arc<dyn MovieStore>,
        translator: Arc<dyn Translator>,
        max_concurrent: usize,
    ) -> Self {
        Self { store, translator, max_concurrent }
    }

    /// Returns the movie with `translations[language]` filled in, calling the
    /// provider only when that language is not cached yet.
    pub async fn translate(&self, movie_id: MovieId, language: Option<&str>) -> AppResult<Movie> {
        let language = LanguageCode::from_param(language)?;

        let movie = self.store.get(movie_id).await?.ok_or(AppError::NotFound(movie_id))?;

        if movie.translation(&language).is_some() {
            debug!(movie_id = %movie_id, language = %language, "translation cache hit");
            return Ok(movie);
        }

        debug!(movie_id = %movie_id, language = %language, "translation cache miss");
        let fields = self.translate_fields(&movie, &language).await?;

        self.store.merge_translation(movie_id, &language, &fields).await?;
        info!(
            movie_id = %movie_id,
            language = %language,
            fields = fields.len(),
            "cached translation"
        );

        Ok(movie.with_translation(language, fields))
    }

    /// One provider call per text field; the first failure discards the rest.
    async fn translate_fields(
        &self,
        movie: &Movie,
        language: &LanguageCode,
    ) -> Result<TranslatedFields, TranslationError> {
        let translator = &self.translator;
        let texts = movie.text_fields().map(|(name, text)| (name, text.to_owned()));

        stream::iter(texts)
            .map(|(name, text)| async move {
                let translated = translator.translate(&text, language, AUTO_DETECT).await?;
                Ok::<_, TranslationError>((name.to_string(), translated))
            })
            .buffered(self.max_concurrent.max(1))
            .try_collect()
            .await
    }
}
