use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    models::{CastMember, Movie},
    store::{CastStore, MovieStore},
};

/// Initial catalog: `{ "movies": [...], "cast": [...] }`.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

impl SeedData {
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading seed file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing seed file {}", path.display()))
    }

    /// Inserts movies that are not stored yet and upserts cast members.
    /// Existing movies are left alone so restarts keep their cached
    /// translations and any edits made through the API.
    pub async fn load(
        &self,
        movies: &dyn MovieStore,
        cast: &dyn CastStore,
    ) -> anyhow::Result<()> {
        let mut inserted = 0;
        for movie in &self.movies {
            let existing = movies
                .get(movie.id)
                .await
                .with_context(|| format!("checking seed movie {}", movie.id))?;
            if existing.is_some() {
                debug!(movie_id = %movie.id, "seed movie already stored");
                continue;
            }
            movies.put(movie).await.with_context(|| format!("seeding movie {}", movie.id))?;
            inserted += 1;
        }
        for member in &self.cast {
            cast.put_member(member)
                .await
                .with_context(|| format!("seeding cast member {}", member.actor_name))?;
        }
        info!(movies = inserted, cast = self.cast.len(), "seeded catalog");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        db,
        models::{
            CastQuery, LanguageCode, MovieId, MoviePatch, TranslatedFields, tests::movie_json,
        },
        store::{MemoryStore, SqlStore},
    };

    #[tokio::test]
    async fn loads_movies_and_cast() {
        let seed: SeedData = serde_json::from_value(json!({
            "movies": [movie_json(1), movie_json(2)],
            "cast": [
                {
                    "movieId": 1,
                    "actorName": "Ada Vale",
                    "roleName": "Mara",
                    "roleDescription": "Engineer"
                }
            ]
        }))
        .unwrap();

        let store = MemoryStore::new();
        seed.load(&store, &store).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 2);
        let id = MovieId::try_from(1).unwrap();
        assert_eq!(store.query(id, &CastQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reseeding_keeps_cached_translations_and_edits() {
        let seed: SeedData =
            serde_json::from_value(json!({ "movies": [movie_json(1)], "cast": [] })).unwrap();
        let store = SqlStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap());
        seed.load(&store, &store).await.unwrap();

        let id = MovieId::try_from(1).unwrap();
        let fr = LanguageCode::try_from("fr".to_string()).unwrap();
        let fields = TranslatedFields::from([("title".into(), "La Longue Nuit".into())]);
        store.merge_translation(id, &fr, &fields).await.unwrap();
        let patch = MoviePatch { title: Some("Edited".into()), ..Default::default() };
        store.update(id, &patch).await.unwrap();

        seed.load(&store, &store).await.unwrap();

        let movie = store.get(id).await.unwrap().unwrap();
        assert_eq!(movie.translation(&fr), Some(&fields));
        assert_eq!(movie.title, "Edited");
    }

    #[tokio::test]
    async fn bundled_seed_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("seed/movies.json");
        let seed = SeedData::from_file(&path).await.unwrap();
        assert!(!seed.movies.is_empty());
        assert!(seed.cast.iter().all(|m| seed.movies.iter().any(|movie| movie.id == m.movie_id)));
    }
}
