use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::{NotSet, Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IdenStatic, QueryFilter,
    QueryOrder, TransactionTrait,
    sea_query::{Expr, OnConflict, SimpleExpr},
};

use super::{CastStore, MovieStore, StoreError, StoreResult};
use crate::{
    entities::{movie, movie_cast, movie_translation},
    models::{
        CastMember, CastQuery, LanguageCode, Movie, MovieId, MoviePatch, TranslatedFields,
        Translations,
    },
};

/// sea-orm backed store. Translations live in their own table, one row per
/// (movie, language), so a single language can be upserted without touching
/// the others.
#[derive(Clone, Debug)]
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieStore for SqlStore {
    async fn get(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        let Some(row) = movie::Entity::find_by_id(id.get()).one(&self.db).await? else {
            return Ok(None);
        };

        let translations = movie_translation::Entity::find()
            .filter(movie_translation::Column::MovieId.eq(id.get()))
            .all(&self.db)
            .await?;

        Ok(Some(to_movie(row, translations)?))
    }

    async fn list(&self) -> StoreResult<Vec<Movie>> {
        let rows = movie::Entity::find().order_by_asc(movie::Column::Id).all(&self.db).await?;

        let mut by_movie: HashMap<i64, Vec<movie_translation::Model>> = HashMap::new();
        for t in movie_translation::Entity::find().all(&self.db).await? {
            by_movie.entry(t.movie_id).or_default().push(t);
        }

        rows.into_iter()
            .map(|row| {
                let translations = by_movie.remove(&row.id).unwrap_or_default();
                to_movie(row, translations)
            })
            .collect()
    }

    async fn put(&self, movie: &Movie) -> StoreResult<()> {
        let now = now_sec();
        let model = movie::ActiveModel {
            id: Set(movie.id.get()),
            adult: Set(movie.adult),
            backdrop_path: Set(movie.backdrop_path.clone()),
            genre_ids: Set(serde_json::to_string(&movie.genre_ids)?),
            original_language: Set(movie.original_language.clone()),
            original_title: Set(movie.original_title.clone()),
            overview: Set(movie.overview.clone()),
            popularity: Set(movie.popularity),
            poster_path: Set(movie.poster_path.clone()),
            release_date: Set(movie.release_date.clone()),
            title: Set(movie.title.clone()),
            video: Set(movie.video),
            vote_average: Set(movie.vote_average),
            vote_count: Set(movie.vote_count),
            updated_at: Set(now),
        };

        let txn = self.db.begin().await?;

        movie::Entity::insert(model)
            .on_conflict(
                OnConflict::column(movie::Column::Id)
                    .update_columns([
                        movie::Column::Adult,
                        movie::Column::BackdropPath,
                        movie::Column::GenreIds,
                        movie::Column::OriginalLanguage,
                        movie::Column::OriginalTitle,
                        movie::Column::Overview,
                        movie::Column::Popularity,
                        movie::Column::PosterPath,
                        movie::Column::ReleaseDate,
                        movie::Column::Title,
                        movie::Column::Video,
                        movie::Column::VoteAverage,
                        movie::Column::VoteCount,
                        movie::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await?;

        movie_translation::Entity::delete_many()
            .filter(movie_translation::Column::MovieId.eq(movie.id.get()))
            .exec(&txn)
            .await?;

        for (language, fields) in movie.translations.iter().flatten() {
            upsert_translation(&txn, movie.id, language, fields, now).await?;
        }

        txn.commit().await?;

        Ok(())
    }

    async fn update(&self, id: MovieId, patch: &MoviePatch) -> StoreResult<()> {
        let mut model = movie::ActiveModel {
            id: Unchanged(id.get()),
            updated_at: Set(now_sec()),
            ..Default::default()
        };

        if let Some(v) = patch.adult {
            model.adult = Set(v);
        }
        if let Some(v) = &patch.backdrop_path {
            model.backdrop_path = Set(v.clone());
        }
        if let Some(v) = &patch.genre_ids {
            model.genre_ids = Set(serde_json::to_string(v)?);
        }
        if let Some(v) = &patch.original_language {
            model.original_language = Set(v.clone());
        }
        if let Some(v) = &patch.original_title {
            model.original_title = Set(v.clone());
        }
        if let Some(v) = &patch.overview {
            model.overview = Set(v.clone());
        }
        if let Some(v) = patch.popularity {
            model.popularity = Set(v);
        }
        if let Some(v) = &patch.poster_path {
            model.poster_path = Set(v.clone());
        }
        if let Some(v) = &patch.release_date {
            model.release_date = Set(v.clone());
        }
        if let Some(v) = &patch.title {
            model.title = Set(v.clone());
        }
        if let Some(v) = patch.video {
            model.video = Set(v);
        }
        if let Some(v) = patch.vote_average {
            model.vote_average = Set(v);
        }
        if let Some(v) = patch.vote_count {
            model.vote_count = Set(v);
        }

        movie::Entity::update_many()
            .set(model)
            .filter(movie::Column::Id.eq(id.get()))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: MovieId) -> StoreResult<()> {
        let txn = self.db.begin().await?;

        movie::Entity::delete_by_id(id.get()).exec(&txn).await?;
        movie_translation::Entity::delete_many()
            .filter(movie_translation::Column::MovieId.eq(id.get()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(())
    }

    async fn merge_translation(
        &self,
        id: MovieId,
        language: &LanguageCode,
        fields: &TranslatedFields,
    ) -> StoreResult<()> {
        let txn = self.db.begin().await?;

        // Skip movies deleted since the caller read them.
        if movie::Entity::find_by_id(id.get()).one(&txn).await?.is_some() {
            upsert_translation(&txn, id, language, fields, now_sec()).await?;
        }

        txn.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl CastStore for SqlStore {
    async fn query(&self, movie_id: MovieId, filter: &CastQuery) -> StoreResult<Vec<CastMember>> {
        let mut query =
            movie_cast::Entity::find().filter(movie_cast::Column::MovieId.eq(movie_id.get()));
        if let Some(prefix) = &filter.actor_name {
            query = query.filter(has_prefix(movie_cast::Column::ActorName, prefix));
        }
        if let Some(prefix) = &filter.role_name {
            query = query.filter(has_prefix(movie_cast::Column::RoleName, prefix));
        }

        let rows = query.order_by_asc(movie_cast::Column::ActorName).all(&self.db).await?;

        rows.into_iter()
            .map(|row| {
                Ok(CastMember {
                    movie_id: MovieId::try_from(row.movie_id).map_err(StoreError::Invalid)?,
                    actor_name: row.actor_name,
                    role_name: row.role_name,
                    role_description: row.role_description,
                })
            })
            .collect()
    }

    async fn put_member(&self, member: &CastMember) -> StoreResult<()> {
        let model = movie_cast::ActiveModel {
            movie_id: Set(member.movie_id.get()),
            actor_name: Set(member.actor_name.clone()),
            role_name: Set(member.role_name.clone()),
            role_description: Set(member.role_description.clone()),
        };

        movie_cast::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([movie_cast::Column::MovieId, movie_cast::Column::ActorName])
                    .update_columns([
                        movie_cast::Column::RoleName,
                        movie_cast::Column::RoleDescription,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }
}

async fn upsert_translation<C: ConnectionTrait>(
    conn: &C,
    id: MovieId,
    language: &LanguageCode,
    fields: &TranslatedFields,
    now: i64,
) -> StoreResult<()> {
    let model = movie_translation::ActiveModel {
        id: NotSet,
        movie_id: Set(id.get()),
        language_code: Set(language.as_str().to_string()),
        fields: Set(serde_json::to_string(fields)?),
        translated_at: Set(now),
    };

    movie_translation::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                movie_translation::Column::MovieId,
                movie_translation::Column::LanguageCode,
            ])
            .update_columns([
                movie_translation::Column::Fields,
                movie_translation::Column::TranslatedAt,
            ])
            .to_owned(),
        )
        .exec(conn)
        .await?;

    Ok(())
}

/// Case-sensitive literal prefix match. `LIKE` would fold ASCII case and treat
/// `%` and `_` in the prefix as wildcards.
fn has_prefix(column: movie_cast::Column, prefix: &str) -> SimpleExpr {
    Expr::cust_with_values(
        format!("substr(\"{}\", 1, length(?)) = ?", column.as_str()),
        [prefix.to_owned(), prefix.to_owned()],
    )
}

fn to_movie(row: movie::Model, translations: Vec<movie_translation::Model>) -> StoreResult<Movie> {
    let translations = if translations.is_empty() {
        None
    } else {
        let mut map = Translations::new();
        for t in translations {
            let language = LanguageCode::try_from(t.language_code).map_err(StoreError::Invalid)?;
            map.insert(language, serde_json::from_str(&t.fields)?);
        }
        Some(map)
    };

    Ok(Movie {
        id: MovieId::try_from(row.id).map_err(StoreError::Invalid)?,
        adult: row.adult,
        backdrop_path: row.backdrop_path,
        genre_ids: serde_json::from_str(&row.genre_ids)?,
        original_language: row.original_language,
        original_title: row.original_title,
        overview: row.overview,
        popularity: row.popularity,
        poster_path: row.poster_path,
        release_date: row.release_date,
        title: row.title,
        video: row.video,
        vote_average: row.vote_average,
        vote_count: row.vote_count,
        translations,
    })
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::tests::sample_movie};

    async fn store() -> SqlStore {
        SqlStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap())
    }

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::try_from(code.to_string()).unwrap()
    }

    fn fields(title: &str) -> TranslatedFields {
        TranslatedFields::from([("title".to_string(), title.to_string())])
    }

    fn cast(movie_id: i64, actor: &str, role: &str) -> CastMember {
        CastMember {
            movie_id: MovieId::try_from(movie_id).unwrap(),
            actor_name: actor.to_string(),
            role_name: role.to_string(),
            role_description: format!("{role} in the film"),
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = store().await;
        let movie = sample_movie(11);
        store.put(&movie).await.unwrap();

        let loaded = store.get(movie.id).await.unwrap().unwrap();
        assert_eq!(loaded, movie);
        assert!(loaded.translations.is_none());

        assert!(store.get(MovieId::try_from(12).unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites_record_and_translations() {
        let store = store().await;
        let movie = sample_movie(11);
        store.put(&movie).await.unwrap();
        store.merge_translation(movie.id, &lang("fr"), &fields("La Nuit")).await.unwrap();

        let replacement = Movie { title: "Another".into(), ..sample_movie(11) };
        store.put(&replacement).await.unwrap();

        assert_eq!(store.get(movie.id).await.unwrap().unwrap(), replacement);
    }

    #[tokio::test]
    async fn update_touches_only_patched_columns() {
        let store = store().await;
        let movie = sample_movie(3);
        store.put(&movie).await.unwrap();
        store.merge_translation(movie.id, &lang("de"), &fields("Die Nacht")).await.unwrap();

        let patch =
            MoviePatch { title: Some("X".into()), genre_ids: Some(vec![18]), ..Default::default() };
        store.update(movie.id, &patch).await.unwrap();

        let loaded = store.get(movie.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "X");
        assert_eq!(loaded.genre_ids, vec![18]);
        assert_eq!(loaded.overview, movie.overview);
        assert_eq!(loaded.translation(&lang("de")), Some(&fields("Die Nacht")));
    }

    #[tokio::test]
    async fn update_and_delete_of_absent_id_are_noops() {
        let store = store().await;
        let id = MovieId::try_from(99).unwrap();
        let patch = MoviePatch { title: Some("X".into()), ..Default::default() };
        store.update(id, &patch).await.unwrap();
        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn merge_translation_keeps_other_languages() {
        let store = store().await;
        let movie = sample_movie(5);
        store.put(&movie).await.unwrap();

        let (fr_code, fr_fields) = (lang("fr"), fields("La Nuit"));
        let (de_code, de_fields) = (lang("de"), fields("Die Nacht"));
        let (fr, de) = tokio::join!(
            store.merge_translation(movie.id, &fr_code, &fr_fields),
            store.merge_translation(movie.id, &de_code, &de_fields),
        );
        fr.unwrap();
        de.unwrap();

        let translations = store.get(movie.id).await.unwrap().unwrap().translations.unwrap();
        assert_eq!(translations.len(), 2);
        assert_eq!(translations[&lang("fr")], fields("La Nuit"));
        assert_eq!(translations[&lang("de")], fields("Die Nacht"));
    }

    #[tokio::test]
    async fn merge_translation_skips_deleted_movie() {
        let store = store().await;
        let id = MovieId::try_from(8).unwrap();
        store.merge_translation(id, &lang("fr"), &fields("La Nuit")).await.unwrap();

        store.put(&sample_movie(8)).await.unwrap();
        assert!(store.get(id).await.unwrap().unwrap().translations.is_none());
    }

    #[tokio::test]
    async fn delete_removes_movie_and_its_translations_but_not_cast() {
        let store = store().await;
        let movie = sample_movie(4);
        store.put(&movie).await.unwrap();
        store.merge_translation(movie.id, &lang("fr"), &fields("La Nuit")).await.unwrap();
        store.put_member(&cast(4, "Ada Vale", "Mara")).await.unwrap();

        store.delete(movie.id).await.unwrap();

        assert!(store.get(movie.id).await.unwrap().is_none());
        assert_eq!(store.list().await.unwrap(), vec![]);
        let remaining = store.query(movie.id, &CastQuery::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[tokio::test]
    async fn list_returns_all_movies_with_their_translations() {
        let store = store().await;
        store.put(&sample_movie(2)).await.unwrap();
        store.put(&sample_movie(1)).await.unwrap();
        store
            .merge_translation(MovieId::try_from(2).unwrap(), &lang("fr"), &fields("La Nuit"))
            .await
            .unwrap();

        let movies = store.list().await.unwrap();
        assert_eq!(movies.iter().map(|m| m.id.get()).collect::<Vec<_>>(), vec![1, 2]);
        assert!(movies[0].translations.is_none());
        assert!(movies[1].translation(&lang("fr")).is_some());
    }

    #[tokio::test]
    async fn cast_query_filters_by_partition_and_prefixes() {
        let store = store().await;
        for member in [
            cast(1, "Ada Vale", "Mara"),
            cast(1, "Adam Pike", "Officer Lund"),
            cast(1, "Ben Ortiz", "Officer Ray"),
            cast(2, "Ada Vale", "Juno"),
        ] {
            store.put_member(&member).await.unwrap();
        }
        let id = MovieId::try_from(1).unwrap();

        let all = store.query(id, &CastQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|m| m.movie_id == id));

        let by_actor = CastQuery { actor_name: Some("Ada".into()), role_name: None };
        let names: Vec<_> =
            store.query(id, &by_actor).await.unwrap().into_iter().map(|m| m.actor_name).collect();
        assert_eq!(names, vec!["Ada Vale", "Adam Pike"]);

        let by_role = CastQuery { actor_name: None, role_name: Some("Officer".into()) };
        assert_eq!(store.query(id, &by_role).await.unwrap().len(), 2);
    }

    async fn actors_with_prefix(store: &SqlStore, prefix: &str) -> Vec<String> {
        let filter = CastQuery { actor_name: Some(prefix.into()), role_name: None };
        let id = MovieId::try_from(1).unwrap();
        store.query(id, &filter).await.unwrap().into_iter().map(|m| m.actor_name).collect()
    }

    #[tokio::test]
    async fn cast_prefix_is_literal_and_case_sensitive() {
        let store = store().await;
        for member in
            [cast(1, "A_b Cd", "One"), cast(1, "Axb Cd", "Two"), cast(1, "Ada Vale", "Mara")]
        {
            store.put_member(&member).await.unwrap();
        }

        assert_eq!(actors_with_prefix(&store, "ada").await, Vec::<String>::new());
        assert_eq!(actors_with_prefix(&store, "Ada").await, vec!["Ada Vale"]);
        assert_eq!(actors_with_prefix(&store, "A_b").await, vec!["A_b Cd"]);
        assert_eq!(actors_with_prefix(&store, "%").await, Vec::<String>::new());
        assert_eq!(actors_with_prefix(&store, "A%").await, Vec::<String>::new());
    }

    #[tokio::test]
    async fn cast_prefix_matches_memory_store() {
        let sql = store().await;
        let memory = crate::store::MemoryStore::new();
        for member in [cast(1, "A_b Cd", "One"), cast(1, "Axb Cd", "Two"), cast(1, "Ada Vale", "_")]
        {
            sql.put_member(&member).await.unwrap();
            memory.put_member(&member).await.unwrap();
        }
        let id = MovieId::try_from(1).unwrap();

        for prefix in ["", "A", "ada", "A_", "%", "Ax", "_"] {
            for filter in [
                CastQuery { actor_name: Some(prefix.into()), role_name: None },
                CastQuery { actor_name: None, role_name: Some(prefix.into()) },
            ] {
                let from_sql = sql.query(id, &filter).await.unwrap();
                let from_memory = memory.query(id, &filter).await.unwrap();
                assert_eq!(from_sql, from_memory, "filter {filter:?}");
            }
        }
    }
}
