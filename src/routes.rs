use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{CastMember, CastQuery, Movie, MovieId, MovieWithCast},
};

#[derive(Debug, Serialize)]
pub struct Data<T> {
    data: T,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/movies", get(list_movies).post(add_movie).put(edit_movie).delete(delete_movie))
        .route("/movies/{movie_id}", get(get_movie))
        .route("/movies/{movie_id}/cast", get(list_cast))
        .route("/movies/{movie_id}/translation", get(translate_movie))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Data<Vec<Movie>>>> {
    let data = state.movies.list_movies().await?;
    Ok(Json(Data { data }))
}

pub async fn add_movie(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Data<Movie>>)> {
    let data = state.movies.add_movie(parse_body(&body)?).await?;
    Ok((StatusCode::CREATED, Json(Data { data })))
}

pub async fn edit_movie(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<Data<Movie>>> {
    let data = state.movies.edit_movie(parse_body(&body)?).await?;
    Ok(Json(Data { data }))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    state.movies.delete_movie(parse_body(&body)?).await?;
    Ok(Json(json!({ "message": "Movie deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct GetMovieQuery {
    cast: Option<String>,
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    Query(q): Query<GetMovieQuery>,
) -> AppResult<Json<MovieWithCast>> {
    let movie_id = MovieId::parse(&movie_id)?;
    let include_cast = q.cast.as_deref() == Some("true");
    Ok(Json(state.cast.get_movie_with_cast(movie_id, include_cast).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastListQuery {
    actor_name: Option<String>,
    role_name: Option<String>,
}

pub async fn list_cast(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    Query(q): Query<CastListQuery>,
) -> AppResult<Json<Data<Vec<CastMember>>>> {
    let movie_id = MovieId::parse(&movie_id)?;
    let filter = CastQuery {
        actor_name: q.actor_name.filter(|s| !s.is_empty()),
        role_name: q.role_name.filter(|s| !s.is_empty()),
    };
    let data = state.cast.list_cast(movie_id, &filter).await?;
    Ok(Json(Data { data }))
}

#[derive(Debug, Deserialize)]
pub struct TranslateQuery {
    language: Option<String>,
}

pub async fn translate_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
    Query(q): Query<TranslateQuery>,
) -> AppResult<Json<Data<Movie>>> {
    let movie_id = MovieId::parse(&movie_id)?;
    let data = state.translations.translate(movie_id, q.language.as_deref()).await?;
    Ok(Json(Data { data }))
}

fn parse_body(body: &Bytes) -> AppResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("invalid JSON body: {e}")))
}
