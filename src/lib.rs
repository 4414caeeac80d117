pub mod cast;
pub mod config;
pub mod db;
mod entities;
pub mod error;
pub mod models;
pub mod movies;
pub mod routes;
pub mod seed;
pub mod store;
pub mod translate;
pub mod translations;

use crate::{cast::CastAggregator, movies::MovieService, translations::TranslationCache};

#[derive(Clone)]
pub struct AppState {
    pub movies: MovieService,
    pub cast: CastAggregator,
    pub translations: TranslationCache,
}
