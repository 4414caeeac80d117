use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64")]
pub struct MovieId(i64);

impl MovieId {
    pub fn get(self) -> i64 {
        self.0
    }

    /// Parses an id from a path segment or query value.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AppError::validation("missing movie id"));
        }
        let n: i64 =
            raw.parse().map_err(|_| AppError::validation(format!("invalid movie id: {raw}")))?;
        Self::try_from(n).map_err(AppError::Validation)
    }
}

impl TryFrom<i64> for MovieId {
    type Error = String;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        if n <= 0 {
            return Err(format!("movie id must be a positive integer, got {n}"));
        }
        Ok(Self(n))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Target language of a translation, e.g. `fr` or `zh-TW`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    const MAX_LEN: usize = 16;

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validates an optional request parameter; absence is a validation error.
    pub fn from_param(raw: Option<&str>) -> AppResult<Self> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty());
        let Some(raw) = raw else {
            return Err(AppError::validation("language is required"));
        };
        Self::try_from(raw.to_string()).map_err(AppError::Validation)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let valid = !raw.is_empty()
            && raw.len() <= Self::MAX_LEN
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(format!("invalid language code: {raw:?}"));
        }
        Ok(Self(raw))
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Translated copy of a movie's text fields, keyed by field name.
pub type TranslatedFields = BTreeMap<String, String>;

pub type Translations = BTreeMap<LanguageCode, TranslatedFields>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Movie {
    pub id: MovieId,
    pub adult: bool,
    pub backdrop_path: String,
    pub genre_ids: Vec<i32>,
    pub original_language: String,
    pub original_title: String,
    pub overview: String,
    pub popularity: f64,
    pub poster_path: String,
    pub release_date: String,
    pub title: String,
    pub video: bool,
    pub vote_average: f64,
    pub vote_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Translations>,
}

impl Movie {
    /// Every string-valued field that gets machine translated.
    pub fn text_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("backdrop_path", &self.backdrop_path),
            ("original_language", &self.original_language),
            ("original_title", &self.original_title),
            ("overview", &self.overview),
            ("poster_path", &self.poster_path),
            ("release_date", &self.release_date),
            ("title", &self.title),
        ]
    }

    pub fn translation(&self, language: &LanguageCode) -> Option<&TranslatedFields> {
        self.translations.as_ref().and_then(|t| t.get(language))
    }

    pub fn with_translation(mut self, language: LanguageCode, fields: TranslatedFields) -> Self {
        self.translations.get_or_insert_with(BTreeMap::new).insert(language, fields);
        self
    }

    pub fn apply(&mut self, patch: &MoviePatch) {
        if let Some(v) = patch.adult {
            self.adult = v;
        }
        if let Some(v) = &patch.backdrop_path {
            self.backdrop_path.clone_from(v);
        }
        if let Some(v) = &patch.genre_ids {
            self.genre_ids.clone_from(v);
        }
        if let Some(v) = &patch.original_language {
            self.original_language.clone_from(v);
        }
        if let Some(v) = &patch.original_title {
            self.original_title.clone_from(v);
        }
        if let Some(v) = &patch.overview {
            self.overview.clone_from(v);
        }
        if let Some(v) = patch.popularity {
            self.popularity = v;
        }
        if let Some(v) = &patch.poster_path {
            self.poster_path.clone_from(v);
        }
        if let Some(v) = &patch.release_date {
            self.release_date.clone_from(v);
        }
        if let Some(v) = &patch.title {
            self.title.clone_from(v);
        }
        if let Some(v) = patch.video {
            self.video = v;
        }
        if let Some(v) = patch.vote_average {
            self.vote_average = v;
        }
        if let Some(v) = patch.vote_count {
            self.vote_count = v;
        }
    }
}

/// A create request that passed schema validation.
#[derive(Clone, Debug, PartialEq)]
pub struct NewMovie(Movie);

impl NewMovie {
    pub fn from_value(value: Value) -> AppResult<Self> {
        if !value.is_object() {
            return Err(AppError::validation("movie must be a JSON object"));
        }
        let movie: Movie = serde_json::from_value(value)
            .map_err(|e| AppError::validation(format!("invalid movie: {e}")))?;
        if movie.translations.is_some() {
            return Err(AppError::validation("translations cannot be supplied on create"));
        }
        Ok(Self(movie))
    }

    pub fn into_inner(self) -> Movie {
        self.0
    }
}

/// Field-level overwrite; `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoviePatch {
    pub adult: Option<bool>,
    pub backdrop_path: Option<String>,
    pub genre_ids: Option<Vec<i32>>,
    pub original_language: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub popularity: Option<f64>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub title: Option<String>,
    pub video: Option<bool>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
}

impl MoviePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditMovie {
    pub id: MovieId,
    pub patch: MoviePatch,
}

impl EditMovie {
    /// Accepts `{ id, ...patchFields }`.
    pub fn from_value(value: Value) -> AppResult<Self> {
        let mut body = into_object(value)?;
        let id = take_id(&mut body)?;
        let patch = serde_json::from_value(Value::Object(body))
            .map_err(|e| AppError::validation(format!("invalid movie patch: {e}")))?;
        Ok(Self { id, patch })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeleteMovie {
    pub id: MovieId,
}

impl DeleteMovie {
    pub fn from_value(value: Value) -> AppResult<Self> {
        let mut body = into_object(value)?;
        Ok(Self { id: take_id(&mut body)? })
    }
}

fn into_object(value: Value) -> AppResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Err(AppError::validation("missing request body")),
        _ => Err(AppError::validation("request body must be a JSON object")),
    }
}

fn take_id(body: &mut Map<String, Value>) -> AppResult<MovieId> {
    match body.remove("id") {
        None | Some(Value::Null) => Err(AppError::validation("missing movie id")),
        Some(raw) => serde_json::from_value(raw)
            .map_err(|e| AppError::validation(format!("invalid movie id: {e}"))),
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub movie_id: MovieId,
    pub actor_name: String,
    pub role_name: String,
    pub role_description: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CastQuery {
    pub actor_name: Option<String>,
    pub role_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieWithCast {
    #[serde(rename = "data")]
    pub movie: Movie,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<CastMember>>,
}
