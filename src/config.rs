use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub translate_base_url: String,
    pub translate_api_key: Option<String>,
    pub translate_rps: u32,
    pub max_concurrent_translations: usize,
    pub seed_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://moviedb.db?mode=rwc".to_string());

        let translate_base_url = std::env::var("TRANSLATE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());

        let translate_api_key =
            std::env::var("TRANSLATE_API_KEY").ok().filter(|key| !key.trim().is_empty());

        let translate_rps: u32 =
            std::env::var("TRANSLATE_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(5);

        let max_concurrent_translations: usize = std::env::var("MAX_CONCURRENT_TRANSLATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(4);

        let seed_file =
            std::env::var("SEED_FILE").ok().filter(|p| !p.is_empty()).map(PathBuf::from);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            translate_base_url,
            translate_api_key,
            translate_rps,
            max_concurrent_translations,
            seed_file,
        })
    }
}
