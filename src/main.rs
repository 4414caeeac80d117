use std::sync::Arc;

use moviedb::{
    AppState,
    cast::CastAggregator,
    config::Config,
    db,
    movies::MovieService,
    routes,
    seed::SeedData,
    store::SqlStore,
    translate::HttpTranslator,
    translations::TranslationCache,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,moviedb=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = Arc::new(SqlStore::new(db));

    if let Some(path) = &config.seed_file {
        SeedData::from_file(path).await?.load(store.as_ref(), store.as_ref()).await?;
    }

    let translator = HttpTranslator::new(
        config.translate_base_url.clone(),
        config.translate_api_key.clone(),
        config.translate_rps,
    )?;

    let state = Arc::new(AppState {
        movies: MovieService::new(store.clone()),
        cast: CastAggregator::new(store.clone(), store.clone()),
        translations: TranslationCache::new(
            store,
            Arc::new(translator),
            config.max_concurrent_translations,
        ),
    });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
