use std::sync::Arc;

use footprint_backend::{
    AppState,
    cache::{DistanceCache, FileCacheStore, SystemClock},
    config::AppConfig,
    create_router,
    database::TripDatabase,
    distance::DistanceService,
    emissions::EmissionsConfig,
    error::FootprintError,
    geocoder::{GeocoderAdapter, NominatimBackend},
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), FootprintError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "footprint_backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let emissions = match &config.emissions_config_path {
        Some(path) => EmissionsConfig::from_path(path)?,
        None => EmissionsConfig::default(),
    };

    let store = FileCacheStore::new(config.cache_dir.clone())?;
    let cache = DistanceCache::new(Arc::new(store), Arc::new(SystemClock));
    if let Err(err) = cache.purge_expired() {
        tracing::warn!("could not purge distance cache: {err}");
    }
    tracing::info!("distance cache at {}", config.cache_dir.display());

    let backend = NominatimBackend::new(
        config.geocoder_url.as_str(),
        &config.geocoder_user_agent,
        config.geocoder_timeout,
    )?;
    let distance = DistanceService::new(GeocoderAdapter::new(backend), cache);

    let trips = match &config.database_url {
        Some(url) => {
            let db = TripDatabase::connect(url).await?;
            db.migrate().await?;
            Some(Arc::new(db))
        }
        None => {
            tracing::info!("DATABASE_URL not set; trip records and credits are disabled");
            None
        }
    };

    let state = AppState {
        distance: Arc::new(distance),
        emissions: Arc::new(emissions),
        trips,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = create_router(state).layer(cors);

    tracing::info!("starting footprint backend on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
