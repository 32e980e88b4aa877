use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use breeze_core::Config;
use breeze_server::{routes, AppState};
use breeze_weather::{Aggregator, ResultCache, CACHE_TTL};

#[tokio::main]
async fn main() -> Result<()> {
    breeze_core::init()?;

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    let (config, _validation) = match Config::load_validated(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    let cache = Arc::new(ResultCache::new());
    let aggregator = match Aggregator::from_settings(&config.weather, cache) {
        Ok(agg) => agg,
        Err(e) => {
            error!("Failed to initialize weather aggregator: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        aggregator: Arc::new(aggregator),
    };

    let port = config.server.port;
    info!("Breezeboard weather analytics server");
    info!("Listening on port {}", port);
    info!("Cache TTL: {} seconds", CACHE_TTL.as_secs());
    info!("Required cities: minimum {}", config.weather.min_cities);
    info!("Endpoints:");
    info!("  GET http://localhost:{}/api/weather", port);
    info!("  GET http://localhost:{}/api/cache-debug", port);
    info!("  GET http://localhost:{}/api/health", port);

    warp::serve(routes(state)).run(([0, 0, 0, 0], port)).await;

    Ok(())
}
