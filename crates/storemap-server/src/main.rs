mod api;
mod middleware;
mod session;

use std::sync::Arc;
use std::time::Duration;

use storemap_core::persist::{load_persisted, open_state_store};
use storemap_core::{load_brands, BrandsFile, BuildOptions, ConfigError, Controller, Event};
use storemap_loader::DataLoader;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::session::spawn_session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(storemap_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, source = %config.data_source, "starting storemap-server");

    let brands = match load_brands(&config.brands_path) {
        Ok(brands) => brands,
        Err(ConfigError::BrandsFileIo { path, source })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            tracing::warn!(
                path = %path,
                "brand palette not found; every brand uses the default colour"
            );
            BrandsFile::default()
        }
        Err(e) => return Err(e.into()),
    };

    let loader = DataLoader::from_app_config(&config)?;
    let (stores, _report) = loader
        .load_stores(&config.stores_file, BuildOptions::from_app_config(&config))
        .await?;
    let stores = Arc::new(stores);

    let store = open_state_store(&config.state_path, config.state_ttl_days)?;
    let persisted = load_persisted(&store)?;
    let (controller, initial) = Controller::restore(&persisted);
    let session = spawn_session(controller, initial, loader.clone(), store);
    session.dispatch(Event::DataLoaded(Arc::clone(&stores))).await?;

    let app = build_app(AppState {
        stores,
        brands: Arc::new(brands),
        loader,
        stores_file: Arc::from(config.stores_file.as_str()),
        session,
        list_wait: Duration::from_secs(config.fetch_timeout_secs),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
