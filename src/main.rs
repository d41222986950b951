use clinic_api_rest::{router, AppState};
use clinic_core::{open_store, CoreConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the clinic service
///
/// Opens the document store once and serves the REST API on top of it.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CLINIC_DATA_DIR`: Root directory of the file store (default: "clinic_data")
/// - `CLINIC_STORE`: `file` or `memory` (default: "file")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = CoreConfig::from_env_values(
        std::env::var("CLINIC_DATA_DIR").ok(),
        std::env::var("CLINIC_STORE").ok(),
    )?;

    tracing::info!(
        "++ Opening {:?} store at {}",
        cfg.store_kind(),
        cfg.data_dir().display()
    );
    let store = open_store(&cfg)?;

    tracing::info!("++ Starting clinic REST on {}", rest_addr);
    let app = router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down clinic REST");
        })
        .await?;

    Ok(())
}
