use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use securelife_contact_api::config::Config;
use securelife_contact_api::geolocation::GeoLocator;
use securelife_contact_api::handlers::AppState;
use securelife_contact_api::mailer::SmtpMailer;
use securelife_contact_api::sheets_client::{AppsScriptClient, SheetRecorder};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, wires the mail transport, the
/// spreadsheet client and the geolocation cache, then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "securelife_contact_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let mailer = SmtpMailer::new(&config)?;
    tracing::info!("✓ SMTP transport ready: {}", config.smtp_host);

    let sheets = config.sheets_webhook_url.clone().map(|url| {
        tracing::info!("✓ Spreadsheet webhook client initialized");
        Arc::new(AppsScriptClient::new(url)) as Arc<dyn SheetRecorder>
    });

    // Per-IP geolocation cache (24 hour TTL, 10k max entries)
    let geo = GeoLocator::new(config.geo_api_url.clone())?;
    tracing::info!("Geolocation cache initialized");

    let app_state = Arc::new(AppState {
        config: config.clone(),
        mailer: Arc::new(mailer),
        sheets,
        geo,
    });

    let app = securelife_contact_api::router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
