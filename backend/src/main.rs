//! Backend entry-point: wires the webhook endpoint, health probes, and
//! OpenAPI docs over the PostgreSQL and identity-provider adapters.

use std::env;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use chrono::TimeDelta;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::warn;
use url::Url;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::domain::ports::WebhookCommand;
use backend::domain::reconciliation::UserSyncService;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::signature::SignatureVerifier;
use backend::inbound::http::state::HttpState;
use backend::inbound::http::webhooks::receive_webhook;
use backend::outbound::identity::WorkosHttpClient;
use backend::outbound::persistence::{DbPool, DieselUserStore};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_API_URL: &str = "https://api.workos.com";
const DEFAULT_TOLERANCE_SECS: i64 = 300;
const DB_POOL_SIZE: u32 = 10;

struct AppConfig {
    database_url: String,
    api_key: String,
    webhook_secret: String,
    api_url: Url,
    bind_addr: String,
    tolerance: TimeDelta,
}

fn required_env(name: &str) -> std::io::Result<String> {
    env::var(name).map_err(|_| std::io::Error::other(format!("{name} must be set")))
}

fn load_config() -> std::io::Result<AppConfig> {
    let database_url = required_env("DATABASE_URL")?;
    let api_key = required_env("WORKOS_API_KEY")?;
    // Refuse to start without a webhook secret rather than silently
    // accepting unsigned deliveries.
    let webhook_secret = required_env("WORKOS_WEBHOOK_SECRET")?;

    let api_url_raw = env::var("WORKOS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
    let api_url = Url::parse(&api_url_raw)
        .map_err(|e| std::io::Error::other(format!("WORKOS_API_URL is invalid: {e}")))?;

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());

    let tolerance_secs = match env::var("WEBHOOK_TIMESTAMP_TOLERANCE_SECS") {
        Ok(raw) => raw.parse::<i64>().map_err(|e| {
            std::io::Error::other(format!("WEBHOOK_TIMESTAMP_TOLERANCE_SECS is invalid: {e}"))
        })?,
        Err(_) => DEFAULT_TOLERANCE_SECS,
    };

    Ok(AppConfig {
        database_url,
        api_key,
        webhook_secret,
        api_url,
        bind_addr,
        tolerance: TimeDelta::seconds(tolerance_secs),
    })
}

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("failed to connect for migrations: {e}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("failed to run migrations: {e}")))?;
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = load_config()?;

    let migration_url = config.database_url.clone();
    tokio::task::spawn_blocking(move || run_migrations(&migration_url))
        .await
        .map_err(std::io::Error::other)??;

    let pool = DbPool::connect(&config.database_url, DB_POOL_SIZE)
        .await
        .map_err(std::io::Error::other)?;
    let store = Arc::new(DieselUserStore::new(pool));
    let provider = Arc::new(
        WorkosHttpClient::new(config.api_url.clone(), config.api_key.clone())
            .map_err(std::io::Error::other)?,
    );
    let webhooks: Arc<dyn WebhookCommand> = Arc::new(UserSyncService::new(store, provider));

    let state = web::Data::new(HttpState::new(
        webhooks,
        SignatureVerifier::new(config.webhook_secret.clone(), config.tolerance),
    ));

    let health_state = web::Data::new(HealthState::new());
    // Clone for server factory so the readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let server_state = state.clone();
    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1").service(receive_webhook);

        let app = App::new()
            .app_data(server_state.clone())
            .app_data(server_health_state.clone())
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = app
            .service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(config.bind_addr.as_str())?;

    health_state.mark_ready();
    server.run().await
}
