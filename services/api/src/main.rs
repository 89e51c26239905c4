use accounts_api::routes;
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use app_auth::AuthService;
use app_config::{AppConfig, JwtConfig};
use app_database::{db_connect::initialize_user_db, service::DbService};
use app_error::AppError;
use app_models::user::User;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Starting accounts service at {}", chrono::Utc::now());

    // Initialize the database connection and wire the service explicitly;
    // the signing secret and store handle are construction parameters, not
    // ambient globals
    let db = initialize_user_db(&config.database).await?;
    let user_db = Arc::new(DbService::<User>::new(db, "users"));

    let jwt_config = JwtConfig::from(&config);
    let auth_service = Arc::new(AuthService::new(
        &jwt_config,
        user_db,
        config.security.password.min_length,
    ));

    let app = routes::create_routes(auth_service, &config);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind to address: {}", address))?;

    info!("Server listening on http://{}", address);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
