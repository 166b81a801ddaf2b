use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use holiday_explorer::{
    api::{self, state::AppState},
    auth::TokenService,
    bootstrap,
    config::Settings,
    payments::{PaymentGateway, StripeGateway},
    repository::{
        BookingRepository, PackageRepository, SqliteBookingRepository, SqlitePackageRepository,
        SqliteUserRepository, UserRepository,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "holiday_explorer=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting Holiday Explorer API on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize repositories
    let users: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
    let packages: Arc<dyn PackageRepository> =
        Arc::new(SqlitePackageRepository::new(db_pool.clone()));
    let bookings: Arc<dyn BookingRepository> =
        Arc::new(SqliteBookingRepository::new(db_pool.clone()));

    let tokens = Arc::new(TokenService::new(&settings.auth.jwt_secret));

    // Initialize Stripe gateway if configured
    let payments: Option<Arc<dyn PaymentGateway>> = if settings.stripe.enabled {
        match settings.stripe.secret_key.clone() {
            Some(secret_key) => {
                tracing::info!("Stripe payment processing enabled");
                Some(Arc::new(StripeGateway::new(secret_key)))
            }
            None => {
                tracing::warn!("Stripe enabled but missing secret key");
                None
            }
        }
    } else {
        tracing::info!("Stripe payment processing disabled");
        None
    };

    // Seed the admin account and sample catalog; the server still starts if
    // seeding fails.
    if let Err(e) = bootstrap::run(users.as_ref(), packages.as_ref()).await {
        tracing::error!("Bootstrap seeding failed: {}", e);
    }

    let state = AppState::new(
        users,
        packages,
        bookings,
        tokens,
        payments,
        Arc::new(settings.clone()),
    );

    let app = api::create_app(state);

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
