pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Settings;
use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.settings);

    Router::new()
        .nest("/api", api_routes(state.clone()))
        .fallback(handlers::root::route_not_found)
        .with_state(state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", or_not_found(get(handlers::root::index)))
        // Auth routes
        .route("/auth/login", or_not_found(post(handlers::auth::login)))
        // Public catalog routes
        .route("/packages", or_not_found(get(handlers::packages::list)))
        .route("/packages/:id", or_not_found(get(handlers::packages::get)))
        // Payment routes
        .route(
            "/payments/create-checkout",
            or_not_found(post(handlers::payments::create_checkout)),
        )
        .route(
            "/payments/session/:id",
            or_not_found(get(handlers::payments::get_session)),
        )
        // Booking lookup by checkout session
        .route("/bookings", or_not_found(get(handlers::bookings::get)))
        // Admin routes
        .nest("/admin", admin_routes(state))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/packages", or_not_found(post(handlers::packages::create)))
        .route(
            "/packages/:id",
            or_not_found(put(handlers::packages::update)),
        )
        .route("/dashboard", or_not_found(get(handlers::admin::dashboard)))
        .route(
            "/bookings",
            or_not_found(get(handlers::bookings::list_recent)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}

// Unmatched methods on a known path get the same 404 body as unknown paths.
fn or_not_found(method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router.fallback(handlers::root::route_not_found)
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let configured = settings.cors.allowed_origin.as_str();

    // Credentials are allowed, so a wildcard origin must be mirrored rather
    // than sent literally.
    let allow_origin = if configured == "*" {
        AllowOrigin::mirror_request()
    } else {
        match configured.parse::<HeaderValue>() {
            Ok(origin) => AllowOrigin::exact(origin),
            Err(e) => {
                tracing::warn!(
                    "Invalid CORS origin {:?}: {}. Mirroring request origins instead.",
                    configured,
                    e
                );
                AllowOrigin::mirror_request()
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
