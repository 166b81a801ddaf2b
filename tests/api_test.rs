use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use holiday_explorer::{
    api::{self, state::AppState},
    auth::TokenService,
    bootstrap,
    config::Settings,
    domain::Role,
    error::Result,
    payments::{
        CheckoutSessionDetails, CheckoutSessionState, CreateSessionParams, PaymentGateway,
    },
    repository::{
        BookingRepository, PackageRepository, SqliteBookingRepository, SqlitePackageRepository,
        SqliteUserRepository, UserRepository,
    },
};

// ── Fake payment gateway ──

#[derive(Default)]
struct FakePaymentGateway {
    next_id: AtomicUsize,
    created: Mutex<Vec<CreateSessionParams>>,
    states: Mutex<HashMap<String, CheckoutSessionState>>,
}

impl FakePaymentGateway {
    fn set_state(&self, session_id: &str, state: CheckoutSessionState) {
        self.states
            .lock()
            .unwrap()
            .insert(session_id.to_string(), state);
    }

    fn created_params(&self) -> Vec<CreateSessionParams> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_checkout_session(
        &self,
        params: CreateSessionParams,
    ) -> Result<CheckoutSessionDetails> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.created.lock().unwrap().push(params);
        Ok(CheckoutSessionDetails {
            session_id: format!("cs_test_{}", n),
            url: format!("https://checkout.stripe.test/c/pay/cs_test_{}", n),
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSessionState> {
        Ok(self
            .states
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_else(|| CheckoutSessionState {
                status: "open".to_string(),
                payment_status: "unpaid".to_string(),
                amount_total: None,
                currency: Some("inr".to_string()),
                metadata: HashMap::new(),
            }))
    }
}

fn paid_state(amount_total_minor: i64) -> CheckoutSessionState {
    CheckoutSessionState {
        status: "complete".to_string(),
        payment_status: "paid".to_string(),
        amount_total: Some(amount_total_minor),
        currency: Some("inr".to_string()),
        metadata: HashMap::new(),
    }
}

// ── Test harness ──

struct TestContext {
    app: Router,
    packages: Arc<dyn PackageRepository>,
    bookings: Arc<dyn BookingRepository>,
    tokens: Arc<TokenService>,
    gateway: Arc<FakePaymentGateway>,
}

async fn test_context() -> TestContext {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let users: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool.clone()));
    let packages: Arc<dyn PackageRepository> =
        Arc::new(SqlitePackageRepository::new(pool.clone()));
    let bookings: Arc<dyn BookingRepository> =
        Arc::new(SqliteBookingRepository::new(pool.clone()));

    bootstrap::run(users.as_ref(), packages.as_ref())
        .await
        .expect("seeding");

    let tokens = Arc::new(TokenService::new("test-secret"));
    let gateway = Arc::new(FakePaymentGateway::default());

    let state = AppState::new(
        users,
        packages.clone(),
        bookings.clone(),
        tokens.clone(),
        Some(gateway.clone()),
        Arc::new(Settings::default()),
    );

    TestContext {
        app: api::create_app(state),
        packages,
        bookings,
        tokens,
        gateway,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn admin_token(ctx: &TestContext) -> String {
    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "email": bootstrap::ADMIN_EMAIL,
            "password": bootstrap::DEFAULT_ADMIN_PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

// ── Root and fallback ──

#[tokio::test]
async fn root_returns_service_metadata() {
    let ctx = test_context().await;

    let (status, body) = send(&ctx.app, "GET", "/api/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Holiday Explorer API");
    assert!(body["endpoints"]["packages"].is_string());
}

#[tokio::test]
async fn unknown_route_echoes_path() {
    let ctx = test_context().await;

    let (status, body) = send(&ctx.app, "GET", "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route /api/nope not found");
}

#[tokio::test]
async fn unmatched_method_falls_through_to_404() {
    let ctx = test_context().await;

    let (status, body) = send(&ctx.app, "DELETE", "/api/packages", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route /api/packages not found");

    let (status, _) = send(&ctx.app, "PATCH", "/api/auth/login", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let ctx = test_context().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/packages")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

// ── Auth ──

#[tokio::test]
async fn login_returns_token_and_sanitized_user() {
    let ctx = test_context().await;

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "admin@holidayexplorer.com", "password": "admin123"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["email"], "admin@holidayexplorer.com");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    // The token verifies back to the same identity.
    let claims = ctx
        .tokens
        .verify(body["token"].as_str().unwrap())
        .expect("token verifies");
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.user_id.to_string(), body["user"]["id"]);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let ctx = test_context().await;

    let (wrong_status, wrong_body) = send(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": bootstrap::ADMIN_EMAIL, "password": "nope"})),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &ctx.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "ghost@example.com", "password": "nope"})),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_requires_email_and_password() {
    let ctx = test_context().await;

    for body in [
        json!({}),
        json!({"email": bootstrap::ADMIN_EMAIL}),
        json!({"password": "admin123"}),
        json!({"email": "", "password": ""}),
    ] {
        let (status, response) =
            send(&ctx.app, "POST", "/api/auth/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Email and password are required");
    }
}

// ── Package catalog ──

#[tokio::test]
async fn packages_list_returns_seeded_catalog() {
    let ctx = test_context().await;

    let (status, body) = send(&ctx.app, "GET", "/api/packages", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let packages = body.as_array().unwrap();
    assert_eq!(packages.len(), 4);
    for package in packages {
        assert!(package["id"].is_string());
        assert!(package["price"].is_i64());
        assert!(package["highlights"].is_array());
    }
}

#[tokio::test]
async fn package_get_unknown_id_is_404() {
    let ctx = test_context().await;

    let (status, body) = send(&ctx.app, "GET", "/api/packages/doesnotexist", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Package not found"}));

    let (status, _) = send(
        &ctx.app,
        "GET",
        &format!("/api/packages/{}", Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_create_requires_admin_token() {
    let ctx = test_context().await;
    let package = json!({
        "title": "Goa Beach Escape",
        "description": "Lazy beaches",
        "price": 9999,
        "duration": "4 Days / 3 Nights",
    });

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/admin/packages",
        None,
        Some(package.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    // A valid token without the admin role is just as unauthorized.
    let user_token = ctx.tokens.issue(Uuid::new_v4(), Role::User).unwrap();
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/api/admin/packages",
        Some(&user_token),
        Some(package),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Nothing was persisted.
    assert_eq!(ctx.packages.count().await.unwrap(), 4);
}

#[tokio::test]
async fn admin_create_then_fetch_roundtrip() {
    let ctx = test_context().await;
    let token = admin_token(&ctx).await;

    let (status, created) = send(
        &ctx.app,
        "POST",
        "/api/admin/packages",
        Some(&token),
        Some(json!({
            "title": "Goa Beach Escape",
            "description": "Lazy beaches and seafood shacks.",
            "price": 9999,
            "duration": "4 Days / 3 Nights",
            "image": "https://example.com/goa.jpg",
            "highlights": ["Baga Beach", "Old Goa"],
            "rating": 4.5,
            "category": "beach",
            "featured": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(created["id"].is_string());
    assert!(created["created_at"].is_string());

    let id = created["id"].as_str().unwrap();
    let (status, fetched) =
        send(&ctx.app, "GET", &format!("/api/packages/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Goa Beach Escape");
    assert_eq!(fetched["price"], 9999);
    assert_eq!(fetched["highlights"], json!(["Baga Beach", "Old Goa"]));
    assert_eq!(fetched["featured"], true);

    // Exactly the public fields, nothing storage-internal.
    let mut keys: Vec<&str> = fetched.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "category",
            "created_at",
            "description",
            "duration",
            "featured",
            "highlights",
            "id",
            "image",
            "price",
            "rating",
            "title",
            "updated_at",
        ]
    );

    // Newest first in the listing.
    let (_, listed) = send(&ctx.app, "GET", "/api/packages", None, None).await;
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn admin_create_rejects_invalid_fields() {
    let ctx = test_context().await;
    let token = admin_token(&ctx).await;

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/api/admin/packages",
        Some(&token),
        Some(json!({
            "title": "Bad",
            "description": "Negative price",
            "price": -5,
            "duration": "1 Day",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/api/admin/packages",
        Some(&token),
        Some(json!({
            "title": "Bad",
            "description": "Rating out of range",
            "price": 5,
            "duration": "1 Day",
            "rating": 7.5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_update_merges_and_404s_on_miss() {
    let ctx = test_context().await;
    let token = admin_token(&ctx).await;

    let (_, listed) = send(&ctx.app, "GET", "/api/packages", None, None).await;
    let id = listed[0]["id"].as_str().unwrap().to_string();
    let title = listed[0]["title"].clone();

    let (status, body) = send(
        &ctx.app,
        "PUT",
        &format!("/api/admin/packages/{}", id),
        Some(&token),
        Some(json!({"price": 20999})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (_, fetched) = send(&ctx.app, "GET", &format!("/api/packages/{}", id), None, None).await;
    assert_eq!(fetched["price"], 20999);
    assert_eq!(fetched["title"], title);

    // No matching package is a 404, not a silent success.
    let (status, body) = send(
        &ctx.app,
        "PUT",
        &format!("/api/admin/packages/{}", Uuid::new_v4()),
        Some(&token),
        Some(json!({"price": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Package not found");

    let (status, _) = send(
        &ctx.app,
        "PUT",
        &format!("/api/admin/packages/{}", id),
        None,
        Some(json!({"price": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Checkout and reconciliation ──

#[tokio::test]
async fn checkout_with_custom_amount_persists_pending_booking() {
    let ctx = test_context().await;

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({
            "customAmount": 500,
            "customerInfo": {"name": "Asha", "email": "asha@example.com", "phone": "+911234"},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let session_id = body["sessionId"].as_str().unwrap();
    assert!(body["url"].as_str().unwrap().starts_with("https://"));

    let booking = ctx
        .bookings
        .find_by_session_id(session_id)
        .await
        .unwrap()
        .expect("booking persisted");
    assert_eq!(booking.amount, 500);
    assert_eq!(booking.currency, "inr");
    assert_eq!(booking.status, "pending");
    assert_eq!(booking.payment_status, "unpaid");
    assert!(booking.package_id.is_none());

    // The processor saw minor units and the custom-package metadata.
    let params = ctx.gateway.created_params();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].amount_minor, 50000);
    assert_eq!(params[0].product_name, "Custom Package");
    assert_eq!(params[0].metadata["packageId"], "custom");
    assert_eq!(params[0].customer_email.as_deref(), Some("asha@example.com"));
}

#[tokio::test]
async fn checkout_with_package_uses_catalog_price() {
    let ctx = test_context().await;

    let (_, listed) = send(&ctx.app, "GET", "/api/packages", None, None).await;
    let package = listed
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["title"] == "Kerala Backwaters Bliss")
        .unwrap();
    let package_id = package["id"].as_str().unwrap();

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({"packageId": package_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let booking = ctx
        .bookings
        .find_by_session_id(body["sessionId"].as_str().unwrap())
        .await
        .unwrap()
        .expect("booking persisted");
    assert_eq!(booking.amount, 12999);
    assert_eq!(booking.package_id.map(|id| id.to_string()).as_deref(), Some(package_id));

    let params = ctx.gateway.created_params();
    assert_eq!(params[0].amount_minor, 1299900);
    assert_eq!(params[0].product_name, "Kerala Backwaters Bliss");
    assert_eq!(params[0].metadata["packageId"], package_id);
}

#[tokio::test]
async fn checkout_validates_amount_source() {
    let ctx = test_context().await;

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Package ID or custom amount required");

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({"packageId": Uuid::new_v4().to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Package not found");
}

#[tokio::test]
async fn session_poll_projects_processor_state() {
    let ctx = test_context().await;

    let (_, created) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({"customAmount": 500})),
    )
    .await;
    let session_id = created["sessionId"].as_str().unwrap().to_string();

    ctx.gateway.set_state(&session_id, paid_state(50000));

    let (status, body) = send(
        &ctx.app,
        "GET",
        &format!("/api/payments/session/{}", session_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "complete");
    assert_eq!(body["payment_status"], "paid");
    // Reported back in major units.
    assert_eq!(body["amount_total"], 500);
    assert_eq!(body["currency"], "inr");

    let booking = ctx
        .bookings
        .find_by_session_id(&session_id)
        .await
        .unwrap()
        .expect("booking exists");
    assert_eq!(booking.status, "complete");
    assert_eq!(booking.payment_status, "paid");
}

// ── Booking lookup ──

#[tokio::test]
async fn booking_lookup_by_session_id() {
    let ctx = test_context().await;

    let (_, created) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({"customAmount": 750})),
    )
    .await;
    let session_id = created["sessionId"].as_str().unwrap();

    let (status, body) = send(
        &ctx.app,
        "GET",
        &format!("/api/bookings?sessionId={}", session_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], *session_id);
    assert_eq!(body["amount"], 750);
    assert_eq!(body["paymentStatus"], "unpaid");

    let (status, body) = send(&ctx.app, "GET", "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Session ID required");

    let (status, body) = send(
        &ctx.app,
        "GET",
        "/api/bookings?sessionId=cs_test_unknown",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Booking not found");
}

// ── Admin dashboard ──

#[tokio::test]
async fn dashboard_reports_totals_and_conversion() {
    let ctx = test_context().await;
    let token = admin_token(&ctx).await;

    // Two bookings, one of which completes payment.
    let (_, first) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({"customAmount": 500})),
    )
    .await;
    let (_, _second) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({"customAmount": 300})),
    )
    .await;

    let paid_session = first["sessionId"].as_str().unwrap().to_string();
    ctx.gateway.set_state(&paid_session, paid_state(50000));
    let (status, _) = send(
        &ctx.app,
        "GET",
        &format!("/api/payments/session/{}", paid_session),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&ctx.app, "GET", "/api/admin/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPackages"], 4);
    assert_eq!(body["totalBookings"], 2);
    assert_eq!(body["paidBookings"], 1);
    assert_eq!(body["totalRevenue"], 500);
    assert_eq!(body["conversionRate"], 50.0);

    let (status, _) = send(&ctx.app, "GET", "/api/admin/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_bookings_listing_requires_token() {
    let ctx = test_context().await;
    let token = admin_token(&ctx).await;

    let (_, created) = send(
        &ctx.app,
        "POST",
        "/api/payments/create-checkout",
        None,
        Some(json!({"customAmount": 250})),
    )
    .await;

    let (status, body) = send(&ctx.app, "GET", "/api/admin/bookings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["sessionId"], created["sessionId"]);

    let (status, _) = send(&ctx.app, "GET", "/api/admin/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
