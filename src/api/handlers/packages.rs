use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{CreatePackageRequest, Package, UpdatePackageRequest},
    error::{AppError, Result},
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Package>>> {
    let packages = state.packages.list().await?;
    Ok(Json(packages))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Package>> {
    // A non-UUID path segment cannot match anything, so it reads as absent.
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::NotFound("Package not found".to_string()))?;

    let package = state
        .packages
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;

    Ok(Json(package))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Json(request): Json<CreatePackageRequest>,
) -> Result<Json<Package>> {
    validate_price(Some(request.price))?;
    validate_rating(Some(request.rating))?;

    let package = state.packages.create(Package::new(request)).await?;
    Ok(Json(package))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePackageRequest>,
) -> Result<Json<Value>> {
    validate_price(request.price)?;
    validate_rating(request.rating)?;

    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::NotFound("Package not found".to_string()))?;

    state
        .packages
        .update(id, request)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;

    Ok(Json(json!({ "success": true })))
}

fn validate_price(price: Option<i64>) -> Result<()> {
    match price {
        Some(price) if price < 0 => Err(AppError::BadRequest(
            "Price must be non-negative".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_rating(rating: Option<f64>) -> Result<()> {
    match rating {
        Some(rating) if !(0.0..=5.0).contains(&rating) => Err(AppError::BadRequest(
            "Rating must be between 0 and 5".to_string(),
        )),
        _ => Ok(()),
    }
}
