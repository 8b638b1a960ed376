use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::Database;
use crate::models::dates::parse_instant;
use crate::models::*;
use crate::store::StoreError;
use crate::timeline::holders_at;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side; clients only see a generic message.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Store errors that describe the request are returned as-is.
fn store_error(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        StoreError::Validation(msg) => {
            tracing::warn!("Validation error: {}", msg);
            (StatusCode::BAD_REQUEST, msg)
        }
        StoreError::Conflict(msg) => {
            tracing::warn!("Conflict: {}", msg);
            (StatusCode::CONFLICT, msg)
        }
        StoreError::Backend(e) => internal_error(e),
    }
}

fn country_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Country not found".to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Countries
// ============================================================

pub async fn list_countries(
    State(db): State<Database>,
) -> Result<Json<Vec<CountrySummary>>, (StatusCode, String)> {
    db.list_countries().map(Json).map_err(internal_error)
}

pub async fn get_country(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Country>, (StatusCode, String)> {
    db.get_country(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(country_not_found)
}

pub async fn create_country(
    State(db): State<Database>,
    Json(input): Json<CountryInput>,
) -> Result<(StatusCode, Json<Country>), (StatusCode, String)> {
    db.create_country(input)
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(store_error)
}

pub async fn update_country(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<CountryInput>,
) -> Result<Json<Country>, (StatusCode, String)> {
    db.update_country(id, input).map(Json).map_err(store_error)
}

pub async fn delete_country(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_country(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(country_not_found())
    }
}

/// Query parameters for role resolution.
#[derive(Debug, Deserialize)]
pub struct HoldersQuery {
    /// A date (`YYYY-MM-DD`) or RFC 3339 instant.
    pub at: String,
}

/// Who held the presidency and the crown at the requested instant.
pub async fn get_holders(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Query(query): Query<HoldersQuery>,
) -> Result<Json<HoldersResponse>, (StatusCode, String)> {
    let at = parse_instant(&query.at).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("`{}` is not a date or RFC 3339 instant", query.at),
        )
    })?;

    let country = db
        .get_country(id)
        .map_err(internal_error)?
        .ok_or_else(country_not_found)?;

    let (president, monarch) = holders_at(&country, at);
    Ok(Json(HoldersResponse {
        at,
        president: president.map(|p| p.name.clone()),
        monarch: monarch.map(|m| m.name.clone()),
    }))
}
