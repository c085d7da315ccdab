//! # Pack Configuration API
//!
//! Named pack size sets stored in the in-memory registry.
//!
//! ## Endpoints
//!
//! - `GET /v1/pack-configurations` — list active configurations
//! - `POST /v1/pack-configurations` — create configuration
//! - `GET /v1/pack-configurations/default` — get the default configuration
//! - `GET /v1/pack-configurations/:id` — get configuration
//! - `PUT /v1/pack-configurations/:id` — update configuration
//! - `DELETE /v1/pack-configurations/:id` — soft-delete configuration
//! - `PATCH /v1/pack-configurations/:id/default` — make configuration the default

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use packs_core::PackSizeSet;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{
    extract_validated_json, validate_name, validate_pack_sizes, FieldError, Validate,
};
use crate::state::{AppState, PackConfigurationRecord};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to create a configuration.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePackConfigurationRequest {
    #[schema(example = "Standard Packs")]
    pub name: String,
    #[schema(example = json!([250, 500, 1000]))]
    pub pack_sizes: Vec<i64>,
}

impl Validate for CreatePackConfigurationRequest {
    fn validate(&self) -> Result<(), FieldError> {
        validate_name(&self.name)?;
        validate_pack_sizes("pack_sizes", &self.pack_sizes)
    }
}

/// Request to replace a configuration.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePackConfigurationRequest {
    pub name: String,
    pub pack_sizes: Vec<i64>,
    /// Make this the default. Clears the flag on every other configuration.
    #[serde(default)]
    pub is_default: bool,
}

impl Validate for UpdatePackConfigurationRequest {
    fn validate(&self) -> Result<(), FieldError> {
        validate_name(&self.name)?;
        validate_pack_sizes("pack_sizes", &self.pack_sizes)
    }
}

/// Active configurations, sorted by name.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PackConfigurationListResponse {
    pub configurations: Vec<PackConfigurationRecord>,
    pub count: usize,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the pack configuration router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/pack-configurations",
            get(list_configurations).post(create_configuration),
        )
        .route("/v1/pack-configurations/default", get(get_default_configuration))
        .route(
            "/v1/pack-configurations/:id",
            get(get_configuration)
                .put(update_configuration)
                .delete(delete_configuration),
        )
        .route(
            "/v1/pack-configurations/:id/default",
            patch(set_default_configuration),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/pack-configurations — List active configurations.
#[utoipa::path(
    get,
    path = "/v1/pack-configurations",
    responses(
        (status = 200, description = "Active configurations", body = PackConfigurationListResponse),
    ),
    tag = "pack_configurations"
)]
async fn list_configurations(
    State(state): State<AppState>,
) -> Json<PackConfigurationListResponse> {
    let configurations = state.configurations.list_active();
    let count = configurations.len();
    Json(PackConfigurationListResponse {
        configurations,
        count,
    })
}

/// POST /v1/pack-configurations — Create a configuration.
#[utoipa::path(
    post,
    path = "/v1/pack-configurations",
    request_body = CreatePackConfigurationRequest,
    responses(
        (status = 201, description = "Configuration created", body = PackConfigurationRecord),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "pack_configurations"
)]
async fn create_configuration(
    State(state): State<AppState>,
    body: Result<Json<CreatePackConfigurationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PackConfigurationRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let sizes = PackSizeSet::try_from_strict(&req.pack_sizes)?;
    let record = state.configurations.create(req.name, sizes);
    tracing::info!(id = %record.id, name = %record.name, "pack configuration created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/pack-configurations/default — Get the default configuration.
#[utoipa::path(
    get,
    path = "/v1/pack-configurations/default",
    responses(
        (status = 200, description = "Default configuration", body = PackConfigurationRecord),
        (status = 404, description = "No default set", body = crate::error::ErrorBody),
    ),
    tag = "pack_configurations"
)]
async fn get_default_configuration(
    State(state): State<AppState>,
) -> Result<Json<PackConfigurationRecord>, AppError> {
    Ok(Json(state.configurations.default_configuration()?))
}

/// GET /v1/pack-configurations/:id — Get a configuration.
#[utoipa::path(
    get,
    path = "/v1/pack-configurations/{id}",
    params(("id" = Uuid, Path, description = "Configuration ID")),
    responses(
        (status = 200, description = "Configuration found", body = PackConfigurationRecord),
        (status = 404, description = "Configuration not found", body = crate::error::ErrorBody),
    ),
    tag = "pack_configurations"
)]
async fn get_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PackConfigurationRecord>, AppError> {
    Ok(Json(state.configurations.get_active(id)?))
}

/// PUT /v1/pack-configurations/:id — Replace a configuration.
#[utoipa::path(
    put,
    path = "/v1/pack-configurations/{id}",
    params(("id" = Uuid, Path, description = "Configuration ID")),
    request_body = UpdatePackConfigurationRequest,
    responses(
        (status = 200, description = "Configuration updated", body = PackConfigurationRecord),
        (status = 404, description = "Configuration not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "pack_configurations"
)]
async fn update_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdatePackConfigurationRequest>, JsonRejection>,
) -> Result<Json<PackConfigurationRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let sizes = PackSizeSet::try_from_strict(&req.pack_sizes)?;
    let record = state
        .configurations
        .update(id, req.name, sizes, req.is_default)?;
    tracing::info!(id = %record.id, is_default = record.is_default, "pack configuration updated");
    Ok(Json(record))
}

/// DELETE /v1/pack-configurations/:id — Soft-delete a configuration.
#[utoipa::path(
    delete,
    path = "/v1/pack-configurations/{id}",
    params(("id" = Uuid, Path, description = "Configuration ID")),
    responses(
        (status = 204, description = "Configuration deleted"),
        (status = 404, description = "Configuration not found", body = crate::error::ErrorBody),
        (status = 409, description = "Configuration is the default", body = crate::error::ErrorBody),
    ),
    tag = "pack_configurations"
)]
async fn delete_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.configurations.soft_delete(id)?;
    tracing::info!(%id, "pack configuration deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /v1/pack-configurations/:id/default — Make a configuration the default.
#[utoipa::path(
    patch,
    path = "/v1/pack-configurations/{id}/default",
    params(("id" = Uuid, Path, description = "Configuration ID")),
    responses(
        (status = 200, description = "Default updated", body = PackConfigurationRecord),
        (status = 404, description = "Configuration not found", body = crate::error::ErrorBody),
    ),
    tag = "pack_configurations"
)]
async fn set_default_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PackConfigurationRecord>, AppError> {
    let record = state.configurations.set_default(id)?;
    tracing::info!(%id, "default pack configuration changed");
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_validation() {
        let ok = CreatePackConfigurationRequest {
            name: "Edge".into(),
            pack_sizes: vec![23, 31, 53],
        };
        assert!(ok.validate().is_ok());

        let blank = CreatePackConfigurationRequest {
            name: " ".into(),
            pack_sizes: vec![1],
        };
        assert!(blank.validate().is_err());

        let zero = CreatePackConfigurationRequest {
            name: "Zero".into(),
            pack_sizes: vec![0],
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn update_request_defaults_flag_to_false() {
        let req: UpdatePackConfigurationRequest =
            serde_json::from_str(r#"{"name":"A","pack_sizes":[5]}"#).unwrap();
        assert!(!req.is_default);
        assert!(req.validate().is_ok());
    }
}
