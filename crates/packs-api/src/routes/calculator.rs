//! # Calculation API
//!
//! ## Endpoints
//!
//! - `POST /v1/calculate` — allocate packs for an order
//!
//! Sizes come from the request body when present, otherwise from the named
//! configuration, otherwise from the default configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use packs_core::{CalculationResult, OrderQuantity, PackSizeSet};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, validate_pack_sizes, FieldError, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to allocate packs for an order.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculationRequest {
    /// Number of items ordered.
    #[schema(example = 251)]
    pub items: i64,
    /// Pack sizes to use. Overrides `configuration_id`.
    #[serde(default)]
    #[schema(example = json!([250, 500, 1000]))]
    pub pack_sizes: Option<Vec<i64>>,
    /// Stored configuration to take sizes from.
    #[serde(default)]
    pub configuration_id: Option<Uuid>,
}

impl Validate for CalculationRequest {
    fn validate(&self) -> Result<(), FieldError> {
        if self.items < 0 {
            return Err(FieldError::new(
                "items",
                format!("items must be zero or positive, got {}", self.items),
            ));
        }
        if let Some(ref sizes) = self.pack_sizes {
            validate_pack_sizes("pack_sizes", sizes)?;
        }
        Ok(())
    }
}

/// Allocation for an order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalculationResponse {
    /// Pack size to number of packs.
    #[schema(value_type = Object, example = json!({"500": 1}))]
    pub allocation: BTreeMap<u64, u64>,
    pub total_packs: u64,
    pub total_items: u64,
    /// Items shipped beyond the order.
    pub surplus: u64,
    pub is_exact_match: bool,
}

impl From<&CalculationResult> for CalculationResponse {
    fn from(result: &CalculationResult) -> Self {
        let allocation = result.allocation();
        Self {
            allocation: allocation.to_map(),
            total_packs: allocation.total_packs(),
            total_items: allocation.total_items(),
            surplus: result.surplus(),
            is_exact_match: result.is_exact_match(),
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the calculation router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/calculate", post(calculate))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/calculate — Allocate packs for an order.
#[utoipa::path(
    post,
    path = "/v1/calculate",
    request_body = CalculationRequest,
    responses(
        (status = 200, description = "Optimal allocation", body = CalculationResponse),
        (status = 400, description = "Malformed body", body = crate::error::ErrorBody),
        (status = 404, description = "Configuration not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "calculator"
)]
pub(crate) async fn calculate(
    State(state): State<AppState>,
    body: Result<Json<CalculationRequest>, JsonRejection>,
) -> Result<Json<CalculationResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let order = OrderQuantity::new(req.items)?;

    let sizes = match (req.pack_sizes, req.configuration_id) {
        (Some(raw), _) => PackSizeSet::try_from_strict(&raw)?,
        (None, Some(id)) => state.configurations.get_active(id)?.pack_size_set(),
        (None, None) => state
            .configurations
            .default_configuration()?
            .pack_size_set(),
    };

    if let Err(err) = state.config.limits.check(&sizes, order) {
        tracing::warn!(error = %err, "calculation rejected by limits");
        return Err(err.into());
    }

    let calculator = Arc::clone(&state.calculator);
    let result = tokio::task::spawn_blocking(move || calculator.calculate(&sizes, order))
        .await
        .map_err(|e| AppError::Internal(format!("calculation task failed: {e}")))?;

    state.metrics.record_calculation();
    let response = CalculationResponse::from(&result);
    tracing::info!(
        order_quantity = order.get(),
        total_packs = response.total_packs,
        total_items = response.total_items,
        surplus = response.surplus,
        "pack calculation completed"
    );
    Ok(Json(response))
}
