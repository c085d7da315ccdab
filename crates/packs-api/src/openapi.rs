//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Packs API",
        version = "0.1.0",
        description = "Optimal pack allocation: minimal surplus, then fewest packs, over configurable pack size sets.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::calculator::calculate,
        crate::routes::pack_configurations::list_configurations,
        crate::routes::pack_configurations::create_configuration,
        crate::routes::pack_configurations::get_default_configuration,
        crate::routes::pack_configurations::get_configuration,
        crate::routes::pack_configurations::update_configuration,
        crate::routes::pack_configurations::delete_configuration,
        crate::routes::pack_configurations::set_default_configuration,
        crate::routes::metrics::metrics,
    ),
    components(schemas(
        crate::state::PackConfigurationRecord,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::calculator::CalculationRequest,
        crate::routes::calculator::CalculationResponse,
        crate::routes::pack_configurations::CreatePackConfigurationRequest,
        crate::routes::pack_configurations::UpdatePackConfigurationRequest,
        crate::routes::pack_configurations::PackConfigurationListResponse,
        crate::routes::metrics::MetricsResponse,
    )),
    tags(
        (name = "calculator", description = "Pack allocation"),
        (name = "pack_configurations", description = "Stored pack size sets"),
        (name = "operations", description = "Service metrics"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_route() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        for expected in [
            "/v1/calculate",
            "/v1/pack-configurations",
            "/v1/pack-configurations/default",
            "/v1/pack-configurations/{id}",
            "/v1/pack-configurations/{id}/default",
            "/metrics",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}
