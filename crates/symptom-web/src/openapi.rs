//! OpenAPI 文档

use axum::response::Json;
use symptom_core::{AnalysisResponse, Disease, SymptomRequest};
use utoipa::OpenApi;

use crate::handlers::{ErrorDetail, HealthStatus, RootStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Health Symptom Checker API",
        description = "API for analyzing health symptoms and providing disease predictions"
    ),
    paths(
        crate::handlers::api_root,
        crate::handlers::health,
        crate::handlers::analyze_symptoms,
    ),
    components(schemas(
        SymptomRequest,
        Disease,
        AnalysisResponse,
        RootStatus,
        HealthStatus,
        ErrorDetail,
    ))
)]
pub struct ApiDoc;

/// OpenAPI JSON 文档
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
