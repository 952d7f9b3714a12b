//! HTTP处理器

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use symptom_analysis::AnalysisEngine;
use symptom_core::{AnalysisResponse, SymptomError, SymptomRequest};
use tracing::{error, info};
use utoipa::ToSchema;

/// 服务版本
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 处理器共享状态
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
}

impl AppState {
    pub fn new(engine: Arc<AnalysisEngine>) -> Self {
        Self { engine }
    }
}

/// 根路径响应
#[derive(Debug, Serialize, ToSchema)]
pub struct RootStatus {
    pub message: String,
    pub status: String,
    pub version: String,
}

/// 健康检查响应
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

/// 错误响应体
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub detail: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service liveness", body = RootStatus)
    )
)]
/// API根路径处理器
pub async fn api_root() -> Json<RootStatus> {
    Json(RootStatus {
        message: "Health Symptom Checker API".to_string(),
        status: "active".to_string(),
        version: API_VERSION.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthStatus)
    )
)]
/// 健康检查处理器
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/analyze-symptoms",
    request_body = SymptomRequest,
    responses(
        (status = 200, description = "Possible diseases and precautions", body = AnalysisResponse),
        (status = 400, description = "Symptoms missing or request invalid", body = ErrorDetail),
        (status = 500, description = "LLM provider unavailable or internal error", body = ErrorDetail)
    )
)]
/// 症状分析处理器
///
/// 模型输出无法解析时仍返回 200 和兜底结果，只有请求无效（400）
/// 和调用失败（500）会返回错误。
pub async fn analyze_symptoms(
    State(state): State<AppState>,
    payload: Result<Json<SymptomRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError(SymptomError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    })?;

    info!(
        symptoms_len = request.symptoms.len(),
        age = ?request.age,
        "Analyzing symptoms"
    );

    let response = state.engine.analyze(&request).await?;
    Ok(Json(response))
}

/// HTTP 错误包装
#[derive(Debug)]
pub struct ApiError(pub SymptomError);

impl From<SymptomError> for ApiError {
    fn from(e: SymptomError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SymptomError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match &self.0 {
            SymptomError::Validation(msg) => msg.clone(),
            SymptomError::Upstream(msg) => {
                format!("Internal server error: Error calling LLM API: {}", msg)
            }
            other => format!("Internal server error: {}", other.detail()),
        }
    }
}

/// 错误处理
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = Json(ErrorDetail {
            detail: self.detail(),
        });

        (status, body).into_response()
    }
}
