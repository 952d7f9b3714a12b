//! 分析引擎
//!
//! 串联提示词构建、模型调用、响应解析和结果持久化的核心流程

use std::sync::Arc;

use symptom_core::{
    AnalysisResponse, AnalysisStore, CompletionProvider, CompletionRequest, CompletionSettings,
    Result, SymptomError, SymptomRequest,
};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::parser::parse_analysis;
use crate::prompt::build_prompt;

/// 分析引擎
///
/// 持有注入的模型客户端和存储，不持有任何可变状态，可在并发请求间共享。
pub struct AnalysisEngine {
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn AnalysisStore>,
    settings: CompletionSettings,
}

impl AnalysisEngine {
    /// 创建新的分析引擎
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        store: Arc<dyn AnalysisStore>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            provider,
            store,
            settings,
        }
    }

    /// 分析一次症状请求
    ///
    /// 返回的错误只有两类：请求校验失败 [`SymptomError::Validation`]
    /// 和模型调用失败 [`SymptomError::Upstream`]。模型内容无法解析时返回兜底结果，
    /// 持久化失败只记录日志。
    pub async fn analyze(&self, request: &SymptomRequest) -> Result<AnalysisResponse> {
        request.validate()?;

        let request_id = Uuid::new_v4();
        self.run(request)
            .instrument(info_span!("analysis", %request_id))
            .await
    }

    async fn run(&self, request: &SymptomRequest) -> Result<AnalysisResponse> {
        // 1. 构建提示词
        let prompt = build_prompt(request);
        let completion = CompletionRequest {
            model: self.settings.model.clone(),
            system_prompt: prompt.system,
            user_prompt: prompt.user,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        // 2. 调用模型，调用失败直接返回，不重试
        info!(
            provider = self.provider.name(),
            model = %completion.model,
            "Requesting symptom analysis"
        );
        let raw = self.provider.complete(&completion).await.map_err(|e| {
            error!(provider = self.provider.name(), "Completion call failed: {}", e);
            match e {
                SymptomError::Upstream(_) => e,
                other => SymptomError::Upstream(other.detail()),
            }
        })?;
        debug!(bytes = raw.len(), "Received model output");

        // 3. 解析，无法失败
        let response = parse_analysis(&raw);

        // 4. 持久化，失败不影响返回结果
        self.persist(request, &response).await;

        Ok(response)
    }

    async fn persist(&self, request: &SymptomRequest, response: &AnalysisResponse) {
        match self.store.save_analysis(request, response).await {
            Ok(id) => info!(analysis_id = id, "Analysis saved to database"),
            Err(e) => warn!("Failed to save analysis to database: {}", e),
        }
    }
}
