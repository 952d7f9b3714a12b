//! 大模型服务连接器
//!
//! 通过 OpenAI 兼容的 `/chat/completions` 接口调用大模型。
//! 所有调用层面的失败都转换为 [`SymptomError::Upstream`]，模型返回内容本身不在这里校验。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use symptom_core::{
    utils::truncate_for_log, CompletionProvider, CompletionRequest, Result, SymptomError,
};
use tracing::{debug, error, info};

/// Groq 的 OpenAI 兼容接口地址
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// 连接器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub name: String,
    pub endpoint: String,
    pub authentication: AuthenticationConfig,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthenticationConfig {
    None,
    ApiKey { key: String, header: Option<String> },
    BearerToken { token: String },
}

/// 上游失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// 401/403
    Auth,
    /// 402
    Billing,
    /// 429
    RateLimit,
    /// 404，通常是模型名错误
    NotFound,
    /// 408 或请求超时
    Timeout,
    /// 连接失败、DNS 等
    Network,
    /// 5xx
    ServerError,
    /// 响应体不是合法的补全响应
    InvalidResponse,
    Unknown,
}

impl UpstreamErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            402 => Self::Billing,
            404 => Self::NotFound,
            408 => Self::Timeout,
            429 => Self::RateLimit,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "authentication failed",
            Self::Billing => "billing or quota exhausted",
            Self::RateLimit => "rate limited",
            Self::NotFound => "model or endpoint not found",
            Self::Timeout => "request timed out",
            Self::Network => "provider unreachable",
            Self::ServerError => "provider server error",
            Self::InvalidResponse => "invalid completion response",
            Self::Unknown => "unexpected provider error",
        }
    }

    fn into_error(self, message: impl std::fmt::Display) -> SymptomError {
        SymptomError::Upstream(format!("{}: {}", self.as_str(), message))
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

impl<'a> From<&'a CompletionRequest> for ChatRequestBody<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// 从补全响应中取出第一条消息内容
///
/// 响应体结构不对属于上游失败；结构正确但 `content` 为空时返回空字符串，
/// 交给解析器走兜底。
fn extract_content(body: &str) -> Result<String> {
    let parsed: ChatResponseBody = serde_json::from_str(body)
        .map_err(|e| UpstreamErrorKind::InvalidResponse.into_error(e))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| UpstreamErrorKind::InvalidResponse.into_error("no choices in response"))?;

    Ok(choice.message.content.unwrap_or_default())
}

/// 校验接口地址，只允许 http / https
fn validate_endpoint(endpoint: &str) -> Result<()> {
    let parsed = reqwest::Url::parse(endpoint)
        .map_err(|e| SymptomError::Config(format!("Invalid LLM endpoint '{}': {}", endpoint, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(SymptomError::Config(format!(
            "Unsupported URL scheme '{}' in LLM endpoint '{}'",
            scheme, endpoint
        ))),
    }
}

/// OpenAI 兼容的补全连接器
pub struct ChatCompletionConnector {
    name: String,
    endpoint: String,
    authentication: AuthenticationConfig,
    client: reqwest::Client,
}

impl ChatCompletionConnector {
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        validate_endpoint(&config.endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SymptomError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            "Initialized completion connector {} for {}",
            config.name, config.endpoint
        );

        Ok(Self {
            name: config.name,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            authentication: config.authentication,
            client,
        })
    }

    /// Groq 连接器
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    /// 添加认证头
    fn add_auth_headers(
        request: reqwest::RequestBuilder,
        auth: &AuthenticationConfig,
    ) -> reqwest::RequestBuilder {
        match auth {
            AuthenticationConfig::None => request,
            AuthenticationConfig::ApiKey { key, header } => {
                let header_name = header.as_deref().unwrap_or("X-API-Key");
                request.header(header_name, key)
            }
            AuthenticationConfig::BearerToken { token } => request.bearer_auth(token),
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> reqwest::RequestBuilder {
        let body = ChatRequestBody::from(request);
        let builder = self.client.post(self.completions_url()).json(&body);
        Self::add_auth_headers(builder, &self.authentication)
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            model = %request.model,
            prompt_bytes = request.user_prompt.len(),
            "Calling chat completions API"
        );

        let response = self.build_request(request).send().await.map_err(|e| {
            error!("HTTP request to {} failed: {}", self.name, e);
            UpstreamErrorKind::from_reqwest(&e).into_error(e)
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamErrorKind::from_reqwest(&e).into_error(e))?;

        if !status.is_success() {
            error!(status = %status, "Provider API error: {}", truncate_for_log(&text, 500));
            return Err(UpstreamErrorKind::from_status(status.as_u16()).into_error(format!(
                "{} {}",
                status,
                truncate_for_log(&text, 200)
            )));
        }

        debug!("Provider response: {}", truncate_for_log(&text, 2000));
        extract_content(&text)
    }
}
