//! # 外部系统集成模块
//!
//! 提供与第三方大模型服务的连接器：
//! - OpenAI 兼容的 chat completions 接口（默认 Groq）
//! - 认证头配置
//! - 上游错误分类，区分认证、配额、超时、网络等失败

pub mod connectors;

pub use connectors::{
    AuthenticationConfig, ChatCompletionConnector, ConnectorConfig, UpstreamErrorKind,
    DEFAULT_BASE_URL,
};
