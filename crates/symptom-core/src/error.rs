//! 错误定义模块

use thiserror::Error;

/// 症状分析系统统一错误类型
#[derive(Error, Debug)]
pub enum SymptomError {
    #[error("验证错误: {0}")]
    Validation(String),

    #[error("上游模型调用失败: {0}")]
    Upstream(String),

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("网络错误: {0}")]
    Network(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

impl SymptomError {
    /// 去掉分类前缀的原始消息，用于对外返回
    pub fn detail(&self) -> String {
        match self {
            SymptomError::Validation(msg)
            | SymptomError::Upstream(msg)
            | SymptomError::Database(msg)
            | SymptomError::Config(msg)
            | SymptomError::Internal(msg) => msg.clone(),
            SymptomError::Network(e) => e.to_string(),
            SymptomError::Serialization(e) => e.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SymptomError::Validation(_))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for SymptomError {
    fn from(e: sqlx::Error) -> Self {
        SymptomError::Database(e.to_string())
    }
}

/// 模型输出内容解析失败
///
/// 与 [`SymptomError::Upstream`] 严格区分：这里表示模型已经回答但内容不可用，
/// 由解析器在本地吸收为兜底响应，永远不会传播给调用方。
#[derive(Error, Debug)]
pub enum ContentDecodeError {
    #[error("模型返回内容为空")]
    Empty,

    #[error("模型返回内容不符合约定格式: {0}")]
    Schema(#[from] serde_json::Error),
}

/// 症状分析系统统一结果类型
pub type Result<T> = std::result::Result<T, SymptomError>;
