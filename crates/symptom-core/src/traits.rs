//! 外部协作者接口
//!
//! 分析引擎只依赖这两个接口，具体实现（HTTP 客户端、PostgreSQL）在构造时注入。

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AnalysisResponse, CompletionRequest, SymptomRequest};

/// 大模型补全服务
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// 提供方名称，用于日志
    fn name(&self) -> &str;

    /// 发送一次补全请求并返回模型原始文本
    ///
    /// 传输、认证、配额等调用层面的失败必须返回 [`crate::SymptomError::Upstream`]。
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// 分析结果存储
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// 写入一次分析，返回数据库生成的记录ID
    async fn save_analysis(
        &self,
        request: &SymptomRequest,
        result: &AnalysisResponse,
    ) -> Result<i64>;
}
