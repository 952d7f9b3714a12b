//! # 症状分析模块
//!
//! 症状分析的完整处理流程，包括：
//! - 提示词构建：把患者输入渲染为系统指令和带输出格式模板的用户指令
//! - 响应解析：把模型的任意文本输出转换为合法的分析结果，无法解析时返回固定兜底结果
//! - 分析引擎：串联提示词构建、模型调用、响应解析和结果持久化

pub mod engine;
pub mod parser;
pub mod prompt;

// 重新导出主要类型
pub use engine::AnalysisEngine;
pub use parser::{decode_analysis, fallback_response, parse_analysis, strip_code_fence};
pub use prompt::{build_prompt, Prompt, SYSTEM_PROMPT};
