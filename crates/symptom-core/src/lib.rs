//! # Symptom Core
//!
//! 症状分析系统的核心模块，提供基础数据结构、错误定义、外部协作者接口和通用工具。

pub mod error;
pub mod models;
pub mod traits;
pub mod utils;

pub use error::{ContentDecodeError, Result, SymptomError};
pub use models::*;
pub use traits::{AnalysisStore, CompletionProvider};
