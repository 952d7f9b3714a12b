//! # 症状分析Web模块
//!
//! HTTP 接口层：路由、处理器、错误响应映射和 OpenAPI 文档。

pub mod handlers;
pub mod openapi;
pub mod server;

pub use handlers::{ApiError, AppState};
pub use server::WebServer;
