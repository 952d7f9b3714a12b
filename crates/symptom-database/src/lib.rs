//! # 症状分析数据库模块
//!
//! 负责分析记录的持久化，提供PostgreSQL连接池、建表和写入操作。
//! 记录只写入，不更新也不删除。

pub mod connection;
pub mod models;
pub mod queries;
pub mod store;

// 重新导出主要类型
pub use connection::{DatabasePool, DatabaseSettings};
pub use models::*;
pub use queries::DatabaseQueries;
pub use store::PostgresAnalysisStore;
