//! 数据库查询操作

use sqlx::types::Json;
use symptom_core::{PersistedAnalysis, Result, SymptomError};

use crate::connection::DatabasePool;
use crate::models::{DbAnalysis, NewAnalysis};

/// 数据库查询操作接口
pub struct DatabaseQueries<'a> {
    pool: &'a DatabasePool,
}

impl<'a> DatabaseQueries<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS symptom_analysis (
                id BIGSERIAL PRIMARY KEY,
                symptoms TEXT NOT NULL,
                age INTEGER,
                gender VARCHAR(50),
                duration VARCHAR(100),
                analysis_result JSONB NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
            )
        "#).execute(pool).await.map_err(|e| SymptomError::Database(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_symptom_analysis_created_at ON symptom_analysis(created_at)",
        )
        .execute(pool)
        .await
        .map_err(|e| SymptomError::Database(e.to_string()))?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 写入一条分析记录
    pub async fn insert_analysis(&self, analysis: &NewAnalysis<'_>) -> Result<PersistedAnalysis> {
        let pool = self.pool.pool();

        let row = sqlx::query_as::<_, DbAnalysis>(r#"
            INSERT INTO symptom_analysis (symptoms, age, gender, duration, analysis_result)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, symptoms, age, gender, duration, analysis_result, created_at
        "#)
        .bind(analysis.symptoms)
        .bind(analysis.age)
        .bind(analysis.gender)
        .bind(analysis.duration)
        .bind(Json(analysis.analysis_result))
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }
}
