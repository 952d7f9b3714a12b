//! 分析结果存储

use async_trait::async_trait;
use symptom_core::{AnalysisResponse, AnalysisStore, Result, SymptomRequest};
use tracing::debug;

use crate::connection::DatabasePool;
use crate::models::NewAnalysis;
use crate::queries::DatabaseQueries;

/// PostgreSQL 分析结果存储
#[derive(Debug, Clone)]
pub struct PostgresAnalysisStore {
    pool: DatabasePool,
}

impl PostgresAnalysisStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PostgresAnalysisStore {
    async fn save_analysis(
        &self,
        request: &SymptomRequest,
        result: &AnalysisResponse,
    ) -> Result<i64> {
        let queries = DatabaseQueries::new(&self.pool);
        let persisted = queries
            .insert_analysis(&NewAnalysis::new(request, result))
            .await?;

        debug!(id = persisted.id, created_at = %persisted.created_at, "Inserted symptom analysis");
        Ok(persisted.id)
    }
}
