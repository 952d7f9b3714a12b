//! 数据库模型

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use symptom_core::{AnalysisResponse, PersistedAnalysis, SymptomRequest};

/// 数据库分析记录表
#[derive(Debug, FromRow)]
pub struct DbAnalysis {
    pub id: i64,
    pub symptoms: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub duration: Option<String>,
    pub analysis_result: Json<AnalysisResponse>, // 存储为JSONB
    pub created_at: DateTime<Utc>,
}

impl From<DbAnalysis> for PersistedAnalysis {
    fn from(db_analysis: DbAnalysis) -> Self {
        PersistedAnalysis {
            id: db_analysis.id,
            symptoms: db_analysis.symptoms,
            age: db_analysis.age,
            gender: db_analysis.gender,
            duration: db_analysis.duration,
            analysis_result: db_analysis.analysis_result.0,
            created_at: db_analysis.created_at,
        }
    }
}

/// 待写入的分析记录
#[derive(Debug, Clone, Copy)]
pub struct NewAnalysis<'a> {
    pub symptoms: &'a str,
    pub age: Option<i32>,
    pub gender: Option<&'a str>,
    pub duration: Option<&'a str>,
    pub analysis_result: &'a AnalysisResponse,
}

impl<'a> NewAnalysis<'a> {
    pub fn new(request: &'a SymptomRequest, result: &'a AnalysisResponse) -> Self {
        Self {
            symptoms: &request.symptoms,
            age: request.age,
            gender: request.gender.as_deref(),
            duration: request.duration.as_deref(),
            analysis_result: result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symptom_core::Disease;

    fn response() -> AnalysisResponse {
        AnalysisResponse {
            possible_diseases: vec![Disease::new("Migraine", "high", "Recurring headaches")],
            precautions: vec!["Rest".to_string()],
            when_to_seek_help: "If vision changes".to_string(),
            disclaimer: "Not a diagnosis".to_string(),
        }
    }

    #[test]
    fn test_new_analysis_keeps_absent_fields_absent() {
        let request = SymptomRequest::new("headache", None, None, Some("2 days".to_string()));
        let result = response();
        let new = NewAnalysis::new(&request, &result);

        assert_eq!(new.symptoms, "headache");
        assert_eq!(new.age, None);
        assert_eq!(new.gender, None);
        assert_eq!(new.duration, Some("2 days"));
    }

    #[test]
    fn test_db_row_into_persisted() {
        let created_at = Utc::now();
        let row = DbAnalysis {
            id: 7,
            symptoms: "headache".to_string(),
            age: Some(30),
            gender: Some("female".to_string()),
            duration: None,
            analysis_result: Json(response()),
            created_at,
        };

        let persisted = PersistedAnalysis::from(row);
        assert_eq!(persisted.id, 7);
        assert_eq!(persisted.age, Some(30));
        assert_eq!(persisted.analysis_result, response());
        assert_eq!(persisted.created_at, created_at);
    }
}
