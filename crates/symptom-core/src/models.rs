//! 核心数据模型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::{Result, SymptomError};
use crate::utils::{blank_as_none, null_as_empty};

/// 年龄上限（含）
pub const MAX_AGE: i32 = 120;

/// 症状分析请求
///
/// 可选字段在反序列化时即完成归一化：空白字符串与缺省一样视为 `None`，
/// 之后的提示词渲染和持久化只需要区分 `Some` / `None`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "symptoms": "headache, fever, cough",
    "age": 25,
    "gender": "male",
    "duration": "3 days"
}))]
pub struct SymptomRequest {
    /// 症状描述（必填）
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symptoms: String,
    /// 患者年龄 0-120
    #[serde(default)]
    pub age: Option<i32>,
    /// 患者性别
    #[serde(default, deserialize_with = "blank_as_none")]
    pub gender: Option<String>,
    /// 症状持续时间
    #[serde(default, deserialize_with = "blank_as_none")]
    pub duration: Option<String>,
}

impl SymptomRequest {
    pub fn new(
        symptoms: impl Into<String>,
        age: Option<i32>,
        gender: Option<String>,
        duration: Option<String>,
    ) -> Self {
        Self {
            symptoms: symptoms.into(),
            age,
            gender: gender.filter(|g| !g.trim().is_empty()),
            duration: duration.filter(|d| !d.trim().is_empty()),
        }
    }

    /// 只有症状描述的请求
    pub fn from_symptoms(symptoms: impl Into<String>) -> Self {
        Self::new(symptoms, None, None, None)
    }

    /// 校验请求字段
    pub fn validate(&self) -> Result<()> {
        if self.symptoms.trim().is_empty() {
            debug!("Rejected symptom request without symptoms");
            return Err(SymptomError::Validation("Symptoms are required".to_string()));
        }

        if let Some(age) = self.age {
            if !(0..=MAX_AGE).contains(&age) {
                debug!(age, "Rejected symptom request with out-of-range age");
                return Err(SymptomError::Validation(format!(
                    "Age must be between 0 and {}",
                    MAX_AGE
                )));
            }
        }

        Ok(())
    }
}

/// 候选疾病
///
/// `likelihood` 约定为 high / medium / low，但不做枚举约束，按模型原样保留。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Disease {
    pub name: String,
    pub likelihood: String,
    pub description: String,
}

impl Disease {
    pub fn new(
        name: impl Into<String>,
        likelihood: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            likelihood: likelihood.into(),
            description: description.into(),
        }
    }
}

/// 症状分析结果
///
/// 返回给调用方的唯一契约，无论上游成功与否形状都不变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "possible_diseases": [
        {
            "name": "Common Cold",
            "likelihood": "high",
            "description": "A viral infection of the upper respiratory tract"
        }
    ],
    "precautions": [
        "Get plenty of rest",
        "Stay hydrated",
        "Take over-the-counter pain relievers if needed"
    ],
    "when_to_seek_help": "Seek immediate help if symptoms worsen or persist beyond 10 days",
    "disclaimer": "This is not a medical diagnosis. Please consult a healthcare professional."
}))]
pub struct AnalysisResponse {
    pub possible_diseases: Vec<Disease>,
    pub precautions: Vec<String>,
    pub when_to_seek_help: String,
    pub disclaimer: String,
}

/// 已持久化的分析记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedAnalysis {
    pub id: i64,
    pub symptoms: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub duration: Option<String>,
    pub analysis_result: AnalysisResponse,
    pub created_at: DateTime<Utc>,
}

/// 默认模型
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// 默认采样温度，偏向稳定输出
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// 默认输出 token 上限
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// 模型调用参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// 一次补全调用的完整输入
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}
