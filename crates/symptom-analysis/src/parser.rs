//! 模型响应解析
//!
//! 把模型返回的任意文本转换为 [`AnalysisResponse`]。
//! 内容无法解析时（非 JSON、缺少字段、类型不符）一律返回固定的兜底结果，
//! 调用层面的失败不经过这里，由分析引擎单独处理。

use symptom_core::{utils::truncate_for_log, AnalysisResponse, ContentDecodeError, Disease};
use tracing::{debug, warn};

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

/// 去掉包裹 JSON 的 markdown 代码块标记
///
/// 开头的 ```` ```json ```` / ```` ``` ```` 与结尾的 ```` ``` ```` 各自独立处理，
/// 不存在就保持原样。语言标记不区分大小写。
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let text = match text.strip_prefix(FENCE) {
        Some(rest) => match rest.get(..JSON_TAG.len()) {
            Some(tag) if tag.eq_ignore_ascii_case(JSON_TAG) => &rest[JSON_TAG.len()..],
            _ => rest,
        },
        None => text,
    };
    let text = text.strip_suffix(FENCE).unwrap_or(text);
    text.trim()
}

/// 严格解码模型输出
///
/// 任意一个疾病条目缺少字段都会让整个解码失败，不会返回部分结果。
pub fn decode_analysis(raw: &str) -> Result<AnalysisResponse, ContentDecodeError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ContentDecodeError::Empty);
    }

    let response: AnalysisResponse = serde_json::from_str(body)?;
    Ok(response)
}

/// 解析模型输出，失败时返回兜底结果
pub fn parse_analysis(raw: &str) -> AnalysisResponse {
    match decode_analysis(raw) {
        Ok(response) => {
            debug!(
                diseases = response.possible_diseases.len(),
                precautions = response.precautions.len(),
                "Model output decoded"
            );
            response
        }
        Err(e) => {
            warn!(
                error = %e,
                content = truncate_for_log(raw, 500),
                "Model output could not be decoded, returning fallback analysis"
            );
            fallback_response()
        }
    }
}

/// 固定的兜底分析结果
pub fn fallback_response() -> AnalysisResponse {
    AnalysisResponse {
        possible_diseases: vec![Disease::new(
            "Unable to analyze",
            "unknown",
            "The system encountered an error analyzing your symptoms.",
        )],
        precautions: vec![
            "Please consult a healthcare professional".to_string(),
            "Monitor your symptoms closely".to_string(),
            "Seek immediate help if symptoms worsen".to_string(),
        ],
        when_to_seek_help: "Seek immediate medical attention if you experience severe symptoms"
            .to_string(),
        disclaimer: "This is not a medical diagnosis. Please consult a healthcare professional."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> AnalysisResponse {
        AnalysisResponse {
            possible_diseases: vec![
                Disease::new("Influenza", "high", "A contagious respiratory illness"),
                Disease::new("Common Cold", "medium", "A viral infection of the upper airways"),
            ],
            precautions: vec![
                "Get plenty of rest".to_string(),
                "Stay hydrated".to_string(),
                "Avoid close contact with others".to_string(),
                "Monitor your temperature".to_string(),
            ],
            when_to_seek_help: "Seek help if you have trouble breathing".to_string(),
            disclaimer: "This is not a medical diagnosis.".to_string(),
        }
    }

    #[test]
    fn test_valid_json_decodes_exactly() {
        let expected = sample_response();
        let raw = serde_json::to_string_pretty(&expected).unwrap();

        assert_eq!(decode_analysis(&raw).unwrap(), expected);
        assert_eq!(parse_analysis(&raw), expected);
    }

    #[test]
    fn test_fence_variants_parse_identically() {
        let expected = sample_response();
        let body = serde_json::to_string(&expected).unwrap();

        let variants = [
            body.clone(),
            format!("```json\n{}\n```", body),
            format!("```\n{}\n```", body),
            format!("```json{}", body),
            format!("{}\n```", body),
            format!("  \n```json\n{}\n```  \n", body),
            format!("```JSON\n{}\n```", body),
            format!("```Json\n{}\n```", body),
        ];

        for raw in &variants {
            assert_eq!(parse_analysis(raw), expected, "variant: {}", raw);
        }
    }

    #[test]
    fn test_strip_code_fence_idempotent() {
        let body = r#"{"a": 1}"#;
        let once = strip_code_fence("```json\n{\"a\": 1}\n```");
        assert_eq!(once, body);
        assert_eq!(strip_code_fence(once), body);
        assert_eq!(strip_code_fence(body), body);
    }

    #[test]
    fn test_prose_returns_fallback() {
        let raw = "I'm sorry, I can't provide a diagnosis. Please see a doctor.";
        assert!(decode_analysis(raw).is_err());
        assert_eq!(parse_analysis(raw), fallback_response());
    }

    #[test]
    fn test_empty_returns_fallback() {
        assert!(matches!(decode_analysis(""), Err(ContentDecodeError::Empty)));
        assert!(matches!(decode_analysis("```json\n```"), Err(ContentDecodeError::Empty)));
        assert_eq!(parse_analysis("   "), fallback_response());
    }

    #[test]
    fn test_truncated_json_returns_fallback() {
        let raw = r#"{"possible_diseases": [{"name": "Flu", "likelihood": "high""#;
        assert_eq!(parse_analysis(raw), fallback_response());
    }

    #[test]
    fn test_missing_top_level_key_returns_fallback() {
        let raw = r#"{
            "possible_diseases": [{"name": "Flu", "likelihood": "high", "description": "x"}],
            "precautions": ["Rest"],
            "disclaimer": "Not a diagnosis"
        }"#;
        assert!(decode_analysis(raw).is_err());
        assert_eq!(parse_analysis(raw), fallback_response());
    }

    #[test]
    fn test_disease_missing_field_fails_atomically() {
        let raw = r#"{
            "possible_diseases": [
                {"name": "Flu", "likelihood": "high", "description": "x"},
                {"name": "Cold", "likelihood": "low"}
            ],
            "precautions": ["Rest"],
            "when_to_seek_help": "If worse",
            "disclaimer": "Not a diagnosis"
        }"#;
        assert_eq!(parse_analysis(raw), fallback_response());
    }

    #[test]
    fn test_wrong_types_return_fallback() {
        let raw = r#"{
            "possible_diseases": [],
            "precautions": "Rest",
            "when_to_seek_help": "If worse",
            "disclaimer": "Not a diagnosis"
        }"#;
        assert_eq!(parse_analysis(raw), fallback_response());

        let raw = r#"{
            "possible_diseases": [{"name": null, "likelihood": "high", "description": "x"}],
            "precautions": [],
            "when_to_seek_help": "If worse",
            "disclaimer": "Not a diagnosis"
        }"#;
        assert_eq!(parse_analysis(raw), fallback_response());
    }

    #[test]
    fn test_json_array_returns_fallback() {
        assert_eq!(parse_analysis("[1, 2, 3]"), fallback_response());
    }

    #[test]
    fn test_unknown_fields_ignored_and_likelihood_preserved() {
        let raw = r#"{
            "possible_diseases": [
                {"name": "Migraine", "likelihood": "very likely", "description": "x", "icd10": "G43"}
            ],
            "precautions": ["Rest in a dark room"],
            "when_to_seek_help": "If vision changes",
            "disclaimer": "Not a diagnosis",
            "confidence": 0.7
        }"#;

        let response = decode_analysis(raw).unwrap();
        assert_eq!(response.possible_diseases.len(), 1);
        assert_eq!(response.possible_diseases[0].likelihood, "very likely");
        assert_eq!(response.precautions, vec!["Rest in a dark room".to_string()]);
    }

    #[test]
    fn test_fallback_contents() {
        let fallback = fallback_response();

        assert_eq!(fallback.possible_diseases.len(), 1);
        let disease = &fallback.possible_diseases[0];
        assert_eq!(disease.name, "Unable to analyze");
        assert_eq!(disease.likelihood, "unknown");
        assert_eq!(
            disease.description,
            "The system encountered an error analyzing your symptoms."
        );
        assert_eq!(
            fallback.precautions,
            vec![
                "Please consult a healthcare professional",
                "Monitor your symptoms closely",
                "Seek immediate help if symptoms worsen",
            ]
        );
        assert_eq!(
            fallback.when_to_seek_help,
            "Seek immediate medical attention if you experience severe symptoms"
        );
        assert_eq!(
            fallback.disclaimer,
            "This is not a medical diagnosis. Please consult a healthcare professional."
        );
    }
}
