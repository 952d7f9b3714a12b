//! 提示词构建

use std::fmt::Write;

use symptom_core::SymptomRequest;

/// 固定的系统指令
pub const SYSTEM_PROMPT: &str = "You are a helpful medical assistant that analyzes symptoms and provides structured health information. Always respond with valid JSON only.";

/// 期望的输出格式
const RESPONSE_TEMPLATE: &str = r#"{
  "possible_diseases": [
    {
      "name": "disease name",
      "likelihood": "high/medium/low",
      "description": "brief description of the condition"
    }
  ],
  "precautions": [
    "precaution 1",
    "precaution 2",
    "precaution 3"
  ],
  "when_to_seek_help": "description of when to seek immediate medical attention",
  "disclaimer": "This is not a medical diagnosis. Please consult a healthcare professional for proper evaluation."
}"#;

const GUIDELINES: &str = "Important:
- Provide 2-4 possible diseases ranked by likelihood
- Each disease should have a clear description
- Provide 4-6 practical precautions
- Be clear about when to seek immediate medical help
- Always include the disclaimer";

/// 渲染完成的提示词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// 根据请求构建提示词
///
/// 纯函数：相同输入得到相同输出。未提供的可选字段不出现在提示词中。
pub fn build_prompt(request: &SymptomRequest) -> Prompt {
    let mut user = String::from(
        "You are a medical symptom analysis assistant. Analyze the following symptoms and provide a structured response.\n\n",
    );

    // 写入 String 不会失败
    let _ = writeln!(user, "Symptoms: {}", request.symptoms);
    if let Some(age) = request.age {
        let _ = writeln!(user, "Age: {}", age);
    }
    if let Some(gender) = &request.gender {
        let _ = writeln!(user, "Gender: {}", gender);
    }
    if let Some(duration) = &request.duration {
        let _ = writeln!(user, "Duration: {}", duration);
    }

    user.push_str(
        "\nProvide your response in the following JSON format ONLY (no additional text, no markdown formatting):\n",
    );
    user.push_str(RESPONSE_TEMPLATE);
    user.push_str("\n\n");
    user.push_str(GUIDELINES);

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_rendered() {
        let request = SymptomRequest::new(
            "headache, fever, cough",
            Some(25),
            Some("male".to_string()),
            Some("3 days".to_string()),
        );

        let prompt = build_prompt(&request);
        assert_eq!(prompt.system, SYSTEM_PROMPT);
        assert!(prompt.user.contains("Symptoms: headache, fever, cough\n"));
        assert!(prompt.user.contains("Age: 25\n"));
        assert!(prompt.user.contains("Gender: male\n"));
        assert!(prompt.user.contains("Duration: 3 days\n"));
    }

    #[test]
    fn test_absent_fields_omitted() {
        let request = SymptomRequest::from_symptoms("sore throat");
        let prompt = build_prompt(&request);

        assert!(prompt.user.contains("sore throat"));
        assert!(!prompt.user.contains("Age:"));
        assert!(!prompt.user.contains("Gender:"));
        assert!(!prompt.user.contains("Duration:"));
    }

    #[test]
    fn test_zero_age_is_rendered() {
        let request = SymptomRequest::new("rash", Some(0), None, None);
        let prompt = build_prompt(&request);
        assert!(prompt.user.contains("Age: 0\n"));
    }

    #[test]
    fn test_template_and_guidelines_present() {
        let prompt = build_prompt(&SymptomRequest::from_symptoms("cough"));

        for key in ["possible_diseases", "precautions", "when_to_seek_help", "disclaimer"] {
            assert!(prompt.user.contains(key), "missing key {}", key);
        }
        assert!(prompt.user.contains("2-4 possible diseases"));
        assert!(prompt.user.contains("4-6 practical precautions"));
    }

    #[test]
    fn test_deterministic() {
        let request = SymptomRequest::new("nausea", Some(40), None, Some("1 week".to_string()));
        assert_eq!(build_prompt(&request), build_prompt(&request));
    }
}
