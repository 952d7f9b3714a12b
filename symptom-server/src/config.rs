//! 配置管理
//!
//! 配置来源按优先级从低到高：内置默认值、配置文件、`SYMPTOM__*` 环境变量、
//! 兼容变量 `GROQ_API_KEY` / `DATABASE_URL`，最后是命令行参数。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use symptom_core::{
    utils::redact_secret, CompletionSettings, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
use symptom_database::DatabaseSettings;
use symptom_integration::{AuthenticationConfig, ConnectorConfig, DEFAULT_BASE_URL};
use tracing::{error, info};

/// 服务完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 大模型配置
    pub llm: LlmConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听主机
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// CORS允许的源，`*` 表示任意
    pub cors_allowed_origins: Vec<String>,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 连接字符串
    pub url: String,
    /// 最大连接数
    pub max_connections: u32,
    /// 获取连接超时（秒）
    pub acquire_timeout_secs: u64,
    /// 启动时自动建表
    pub auto_migrate: bool,
}

/// 大模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI 兼容接口地址
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或过滤表达式
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let settings = DatabaseSettings::default();
        Self {
            url: settings.url,
            max_connections: settings.max_connections,
            acquire_timeout_secs: settings.acquire_timeout_secs,
            auto_migrate: true,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn settings(&self) -> DatabaseSettings {
        DatabaseSettings {
            url: self.url.clone(),
            max_connections: self.max_connections,
            acquire_timeout_secs: self.acquire_timeout_secs,
        }
    }
}

impl LlmConfig {
    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub fn connector_config(&self) -> ConnectorConfig {
        ConnectorConfig {
            name: "llm".to_string(),
            endpoint: self.base_url.clone(),
            authentication: AuthenticationConfig::BearerToken {
                token: self.api_key.clone(),
            },
            timeout_secs: self.timeout_secs,
        }
    }
}

impl ServiceConfig {
    /// 加载配置
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("SYMPTOM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins"),
            )
            .set_override_option("llm.api_key", std::env::var("GROQ_API_KEY").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// 命令行参数覆盖
    pub fn apply_overrides(
        &mut self,
        host: Option<String>,
        port: Option<u16>,
        log_level: Option<String>,
    ) {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
    }

    /// 输出生效配置，密钥脱敏
    pub fn log_summary(&self) {
        info!("Symptom checker configuration:");
        info!("  Listen address: {}:{}", self.server.host, self.server.port);
        info!("  CORS origins: {:?}", self.server.cors_allowed_origins);
        info!("  LLM endpoint: {}", self.llm.base_url);
        info!("  LLM model: {}", self.llm.model);
        info!("  LLM api key: {}", redact_secret(&self.llm.api_key));
        info!("  Database pool size: {}", self.database.max_connections);
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&ServiceConfig) -> Result<()>,
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "llm.api_key",
                validator: |config| {
                    if config.llm.api_key.trim().is_empty() {
                        Err(anyhow::anyhow!(
                            "GROQ_API_KEY not found in environment variables or configuration"
                        ))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "server.port",
                validator: |config| {
                    if config.server.port == 0 {
                        Err(anyhow::anyhow!("Server port cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "database.max_connections",
                validator: |config| {
                    if config.database.max_connections == 0 {
                        Err(anyhow::anyhow!("Database max connections cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "llm.temperature",
                validator: |config| {
                    if (0.0..=2.0).contains(&config.llm.temperature) {
                        Ok(())
                    } else {
                        Err(anyhow::anyhow!("Temperature must be between 0.0 and 2.0"))
                    }
                },
            },
            ValidationRule {
                field_path: "llm.max_tokens",
                validator: |config| {
                    if config.llm.max_tokens == 0 {
                        Err(anyhow::anyhow!("Max tokens cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "llm.timeout_secs",
                validator: |config| {
                    if config.llm.timeout_secs == 0 {
                        Err(anyhow::anyhow!("LLM timeout cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &ServiceConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("Invalid {}: {}", rule.field_path, e));
            }
        }

        info!("Configuration validation passed");
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.llm.api_key = "gsk_test".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert!(config.database.auto_migrate);
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let validator = ConfigValidator::new();
        let err = validator.validate(&ServiceConfig::default()).unwrap_err();
        assert!(err.to_string().contains("llm.api_key"));

        assert!(validator.validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let validator = ConfigValidator::new();

        let mut config = valid_config();
        config.server.port = 0;
        assert!(validator.validate(&config).is_err());

        let mut config = valid_config();
        config.llm.temperature = 3.5;
        assert!(validator.validate(&config).is_err());

        let mut config = valid_config();
        config.llm.max_tokens = 0;
        assert!(validator.validate(&config).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = valid_config();
        config.apply_overrides(Some("127.0.0.1".to_string()), Some(9000), None);

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("symptom-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[server]
port = 8123
cors_allowed_origins = ["https://example.org"]

[llm]
model = "llama-3.1-8b-instant"
max_tokens = 512
"#,
        )
        .unwrap();

        let config = ServiceConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.cors_allowed_origins, vec!["https://example.org"]);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.max_tokens, 512);
        // 文件未设置的字段保持默认
        assert_eq!(config.server.host, "0.0.0.0");
        assert!((config.llm.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_conversions() {
        let config = valid_config();

        let settings = config.llm.completion_settings();
        assert_eq!(settings, CompletionSettings::default());

        let connector = config.llm.connector_config();
        assert_eq!(connector.endpoint, DEFAULT_BASE_URL);
        assert_eq!(connector.timeout_secs, 60);

        let db = config.database.settings();
        assert_eq!(db.max_connections, config.database.max_connections);
    }
}
