use crate::adapters::http::{DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT};
use crate::core::steps::DEFAULT_STEP_MARKERS;
use crate::core::ConfigProvider;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub tutorial: TutorialConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub default_pin: String,
    pub min_password_length: usize,
    pub owner_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_pin: "1234".to_string(),
            min_password_length: 6,
            owner_role: "owner".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorialConfig {
    pub step_markers: Vec<String>,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            step_markers: DEFAULT_STEP_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${YAPPA_API_URL})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_positive_number(
            "api.timeout_seconds",
            self.api.timeout_seconds as usize,
            1,
        )?;
        validation::validate_numeric("auth.default_pin", &self.auth.default_pin)?;
        validation::validate_positive_number(
            "auth.min_password_length",
            self.auth.min_password_length,
            1,
        )?;
        validation::validate_non_empty_string("auth.owner_role", &self.auth.owner_role)?;

        if self
            .tutorial
            .step_markers
            .iter()
            .all(|m| m.trim().is_empty())
        {
            return Err(AppError::InvalidConfigValueError {
                field: "tutorial.step_markers".to_string(),
                value: format!("{:?}", self.tutorial.step_markers),
                reason: "At least one non-empty marker is required".to_string(),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds
    }

    fn user_agent(&self) -> &str {
        self.api.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn default_pin(&self) -> &str {
        &self.auth.default_pin
    }

    fn min_password_length(&self) -> usize {
        self.auth.min_password_length
    }

    fn owner_role(&self) -> &str {
        &self.auth.owner_role
    }

    fn step_markers(&self) -> &[String] {
        &self.tutorial.step_markers
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
