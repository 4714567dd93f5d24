use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API responded with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid credentials: {detail}")]
    InvalidCredentials { detail: String },

    #[error("No owner access: {detail}")]
    NoOwnerAccess { detail: String },

    #[error("Invalid PIN: {detail}")]
    InvalidPin { detail: String },

    #[error("Request failed: {detail}")]
    RequestFailed { detail: String },

    #[error("Password reset failed: {detail}")]
    ResetFailed { detail: String },

    #[error("Operation '{operation}' not allowed in stage {stage}")]
    InvalidState { operation: String, stage: String },
}

pub type Result<T> = std::result::Result<T, AppError>;

pub const CONNECTION_FAILED: &str = "No se pudo conectar con el servidor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Validation,
    Configuration,
    Data,
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn invalid_state(operation: &str, stage: impl std::fmt::Debug) -> Self {
        Self::InvalidState {
            operation: operation.to_string(),
            stage: format!("{:?}", stage),
        }
    }

    /// 後端回傳的錯誤細節（若無則為 None）
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Api { detail, .. } => detail.clone(),
            Self::InvalidCredentials { detail }
            | Self::NoOwnerAccess { detail }
            | Self::InvalidPin { detail }
            | Self::RequestFailed { detail }
            | Self::ResetFailed { detail } => Some(detail.clone()),
            Self::ValidationError { message } => Some(message.clone()),
            _ => None,
        }
    }

    /// 傳輸層失敗（逾時、連線中斷），與後端明確拒絕區分
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Io(_))
    }

    /// 將服務層錯誤轉為流程錯誤：傳輸失敗一律視為 RequestFailed，
    /// 其餘交給 `rejected` 建構對應的流程錯誤。
    pub fn into_flow_error(self, generic: &str, rejected: fn(String) -> AppError) -> AppError {
        if self.is_transport() {
            return AppError::RequestFailed {
                detail: CONNECTION_FAILED.to_string(),
            };
        }
        rejected(self.detail().unwrap_or_else(|| generic.to_string()))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::Io(_) | Self::RequestFailed { .. } => ErrorCategory::Network,
            Self::Api { .. } | Self::Serialization(_) => ErrorCategory::Data,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::InvalidCredentials { .. }
            | Self::NoOwnerAccess { .. }
            | Self::InvalidPin { .. }
            | Self::ResetFailed { .. } => ErrorCategory::Authentication,
            Self::InvalidState { .. } => ErrorCategory::Flow,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Authentication | ErrorCategory::Data | ErrorCategory::Flow => {
                ErrorSeverity::High
            }
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => message.clone(),
            Self::InvalidCredentials { detail } => {
                format!("Usuario o contraseña incorrectos ({})", detail)
            }
            Self::NoOwnerAccess { .. } => {
                "Esta cuenta no tiene un usuario con acceso al comercio".to_string()
            }
            Self::InvalidPin { .. } => "PIN incorrecto".to_string(),
            Self::ResetFailed { detail } => {
                format!("No se pudo cambiar la contraseña ({})", detail)
            }
            Self::RequestFailed { detail } => format!("Error de conexión ({})", detail),
            Self::InvalidState { .. } => "Paso no disponible en este momento".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => format!("Configuración inválida: {}", self),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the network connection and the api.base_url setting",
            ErrorCategory::Authentication => "Verify the credentials or request a new reset code",
            ErrorCategory::Validation => "Correct the highlighted input and try again",
            ErrorCategory::Configuration => "Review the TOML configuration file and CLI flags",
            ErrorCategory::Data => "The backend returned an unexpected response; try again later",
            ErrorCategory::Flow => "Restart the flow from the first step",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_map_to_request_failed() {
        let io = AppError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "timed out",
        ));
        let mapped = io.into_flow_error("login failed", |detail| AppError::InvalidCredentials {
            detail,
        });
        match mapped {
            AppError::RequestFailed { detail } => assert_eq!(detail, CONNECTION_FAILED),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_errors_keep_backend_detail() {
        let api = AppError::Api {
            status: 401,
            detail: Some("Credenciales inválidas".to_string()),
        };
        let mapped = api.into_flow_error("login failed", |detail| AppError::InvalidCredentials {
            detail,
        });
        match mapped {
            AppError::InvalidCredentials { detail } => assert_eq!(detail, "Credenciales inválidas"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_errors_without_detail_use_generic_message() {
        let api = AppError::Api {
            status: 500,
            detail: None,
        };
        let mapped = api.into_flow_error("reset failed", |detail| AppError::ResetFailed { detail });
        assert_eq!(mapped.detail().as_deref(), Some("reset failed"));
    }

    #[test]
    fn test_severity_ordering() {
        assert_eq!(
            AppError::validation("x").severity(),
            ErrorSeverity::Low
        );
        assert_eq!(
            AppError::ConfigError {
                message: "api.base_url".into()
            }
            .severity(),
            ErrorSeverity::Critical
        );
    }
}
