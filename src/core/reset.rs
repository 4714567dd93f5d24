use crate::domain::ports::AuthService;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{require_input, validate_new_password};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStage {
    AwaitingEmail,
    AwaitingCode,
    AwaitingNewPassword,
    Completed,
}

/// 忘記密碼流程：寄送驗證碼 → 輸入驗證碼 → 設定新密碼。
///
/// 驗證碼只在最後一步由後端檢查；`submit_code` 不發出請求。
pub struct PasswordResetFlow<A: AuthService> {
    service: A,
    min_password_length: usize,
    stage: ResetStage,
    email: Option<String>,
    code: Option<String>,
}

impl<A: AuthService> PasswordResetFlow<A> {
    pub fn new(service: A, min_password_length: usize) -> Self {
        Self {
            service,
            min_password_length,
            stage: ResetStage::AwaitingEmail,
            email: None,
            code: None,
        }
    }

    /// 從「已寄出驗證碼」的畫面恢復，不再重新寄送
    pub fn resume(service: A, min_password_length: usize, email: &str) -> Result<Self> {
        require_input("Correo electrónico", email)?;
        Ok(Self {
            service,
            min_password_length,
            stage: ResetStage::AwaitingCode,
            email: Some(email.trim().to_string()),
            code: None,
        })
    }

    pub fn stage(&self) -> ResetStage {
        self.stage
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub async fn request_code(&mut self, email: &str) -> Result<()> {
        if self.stage != ResetStage::AwaitingEmail {
            return Err(AppError::invalid_state("request_code", self.stage));
        }
        require_input("Correo electrónico", email)?;

        let email = email.trim();
        self.send_code(email).await?;

        self.email = Some(email.to_string());
        self.stage = ResetStage::AwaitingCode;
        Ok(())
    }

    pub fn submit_code(&mut self, code: &str) -> Result<()> {
        if !matches!(
            self.stage,
            ResetStage::AwaitingCode | ResetStage::AwaitingNewPassword
        ) {
            return Err(AppError::invalid_state("submit_code", self.stage));
        }
        require_input("Código", code)?;

        self.code = Some(code.trim().to_string());
        self.stage = ResetStage::AwaitingNewPassword;
        tracing::debug!("Reset code captured, awaiting new password");
        Ok(())
    }

    pub async fn reset_password(&mut self, new_password: &str, confirm_password: &str) -> Result<()> {
        if self.stage != ResetStage::AwaitingNewPassword {
            return Err(AppError::invalid_state("reset_password", self.stage));
        }
        validate_new_password(new_password, confirm_password, self.min_password_length)?;

        let (email, code) = match (self.email.as_deref(), self.code.as_deref()) {
            (Some(email), Some(code)) => (email, code),
            _ => return Err(AppError::invalid_state("reset_password", self.stage)),
        };

        tracing::info!("🔑 Submitting password reset for '{}'", email);
        self.service
            .reset_password(email, code, new_password)
            .await
            .map_err(|e| {
                tracing::warn!("❌ Password reset failed: {}", e);
                e.into_flow_error("Código inválido o expirado", |detail| {
                    AppError::ResetFailed { detail }
                })
            })?;

        tracing::info!("✅ Password reset completed");
        self.stage = ResetStage::Completed;
        self.code = None;
        Ok(())
    }

    /// 重新寄送驗證碼；不改變目前階段
    pub async fn resend_code(&mut self) -> Result<()> {
        if !matches!(
            self.stage,
            ResetStage::AwaitingCode | ResetStage::AwaitingNewPassword
        ) {
            return Err(AppError::invalid_state("resend_code", self.stage));
        }
        let email = self
            .email
            .clone()
            .ok_or_else(|| AppError::invalid_state("resend_code", self.stage))?;

        self.send_code(&email).await
    }

    async fn send_code(&self, email: &str) -> Result<()> {
        tracing::info!("📧 Requesting reset code for '{}'", email);
        self.service.forgot_password(email).await.map_err(|e| {
            tracing::warn!("❌ Reset code request failed: {}", e);
            e.into_flow_error("No se pudo enviar el código", |detail| {
                AppError::RequestFailed { detail }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EntityId, LoginStep1Response, LoginStep2Response};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockAuthService {
        valid_code: Option<String>,
        forgot_fails: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockAuthService {
        fn accepting(code: &str) -> Self {
            Self {
                valid_code: Some(code.to_string()),
                ..Default::default()
            }
        }

        async fn calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl AuthService for MockAuthService {
        async fn login_step1(&self, _username: &str, _password: &str) -> Result<LoginStep1Response> {
            unreachable!("not used by the reset flow")
        }

        async fn login_step2(
            &self,
            _merchant_id: &EntityId,
            _clerk_id: &EntityId,
            _pin: &str,
        ) -> Result<LoginStep2Response> {
            unreachable!("not used by the reset flow")
        }

        async fn forgot_password(&self, email: &str) -> Result<()> {
            self.calls.lock().await.push(format!("forgot:{}", email));
            if self.forgot_fails {
                return Err(AppError::Api {
                    status: 404,
                    detail: Some("Usuario no encontrado".to_string()),
                });
            }
            Ok(())
        }

        async fn reset_password(&self, email: &str, reset_code: &str, _new_password: &str) -> Result<()> {
            self.calls
                .lock()
                .await
                .push(format!("reset:{}:{}", email, reset_code));
            if self.valid_code.as_deref() == Some(reset_code) {
                Ok(())
            } else {
                Err(AppError::Api {
                    status: 400,
                    detail: Some("Código inválido o expirado".to_string()),
                })
            }
        }
    }

    async fn flow_at_new_password(service: &MockAuthService) -> PasswordResetFlow<MockAuthService> {
        let mut flow = PasswordResetFlow::new(service.clone(), 6);
        flow.request_code("a@b.com").await.unwrap();
        flow.submit_code("123456").unwrap();
        flow
    }

    #[tokio::test]
    async fn test_happy_path_reaches_completed() {
        let service = MockAuthService::accepting("123456");
        let mut flow = PasswordResetFlow::new(service.clone(), 6);

        flow.request_code("a@b.com").await.unwrap();
        assert_eq!(flow.stage(), ResetStage::AwaitingCode);
        flow.submit_code("123456").unwrap();
        assert_eq!(flow.stage(), ResetStage::AwaitingNewPassword);
        flow.reset_password("newpass1", "newpass1").await.unwrap();
        assert_eq!(flow.stage(), ResetStage::Completed);

        assert_eq!(
            service.calls().await,
            vec!["forgot:a@b.com", "reset:a@b.com:123456"]
        );
    }

    #[tokio::test]
    async fn test_blank_email_makes_no_call() {
        let service = MockAuthService::default();
        let mut flow = PasswordResetFlow::new(service.clone(), 6);

        let err = flow.request_code("   ").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
        assert_eq!(flow.stage(), ResetStage::AwaitingEmail);
        assert!(service.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_request_failure_keeps_stage_and_detail() {
        let service = MockAuthService {
            forgot_fails: true,
            ..Default::default()
        };
        let mut flow = PasswordResetFlow::new(service, 6);

        match flow.request_code("nadie@b.com").await.unwrap_err() {
            AppError::RequestFailed { detail } => assert_eq!(detail, "Usuario no encontrado"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(flow.stage(), ResetStage::AwaitingEmail);
    }

    #[tokio::test]
    async fn test_short_password_makes_no_call() {
        let service = MockAuthService::accepting("123456");
        let mut flow = flow_at_new_password(&service).await;

        let err = flow.reset_password("abc12", "abc12").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
        assert_eq!(flow.stage(), ResetStage::AwaitingNewPassword);
        assert_eq!(service.calls().await, vec!["forgot:a@b.com"]);
    }

    #[tokio::test]
    async fn test_mismatched_password_makes_no_call() {
        let service = MockAuthService::accepting("123456");
        let mut flow = flow_at_new_password(&service).await;

        let err = flow.reset_password("abcdef", "xyz123").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError { .. }));
        assert_eq!(service.calls().await, vec!["forgot:a@b.com"]);
    }

    #[tokio::test]
    async fn test_reset_failure_allows_retry_with_corrected_code() {
        let service = MockAuthService::accepting("654321");
        let mut flow = flow_at_new_password(&service).await;

        let err = flow.reset_password("newpass1", "newpass1").await.unwrap_err();
        assert!(matches!(err, AppError::ResetFailed { .. }));
        assert_eq!(flow.stage(), ResetStage::AwaitingNewPassword);

        flow.submit_code("654321").unwrap();
        flow.reset_password("newpass1", "newpass1").await.unwrap();
        assert_eq!(flow.stage(), ResetStage::Completed);
    }

    #[tokio::test]
    async fn test_resend_code_keeps_stage() {
        let service = MockAuthService::accepting("123456");
        let mut flow = PasswordResetFlow::new(service.clone(), 6);
        flow.request_code("a@b.com").await.unwrap();

        flow.resend_code().await.unwrap();
        assert_eq!(flow.stage(), ResetStage::AwaitingCode);

        flow.submit_code("123456").unwrap();
        flow.resend_code().await.unwrap();
        assert_eq!(flow.stage(), ResetStage::AwaitingNewPassword);
        assert_eq!(service.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_resume_starts_at_code_entry_without_sending() {
        let service = MockAuthService::accepting("123456");
        let mut flow = PasswordResetFlow::resume(service.clone(), 6, " a@b.com ").unwrap();
        assert_eq!(flow.stage(), ResetStage::AwaitingCode);
        assert_eq!(flow.email(), Some("a@b.com"));

        flow.submit_code("123456").unwrap();
        flow.reset_password("newpass1", "newpass1").await.unwrap();
        assert_eq!(service.calls().await, vec!["reset:a@b.com:123456"]);
    }

    #[tokio::test]
    async fn test_out_of_order_calls_are_rejected() {
        let service = MockAuthService::default();
        let mut flow = PasswordResetFlow::new(service.clone(), 6);

        assert!(matches!(
            flow.submit_code("123456"),
            Err(AppError::InvalidState { .. })
        ));
        assert!(matches!(
            flow.resend_code().await,
            Err(AppError::InvalidState { .. })
        ));
        assert!(matches!(
            flow.reset_password("newpass1", "newpass1").await,
            Err(AppError::InvalidState { .. })
        ));
        assert!(service.calls().await.is_empty());
    }
}
