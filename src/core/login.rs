use crate::domain::model::{
    AccessToken, AccountSelection, AuthenticatedSession, Clerk, LoginStep1Response,
};
use crate::domain::ports::{AuthService, ConfigProvider};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::require_input;
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    AwaitingCredentials,
    AwaitingPinSelection,
    Authenticated,
}

#[derive(Debug, Clone)]
pub struct LoginOptions {
    pub default_pin: String,
    pub owner_role: String,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            default_pin: "1234".to_string(),
            owner_role: "owner".to_string(),
        }
    }
}

impl LoginOptions {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            default_pin: config.default_pin().to_string(),
            owner_role: config.owner_role().to_string(),
        }
    }
}

/// 兩步驟登入：帳號密碼 → PIN。
///
/// 只有在成功回應後才會前進到下一個階段；任何失敗都保留目前階段並回傳錯誤。
/// 憑證只在抵達 `Authenticated` 時交回呼叫端，流程本身不保存也不附加到其他請求。
pub struct LoginFlow<A: AuthService> {
    service: A,
    options: LoginOptions,
    stage: LoginStage,
    username: Option<String>,
    selection: Option<AccountSelection>,
    session: Option<AuthenticatedSession>,
}

impl<A: AuthService> LoginFlow<A> {
    pub fn new(service: A, options: LoginOptions) -> Self {
        Self {
            service,
            options,
            stage: LoginStage::AwaitingCredentials,
            username: None,
            selection: None,
            session: None,
        }
    }

    pub fn stage(&self) -> LoginStage {
        self.stage
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn selection(&self) -> Option<&AccountSelection> {
        self.selection.as_ref()
    }

    pub fn session(&self) -> Option<&AuthenticatedSession> {
        self.session.as_ref()
    }

    pub fn into_session(self) -> Option<AuthenticatedSession> {
        self.session
    }

    pub fn reset(&mut self) {
        self.stage = LoginStage::AwaitingCredentials;
        self.username = None;
        self.selection = None;
        self.session = None;
    }

    pub async fn submit_credentials(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<&AccountSelection> {
        if self.stage != LoginStage::AwaitingCredentials {
            return Err(AppError::invalid_state("submit_credentials", self.stage));
        }
        require_input("Usuario", username)?;
        require_input("Contraseña", password)?;

        let username = username.trim();
        tracing::info!("🔐 Login step 1 for '{}'", username);

        let response = self
            .service
            .login_step1(username, password)
            .await
            .map_err(|e| {
                tracing::warn!("❌ Login step 1 failed: {}", e);
                e.into_flow_error("Usuario o contraseña incorrectos", |detail| {
                    AppError::InvalidCredentials { detail }
                })
            })?;

        let selection = select_account(response, &self.options.owner_role)?;
        tracing::info!(
            "✅ Selected merchant {} / clerk {}",
            selection.merchant.id,
            selection.clerk.id
        );

        self.username = Some(username.to_string());
        self.stage = LoginStage::AwaitingPinSelection;
        Ok(self.selection.insert(selection))
    }

    pub async fn submit_pin(&mut self, pin: &str) -> Result<AuthenticatedSession> {
        if self.stage != LoginStage::AwaitingPinSelection {
            return Err(AppError::invalid_state("submit_pin", self.stage));
        }
        require_input("PIN", pin)?;

        let selection = self
            .selection
            .as_ref()
            .ok_or_else(|| AppError::invalid_state("submit_pin", self.stage))?;

        tracing::info!("🔐 Login step 2 for merchant {}", selection.merchant.id);

        let response = self
            .service
            .login_step2(&selection.merchant.id, &selection.clerk.id, pin.trim())
            .await
            .map_err(|e| {
                tracing::warn!("❌ Login step 2 failed: {}", e);
                e.into_flow_error("PIN incorrecto", |detail| AppError::InvalidPin { detail })
            })?;

        if response.access_token.trim().is_empty() {
            return Err(AppError::InvalidPin {
                detail: "El servidor no devolvió un token de acceso".to_string(),
            });
        }

        let session = AuthenticatedSession {
            access_token: AccessToken::new(response.access_token),
            token_type: response.token_type.unwrap_or_else(|| "bearer".to_string()),
            merchant_id: selection.merchant.id.clone(),
            clerk_id: selection.clerk.id.clone(),
            admin_id: selection.admin_id.clone(),
            user: response.user,
            authenticated_at: Utc::now(),
        };

        tracing::info!("✅ Authenticated for merchant {}", session.merchant_id);
        self.stage = LoginStage::Authenticated;
        self.session = Some(session.clone());
        Ok(session)
    }

    /// 目前的登入畫面不詢問商家或 PIN：自動選擇並使用預設 PIN
    pub async fn login(&mut self, username: &str, password: &str) -> Result<AuthenticatedSession> {
        self.submit_credentials(username, password).await?;
        let pin = self.options.default_pin.clone();
        self.submit_pin(&pin).await
    }
}

/// 選第一個商家；在其店員中優先選 owner，否則選第一位
pub fn select_account(response: LoginStep1Response, owner_role: &str) -> Result<AccountSelection> {
    let detail = response
        .message
        .clone()
        .unwrap_or_else(|| "Usuario o contraseña incorrectos".to_string());

    if !response.success || response.merchants.is_empty() {
        return Err(AppError::InvalidCredentials { detail });
    }

    let LoginStep1Response {
        mut merchants,
        clerks,
        admin_id,
        ..
    } = response;
    let merchant = merchants.swap_remove(0);

    let candidates: Vec<Clerk> = clerks
        .into_iter()
        .filter(|c| c.merchant_id.as_ref().map_or(true, |id| *id == merchant.id))
        .collect();

    let clerk = candidates
        .iter()
        .find(|c| c.has_role(owner_role))
        .or_else(|| candidates.first())
        .cloned()
        .ok_or_else(|| AppError::NoOwnerAccess {
            detail: format!("No hay usuarios asociados al comercio {}", merchant.id),
        })?;

    Ok(AccountSelection {
        merchant,
        clerk,
        admin_id,
    })
}
