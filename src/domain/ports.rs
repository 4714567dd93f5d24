use crate::domain::model::{
    AccessToken, EntityId, LoginStep1Response, LoginStep2Response, TutorialDocument,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn user_agent(&self) -> &str;
    fn default_pin(&self) -> &str;
    fn min_password_length(&self) -> usize;
    fn owner_role(&self) -> &str;
    fn step_markers(&self) -> &[String];
}

/// 認證服務的各個端點。實作只負責傳輸，不保存任何憑證。
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login_step1(&self, username: &str, password: &str) -> Result<LoginStep1Response>;

    async fn login_step2(
        &self,
        merchant_id: &EntityId,
        clerk_id: &EntityId,
        pin: &str,
    ) -> Result<LoginStep2Response>;

    async fn forgot_password(&self, email: &str) -> Result<()>;

    async fn reset_password(&self, email: &str, reset_code: &str, new_password: &str)
        -> Result<()>;
}

#[async_trait]
pub trait TrainingSource: Send + Sync {
    async fn fetch_training(
        &self,
        id: &str,
        token: Option<&AccessToken>,
    ) -> Result<TutorialDocument>;
}
