pub mod login;
pub mod reset;
pub mod steps;
pub mod tutorial;

pub use crate::domain::model::{
    AccessToken, AccountSelection, AuthenticatedSession, TutorialChecklist, TutorialDocument,
    TutorialStep,
};
pub use crate::domain::ports::{AuthService, ConfigProvider, TrainingSource};
pub use crate::utils::error::Result;
