pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::ApiClient;
pub use config::AppConfig;
pub use crate::core::{
    login::{LoginFlow, LoginOptions, LoginStage},
    reset::{PasswordResetFlow, ResetStage},
    steps::{extract_steps, StepExtractor},
    tutorial::TutorialService,
};
pub use domain::model::{AccessToken, AuthenticatedSession, TutorialStep};
pub use utils::error::{AppError, Result};
