pub mod toml_config;

pub use toml_config::AppConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
pub const DEFAULT_CONFIG_FILE: &str = "yappa.toml";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "yappa")]
#[command(about = "Yappa/StreetBiz client: login, password recovery and tutorial checklists")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override api.base_url from the config file
    #[arg(long)]
    pub api_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Extract checklist steps from a local markdown file or a remote training
    Steps {
        #[arg(long, conflicts_with = "training_id", required_unless_present = "training_id")]
        file: Option<PathBuf>,

        #[arg(long)]
        training_id: Option<String>,

        /// Bearer token attached to the training request
        #[arg(long)]
        token: Option<String>,
    },

    /// Log in and print the session as JSON
    Login {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        /// PIN for step 2; defaults to auth.default_pin
        #[arg(long)]
        pin: Option<String>,
    },

    /// Ask the backend to email a reset code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Set a new password using an emailed reset code
    ResetPassword {
        #[arg(long)]
        email: String,

        #[arg(long)]
        code: String,

        #[arg(long)]
        new_password: String,

        #[arg(long)]
        confirm_password: String,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔並套用命令列覆蓋；未指定且預設檔不存在時使用內建預設值
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                AppConfig::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => AppConfig::default(),
        };

        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        config.logging.verbose |= self.verbose;
        config.logging.json |= self.json_logs;

        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_overrides_file_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nbase_url = \"https://file.yappa.example\"\n")
            .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "yappa",
            "--config",
            path.as_str(),
            "--api-url",
            "https://cli.yappa.example",
            "--verbose",
            "forgot-password",
            "--email",
            "a@b.com",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.api.base_url, "https://cli.yappa.example");
        assert!(config.logging.verbose);
        assert!(matches!(cli.command, Command::ForgotPassword { .. }));
    }

    #[test]
    fn test_steps_requires_a_source() {
        assert!(CliConfig::try_parse_from(["yappa", "steps"]).is_err());
        assert!(CliConfig::try_parse_from(["yappa", "steps", "--training-id", "3"]).is_ok());
    }
}
