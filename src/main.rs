use clap::Parser;
use yappa_client::core::ConfigProvider;
use yappa_client::utils::error::ErrorSeverity;
use yappa_client::utils::{logger, validation::Validate};
use yappa_client::{
    AccessToken, ApiClient, AppConfig, AppError, CliConfig, Command, LoginFlow, LoginOptions,
    PasswordResetFlow, Result, StepExtractor, TutorialService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(3);
        }
    };

    logger::init_cli_logger(config.logging.verbose, config.logging.json);
    tracing::info!("Starting yappa CLI");
    tracing::debug!("API base URL: {}", config.api_base_url());

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    match run(&cli.command, &config).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 2,
                ErrorSeverity::Medium => 4,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(command: &Command, config: &AppConfig) -> Result<String> {
    let client = ApiClient::from_config(config)?;

    match command {
        Command::Steps {
            file,
            training_id,
            token,
        } => {
            let extractor = StepExtractor::from_config(config)?;
            if let Some(path) = file {
                let content = std::fs::read_to_string(path)?;
                let steps = extractor.extract(&content);
                return Ok(serde_json::to_string_pretty(&steps)?);
            }

            let id = training_id
                .as_deref()
                .ok_or_else(|| AppError::validation("--file or --training-id is required"))?;
            let token = token.as_deref().map(AccessToken::new);
            let service = TutorialService::new(client, extractor);
            let checklist = service.checklist(id, token.as_ref()).await?;
            Ok(serde_json::to_string_pretty(&checklist)?)
        }

        Command::Login {
            username,
            password,
            pin,
        } => {
            let mut flow = LoginFlow::new(client, LoginOptions::from_config(config));
            let session = match pin {
                Some(pin) => {
                    flow.submit_credentials(username, password).await?;
                    flow.submit_pin(pin).await?
                }
                None => flow.login(username, password).await?,
            };
            Ok(serde_json::to_string_pretty(&session)?)
        }

        Command::ForgotPassword { email } => {
            let mut flow = PasswordResetFlow::new(client, config.min_password_length());
            flow.request_code(email).await?;
            Ok(format!("📧 Reset code sent to {}", email.trim()))
        }

        Command::ResetPassword {
            email,
            code,
            new_password,
            confirm_password,
        } => {
            let mut flow = PasswordResetFlow::resume(client, config.min_password_length(), email)?;
            flow.submit_code(code)?;
            flow.reset_password(new_password, confirm_password).await?;
            Ok("✅ Password updated".to_string())
        }
    }
}
