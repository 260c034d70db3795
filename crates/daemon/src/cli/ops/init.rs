use clap::Args;

use nouns_daemon::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Port the daemon listens on
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Default log level of the daemon
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] nouns_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            port: self.port,
            log_level: self.log_level.clone(),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized nouns directory at: {}\n\
             - Database: {}\n\
             - Config: {}\n\
             - Port: {}\n\
             - Log level: {}",
            state.nouns_dir.display(),
            state.db_path.display(),
            state.config_path.display(),
            state.config.port,
            state.config.log_level,
        );

        Ok(output)
    }
}
