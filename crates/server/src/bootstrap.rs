use bluelight_core::config::{AppConfig, ConfigError};
use bluelight_core::{FetchCoordinator, FetchError, StatusFetcher};
use bluelight_slack::DeployStatusHandler;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub handler: DeployStatusHandler,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("status client initialization failed: {0}")]
    StatusClient(#[source] FetchError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let fetcher = StatusFetcher::from_config(&config).map_err(BootstrapError::StatusClient)?;
    info!(
        event_name = "system.bootstrap.status_client_ready",
        correlation_id = "bootstrap",
        timeout_secs = config.fetch.timeout_secs,
        "status client initialized"
    );

    let handler = DeployStatusHandler::new(FetchCoordinator::new(fetcher));
    Ok(Application { config, handler })
}
