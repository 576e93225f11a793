use switchboard_bus::BusError;
use switchboard_environment::EnvironmentError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

pub type Result<T> = std::result::Result<T, AppError>;
