use crate::transport::TransportError;
use switchboard_events::RoutingConflict;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("routing conflict: {0}")]
    RoutingConflict(#[from] RoutingConflict),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, BusError>;

/// A listener failed during local dispatch. Logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("listener returned an error: {0:#}")]
    Failed(anyhow::Error),

    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        HandlerError::Panicked(message)
    }
}
