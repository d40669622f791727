use crate::modules::gateway::GatewayError;
use crate::modules::normalizer::NormalizeError;
use crate::modules::toggle::ToggleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("network error: {0}")]
    Network(#[from] GatewayError),
    #[error(transparent)]
    Toggle(#[from] ToggleError),
    #[error("invalid payload: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("no payload loaded yet")]
    NotLoaded,
    #[error("dashboard store unavailable")]
    StoreUnavailable,
    /// The same failure handed to callers whose requests were merged into one.
    #[error("{0}")]
    Relayed(String),
}
