/// Context for every failure below the route layer that is not a business rejection.
#[derive(Debug, thiserror::Error)]
#[error("tracker service failed")]
pub struct TrackerServiceError;
