use crate::error::TrackerServiceError;
use error_stack::Report;

pub type ServiceResult<T> = Result<T, Report<TrackerServiceError>>;
pub type OptServiceResult<T> = Result<Option<T>, Report<TrackerServiceError>>;

pub mod auth;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod service;
pub mod state;
