//! Services sit between the routes and the repositories.
//!
//! A service call has three kinds of result. A repository failure is an `Err` and ends up as a
//! logged 500. A business rule that the caller broke is `Ok(Outcome::Rejected(..))`. Everything
//! else is `Ok(Outcome::Done(..))`.
use std::borrow::Cow;
use tracker_core::validation::FieldError;

mod achievements;
mod defects;
mod projects;
mod reviews;

pub use achievements::AchievementService;
pub use defects::DefectService;
pub use projects::ProjectService;
pub use reviews::ReviewService;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Rejected(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(t) => Outcome::Done(f(t)),
            Outcome::Rejected(r) => Outcome::Rejected(r),
        }
    }
}

impl<T> From<Rejection> for Outcome<T> {
    fn from(value: Rejection) -> Self {
        Outcome::Rejected(value)
    }
}

/// Why a request was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Invalid(Vec<FieldError>),
    Conflict(Cow<'static, str>),
    BadRequest(Cow<'static, str>),
    /// Names the kind of thing that was missing, e.g. "Defect".
    NotFound(&'static str),
    Unauthorized(Cow<'static, str>),
}

impl From<Vec<FieldError>> for Rejection {
    fn from(value: Vec<FieldError>) -> Self {
        Rejection::Invalid(value)
    }
}

/// Unwraps a `Result<T, R>` where `R` converts into a [`Rejection`], returning the rejection as an
/// outcome from the enclosing function.
macro_rules! accept {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(rejection) => {
                return Ok($crate::service::Outcome::Rejected(
                    $crate::service::Rejection::from(rejection),
                ));
            }
        }
    };
}

/// Unwraps an `Option`, answering with a 404 rejection for `what` when it is `None`.
macro_rules! found {
    ($option:expr, $what:expr) => {
        match $option {
            Some(value) => value,
            None => {
                return Ok($crate::service::Outcome::Rejected(
                    $crate::service::Rejection::NotFound($what),
                ));
            }
        }
    };
}

pub(crate) use accept;
pub(crate) use found;
