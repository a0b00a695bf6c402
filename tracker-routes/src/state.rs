use crate::auth::AuthConfig;
use crate::service::{AchievementService, DefectService, ProjectService, ReviewService};
use axum::extract::FromRef;
use metrics_exporter_prometheus::PrometheusHandle;
use tracker_core::TrackerEngine;

#[derive(Clone)]
pub struct TrackerAppState<T: TrackerEngine> {
    pub defects: DefectService<T>,
    pub reviews: ReviewService<T>,
    pub achievements: AchievementService<T>,
    pub projects: ProjectService<T>,
    pub auth: AuthConfig,
    /// `None` when metrics are disabled, `/metrics` then answers 503.
    pub metrics: Option<PrometheusHandle>,
}

impl<T: TrackerEngine> TrackerAppState<T> {
    pub fn new_with_metrics(engine: T, auth: AuthConfig, metrics: PrometheusHandle) -> Self {
        Self::new(engine, auth, Some(metrics))
    }

    pub fn new_without_metrics(engine: T, auth: AuthConfig) -> Self {
        Self::new(engine, auth, None)
    }

    fn new(engine: T, auth: AuthConfig, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            defects: DefectService::new(engine.clone()),
            reviews: ReviewService::new(engine.clone()),
            achievements: AchievementService::new(engine.clone()),
            projects: ProjectService::new(engine),
            auth,
            metrics,
        }
    }
}

impl<T: TrackerEngine> FromRef<TrackerAppState<T>> for DefectService<T> {
    fn from_ref(input: &TrackerAppState<T>) -> Self {
        input.defects.clone()
    }
}

impl<T: TrackerEngine> FromRef<TrackerAppState<T>> for ReviewService<T> {
    fn from_ref(input: &TrackerAppState<T>) -> Self {
        input.reviews.clone()
    }
}

impl<T: TrackerEngine> FromRef<TrackerAppState<T>> for AchievementService<T> {
    fn from_ref(input: &TrackerAppState<T>) -> Self {
        input.achievements.clone()
    }
}

impl<T: TrackerEngine> FromRef<TrackerAppState<T>> for ProjectService<T> {
    fn from_ref(input: &TrackerAppState<T>) -> Self {
        input.projects.clone()
    }
}

impl<T: TrackerEngine> FromRef<TrackerAppState<T>> for AuthConfig {
    fn from_ref(input: &TrackerAppState<T>) -> Self {
        input.auth.clone()
    }
}
