use crate::auth::validate_token;
use crate::metrics;
use crate::state::TrackerAppState;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Router, middleware};
use tracing::info;
use tracker_core::TrackerEngine;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

mod achievements;
mod defects;
mod projects;
pub mod requests;
pub mod responses;
mod reviews;

const DEFECT_ROOT_PATH: &str = "/defects";
const REVIEW_ROOT_PATH: &str = "/reviews";
const ACHIEVEMENT_ROOT_PATH: &str = "/achievements";
const PROJECT_ROOT_PATH: &str = "/projects";

const METRICS_PATH: &str = "/metrics";

#[derive(OpenApi)]
#[openapi(
    nest(
        (path = DEFECT_ROOT_PATH, api = defects::DefectDocs),
        (path = REVIEW_ROOT_PATH, api = reviews::ReviewDocs),
        (path = ACHIEVEMENT_ROOT_PATH, api = achievements::AchievementDocs),
        (path = PROJECT_ROOT_PATH, api = projects::ProjectDocs),
    ),
    modifiers(&BearerAuth),
)]
struct ApiDoc;

struct BearerAuth;

impl utoipa::Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Every resource, the API docs and `/metrics`, behind the token middleware.
pub fn build<T: TrackerEngine>(app_state: TrackerAppState<T>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes(app_state))
        .split_for_parts();

    router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
}

fn routes<S, T: TrackerEngine>(app_state: TrackerAppState<T>) -> OpenApiRouter<S> {
    let main_router = OpenApiRouter::new()
        .nest(DEFECT_ROOT_PATH, defects::routes::<T>())
        .nest(REVIEW_ROOT_PATH, reviews::routes::<T>())
        .nest(ACHIEVEMENT_ROOT_PATH, achievements::routes::<T>())
        .nest(PROJECT_ROOT_PATH, projects::routes::<T>());

    let router = match app_state.metrics.clone() {
        Some(handle) => {
            info!("metrics enabled, setting up metrics handler");
            main_router
                .route_layer(middleware::from_fn(metrics::track_http))
                .route(METRICS_PATH, get(|| async move { handle.render() }))
        }
        None => {
            info!("metrics not enabled, setting up service unavailable metrics handler");
            main_router.route(METRICS_PATH, get(metrics_disabled))
        }
    };

    router
        .layer(middleware::from_fn_with_state(
            app_state.auth.clone(),
            validate_token,
        ))
        .with_state(app_state)
}

async fn metrics_disabled() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Metrics endpoint is disabled. Metrics must be enabled and the service restarted",
    )
}
