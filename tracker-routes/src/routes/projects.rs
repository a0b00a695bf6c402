use crate::auth::AuthedUser;
use crate::error::TrackerServiceError;
use crate::routes::requests::{CreateProjectRequest, JsonBody};
use crate::routes::responses::{ApiError, ApiResponse};
use crate::service::{Outcome, ProjectService};
use crate::state::TrackerAppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use engine::error::EndpointError;
use engine::id::ProjectId;
use tracing::instrument;
use tracker_core::TrackerEngine;
use tracker_core::project::Project;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

#[derive(OpenApi)]
#[openapi(paths(create_project, get_project))]
pub(super) struct ProjectDocs;

const PROJECT_CREATE_PATH: &str = "/";
const PROJECT_GET_PATH: &str = "/{projectId}";

pub(super) fn routes<T: TrackerEngine>() -> OpenApiRouter<TrackerAppState<T>> {
    OpenApiRouter::new()
        .route(PROJECT_CREATE_PATH, post(create_project))
        .route(PROJECT_GET_PATH, get(get_project))
}

/// Register a project that defects can be filed against.
#[utoipa::path(
    post,
    path = PROJECT_CREATE_PATH,
    responses(
        (status = CREATED, description = "The project was created", body = Project),
        (status = BAD_REQUEST, description = "The project name is missing", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
    ),
    request_body = CreateProjectRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service, request), err(Debug), fields(req.name = request.project_name))]
async fn create_project<T: TrackerEngine>(
    State(service): State<ProjectService<T>>,
    user: AuthedUser,
    JsonBody(request): JsonBody<CreateProjectRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    let res = match service.create(user.id, request.into()).await? {
        Outcome::Done(project) => ApiResponse::created(project).into_response(),
        Outcome::Rejected(rejection) => ApiError::from(rejection).into_response(),
    };
    Ok(res)
}

#[utoipa::path(
    get,
    path = PROJECT_GET_PATH,
    responses(
        (status = OK, description = "The project with the given id", body = Project),
        (status = NOT_FOUND, description = "No project has the given id", body = ApiError),
    ),
    params(("projectId" = String, Path, description = "The project to get"))
)]
#[instrument(skip(service), err(Debug))]
async fn get_project<T: TrackerEngine>(
    State(service): State<ProjectService<T>>,
    Path(project_id): Path<ProjectId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    let project = service.get(project_id).await?;

    Ok(project
        .map(|p| Json(p).into_response())
        .unwrap_or_else(|| ApiError::not_found("Project").into_response()))
}

#[cfg(test)]
mod tests {
    use crate::routes::tests::{TestContext, context};
    use engine::id::ProjectId;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[tokio::test]
    async fn created_project_can_be_fetched(#[future(awt)] context: TestContext) {
        let project = context.create_project().await;

        assert_eq!(context.member.id.to_string(), project["createdBy"]);

        let response = context
            .server
            .get(&format!("/projects/{}", project["_id"].as_str().unwrap()))
            .await;

        response.assert_status_ok();
        assert_eq!(project, response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn project_name_is_required(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .post("/projects")
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "projectDescription": "nameless" }))
            .await;

        response.assert_status_bad_request();
        assert_eq!("projectName", response.json::<Value>()["errors"][0]["field"]);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_project_is_not_found(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .get(&format!("/projects/{}", ProjectId::new()))
            .await;

        response.assert_status_not_found();
        assert_eq!(json!({ "message": "Project not found" }), response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn creating_a_project_needs_a_token(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .post("/projects")
            .json(&json!({ "projectName": "Website" }))
            .await;

        response.assert_status_unauthorized();
    }
}
