use crate::auth::AuthedUser;
use crate::error::TrackerServiceError;
use crate::routes::requests::{CreateAchievementRequest, JsonBody, UpdateAchievementRequest};
use crate::routes::responses::{ApiError, MessageBody};
use crate::service::AchievementService;
use crate::state::TrackerAppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use engine::error::EndpointError;
use engine::id::AchievementId;
use tracing::instrument;
use tracker_core::TrackerEngine;
use tracker_core::achievement::{Achievement, RelatedObject};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

#[derive(OpenApi)]
#[openapi(paths(
    list_achievements,
    get_achievement,
    get_related_object,
    add_achievement,
    update_achievement,
    delete_achievement,
))]
pub(super) struct AchievementDocs;

const ACHIEVEMENT_LIST_PATH: &str = "/";
const ACHIEVEMENT_GET_PATH: &str = "/{achievementId}";
const ACHIEVEMENT_RELATED_PATH: &str = "/{achievementId}/related";
const ACHIEVEMENT_CREATE_PATH: &str = "/addAch";
const ACHIEVEMENT_UPDATE_PATH: &str = "/updateAch/{achievementId}";
const ACHIEVEMENT_DELETE_PATH: &str = "/deleteAch/{achievementId}";

pub(super) fn routes<T: TrackerEngine>() -> OpenApiRouter<TrackerAppState<T>> {
    OpenApiRouter::new()
        .route(ACHIEVEMENT_LIST_PATH, get(list_achievements))
        .route(ACHIEVEMENT_GET_PATH, get(get_achievement))
        .route(ACHIEVEMENT_RELATED_PATH, get(get_related_object))
        .route(ACHIEVEMENT_CREATE_PATH, post(add_achievement))
        .route(ACHIEVEMENT_UPDATE_PATH, put(update_achievement))
        .route(ACHIEVEMENT_DELETE_PATH, delete(delete_achievement))
}

#[utoipa::path(
    get,
    path = ACHIEVEMENT_LIST_PATH,
    responses((status = OK, description = "All achievement definitions", body = Vec<Achievement>))
)]
#[instrument(skip(service), err(Debug))]
async fn list_achievements<T: TrackerEngine>(
    State(service): State<AchievementService<T>>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(Json(service.list().await?).into_response())
}

#[utoipa::path(
    get,
    path = ACHIEVEMENT_GET_PATH,
    responses(
        (status = OK, description = "The achievement with the given id", body = Achievement),
        (status = NOT_FOUND, description = "No achievement has the given id", body = ApiError),
    ),
    params(("achievementId" = String, Path, description = "The achievement to get"))
)]
#[instrument(skip(service), err(Debug))]
async fn get_achievement<T: TrackerEngine>(
    State(service): State<AchievementService<T>>,
    Path(achievement_id): Path<AchievementId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    let achievement = service.get(achievement_id).await?;

    Ok(achievement
        .map(|a| Json(a).into_response())
        .unwrap_or_else(|| ApiError::not_found("Achievement").into_response()))
}

/// The entity an achievement is linked to, tagged with the collection it lives in.
#[utoipa::path(
    get,
    path = ACHIEVEMENT_RELATED_PATH,
    responses(
        (status = OK, description = "The linked entity", body = RelatedObject),
        (status = NOT_FOUND, description = "The achievement does not exist, has no link, or links to something that is gone", body = ApiError),
    ),
    params(("achievementId" = String, Path, description = "The achievement whose link to follow"))
)]
#[instrument(skip(service), err(Debug))]
async fn get_related_object<T: TrackerEngine>(
    State(service): State<AchievementService<T>>,
    Path(achievement_id): Path<AchievementId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service.related(achievement_id).await?.into_response())
}

/// Define a new achievement. Administrators only.
#[utoipa::path(
    post,
    path = ACHIEVEMENT_CREATE_PATH,
    responses(
        (status = OK, description = "The achievement was created", body = Achievement),
        (status = BAD_REQUEST, description = "A field is missing or invalid, or the name or code is taken", body = ApiError),
        (status = UNAUTHORIZED, description = "The caller is not an administrator", body = ApiError),
        (status = NOT_FOUND, description = "The related object does not exist", body = ApiError),
    ),
    request_body = CreateAchievementRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service, request), err(Debug), fields(req.code = request.achievement_code))]
async fn add_achievement<T: TrackerEngine>(
    State(service): State<AchievementService<T>>,
    user: AuthedUser,
    JsonBody(request): JsonBody<CreateAchievementRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .create(user.id, request.into())
        .await?
        .into_response())
}

/// Update an achievement. Name and code only change together, and never together with the
/// description.
#[utoipa::path(
    put,
    path = ACHIEVEMENT_UPDATE_PATH,
    responses(
        (status = OK, description = "The achievement was updated", body = Achievement),
        (status = BAD_REQUEST, description = "The update is not allowed or a field is invalid", body = ApiError),
        (status = UNAUTHORIZED, description = "The caller is not an administrator", body = ApiError),
        (status = NOT_FOUND, description = "The achievement or the related object does not exist", body = ApiError),
    ),
    params(("achievementId" = String, Path, description = "The achievement to update")),
    request_body = UpdateAchievementRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service, request), err(Debug))]
async fn update_achievement<T: TrackerEngine>(
    State(service): State<AchievementService<T>>,
    user: AuthedUser,
    Path(achievement_id): Path<AchievementId>,
    JsonBody(request): JsonBody<UpdateAchievementRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .update(user.id, achievement_id, request.into())
        .await?
        .into_response())
}

#[utoipa::path(
    delete,
    path = ACHIEVEMENT_DELETE_PATH,
    responses(
        (status = OK, description = "The achievement was removed", body = MessageBody),
        (status = UNAUTHORIZED, description = "The caller is not an administrator", body = ApiError),
        (status = NOT_FOUND, description = "The achievement does not exist", body = ApiError),
    ),
    params(("achievementId" = String, Path, description = "The achievement to delete")),
    security(("bearer" = []))
)]
#[instrument(skip(service), err(Debug))]
async fn delete_achievement<T: TrackerEngine>(
    State(service): State<AchievementService<T>>,
    user: AuthedUser,
    Path(achievement_id): Path<AchievementId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .delete(user.id, achievement_id)
        .await?
        .map(|()| MessageBody::new("Achievement removed"))
        .into_response())
}
