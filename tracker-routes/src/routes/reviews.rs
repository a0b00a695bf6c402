use crate::auth::AuthedUser;
use crate::error::TrackerServiceError;
use crate::routes::requests::{CommentRequest, CreateReviewRequest, JsonBody};
use crate::routes::responses::{ApiError, MessageBody};
use crate::service::ReviewService;
use crate::state::TrackerAppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use engine::error::EndpointError;
use engine::id::{CommentId, ReviewId, UserId};
use tracing::instrument;
use tracker_core::TrackerEngine;
use tracker_core::review::{Comment, Like, Review};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

#[derive(OpenApi)]
#[openapi(paths(
    list_reviews,
    get_review,
    add_review,
    like_review,
    unlike_review,
    add_comment,
    delete_comment,
    delete_review,
))]
pub(super) struct ReviewDocs;

const REVIEW_LIST_PATH: &str = "/";
const REVIEW_GET_PATH: &str = "/{reviewId}";
const REVIEW_CREATE_PATH: &str = "/addRev/{userId}";
const REVIEW_LIKE_PATH: &str = "/like/{reviewId}";
const REVIEW_UNLIKE_PATH: &str = "/unlike/{reviewId}";
const REVIEW_COMMENT_PATH: &str = "/comment/{reviewId}";
const REVIEW_DELETE_COMMENT_PATH: &str = "/deleteComment/{reviewId}/{commentId}";
const REVIEW_DELETE_PATH: &str = "/{reviewId}";

pub(super) fn routes<T: TrackerEngine>() -> OpenApiRouter<TrackerAppState<T>> {
    OpenApiRouter::new()
        .route(REVIEW_LIST_PATH, get(list_reviews))
        .route(REVIEW_GET_PATH, get(get_review))
        .route(REVIEW_CREATE_PATH, post(add_review))
        .route(REVIEW_LIKE_PATH, put(like_review))
        .route(REVIEW_UNLIKE_PATH, put(unlike_review))
        .route(REVIEW_COMMENT_PATH, post(add_comment))
        .route(REVIEW_DELETE_COMMENT_PATH, delete(delete_comment))
        .route(REVIEW_DELETE_PATH, delete(delete_review))
}

/// Every review, newest first.
#[utoipa::path(
    get,
    path = REVIEW_LIST_PATH,
    responses((status = OK, description = "All reviews", body = Vec<Review>))
)]
#[instrument(skip(service), err(Debug))]
async fn list_reviews<T: TrackerEngine>(
    State(service): State<ReviewService<T>>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(Json(service.list().await?).into_response())
}

#[utoipa::path(
    get,
    path = REVIEW_GET_PATH,
    responses(
        (status = OK, description = "The review with the given id", body = Review),
        (status = NOT_FOUND, description = "No review has the given id", body = ApiError),
    ),
    params(("reviewId" = String, Path, description = "The review to get"))
)]
#[instrument(skip(service), err(Debug))]
async fn get_review<T: TrackerEngine>(
    State(service): State<ReviewService<T>>,
    Path(review_id): Path<ReviewId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    let review = service.get(review_id).await?;

    Ok(review
        .map(|r| Json(r).into_response())
        .unwrap_or_else(|| ApiError::not_found("Review").into_response()))
}

/// Review another user. The caller's current name and avatar are copied into the review.
#[utoipa::path(
    post,
    path = REVIEW_CREATE_PATH,
    responses(
        (status = OK, description = "The review was written", body = Review),
        (status = BAD_REQUEST, description = "The review text is missing", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
        (status = NOT_FOUND, description = "The reviewed user does not exist", body = ApiError),
    ),
    params(("userId" = String, Path, description = "The user being reviewed")),
    request_body = CreateReviewRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service, request), err(Debug))]
async fn add_review<T: TrackerEngine>(
    State(service): State<ReviewService<T>>,
    user: AuthedUser,
    Path(target): Path<UserId>,
    JsonBody(request): JsonBody<CreateReviewRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .create(user.id, target, request.review_text)
        .await?
        .into_response())
}

#[utoipa::path(
    put,
    path = REVIEW_LIKE_PATH,
    responses(
        (status = OK, description = "The likes of the review, newest first", body = Vec<Like>),
        (status = BAD_REQUEST, description = "The caller already liked the review", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
        (status = NOT_FOUND, description = "The review does not exist", body = ApiError),
    ),
    params(("reviewId" = String, Path, description = "The review to like")),
    security(("bearer" = []))
)]
#[instrument(skip(service), err(Debug))]
async fn like_review<T: TrackerEngine>(
    State(service): State<ReviewService<T>>,
    user: AuthedUser,
    Path(review_id): Path<ReviewId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service.like(user.id, review_id).await?.into_response())
}

#[utoipa::path(
    put,
    path = REVIEW_UNLIKE_PATH,
    responses(
        (status = OK, description = "The remaining likes of the review", body = Vec<Like>),
        (status = BAD_REQUEST, description = "The caller has not liked the review", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
        (status = NOT_FOUND, description = "The review does not exist", body = ApiError),
    ),
    params(("reviewId" = String, Path, description = "The review to unlike")),
    security(("bearer" = []))
)]
#[instrument(skip(service), err(Debug))]
async fn unlike_review<T: TrackerEngine>(
    State(service): State<ReviewService<T>>,
    user: AuthedUser,
    Path(review_id): Path<ReviewId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service.unlike(user.id, review_id).await?.into_response())
}

#[utoipa::path(
    post,
    path = REVIEW_COMMENT_PATH,
    responses(
        (status = OK, description = "The comments of the review, oldest first", body = Vec<Comment>),
        (status = BAD_REQUEST, description = "The comment text is missing", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
        (status = NOT_FOUND, description = "The review does not exist", body = ApiError),
    ),
    params(("reviewId" = String, Path, description = "The review to comment on")),
    request_body = CommentRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service, request), err(Debug))]
async fn add_comment<T: TrackerEngine>(
    State(service): State<ReviewService<T>>,
    user: AuthedUser,
    Path(review_id): Path<ReviewId>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .comment(user.id, review_id, request.text)
        .await?
        .into_response())
}

/// Remove one of the caller's comments. Removing a comment that is not there changes nothing.
#[utoipa::path(
    delete,
    path = REVIEW_DELETE_COMMENT_PATH,
    responses(
        (status = OK, description = "The remaining comments of the review", body = Vec<Comment>),
        (status = UNAUTHORIZED, description = "No valid token was given, or the comment belongs to somebody else", body = ApiError),
        (status = NOT_FOUND, description = "The review does not exist", body = ApiError),
    ),
    params(
        ("reviewId" = String, Path, description = "The review the comment is on"),
        ("commentId" = String, Path, description = "The comment to remove"),
    ),
    security(("bearer" = []))
)]
#[instrument(skip(service), err(Debug))]
async fn delete_comment<T: TrackerEngine>(
    State(service): State<ReviewService<T>>,
    user: AuthedUser,
    Path((review_id, comment_id)): Path<(ReviewId, CommentId)>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .remove_comment(user.id, review_id, comment_id)
        .await?
        .into_response())
}

/// Delete a review. Only its author may do this.
#[utoipa::path(
    delete,
    path = REVIEW_DELETE_PATH,
    responses(
        (status = OK, description = "The review was removed", body = MessageBody),
        (status = UNAUTHORIZED, description = "No valid token was given, or the caller did not write the review", body = ApiError),
        (status = NOT_FOUND, description = "The review does not exist", body = ApiError),
    ),
    params(("reviewId" = String, Path, description = "The review to delete")),
    security(("bearer" = []))
)]
#[instrument(skip(service), err(Debug))]
async fn delete_review<T: TrackerEngine>(
    State(service): State<ReviewService<T>>,
    user: AuthedUser,
    Path(review_id): Path<ReviewId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .delete(user.id, review_id)
        .await?
        .map(|()| MessageBody::new("Review removed"))
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::routes::tests::{TestContext, context};
    use engine::id::{CommentId, ReviewId, UserId};
    use rstest::rstest;
    use serde_json::{Value, json};
    use tracker_core::user::User;

    async fn write_review(context: &TestContext, author: &User, target: &User) -> Value {
        let response = context
            .server
            .post(&format!("/reviews/addRev/{}", target.id))
            .authorization_bearer(context.token(author))
            .json(&json!({ "reviewText": "Always ships on time" }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    async fn review_by_member(context: &TestContext) -> String {
        let target = context.another_member("taylor").await;
        let review = write_review(context, &context.member, &target).await;
        review["_id"].as_str().unwrap().to_string()
    }

    #[rstest]
    #[tokio::test]
    async fn review_snapshots_author_profile(#[future(awt)] context: TestContext) {
        let target = context.another_member("taylor").await;

        let review = write_review(&context, &context.member, &target).await;

        assert_eq!(target.id.to_string(), review["user"]);
        assert_eq!(context.member.id.to_string(), review["author"]);
        assert_eq!("morgan", review["name"]);
        assert_eq!(json!(context.member.avatar), review["avatar"]);
        assert_eq!(json!([]), review["likes"]);
        assert_eq!(json!([]), review["comments"]);
    }

    #[rstest]
    #[tokio::test]
    async fn review_of_unknown_user_is_not_found(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .post(&format!("/reviews/addRev/{}", UserId::new()))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "reviewText": "who is this" }))
            .await;

        response.assert_status_not_found();
        assert_eq!(json!({ "message": "User not found" }), response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn review_text_is_required(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .post(&format!("/reviews/addRev/{}", context.admin.id))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "reviewText": "   " }))
            .await;

        response.assert_status_bad_request();
        assert_eq!("reviewText", response.json::<Value>()["errors"][0]["field"]);
    }

    #[rstest]
    #[tokio::test]
    async fn second_like_is_rejected_and_count_unchanged(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;
        let path = format!("/reviews/like/{review_id}");
        let token = context.token(&context.admin);

        let first = context.server.put(&path).authorization_bearer(&token).await;
        first.assert_status_ok();
        assert_eq!(
            json!([{ "user": context.admin.id.to_string() }]),
            first.json::<Value>()
        );

        let second = context.server.put(&path).authorization_bearer(&token).await;
        second.assert_status_bad_request();
        assert_eq!(
            json!({ "message": "Review already liked" }),
            second.json::<Value>()
        );

        let review: Value = context
            .server
            .get(&format!("/reviews/{review_id}"))
            .await
            .json();
        assert_eq!(1, review["likes"].as_array().unwrap().len());
    }

    #[rstest]
    #[tokio::test]
    async fn newest_like_comes_first(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;
        let path = format!("/reviews/like/{review_id}");

        context
            .server
            .put(&path)
            .authorization_bearer(context.token(&context.admin))
            .await
            .assert_status_ok();
        let likes: Value = context
            .server
            .put(&path)
            .authorization_bearer(context.token(&context.member))
            .await
            .json();

        assert_eq!(context.member.id.to_string(), likes[0]["user"]);
        assert_eq!(context.admin.id.to_string(), likes[1]["user"]);
    }

    #[rstest]
    #[tokio::test]
    async fn unlike_without_like_is_rejected(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;
        context
            .server
            .put(&format!("/reviews/like/{review_id}"))
            .authorization_bearer(context.token(&context.member))
            .await
            .assert_status_ok();

        let response = context
            .server
            .put(&format!("/reviews/unlike/{review_id}"))
            .authorization_bearer(context.token(&context.admin))
            .await;

        response.assert_status_bad_request();
        assert_eq!(
            json!({ "message": "Review has not yet been liked" }),
            response.json::<Value>()
        );
        let review: Value = context
            .server
            .get(&format!("/reviews/{review_id}"))
            .await
            .json();
        assert_eq!(
            json!([{ "user": context.member.id.to_string() }]),
            review["likes"]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unlike_removes_the_callers_like(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;
        let token = context.token(&context.admin);
        context
            .server
            .put(&format!("/reviews/like/{review_id}"))
            .authorization_bearer(&token)
            .await
            .assert_status_ok();

        let response = context
            .server
            .put(&format!("/reviews/unlike/{review_id}"))
            .authorization_bearer(&token)
            .await;

        response.assert_status_ok();
        assert_eq!(json!([]), response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn like_without_token_is_unauthorized(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;

        let response = context
            .server
            .put(&format!("/reviews/like/{review_id}"))
            .await;

        response.assert_status_unauthorized();
    }

    #[rstest]
    #[tokio::test]
    async fn like_of_unknown_review_is_not_found(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .put(&format!("/reviews/like/{}", ReviewId::new()))
            .authorization_bearer(context.token(&context.member))
            .await;

        response.assert_status_not_found();
    }

    #[rstest]
    #[tokio::test]
    async fn comments_are_appended_with_commenter_profile(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;
        let path = format!("/reviews/comment/{review_id}");

        context
            .server
            .post(&path)
            .authorization_bearer(context.token(&context.admin))
            .json(&json!({ "text": "agreed" }))
            .await
            .assert_status_ok();
        let comments: Value = context
            .server
            .post(&path)
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "text": "thanks" }))
            .await
            .json();

        assert_eq!("agreed", comments[0]["text"]);
        assert_eq!("ari", comments[0]["name"]);
        assert_eq!("thanks", comments[1]["text"]);
        assert_eq!(context.member.id.to_string(), comments[1]["user"]);
    }

    #[rstest]
    #[tokio::test]
    async fn removing_somebody_elses_comment_is_unauthorized(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;
        let comments: Value = context
            .server
            .post(&format!("/reviews/comment/{review_id}"))
            .authorization_bearer(context.token(&context.admin))
            .json(&json!({ "text": "agreed" }))
            .await
            .json();
        let comment_id = comments[0]["_id"].as_str().unwrap();
        let path = format!("/reviews/deleteComment/{review_id}/{comment_id}");

        let response = context
            .server
            .delete(&path)
            .authorization_bearer(context.token(&context.member))
            .await;
        response.assert_status_unauthorized();

        let response = context
            .server
            .delete(&path)
            .authorization_bearer(context.token(&context.admin))
            .await;
        response.assert_status_ok();
        assert_eq!(json!([]), response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn removing_absent_comment_changes_nothing(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;
        let comments: Value = context
            .server
            .post(&format!("/reviews/comment/{review_id}"))
            .authorization_bearer(context.token(&context.admin))
            .json(&json!({ "text": "agreed" }))
            .await
            .json();

        let response = context
            .server
            .delete(&format!(
                "/reviews/deleteComment/{review_id}/{}",
                CommentId::new()
            ))
            .authorization_bearer(context.token(&context.admin))
            .await;

        response.assert_status_ok();
        assert_eq!(comments, response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn only_the_author_deletes_a_review(#[future(awt)] context: TestContext) {
        let review_id = review_by_member(&context).await;
        let path = format!("/reviews/{review_id}");

        let response = context
            .server
            .delete(&path)
            .authorization_bearer(context.token(&context.admin))
            .await;
        response.assert_status_unauthorized();

        let response = context
            .server
            .delete(&path)
            .authorization_bearer(context.token(&context.member))
            .await;
        response.assert_status_ok();
        assert_eq!(json!({ "message": "Review removed" }), response.json::<Value>());

        context.server.get(&path).await.assert_status_not_found();
    }

    #[rstest]
    #[tokio::test]
    async fn reviews_are_listed_newest_first(#[future(awt)] context: TestContext) {
        let older = review_by_member(&context).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = review_by_member(&context).await;

        let reviews: Vec<Value> = context.server.get("/reviews").await.json();

        assert_eq!(newer, reviews[0]["_id"]);
        assert_eq!(older, reviews[1]["_id"]);
    }

    #[rstest]
    #[tokio::test]
    async fn unregistered_author_cannot_review(#[future(awt)] context: TestContext) {
        let stranger = crate::routes::tests::user("stranger", tracker_core::user::UserRole::Member);

        let response = context
            .server
            .post(&format!("/reviews/addRev/{}", context.member.id))
            .authorization_bearer(context.token(&stranger))
            .json(&json!({ "reviewText": "hello" }))
            .await;

        response.assert_status_unauthorized();
    }
}
