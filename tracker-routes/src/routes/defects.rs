use crate::auth::AuthedUser;
use crate::error::TrackerServiceError;
use crate::routes::requests::{
    AssignDefectRequest, CreateDefectRequest, DefectFilter, JsonBody, UpdateDefectRequest,
    UpdateStatusRequest,
};
use crate::routes::responses::ApiError;
use crate::service::DefectService;
use crate::state::TrackerAppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use engine::Pagination;
use engine::error::EndpointError;
use engine::id::DefectId;
use tracing::instrument;
use tracker_core::TrackerEngine;
use tracker_core::defect::{Defect, DefectListCriteria};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

#[derive(OpenApi)]
#[openapi(paths(
    list_defects,
    get_defect,
    create_defect,
    update_defect,
    update_status,
    update_assigned_to,
))]
pub(super) struct DefectDocs;

const DEFAULT_DEFECT_PAGE_SIZE: u64 = 25;

const DEFECT_LIST_PATH: &str = "/";
const DEFECT_GET_PATH: &str = "/{defectId}";
const DEFECT_CREATE_PATH: &str = "/createDefect";
const DEFECT_UPDATE_PATH: &str = "/updateDefect/{defectId}";
const DEFECT_STATUS_PATH: &str = "/updateStatus/{defectId}";
const DEFECT_ASSIGN_PATH: &str = "/updateAssignedTo/{defectId}";

pub(super) fn routes<T: TrackerEngine>() -> OpenApiRouter<TrackerAppState<T>> {
    OpenApiRouter::new()
        .route(DEFECT_LIST_PATH, get(list_defects))
        .route(DEFECT_GET_PATH, get(get_defect))
        .route(DEFECT_CREATE_PATH, post(create_defect))
        .route(DEFECT_UPDATE_PATH, put(update_defect))
        .route(DEFECT_STATUS_PATH, put(update_status))
        .route(DEFECT_ASSIGN_PATH, put(update_assigned_to))
}

/// List defects in creation order, a page at a time.
#[utoipa::path(
    get,
    path = DEFECT_LIST_PATH,
    responses(
        (status = OK, description = "Defects were found on the given page", body = Vec<Defect>),
        (status = NO_CONTENT, description = "No defects exist on the given page"),
    ),
    params(
        ("page" = Option<u64>, Query, description = "The page to return, starting at 1"),
        ("page_size" = Option<u64>, Query, description = "The max number of defects to return, 25 by default"),
        ("projectId" = Option<String>, Query, description = "Only list defects of this project"),
    )
)]
#[instrument(skip(service), err(Debug), fields(req.page = pagination.page, req.page_size = pagination.page_size))]
async fn list_defects<T: TrackerEngine>(
    State(service): State<DefectService<T>>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<DefectFilter>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    let defects = service
        .list(DefectListCriteria::new(
            pagination,
            DEFAULT_DEFECT_PAGE_SIZE,
            filter.project_id,
        ))
        .await?;

    let res = if defects.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(defects).into_response()
    };
    Ok(res)
}

#[utoipa::path(
    get,
    path = DEFECT_GET_PATH,
    responses(
        (status = OK, description = "The defect with the given id", body = Defect),
        (status = BAD_REQUEST, description = "The id is malformed"),
        (status = NOT_FOUND, description = "No defect has the given id", body = ApiError),
    ),
    params(("defectId" = String, Path, description = "The defect to get"))
)]
#[instrument(skip(service), err(Debug))]
async fn get_defect<T: TrackerEngine>(
    State(service): State<DefectService<T>>,
    Path(defect_id): Path<DefectId>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    let defect = service.get(defect_id).await?;

    Ok(defect
        .map(|d| Json(d).into_response())
        .unwrap_or_else(|| ApiError::not_found("Defect").into_response()))
}

/// Report a new defect. The reporter is the caller.
#[utoipa::path(
    post,
    path = DEFECT_CREATE_PATH,
    responses(
        (status = OK, description = "The defect was created", body = Defect),
        (status = BAD_REQUEST, description = "One or more fields are missing or invalid", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
        (status = NOT_FOUND, description = "The project does not exist", body = ApiError),
    ),
    request_body = CreateDefectRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service, request), err(Debug), fields(req.title = request.defect_title))]
async fn create_defect<T: TrackerEngine>(
    State(service): State<DefectService<T>>,
    user: AuthedUser,
    JsonBody(request): JsonBody<CreateDefectRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .create(user.id, request.into())
        .await?
        .into_response())
}

/// Replace the supplied core fields of a defect.
#[utoipa::path(
    put,
    path = DEFECT_UPDATE_PATH,
    responses(
        (status = OK, description = "The defect was updated", body = Defect),
        (status = BAD_REQUEST, description = "A supplied field is invalid", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
        (status = NOT_FOUND, description = "The defect or the new project does not exist", body = ApiError),
    ),
    params(("defectId" = String, Path, description = "The defect to update")),
    request_body = UpdateDefectRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service, request), err(Debug))]
async fn update_defect<T: TrackerEngine>(
    State(service): State<DefectService<T>>,
    user: AuthedUser,
    Path(defect_id): Path<DefectId>,
    JsonBody(request): JsonBody<UpdateDefectRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .update(defect_id, request.into())
        .await?
        .into_response())
}

/// Move a defect to another status. Entering `Resolved` or `Closed` stamps the matching date.
#[utoipa::path(
    put,
    path = DEFECT_STATUS_PATH,
    responses(
        (status = OK, description = "The status was changed", body = Defect),
        (status = BAD_REQUEST, description = "The status is missing or unknown", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
        (status = NOT_FOUND, description = "The defect does not exist", body = ApiError),
    ),
    params(("defectId" = String, Path, description = "The defect to move")),
    request_body = UpdateStatusRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service), err(Debug))]
async fn update_status<T: TrackerEngine>(
    State(service): State<DefectService<T>>,
    user: AuthedUser,
    Path(defect_id): Path<DefectId>,
    JsonBody(request): JsonBody<UpdateStatusRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .change_status(defect_id, request.defect_status)
        .await?
        .into_response())
}

#[utoipa::path(
    put,
    path = DEFECT_ASSIGN_PATH,
    responses(
        (status = OK, description = "The defect was reassigned", body = Defect),
        (status = BAD_REQUEST, description = "The assignee is missing or malformed", body = ApiError),
        (status = UNAUTHORIZED, description = "No valid token was given", body = ApiError),
        (status = NOT_FOUND, description = "The defect does not exist", body = ApiError),
    ),
    params(("defectId" = String, Path, description = "The defect to reassign")),
    request_body = AssignDefectRequest,
    security(("bearer" = []))
)]
#[instrument(skip(service), err(Debug))]
async fn update_assigned_to<T: TrackerEngine>(
    State(service): State<DefectService<T>>,
    user: AuthedUser,
    Path(defect_id): Path<DefectId>,
    JsonBody(request): JsonBody<AssignDefectRequest>,
) -> Result<Response, EndpointError<TrackerServiceError>> {
    Ok(service
        .assign(defect_id, request.assigned_to)
        .await?
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::routes::tests::{TestContext, context, failing_server};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{DateTime, Utc};
    use engine::id::{DefectId, ProjectId, UserId};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn defect_body(project_id: &str) -> Value {
        json!({
            "projectId": project_id,
            "defectTitle": "Login button does nothing",
            "defectDescription": "Clicking login has no effect",
            "defectStatus": "New",
            "defectPriority": "High",
            "defectSeverity": "Major",
            "reproduceSteps": "Open the page, click login",
            "expectedResult": "User is logged in",
            "actualResult": "Nothing happens",
        })
    }

    async fn create_defect(context: &TestContext) -> Value {
        let project = context.create_project().await;
        let response = context
            .server
            .post("/defects/createDefect")
            .authorization_bearer(context.token(&context.member))
            .json(&defect_body(project["_id"].as_str().unwrap()))
            .await;
        response.assert_status_ok();
        response.json()
    }

    fn date(value: &Value) -> DateTime<Utc> {
        value.as_str().unwrap().parse().unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn create_defect_sets_reporter_and_project_name(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;

        assert_eq!(context.member.id.to_string(), defect["reportedBy"]);
        assert_eq!("Website", defect["projectName"]);
        assert_eq!("New", defect["defectStatus"]);
        assert_eq!(Value::Null, defect["modifiedDate"]);
        assert_eq!(Value::Null, defect["resolvedDate"]);
        assert_eq!(Value::Null, defect["closedDate"]);
    }

    #[rstest]
    #[case::title("defectTitle")]
    #[case::status("defectStatus")]
    #[case::severity("defectSeverity")]
    #[case::actual("actualResult")]
    #[tokio::test]
    async fn create_defect_names_missing_field(
        #[future(awt)] context: TestContext,
        #[case] field: &str,
    ) {
        let project = context.create_project().await;
        let mut body = defect_body(project["_id"].as_str().unwrap());
        body.as_object_mut().unwrap().remove(field);

        let response = context
            .server
            .post("/defects/createDefect")
            .authorization_bearer(context.token(&context.member))
            .json(&body)
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        let errors = body["errors"].as_array().unwrap();
        assert_eq!(1, errors.len());
        assert_eq!(field, errors[0]["field"]);
    }

    #[rstest]
    #[tokio::test]
    async fn create_defect_with_wrong_field_type_is_bad_request(
        #[future(awt)] context: TestContext,
    ) {
        let project = context.create_project().await;
        let mut body = defect_body(project["_id"].as_str().unwrap());
        body["defectTitle"] = json!(5);

        let response = context
            .server
            .post("/defects/createDefect")
            .authorization_bearer(context.token(&context.member))
            .json(&body)
            .await;

        response.assert_status_bad_request();
        let message = response.json::<Value>()["message"].as_str().unwrap().to_string();
        assert!(message.contains("defectTitle"), "{message}");
    }

    #[rstest]
    #[tokio::test]
    async fn status_update_with_non_json_body_is_bad_request(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;

        let response = context
            .server
            .put(&format!("/defects/updateStatus/{}", defect["_id"].as_str().unwrap()))
            .authorization_bearer(context.token(&context.member))
            .text("Closed")
            .await;

        response.assert_status_bad_request();
        assert!(response.json::<Value>()["message"].is_string());
    }

    #[rstest]
    #[tokio::test]
    async fn create_defect_for_unknown_project_is_not_found(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .post("/defects/createDefect")
            .authorization_bearer(context.token(&context.member))
            .json(&defect_body(&ProjectId::new().to_string()))
            .await;

        response.assert_status_not_found();
        assert_eq!(json!({ "message": "Project not found" }), response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn create_defect_without_token_is_unauthorized(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .post("/defects/createDefect")
            .json(&defect_body(&ProjectId::new().to_string()))
            .await;

        response.assert_status_unauthorized();
        assert_eq!(
            json!({ "message": "No token, authorization denied" }),
            response.json::<Value>()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn closing_a_new_defect_stamps_closed_date_only(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;
        let id = defect["_id"].as_str().unwrap();

        let response = context
            .server
            .put(&format!("/defects/updateStatus/{id}"))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "defectStatus": "Closed" }))
            .await;

        response.assert_status_ok();
        let closed: Value = response.json();
        assert_eq!("Closed", closed["defectStatus"]);
        assert_eq!(Value::Null, closed["resolvedDate"]);
        assert_eq!(date(&closed["closedDate"]), date(&closed["modifiedDate"]));
        assert!(date(&closed["closedDate"]) >= date(&closed["createdDate"]));
    }

    #[rstest]
    #[tokio::test]
    async fn resolving_twice_overwrites_resolved_date(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;
        let path = format!("/defects/updateStatus/{}", defect["_id"].as_str().unwrap());
        let token = context.token(&context.member);

        let first: Value = context
            .server
            .put(&path)
            .authorization_bearer(&token)
            .json(&json!({ "defectStatus": "Resolved" }))
            .await
            .json();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second: Value = context
            .server
            .put(&path)
            .authorization_bearer(&token)
            .json(&json!({ "defectStatus": "Resolved" }))
            .await
            .json();

        assert!(date(&second["resolvedDate"]) > date(&first["resolvedDate"]));
        assert_eq!(second["resolvedDate"], second["modifiedDate"]);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_status_is_rejected(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;

        let response = context
            .server
            .put(&format!("/defects/updateStatus/{}", defect["_id"].as_str().unwrap()))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "defectStatus": "Archived" }))
            .await;

        response.assert_status_bad_request();
        assert_eq!("defectStatus", response.json::<Value>()["errors"][0]["field"]);
    }

    #[rstest]
    #[tokio::test]
    async fn update_changes_only_supplied_fields(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;

        let response = context
            .server
            .put(&format!("/defects/updateDefect/{}", defect["_id"].as_str().unwrap()))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "defectTitle": "Login is broken", "defectSeverity": "Critical" }))
            .await;

        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!("Login is broken", updated["defectTitle"]);
        assert_eq!("Critical", updated["defectSeverity"]);
        assert_eq!(defect["defectDescription"], updated["defectDescription"]);
        assert_eq!(defect["defectStatus"], updated["defectStatus"]);
        assert_ne!(Value::Null, updated["modifiedDate"]);
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_unknown_defect_is_not_found(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .put(&format!("/defects/updateDefect/{}", ProjectId::new()))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "defectTitle": "anything" }))
            .await;

        response.assert_status_not_found();
    }

    #[rstest]
    #[tokio::test]
    async fn status_update_of_unknown_defect_is_not_found(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .put(&format!("/defects/updateStatus/{}", DefectId::new()))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "defectStatus": "Closed" }))
            .await;

        response.assert_status_not_found();
        assert_eq!(json!({ "message": "Defect not found" }), response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn reassigning_unknown_defect_is_not_found(#[future(awt)] context: TestContext) {
        let response = context
            .server
            .put(&format!("/defects/updateAssignedTo/{}", DefectId::new()))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "assignedTo": UserId::new().to_string() }))
            .await;

        response.assert_status_not_found();
        assert_eq!(json!({ "message": "Defect not found" }), response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn reassigning_replaces_assignee(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;
        let assignee = UserId::new();

        let response = context
            .server
            .put(&format!("/defects/updateAssignedTo/{}", defect["_id"].as_str().unwrap()))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "assignedTo": assignee.to_string() }))
            .await;

        response.assert_status_ok();
        assert_eq!(assignee.to_string(), response.json::<Value>()["assignedTo"]);
    }

    #[rstest]
    #[tokio::test]
    async fn reassigning_to_nobody_is_rejected(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;

        let response = context
            .server
            .put(&format!("/defects/updateAssignedTo/{}", defect["_id"].as_str().unwrap()))
            .authorization_bearer(context.token(&context.member))
            .json(&json!({ "assignedTo": "" }))
            .await;

        response.assert_status_bad_request();
    }

    #[rstest]
    #[tokio::test]
    async fn empty_page_is_no_content(#[future(awt)] context: TestContext) {
        let response = context.server.get("/defects").await;

        response.assert_status(StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[tokio::test]
    async fn zero_page_size_is_no_content(#[future(awt)] context: TestContext) {
        create_defect(&context).await;

        let response = context
            .server
            .get("/defects")
            .add_query_param("page_size", 0)
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
    }

    #[rstest]
    #[tokio::test]
    async fn list_filters_by_project_and_pages(#[future(awt)] context: TestContext) {
        create_defect(&context).await;
        let second = create_defect(&context).await;
        let project_id = second["projectId"].as_str().unwrap();

        let filtered: Vec<Value> = context
            .server
            .get("/defects")
            .add_query_param("projectId", project_id)
            .await
            .json();
        assert_eq!(1, filtered.len());
        assert_eq!(second["_id"], filtered[0]["_id"]);

        let second_page: Vec<Value> = context
            .server
            .get("/defects")
            .add_query_param("page", 2)
            .add_query_param("page_size", 1)
            .await
            .json();
        assert_eq!(1, second_page.len());
        assert_eq!(second["_id"], second_page[0]["_id"]);
    }

    #[rstest]
    #[tokio::test]
    async fn get_defect_by_id(#[future(awt)] context: TestContext) {
        let defect = create_defect(&context).await;

        let response = context
            .server
            .get(&format!("/defects/{}", defect["_id"].as_str().unwrap()))
            .await;

        response.assert_status_ok();
        assert_eq!(defect, response.json::<Value>());
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_defect_id_is_bad_request(#[future(awt)] context: TestContext) {
        let response = context.server.get("/defects/not-an-id").await;

        response.assert_status_bad_request();
    }

    #[rstest]
    #[tokio::test]
    async fn repository_failure_is_internal_server_error(failing_server: TestServer) {
        let response = failing_server
            .get(&format!("/defects/{}", ProjectId::new()))
            .await;

        response.assert_status_internal_server_error();
        assert_eq!(
            json!({ "message": "internal server error" }),
            response.json::<Value>()
        );
    }
}
