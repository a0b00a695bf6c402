//! Request bodies. Every field is optional at the JSON level so that validation can report all
//! missing fields at once instead of failing on the first one.
use crate::routes::responses::ApiError;
use axum::extract::FromRequest;
use engine::id::ProjectId;
use engine::patch_field_schema;
use optional_field::{Field, serde_optional_fields};
use serde::Deserialize;
use serde_json::Value;
use tracker_core::achievement::{AchievementDraft, AchievementPatchDraft};
use tracker_core::defect::{DefectDraft, DefectPatchDraft};
use tracker_core::project::ProjectDraft;
use utoipa::ToSchema;

/// [`axum::Json`] whose rejection is a 400 [`ApiError`], so a body of the wrong shape is reported
/// like any other bad request.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDefectRequest {
    pub project_id: Option<String>,
    pub defect_title: Option<String>,
    pub defect_description: Option<String>,
    /// One of `New`, `In Progress`, `Resolved`, `Failed`, `Closed`, `Reopen`.
    pub defect_status: Option<String>,
    /// One of `High`, `Medium`, `Low`.
    pub defect_priority: Option<String>,
    /// One of `Critical`, `Major`, `Minor`, `Cosmetic`.
    pub defect_severity: Option<String>,
    pub assigned_to: Option<String>,
    pub reproduce_steps: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
}

impl From<CreateDefectRequest> for DefectDraft {
    fn from(value: CreateDefectRequest) -> Self {
        Self {
            project_id: value.project_id,
            title: value.defect_title,
            description: value.defect_description,
            status: value.defect_status,
            priority: value.defect_priority,
            severity: value.defect_severity,
            assigned_to: value.assigned_to,
            reproduce_steps: value.reproduce_steps,
            expected_result: value.expected_result,
            actual_result: value.actual_result,
        }
    }
}

/// Only supplied fields change. The status has its own endpoint.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDefectRequest {
    pub project_id: Option<String>,
    pub defect_title: Option<String>,
    pub defect_description: Option<String>,
    pub defect_priority: Option<String>,
    pub defect_severity: Option<String>,
    pub reproduce_steps: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
}

impl From<UpdateDefectRequest> for DefectPatchDraft {
    fn from(value: UpdateDefectRequest) -> Self {
        Self {
            project_id: value.project_id,
            title: value.defect_title,
            description: value.defect_description,
            priority: value.defect_priority,
            severity: value.defect_severity,
            reproduce_steps: value.reproduce_steps,
            expected_result: value.expected_result,
            actual_result: value.actual_result,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub defect_status: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignDefectRequest {
    pub assigned_to: Option<String>,
}

/// Only list defects filed against this project.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectFilter {
    pub project_id: Option<ProjectId>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub review_text: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAchievementRequest {
    pub achievement_name: Option<String>,
    pub achievement_code: Option<String>,
    pub achievement_desc: Option<String>,
    pub achievement_type: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub criteria: Option<Value>,
    pub badge_url: Option<String>,
    pub points: Option<u32>,
    pub level: Option<u32>,
    /// `public` (default) or `private`.
    pub visibility: Option<String>,
    /// `earned`, `in_progress` or `locked` (default).
    pub status: Option<String>,
    /// Id of the linked entity. Requires `relatedObjectType`.
    pub related_object: Option<String>,
    /// One of `User`, `Project`, `Defect`, `Review`, `Achievement`.
    pub related_object_type: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<CreateAchievementRequest> for AchievementDraft {
    fn from(value: CreateAchievementRequest) -> Self {
        Self {
            name: value.achievement_name,
            code: value.achievement_code,
            description: value.achievement_desc,
            kind: value.achievement_type,
            criteria: value.criteria,
            badge_url: value.badge_url,
            points: value.points,
            level: value.level,
            visibility: value.visibility,
            status: value.status,
            related_object: value.related_object,
            related_object_type: value.related_object_type,
            tags: value.tags,
        }
    }
}

#[serde_optional_fields]
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAchievementRequest {
    /// Must be sent together with `achievementCode`.
    pub achievement_name: Option<String>,
    /// Must be sent together with `achievementName`.
    pub achievement_code: Option<String>,
    pub achievement_desc: Option<String>,
    pub achievement_type: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub criteria: Option<Value>,
    pub badge_url: Option<String>,
    pub points: Option<u32>,
    pub level: Option<u32>,
    pub visibility: Option<String>,
    pub status: Option<String>,
    /// Setting this to null removes the link. Leaving it out keeps the link.
    #[schema(schema_with = patch_field_schema)]
    pub related_object: Field<String>,
    pub related_object_type: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<UpdateAchievementRequest> for AchievementPatchDraft {
    fn from(value: UpdateAchievementRequest) -> Self {
        Self {
            name: value.achievement_name,
            code: value.achievement_code,
            description: value.achievement_desc,
            kind: value.achievement_type,
            criteria: value.criteria,
            badge_url: value.badge_url,
            points: value.points,
            level: value.level,
            visibility: value.visibility,
            status: value.status,
            related_object: value.related_object,
            related_object_type: value.related_object_type,
            tags: value.tags,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub project_name: Option<String>,
    pub project_description: Option<String>,
}

impl From<CreateProjectRequest> for ProjectDraft {
    fn from(value: CreateProjectRequest) -> Self {
        Self {
            name: value.project_name,
            description: value.project_description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_related_object_leaves_link_alone() {
        let request: UpdateAchievementRequest =
            serde_json::from_value(json!({ "points": 10 })).unwrap();

        assert!(matches!(request.related_object, Field::Missing));
        assert_eq!(Some(10), request.points);
    }

    #[test]
    fn null_related_object_is_kept_apart_from_missing() {
        let request: UpdateAchievementRequest =
            serde_json::from_value(json!({ "relatedObject": null })).unwrap();

        assert!(matches!(request.related_object, Field::Present(None)));
    }

    #[test]
    fn empty_defect_body_deserializes() {
        let request: CreateDefectRequest = serde_json::from_value(json!({})).unwrap();

        assert!(request.defect_title.is_none());
    }
}
