//! Achievement definitions, maintained by administrators.
//!
//! An achievement may point at one other stored entity. The pointer is a [`RelatedRef`], a tagged
//! union whose tag names the collection the id belongs to, so it can only be resolved together
//! with its kind.
use crate::defect::Defect;
use crate::project::Project;
use crate::result::{AchievementRepoError, OptRepoResult, RepoResult};
use crate::review::Review;
use crate::user::User;
use crate::validation::{FieldError, Validator, non_blank};
use crate::wire::wire_enum;
use chrono::{DateTime, Utc};
use engine::id::{AchievementId, DefectId, InvalidId, ProjectId, ReviewId, UserId};
use optional_field::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

wire_enum! {
    pub enum Visibility {
        Public => "public",
        Private => "private",
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Public
    }
}

wire_enum! {
    pub enum AchievementStatus {
        Earned => "earned",
        InProgress => "in_progress",
        Locked => "locked",
    }
}

impl Default for AchievementStatus {
    fn default() -> Self {
        Self::Locked
    }
}

wire_enum! {
    /// The collections an achievement can point into.
    pub enum RelatedKind {
        User => "User",
        Project => "Project",
        Defect => "Defect",
        Review => "Review",
        Achievement => "Achievement",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id")]
pub enum RelatedRef {
    User(UserId),
    Project(ProjectId),
    Defect(DefectId),
    Review(ReviewId),
    Achievement(AchievementId),
}

impl RelatedRef {
    pub fn new(kind: RelatedKind, id: &str) -> Result<Self, InvalidId> {
        Ok(match kind {
            RelatedKind::User => Self::User(id.parse()?),
            RelatedKind::Project => Self::Project(id.parse()?),
            RelatedKind::Defect => Self::Defect(id.parse()?),
            RelatedKind::Review => Self::Review(id.parse()?),
            RelatedKind::Achievement => Self::Achievement(id.parse()?),
        })
    }

    pub fn kind(&self) -> RelatedKind {
        match self {
            Self::User(_) => RelatedKind::User,
            Self::Project(_) => RelatedKind::Project,
            Self::Defect(_) => RelatedKind::Defect,
            Self::Review(_) => RelatedKind::Review,
            Self::Achievement(_) => RelatedKind::Achievement,
        }
    }

    pub fn id(&self) -> String {
        match self {
            Self::User(id) => id.to_string(),
            Self::Project(id) => id.to_string(),
            Self::Defect(id) => id.to_string(),
            Self::Review(id) => id.to_string(),
            Self::Achievement(id) => id.to_string(),
        }
    }
}

/// The entity a [`RelatedRef`] resolved to.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", content = "object")]
pub enum RelatedObject {
    User(User),
    Project(Project),
    Defect(Defect),
    Review(Review),
    Achievement(Box<Achievement>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    #[serde(rename = "_id")]
    pub id: AchievementId,
    /// The administrator that created the definition.
    #[serde(rename = "user")]
    pub created_by: UserId,
    #[serde(rename = "achievementName")]
    pub name: String,
    #[serde(rename = "achievementCode")]
    pub code: String,
    #[serde(rename = "achievementDesc")]
    pub description: String,
    #[serde(rename = "achievementType")]
    pub kind: String,
    #[schema(value_type = Option<Object>)]
    pub criteria: Option<Value>,
    pub badge_url: Option<String>,
    pub points: Option<u32>,
    pub level: Option<u32>,
    pub visibility: Visibility,
    pub status: AchievementStatus,
    pub related: Option<RelatedRef>,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
}

impl Achievement {
    pub fn create(id: AchievementId, new_achievement: NewAchievement) -> Self {
        let NewAchievement {
            fields,
            created_by,
            date,
        } = new_achievement;

        Self {
            id,
            created_by,
            name: fields.name,
            code: fields.code,
            description: fields.description,
            kind: fields.kind,
            criteria: fields.criteria,
            badge_url: fields.badge_url,
            points: fields.points,
            level: fields.level,
            visibility: fields.visibility,
            status: fields.status,
            related: fields.related,
            tags: fields.tags,
            date,
        }
    }
}

/// Unvalidated achievement input. Blank strings count as not supplied.
#[derive(Debug, Clone, Default)]
pub struct AchievementDraft {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub criteria: Option<Value>,
    pub badge_url: Option<String>,
    pub points: Option<u32>,
    pub level: Option<u32>,
    pub visibility: Option<String>,
    pub status: Option<String>,
    pub related_object: Option<String>,
    pub related_object_type: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidAchievement {
    pub name: String,
    pub code: String,
    pub description: String,
    pub kind: String,
    pub criteria: Option<Value>,
    pub badge_url: Option<String>,
    pub points: Option<u32>,
    pub level: Option<u32>,
    pub visibility: Visibility,
    pub status: AchievementStatus,
    pub related: Option<RelatedRef>,
    pub tags: Vec<String>,
}

impl AchievementDraft {
    pub fn validate(self) -> Result<ValidAchievement, Vec<FieldError>> {
        let mut v = Validator::new();

        let name = v.require_text("achievementName", self.name, "Achievement name is required");
        let code = v.require_text("achievementCode", self.code, "Achievement code is required");
        let description = v.require_text(
            "achievementDesc",
            self.description,
            "Achievement description is required",
        );
        let kind = v.require_text("achievementType", self.kind, "Achievement type is required");
        let visibility =
            v.optional_parsed("visibility", non_blank(self.visibility), visibility_message());
        let status = v.optional_parsed("status", non_blank(self.status), status_message());
        let related = related_ref(&mut v, self.related_object, self.related_object_type);

        if !v.is_valid() {
            return Err(v.into_errors());
        }

        match (name, code, description, kind) {
            (Some(name), Some(code), Some(description), Some(kind)) => Ok(ValidAchievement {
                name,
                code,
                description,
                kind,
                criteria: self.criteria,
                badge_url: non_blank(self.badge_url),
                points: self.points,
                level: self.level,
                visibility: visibility.unwrap_or_default(),
                status: status.unwrap_or_default(),
                related,
                tags: self.tags.unwrap_or_default(),
            }),
            _ => Err(v.into_errors()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAchievement {
    pub fields: ValidAchievement,
    pub created_by: UserId,
    pub date: DateTime<Utc>,
}

/// Unvalidated update. `related_object` distinguishes "leave alone" (missing) from "unlink" (null).
#[derive(Debug, Clone)]
pub struct AchievementPatchDraft {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub criteria: Option<Value>,
    pub badge_url: Option<String>,
    pub points: Option<u32>,
    pub level: Option<u32>,
    pub visibility: Option<String>,
    pub status: Option<String>,
    pub related_object: Field<String>,
    pub related_object_type: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Default for AchievementPatchDraft {
    fn default() -> Self {
        Self {
            name: None,
            code: None,
            description: None,
            kind: None,
            criteria: None,
            badge_url: None,
            points: None,
            level: None,
            visibility: None,
            status: None,
            related_object: Field::Missing,
            related_object_type: None,
            tags: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchRejection {
    /// Name, code and description together describe a different achievement.
    #[error("Please add a new achievement instead of updating the existing one")]
    ReplaceInstead,
    #[error("Name and code of an achievement cannot be updated individually, change both at the same time")]
    NameCodeSplit,
    #[error("invalid achievement update")]
    Invalid(Vec<FieldError>),
}

/// A new name and code, which only ever change together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AchievementPatch {
    pub rename: Option<Rename>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub criteria: Option<Value>,
    pub badge_url: Option<String>,
    pub points: Option<u32>,
    pub level: Option<u32>,
    pub visibility: Option<Visibility>,
    pub status: Option<AchievementStatus>,
    pub related: Field<RelatedRef>,
    pub tags: Option<Vec<String>>,
}

impl AchievementPatchDraft {
    pub fn validate(self) -> Result<AchievementPatch, PatchRejection> {
        let name = non_blank(self.name);
        let code = non_blank(self.code);
        let description = non_blank(self.description);

        if name.is_some() && code.is_some() && description.is_some() {
            return Err(PatchRejection::ReplaceInstead);
        }

        let rename = match (name, code) {
            (Some(name), Some(code)) => Some(Rename { name, code }),
            (None, None) => None,
            _ => return Err(PatchRejection::NameCodeSplit),
        };

        let mut v = Validator::new();
        let visibility =
            v.optional_parsed("visibility", non_blank(self.visibility), visibility_message());
        let status = v.optional_parsed("status", non_blank(self.status), status_message());

        let related = match self.related_object {
            Field::Missing => {
                if non_blank(self.related_object_type).is_some() {
                    v.reject(
                        "relatedObject",
                        "Related object is required when a related object type is given",
                    );
                }
                Field::Missing
            }
            Field::Present(None) => Field::Present(None),
            Field::Present(Some(id)) => {
                match related_ref(&mut v, Some(id), self.related_object_type) {
                    Some(related) => Field::Present(Some(related)),
                    None => Field::Missing,
                }
            }
        };

        if !v.is_valid() {
            return Err(PatchRejection::Invalid(v.into_errors()));
        }

        Ok(AchievementPatch {
            rename,
            description,
            kind: non_blank(self.kind),
            criteria: self.criteria,
            badge_url: non_blank(self.badge_url),
            points: self.points,
            level: self.level,
            visibility,
            status,
            related,
            tags: self.tags,
        })
    }
}

impl AchievementPatch {
    /// The reference that will be stored after this patch, if it sets one.
    pub fn new_related(&self) -> Option<RelatedRef> {
        match &self.related {
            Field::Present(Some(related)) => Some(*related),
            _ => None,
        }
    }

    pub fn apply(self, achievement: &mut Achievement) {
        if let Some(Rename { name, code }) = self.rename {
            achievement.name = name;
            achievement.code = code;
        }
        if let Some(description) = self.description {
            achievement.description = description;
        }
        if let Some(kind) = self.kind {
            achievement.kind = kind;
        }
        if let Some(criteria) = self.criteria {
            achievement.criteria = Some(criteria);
        }
        if let Some(badge_url) = self.badge_url {
            achievement.badge_url = Some(badge_url);
        }
        if let Some(points) = self.points {
            achievement.points = Some(points);
        }
        if let Some(level) = self.level {
            achievement.level = Some(level);
        }
        if let Some(visibility) = self.visibility {
            achievement.visibility = visibility;
        }
        if let Some(status) = self.status {
            achievement.status = status;
        }
        if let Field::Present(related) = self.related {
            achievement.related = related;
        }
        if let Some(tags) = self.tags {
            achievement.tags = tags;
        }
    }
}

/// Both halves of the reference or neither. Records an error and returns `None` for anything else.
fn related_ref(
    v: &mut Validator,
    object: Option<String>,
    object_type: Option<String>,
) -> Option<RelatedRef> {
    match (non_blank(object), non_blank(object_type)) {
        (None, None) => None,
        (Some(_), None) => {
            v.reject(
                "relatedObjectType",
                "Related object type is required when a related object is given",
            );
            None
        }
        (None, Some(_)) => {
            v.reject(
                "relatedObject",
                "Related object is required when a related object type is given",
            );
            None
        }
        (Some(id), Some(kind)) => {
            let Ok(kind) = kind.parse::<RelatedKind>() else {
                v.reject(
                    "relatedObjectType",
                    format!(
                        "Related object type must be one of: {}",
                        RelatedKind::allowed()
                    ),
                );
                return None;
            };

            match RelatedRef::new(kind, &id) {
                Ok(related) => Some(related),
                Err(_) => {
                    v.reject("relatedObject", "Related object is not a valid id");
                    None
                }
            }
        }
    }
}

fn visibility_message() -> String {
    format!("Visibility must be one of: {}", Visibility::allowed())
}

fn status_message() -> String {
    format!("Status must be one of: {}", AchievementStatus::allowed())
}

pub trait AchievementRepository {
    fn get(
        &self,
        id: AchievementId,
    ) -> impl Future<Output = OptRepoResult<Achievement, AchievementRepoError>> + Send;

    fn list(&self)
    -> impl Future<Output = RepoResult<Vec<Achievement>, AchievementRepoError>> + Send;

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = OptRepoResult<Achievement, AchievementRepoError>> + Send;

    fn find_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = OptRepoResult<Achievement, AchievementRepoError>> + Send;

    fn create(
        &self,
        new_achievement: NewAchievement,
    ) -> impl Future<Output = RepoResult<Achievement, AchievementRepoError>> + Send;

    /// `None` if the achievement does not exist.
    fn update(
        &self,
        id: AchievementId,
        patch: AchievementPatch,
    ) -> impl Future<Output = OptRepoResult<Achievement, AchievementRepoError>> + Send;

    /// `None` if the achievement does not exist.
    fn delete(
        &self,
        id: AchievementId,
    ) -> impl Future<Output = OptRepoResult<(), AchievementRepoError>> + Send;
}
