//! Defect lifecycle: creation, partial edits, status transitions and reassignment.
//!
//! Status changes are not restricted by any adjacency table, every status can follow every other.
//! What the lifecycle does guarantee is timestamp bookkeeping: each write stamps `modifiedDate`,
//! entering `Resolved` stamps `resolvedDate` and entering `Closed` stamps `closedDate`. Neither
//! marker is ever cleared, and re-entering the same status overwrites it.
use crate::result::{DefectRepoError, OptRepoResult, RepoResult};
use crate::validation::{FieldError, Validator};
use crate::wire::wire_enum;
use chrono::{DateTime, Utc};
use engine::Pagination;
use engine::id::{DefectId, ProjectId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

wire_enum! {
    pub enum DefectStatus {
        New => "New",
        InProgress => "In Progress",
        Resolved => "Resolved",
        Failed => "Failed",
        Closed => "Closed",
        Reopen => "Reopen",
    }
}

wire_enum! {
    pub enum DefectPriority {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

wire_enum! {
    pub enum DefectSeverity {
        Critical => "Critical",
        Major => "Major",
        Minor => "Minor",
        Cosmetic => "Cosmetic",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    #[serde(rename = "_id")]
    pub id: DefectId,
    pub project_id: ProjectId,
    /// Name of the project at the time the project reference was last set.
    pub project_name: String,
    #[serde(rename = "defectTitle")]
    pub title: String,
    #[serde(rename = "defectDescription")]
    pub description: String,
    #[serde(rename = "defectStatus")]
    pub status: DefectStatus,
    #[serde(rename = "defectPriority")]
    pub priority: DefectPriority,
    #[serde(rename = "defectSeverity")]
    pub severity: DefectSeverity,
    pub reported_by: UserId,
    pub assigned_to: Option<UserId>,
    pub reproduce_steps: String,
    pub expected_result: String,
    pub actual_result: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: Option<DateTime<Utc>>,
    pub resolved_date: Option<DateTime<Utc>>,
    pub closed_date: Option<DateTime<Utc>>,
}

impl Defect {
    pub fn create(id: DefectId, new_defect: NewDefect) -> Self {
        let NewDefect {
            fields,
            project,
            reported_by,
            created,
        } = new_defect;

        Self {
            id,
            project_id: project.id,
            project_name: project.name,
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            severity: fields.severity,
            reported_by,
            assigned_to: fields.assigned_to,
            reproduce_steps: fields.reproduce_steps,
            expected_result: fields.expected_result,
            actual_result: fields.actual_result,
            created_date: created,
            modified_date: None,
            resolved_date: None,
            closed_date: None,
        }
    }
}

/// The project a defect points at, with the display name that gets copied into the defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: ProjectId,
    pub name: String,
}

/// Unvalidated creation input, as received.
#[derive(Debug, Clone, Default)]
pub struct DefectDraft {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub assigned_to: Option<String>,
    pub reproduce_steps: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidDefect {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: DefectStatus,
    pub priority: DefectPriority,
    pub severity: DefectSeverity,
    pub assigned_to: Option<UserId>,
    pub reproduce_steps: String,
    pub expected_result: String,
    pub actual_result: String,
}

impl DefectDraft {
    /// Checks every field and reports all failures at once.
    pub fn validate(self) -> Result<ValidDefect, Vec<FieldError>> {
        let mut v = Validator::new();

        let project_id = v.require_parsed(
            "projectId",
            self.project_id,
            "Project ID is required",
            "Project ID is not a valid id",
        );
        let title = v.require_text("defectTitle", self.title, "Defect title is required");
        let description = v.require_text(
            "defectDescription",
            self.description,
            "Defect description is required",
        );
        let status = v.require_parsed(
            "defectStatus",
            self.status,
            "Defect status is required",
            status_message(),
        );
        let priority = v.require_parsed(
            "defectPriority",
            self.priority,
            "Defect priority is required",
            priority_message(),
        );
        let severity = v.require_parsed(
            "defectSeverity",
            self.severity,
            "Defect severity is required",
            severity_message(),
        );
        let assigned_to = v.optional_parsed(
            "assignedTo",
            self.assigned_to,
            "Assigned to user ID is not a valid id",
        );
        let reproduce_steps = v.require_text(
            "reproduceSteps",
            self.reproduce_steps,
            "Reproduce steps are required",
        );
        let expected_result = v.require_text(
            "expectedResult",
            self.expected_result,
            "Expected result is required",
        );
        let actual_result =
            v.require_text("actualResult", self.actual_result, "Actual result is required");

        if !v.is_valid() {
            return Err(v.into_errors());
        }

        match (
            project_id,
            title,
            description,
            status,
            priority,
            severity,
            reproduce_steps,
            expected_result,
            actual_result,
        ) {
            (
                Some(project_id),
                Some(title),
                Some(description),
                Some(status),
                Some(priority),
                Some(severity),
                Some(reproduce_steps),
                Some(expected_result),
                Some(actual_result),
            ) => Ok(ValidDefect {
                project_id,
                title,
                description,
                status,
                priority,
                severity,
                assigned_to,
                reproduce_steps,
                expected_result,
                actual_result,
            }),
            _ => Err(v.into_errors()),
        }
    }
}

/// A validated defect ready to be stored.
#[derive(Debug, Clone)]
pub struct NewDefect {
    pub fields: ValidDefect,
    pub project: ProjectRef,
    pub reported_by: UserId,
    pub created: DateTime<Utc>,
}

/// Unvalidated partial update. Status is deliberately absent, it only changes through [`StatusChange`].
#[derive(Debug, Clone, Default)]
pub struct DefectPatchDraft {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub reproduce_steps: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidDefectPatch {
    pub project_id: Option<ProjectId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<DefectPriority>,
    pub severity: Option<DefectSeverity>,
    pub reproduce_steps: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
}

impl DefectPatchDraft {
    pub fn validate(self) -> Result<ValidDefectPatch, Vec<FieldError>> {
        let mut v = Validator::new();

        let patch = ValidDefectPatch {
            project_id: v.optional_parsed(
                "projectId",
                self.project_id,
                "Project ID is not a valid id",
            ),
            title: v.optional_text("defectTitle", self.title, "Defect title cannot be empty"),
            description: v.optional_text(
                "defectDescription",
                self.description,
                "Defect description cannot be empty",
            ),
            priority: v.optional_parsed("defectPriority", self.priority, priority_message()),
            severity: v.optional_parsed("defectSeverity", self.severity, severity_message()),
            reproduce_steps: v.optional_text(
                "reproduceSteps",
                self.reproduce_steps,
                "Reproduce steps cannot be empty",
            ),
            expected_result: v.optional_text(
                "expectedResult",
                self.expected_result,
                "Expected result cannot be empty",
            ),
            actual_result: v.optional_text(
                "actualResult",
                self.actual_result,
                "Actual result cannot be empty",
            ),
        };

        if v.is_valid() {
            Ok(patch)
        } else {
            Err(v.into_errors())
        }
    }
}

/// A partial update to the core fields of a defect. `None` fields keep their stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct DefectPatch {
    pub project: Option<ProjectRef>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<DefectPriority>,
    pub severity: Option<DefectSeverity>,
    pub reproduce_steps: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub modified: DateTime<Utc>,
}

impl DefectPatch {
    pub fn new(
        fields: ValidDefectPatch,
        project: Option<ProjectRef>,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            project,
            title: fields.title,
            description: fields.description,
            priority: fields.priority,
            severity: fields.severity,
            reproduce_steps: fields.reproduce_steps,
            expected_result: fields.expected_result,
            actual_result: fields.actual_result,
            modified,
        }
    }

    pub fn apply(self, defect: &mut Defect) {
        if let Some(project) = self.project {
            defect.project_id = project.id;
            defect.project_name = project.name;
        }
        if let Some(title) = self.title {
            defect.title = title;
        }
        if let Some(description) = self.description {
            defect.description = description;
        }
        if let Some(priority) = self.priority {
            defect.priority = priority;
        }
        if let Some(severity) = self.severity {
            defect.severity = severity;
        }
        if let Some(steps) = self.reproduce_steps {
            defect.reproduce_steps = steps;
        }
        if let Some(expected) = self.expected_result {
            defect.expected_result = expected;
        }
        if let Some(actual) = self.actual_result {
            defect.actual_result = actual;
        }
        defect.modified_date = Some(self.modified);
    }
}

/// Moves a defect into a new status at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: DefectStatus,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    pub fn new(status: DefectStatus, at: DateTime<Utc>) -> Self {
        Self { status, at }
    }

    pub fn parse(raw: Option<String>, at: DateTime<Utc>) -> Result<Self, Vec<FieldError>> {
        let mut v = Validator::new();
        let status = v.require_parsed(
            "defectStatus",
            raw,
            "Defect status is required",
            status_message(),
        );

        match status {
            Some(status) => Ok(Self::new(status, at)),
            None => Err(v.into_errors()),
        }
    }

    /// Set when the new status is `Resolved`, otherwise left alone.
    pub fn resolved_date(&self) -> Option<DateTime<Utc>> {
        (self.status == DefectStatus::Resolved).then_some(self.at)
    }

    /// Set when the new status is `Closed`, otherwise left alone.
    pub fn closed_date(&self) -> Option<DateTime<Utc>> {
        (self.status == DefectStatus::Closed).then_some(self.at)
    }

    pub fn apply(self, defect: &mut Defect) {
        defect.status = self.status;
        if let Some(resolved) = self.resolved_date() {
            defect.resolved_date = Some(resolved);
        }
        if let Some(closed) = self.closed_date() {
            defect.closed_date = Some(closed);
        }
        defect.modified_date = Some(self.at);
    }
}

/// Hands a defect to a new owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub assignee: UserId,
    pub at: DateTime<Utc>,
}

impl Assignment {
    pub fn parse(raw: Option<String>, at: DateTime<Utc>) -> Result<Self, Vec<FieldError>> {
        let mut v = Validator::new();
        let assignee = v.require_parsed(
            "assignedTo",
            raw,
            "Assigned to user ID is required",
            "Assigned to user ID is not a valid id",
        );

        match assignee {
            Some(assignee) => Ok(Self { assignee, at }),
            None => Err(v.into_errors()),
        }
    }

    pub fn apply(self, defect: &mut Defect) {
        defect.assigned_to = Some(self.assignee);
        defect.modified_date = Some(self.at);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefectListCriteria {
    pub page: u64,
    pub page_size: u64,
    pub project_id: Option<ProjectId>,
}

impl DefectListCriteria {
    pub fn new(
        pagination: Pagination,
        default_page_size: u64,
        project_id: Option<ProjectId>,
    ) -> Self {
        Self {
            page: pagination.page,
            page_size: pagination.page_size_or(default_page_size),
            project_id,
        }
    }

    pub fn offset(&self) -> Option<u64> {
        Pagination::with_page_size(self.page, self.page_size).offset(self.page_size)
    }
}

pub trait DefectRepository {
    fn get(&self, id: DefectId)
    -> impl Future<Output = OptRepoResult<Defect, DefectRepoError>> + Send;

    fn list(
        &self,
        criteria: DefectListCriteria,
    ) -> impl Future<Output = RepoResult<Vec<Defect>, DefectRepoError>> + Send;

    fn create(
        &self,
        new_defect: NewDefect,
    ) -> impl Future<Output = RepoResult<Defect, DefectRepoError>> + Send;

    /// `None` if the defect does not exist.
    fn patch(
        &self,
        id: DefectId,
        patch: DefectPatch,
    ) -> impl Future<Output = OptRepoResult<Defect, DefectRepoError>> + Send;

    /// `None` if the defect does not exist.
    fn change_status(
        &self,
        id: DefectId,
        change: StatusChange,
    ) -> impl Future<Output = OptRepoResult<Defect, DefectRepoError>> + Send;

    /// `None` if the defect does not exist.
    fn assign(
        &self,
        id: DefectId,
        assignment: Assignment,
    ) -> impl Future<Output = OptRepoResult<Defect, DefectRepoError>> + Send;
}

fn status_message() -> String {
    format!("Defect status must be one of: {}", DefectStatus::allowed())
}

fn priority_message() -> String {
    format!("Defect priority must be one of: {}", DefectPriority::allowed())
}

fn severity_message() -> String {
    format!("Defect severity must be one of: {}", DefectSeverity::allowed())
}
