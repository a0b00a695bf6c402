use crate::result::{OptRepoResult, ProjectRepoError, RepoResult};
use crate::validation::{FieldError, Validator, non_blank};
use chrono::{DateTime, Utc};
use engine::id::{ProjectId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: ProjectId,
    pub project_name: String,
    pub project_description: Option<String>,
    pub created_by: UserId,
    pub created_date: DateTime<Utc>,
}

impl Project {
    pub fn create(id: ProjectId, new_project: NewProject) -> Self {
        Self {
            id,
            project_name: new_project.name,
            project_description: new_project.description,
            created_by: new_project.created_by,
            created_date: new_project.created,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created: DateTime<Utc>,
}

/// Unvalidated project input.
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectDraft {
    /// A blank description is dropped rather than rejected.
    pub fn validate(
        self,
        created_by: UserId,
        created: DateTime<Utc>,
    ) -> Result<NewProject, Vec<FieldError>> {
        let mut v = Validator::new();

        match v.require_text("projectName", self.name, "Project name is required") {
            Some(name) => Ok(NewProject {
                name,
                description: non_blank(self.description),
                created_by,
                created,
            }),
            None => Err(v.into_errors()),
        }
    }
}

pub trait ProjectRepository {
    fn get(
        &self,
        id: ProjectId,
    ) -> impl Future<Output = OptRepoResult<Project, ProjectRepoError>> + Send;

    fn create(
        &self,
        new_project: NewProject,
    ) -> impl Future<Output = RepoResult<Project, ProjectRepoError>> + Send;
}
