use super::{from_bson_date, to_bson_date};
use bson::doc;
use bson::oid::ObjectId;
use engine::id::ProjectId;
use error_stack::ResultExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tracker_core::project::{NewProject, Project, ProjectRepository};
use tracker_core::result::{OptRepoResult, ProjectRepoError, RepoResult};

const PROJECTS_COLLECTION_NAME: &str = "projects";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MongoProject {
    #[serde(rename = "_id")]
    id: ObjectId,
    project_name: String,
    project_description: Option<String>,
    created_by: ObjectId,
    created_date: bson::DateTime,
}

impl From<Project> for MongoProject {
    fn from(value: Project) -> Self {
        Self {
            id: value.id.into(),
            project_name: value.project_name,
            project_description: value.project_description,
            created_by: value.created_by.into(),
            created_date: to_bson_date(value.created_date),
        }
    }
}

impl From<MongoProject> for Project {
    fn from(value: MongoProject) -> Self {
        Self {
            id: value.id.into(),
            project_name: value.project_name,
            project_description: value.project_description,
            created_by: value.created_by.into(),
            created_date: from_bson_date(value.created_date),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectRepo {
    collection: Collection<MongoProject>,
}

impl ProjectRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(PROJECTS_COLLECTION_NAME),
        }
    }
}

impl ProjectRepository for ProjectRepo {
    async fn get(&self, id: ProjectId) -> OptRepoResult<Project, ProjectRepoError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .change_context(ProjectRepoError::Get)
            .map(|p| p.map(From::from))
    }

    async fn create(&self, new_project: NewProject) -> RepoResult<Project, ProjectRepoError> {
        let document = MongoProject::from(Project::create(ProjectId::new(), new_project));

        self.collection
            .insert_one(&document)
            .await
            .change_context(ProjectRepoError::Create)?;

        Ok(document.into())
    }
}
