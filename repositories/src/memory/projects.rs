use engine::ArwLock;
use engine::id::ProjectId;
use indexmap::IndexMap;
use tracker_core::project::{NewProject, Project, ProjectRepository};
use tracker_core::result::{OptRepoResult, ProjectRepoError, RepoResult};

#[derive(Clone, Default)]
pub struct InMemoryProjectRepo {
    db: ArwLock<IndexMap<ProjectId, Project>>,
}

impl ProjectRepository for InMemoryProjectRepo {
    async fn get(&self, id: ProjectId) -> OptRepoResult<Project, ProjectRepoError> {
        let db = self.db.read().await;
        Ok(db.get(&id).cloned())
    }

    async fn create(&self, new_project: NewProject) -> RepoResult<Project, ProjectRepoError> {
        let mut db = self.db.write().await;
        let project = Project::create(ProjectId::new(), new_project);
        db.insert(project.id, project.clone());

        Ok(project)
    }
}
