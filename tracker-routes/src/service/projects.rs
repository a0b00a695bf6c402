use super::{Outcome, accept};
use crate::error::TrackerServiceError;
use crate::{OptServiceResult, ServiceResult};
use chrono::Utc;
use engine::id::{ProjectId, UserId};
use error_stack::ResultExt;
use tracing::{debug, instrument};
use tracker_core::TrackerEngine;
use tracker_core::project::{Project, ProjectDraft, ProjectRepository};

#[derive(Debug, Clone)]
pub struct ProjectService<T> {
    engine: T,
}

impl<T: TrackerEngine> ProjectService<T> {
    pub fn new(engine: T) -> Self {
        Self { engine }
    }

    #[instrument(skip_all, name = "service#get_project")]
    pub async fn get(&self, id: ProjectId) -> OptServiceResult<Project> {
        self.engine
            .projects()
            .get(id)
            .await
            .change_context(TrackerServiceError)
    }

    #[instrument(skip_all, name = "service#create_project")]
    pub async fn create(
        &self,
        user: UserId,
        draft: ProjectDraft,
    ) -> ServiceResult<Outcome<Project>> {
        let new_project = accept!(draft.validate(user, Utc::now()));

        let project = self
            .engine
            .projects()
            .create(new_project)
            .await
            .change_context(TrackerServiceError)?;

        debug!("project {} created by {user}", project.id);
        Ok(Outcome::Done(project))
    }
}
