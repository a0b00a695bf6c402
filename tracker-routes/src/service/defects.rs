use super::{Outcome, accept, found};
use crate::error::TrackerServiceError;
use crate::metrics;
use crate::{OptServiceResult, ServiceResult};
use chrono::Utc;
use engine::id::{DefectId, ProjectId, UserId};
use error_stack::ResultExt;
use tracing::{debug, instrument};
use tracker_core::TrackerEngine;
use tracker_core::defect::{
    Assignment, Defect, DefectDraft, DefectListCriteria, DefectPatch, DefectPatchDraft,
    DefectRepository, NewDefect, ProjectRef, StatusChange,
};
use tracker_core::project::ProjectRepository;

#[derive(Debug, Clone)]
pub struct DefectService<T> {
    engine: T,
}

impl<T: TrackerEngine> DefectService<T> {
    pub fn new(engine: T) -> Self {
        Self { engine }
    }

    #[instrument(skip_all, name = "service#get_defect")]
    pub async fn get(&self, id: DefectId) -> OptServiceResult<Defect> {
        self.engine
            .defects()
            .get(id)
            .await
            .change_context(TrackerServiceError)
    }

    pub async fn list(&self, criteria: DefectListCriteria) -> ServiceResult<Vec<Defect>> {
        self.engine
            .defects()
            .list(criteria)
            .await
            .change_context(TrackerServiceError)
    }

    /// The reporter is always the caller, whatever the request said.
    #[instrument(skip_all, name = "service#create_defect")]
    pub async fn create(
        &self,
        reporter: UserId,
        draft: DefectDraft,
    ) -> ServiceResult<Outcome<Defect>> {
        let fields = accept!(draft.validate());
        let project = found!(self.project(fields.project_id).await?, "Project");

        let defect = self
            .engine
            .defects()
            .create(NewDefect {
                fields,
                project,
                reported_by: reporter,
                created: Utc::now(),
            })
            .await
            .change_context(TrackerServiceError)?;

        debug!("defect {} reported by {reporter}", defect.id);
        metrics::increment_defects_created();

        Ok(Outcome::Done(defect))
    }

    #[instrument(skip_all, name = "service#update_defect")]
    pub async fn update(
        &self,
        id: DefectId,
        draft: DefectPatchDraft,
    ) -> ServiceResult<Outcome<Defect>> {
        let fields = accept!(draft.validate());

        let project = match fields.project_id {
            Some(project_id) => Some(found!(self.project(project_id).await?, "Project")),
            None => None,
        };

        let updated = self
            .engine
            .defects()
            .patch(id, DefectPatch::new(fields, project, Utc::now()))
            .await
            .change_context(TrackerServiceError)?;

        Ok(Outcome::Done(found!(updated, "Defect")))
    }

    #[instrument(skip_all, name = "service#change_defect_status")]
    pub async fn change_status(
        &self,
        id: DefectId,
        status: Option<String>,
    ) -> ServiceResult<Outcome<Defect>> {
        let change = accept!(StatusChange::parse(status, Utc::now()));

        let updated = self
            .engine
            .defects()
            .change_status(id, change)
            .await
            .change_context(TrackerServiceError)?;

        let defect = found!(updated, "Defect");
        metrics::increment_defect_status_changes(change.status);

        Ok(Outcome::Done(defect))
    }

    #[instrument(skip_all, name = "service#assign_defect")]
    pub async fn assign(
        &self,
        id: DefectId,
        assignee: Option<String>,
    ) -> ServiceResult<Outcome<Defect>> {
        let assignment = accept!(Assignment::parse(assignee, Utc::now()));

        let updated = self
            .engine
            .defects()
            .assign(id, assignment)
            .await
            .change_context(TrackerServiceError)?;

        Ok(Outcome::Done(found!(updated, "Defect")))
    }

    async fn project(&self, id: ProjectId) -> OptServiceResult<ProjectRef> {
        let project = self
            .engine
            .projects()
            .get(id)
            .await
            .change_context(TrackerServiceError)
            .attach_with(|| format!("project {id}"))?;

        Ok(project.map(|p| ProjectRef {
            id: p.id,
            name: p.project_name,
        }))
    }
}
