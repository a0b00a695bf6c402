use engine::ArwLock;
use engine::id::DefectId;
use error_stack::ResultExt;
use indexmap::IndexMap;
use tracker_core::defect::{
    Assignment, Defect, DefectListCriteria, DefectPatch, DefectRepository, NewDefect,
    StatusChange,
};
use tracker_core::result::{DefectRepoError, OptRepoResult, RepoResult};

#[derive(Clone, Default)]
pub struct InMemoryDefectRepo {
    db: ArwLock<IndexMap<DefectId, Defect>>,
}

impl InMemoryDefectRepo {
    async fn modify(&self, id: DefectId, f: impl FnOnce(&mut Defect)) -> Option<Defect> {
        let mut db = self.db.write().await;

        db.get_mut(&id).map(|defect| {
            f(defect);
            defect.clone()
        })
    }
}

impl DefectRepository for InMemoryDefectRepo {
    async fn get(&self, id: DefectId) -> OptRepoResult<Defect, DefectRepoError> {
        let db = self.db.read().await;
        Ok(db.get(&id).cloned())
    }

    async fn list(&self, criteria: DefectListCriteria) -> RepoResult<Vec<Defect>, DefectRepoError> {
        let skip = criteria
            .offset()
            .and_then(|offset| usize::try_from(offset).ok())
            .ok_or(DefectRepoError::List)
            .attach_with(|| {
                format!(
                    "invalid page ({}) and page size ({})",
                    criteria.page, criteria.page_size
                )
            })?;
        let take = usize::try_from(criteria.page_size).unwrap_or(usize::MAX);

        let db = self.db.read().await;

        Ok(db
            .values()
            .filter(|defect| {
                criteria
                    .project_id
                    .is_none_or(|project_id| defect.project_id == project_id)
            })
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn create(&self, new_defect: NewDefect) -> RepoResult<Defect, DefectRepoError> {
        let mut db = self.db.write().await;
        let defect = Defect::create(DefectId::new(), new_defect);
        db.insert(defect.id, defect.clone());

        Ok(defect)
    }

    async fn patch(
        &self,
        id: DefectId,
        patch: DefectPatch,
    ) -> OptRepoResult<Defect, DefectRepoError> {
        Ok(self.modify(id, |defect| patch.apply(defect)).await)
    }

    async fn change_status(
        &self,
        id: DefectId,
        change: StatusChange,
    ) -> OptRepoResult<Defect, DefectRepoError> {
        Ok(self.modify(id, |defect| change.apply(defect)).await)
    }

    async fn assign(
        &self,
        id: DefectId,
        assignment: Assignment,
    ) -> OptRepoResult<Defect, DefectRepoError> {
        Ok(self.modify(id, |defect| assignment.apply(defect)).await)
    }
}
