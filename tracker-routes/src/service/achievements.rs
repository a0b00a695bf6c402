//! Achievement definitions. Reads are public, every write needs a stored administrator.
use super::{Outcome, Rejection, accept, found};
use crate::error::TrackerServiceError;
use crate::metrics;
use crate::{OptServiceResult, ServiceResult};
use chrono::Utc;
use engine::id::{AchievementId, UserId};
use error_stack::ResultExt;
use tracing::{debug, instrument, warn};
use tracker_core::TrackerEngine;
use tracker_core::achievement::{
    Achievement, AchievementDraft, AchievementPatchDraft, AchievementRepository, NewAchievement,
    PatchRejection, RelatedObject, RelatedRef, Rename,
};
use tracker_core::defect::DefectRepository;
use tracker_core::project::ProjectRepository;
use tracker_core::review::ReviewRepository;
use tracker_core::user::UserRepository;

const RELATED_OBJECT: &str = "Related object";

impl From<PatchRejection> for Rejection {
    fn from(value: PatchRejection) -> Self {
        match value {
            PatchRejection::Invalid(errors) => Rejection::Invalid(errors),
            other => Rejection::BadRequest(other.to_string().into()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AdminAction {
    Add,
    Update,
    Delete,
}

impl AdminAction {
    fn denied(self) -> Rejection {
        let action = match self {
            AdminAction::Add => "add",
            AdminAction::Update => "update",
            AdminAction::Delete => "delete",
        };
        Rejection::Unauthorized(
            format!("Unauthorized. Only Admins have access to {action} achievements").into(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct AchievementService<T> {
    engine: T,
}

impl<T: TrackerEngine> AchievementService<T> {
    pub fn new(engine: T) -> Self {
        Self { engine }
    }

    #[instrument(skip_all, name = "service#get_achievement")]
    pub async fn get(&self, id: AchievementId) -> OptServiceResult<Achievement> {
        self.engine
            .achievements()
            .get(id)
            .await
            .change_context(TrackerServiceError)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Achievement>> {
        self.engine
            .achievements()
            .list()
            .await
            .change_context(TrackerServiceError)
    }

    /// The entity the achievement points at. Missing links and dangling links are both not found.
    #[instrument(skip_all, name = "service#related_object")]
    pub async fn related(&self, id: AchievementId) -> ServiceResult<Outcome<RelatedObject>> {
        let achievement = found!(self.get(id).await?, "Achievement");
        let related = found!(achievement.related, RELATED_OBJECT);

        Ok(Outcome::Done(found!(self.resolve(related).await?, RELATED_OBJECT)))
    }

    #[instrument(skip_all, name = "service#create_achievement")]
    pub async fn create(
        &self,
        user: UserId,
        draft: AchievementDraft,
    ) -> ServiceResult<Outcome<Achievement>> {
        accept!(self.require_admin(user, AdminAction::Add).await?);
        let fields = accept!(draft.validate());

        accept!(self.check_unique(&fields.name, &fields.code, None).await?);
        if let Some(related) = fields.related {
            found!(self.resolve(related).await?, RELATED_OBJECT);
        }

        let achievement = self
            .engine
            .achievements()
            .create(NewAchievement {
                fields,
                created_by: user,
                date: Utc::now(),
            })
            .await
            .change_context(TrackerServiceError)?;

        debug!("achievement {} ({}) created", achievement.id, achievement.code);
        metrics::increment_achievements_created();

        Ok(Outcome::Done(achievement))
    }

    #[instrument(skip_all, name = "service#update_achievement")]
    pub async fn update(
        &self,
        user: UserId,
        id: AchievementId,
        draft: AchievementPatchDraft,
    ) -> ServiceResult<Outcome<Achievement>> {
        accept!(self.require_admin(user, AdminAction::Update).await?);
        found!(self.get(id).await?, "Achievement");
        let patch = accept!(draft.validate());

        if let Some(Rename { name, code }) = &patch.rename {
            accept!(self.check_unique(name, code, Some(id)).await?);
        }
        if let Some(related) = patch.new_related() {
            found!(self.resolve(related).await?, RELATED_OBJECT);
        }

        let updated = self
            .engine
            .achievements()
            .update(id, patch)
            .await
            .change_context(TrackerServiceError)?;

        Ok(Outcome::Done(found!(updated, "Achievement")))
    }

    #[instrument(skip_all, name = "service#delete_achievement")]
    pub async fn delete(&self, user: UserId, id: AchievementId) -> ServiceResult<Outcome<()>> {
        accept!(self.require_admin(user, AdminAction::Delete).await?);

        let deleted = self
            .engine
            .achievements()
            .delete(id)
            .await
            .change_context(TrackerServiceError)?;

        let deleted = found!(deleted, "Achievement");
        metrics::increment_achievements_deleted();

        Ok(Outcome::Done(deleted))
    }

    /// Looks up the caller's stored role. Unknown users are treated like non-admins.
    async fn require_admin(
        &self,
        user: UserId,
        action: AdminAction,
    ) -> ServiceResult<Result<(), Rejection>> {
        let stored = self
            .engine
            .users()
            .get(user)
            .await
            .change_context(TrackerServiceError)
            .attach_with(|| format!("user {user}"))?;

        match stored {
            Some(stored) if stored.is_admin() => Ok(Ok(())),
            _ => {
                warn!("user {user} is not allowed to {action:?} achievements");
                Ok(Err(action.denied()))
            }
        }
    }

    /// Name is checked before code. `own` is left out of the comparison so an achievement never
    /// collides with itself.
    async fn check_unique(
        &self,
        name: &str,
        code: &str,
        own: Option<AchievementId>,
    ) -> ServiceResult<Result<(), Rejection>> {
        let repo = self.engine.achievements();
        let is_other = |a: &Achievement| Some(a.id) != own;

        let by_name = repo
            .find_by_name(name)
            .await
            .change_context(TrackerServiceError)?;
        if by_name.as_ref().is_some_and(is_other) {
            return Ok(Err(Rejection::Conflict(
                "Achievement with the same name already exist".into(),
            )));
        }

        let by_code = repo
            .find_by_code(code)
            .await
            .change_context(TrackerServiceError)?;
        if by_code.as_ref().is_some_and(is_other) {
            return Ok(Err(Rejection::Conflict(
                "Achievement with the same code already exist".into(),
            )));
        }

        Ok(Ok(()))
    }

    async fn resolve(&self, related: RelatedRef) -> OptServiceResult<RelatedObject> {
        let resolved = match related {
            RelatedRef::User(id) => self
                .engine
                .users()
                .get(id)
                .await
                .map(|u| u.map(RelatedObject::User))
                .change_context(TrackerServiceError),
            RelatedRef::Project(id) => self
                .engine
                .projects()
                .get(id)
                .await
                .map(|p| p.map(RelatedObject::Project))
                .change_context(TrackerServiceError),
            RelatedRef::Defect(id) => self
                .engine
                .defects()
                .get(id)
                .await
                .map(|d| d.map(RelatedObject::Defect))
                .change_context(TrackerServiceError),
            RelatedRef::Review(id) => self
                .engine
                .reviews()
                .get(id)
                .await
                .map(|r| r.map(RelatedObject::Review))
                .change_context(TrackerServiceError),
            RelatedRef::Achievement(id) => self
                .engine
                .achievements()
                .get(id)
                .await
                .map(|a| a.map(|a| RelatedObject::Achievement(Box::new(a))))
                .change_context(TrackerServiceError),
        };

        resolved.attach_with(|| format!("related {} {}", related.kind(), related.id()))
    }
}
