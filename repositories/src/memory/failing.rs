use engine::id::{AchievementId, DefectId, ProjectId, ReviewId, UserId};
use error_stack::IntoReport;
use tracker_core::TrackerEngine;
use tracker_core::achievement::{
    Achievement, AchievementPatch, AchievementRepository, NewAchievement,
};
use tracker_core::defect::{
    Assignment, Defect, DefectListCriteria, DefectPatch, DefectRepository, NewDefect,
    StatusChange,
};
use tracker_core::project::{NewProject, Project, ProjectRepository};
use tracker_core::result::{
    AchievementRepoError, DefectRepoError, OptRepoResult, ProjectRepoError, RepoResult,
    ReviewRepoError, UserRepoError,
};
use tracker_core::review::{Comment, Like, NewReview, Review, ReviewRepository};
use tracker_core::user::{User, UserRepository};

/// A repository whose every call fails, for exercising error responses.
#[derive(Clone, Copy, Default)]
pub struct FailingRepo;

#[derive(Clone, Copy, Default)]
pub struct FailingEngine;

impl TrackerEngine for FailingEngine {
    type Defects = FailingRepo;
    type Reviews = FailingRepo;
    type Achievements = FailingRepo;
    type Projects = FailingRepo;
    type Users = FailingRepo;

    fn defects(&self) -> Self::Defects {
        FailingRepo
    }

    fn reviews(&self) -> Self::Reviews {
        FailingRepo
    }

    fn achievements(&self) -> Self::Achievements {
        FailingRepo
    }

    fn projects(&self) -> Self::Projects {
        FailingRepo
    }

    fn users(&self) -> Self::Users {
        FailingRepo
    }
}

impl DefectRepository for FailingRepo {
    async fn get(&self, _: DefectId) -> OptRepoResult<Defect, DefectRepoError> {
        Err(DefectRepoError::Get.into_report())
    }

    async fn list(&self, _: DefectListCriteria) -> RepoResult<Vec<Defect>, DefectRepoError> {
        Err(DefectRepoError::List.into_report())
    }

    async fn create(&self, _: NewDefect) -> RepoResult<Defect, DefectRepoError> {
        Err(DefectRepoError::Create.into_report())
    }

    async fn patch(&self, _: DefectId, _: DefectPatch) -> OptRepoResult<Defect, DefectRepoError> {
        Err(DefectRepoError::Patch.into_report())
    }

    async fn change_status(
        &self,
        _: DefectId,
        _: StatusChange,
    ) -> OptRepoResult<Defect, DefectRepoError> {
        Err(DefectRepoError::ChangeStatus.into_report())
    }

    async fn assign(&self, _: DefectId, _: Assignment) -> OptRepoResult<Defect, DefectRepoError> {
        Err(DefectRepoError::Assign.into_report())
    }
}

impl ReviewRepository for FailingRepo {
    async fn get(&self, _: ReviewId) -> OptRepoResult<Review, ReviewRepoError> {
        Err(ReviewRepoError::Get.into_report())
    }

    async fn list(&self) -> RepoResult<Vec<Review>, ReviewRepoError> {
        Err(ReviewRepoError::List.into_report())
    }

    async fn create(&self, _: NewReview) -> RepoResult<Review, ReviewRepoError> {
        Err(ReviewRepoError::Create.into_report())
    }

    async fn update_likes(
        &self,
        _: ReviewId,
        _: Vec<Like>,
    ) -> OptRepoResult<Review, ReviewRepoError> {
        Err(ReviewRepoError::UpdateLikes.into_report())
    }

    async fn update_comments(
        &self,
        _: ReviewId,
        _: Vec<Comment>,
    ) -> OptRepoResult<Review, ReviewRepoError> {
        Err(ReviewRepoError::UpdateComments.into_report())
    }

    async fn delete(&self, _: ReviewId) -> OptRepoResult<(), ReviewRepoError> {
        Err(ReviewRepoError::Delete.into_report())
    }
}

impl AchievementRepository for FailingRepo {
    async fn get(&self, _: AchievementId) -> OptRepoResult<Achievement, AchievementRepoError> {
        Err(AchievementRepoError::Get.into_report())
    }

    async fn list(&self) -> RepoResult<Vec<Achievement>, AchievementRepoError> {
        Err(AchievementRepoError::List.into_report())
    }

    async fn find_by_name(&self, _: &str) -> OptRepoResult<Achievement, AchievementRepoError> {
        Err(AchievementRepoError::FindBy("name").into_report())
    }

    async fn find_by_code(&self, _: &str) -> OptRepoResult<Achievement, AchievementRepoError> {
        Err(AchievementRepoError::FindBy("code").into_report())
    }

    async fn create(&self, _: NewAchievement) -> RepoResult<Achievement, AchievementRepoError> {
        Err(AchievementRepoError::Create.into_report())
    }

    async fn update(
        &self,
        _: AchievementId,
        _: AchievementPatch,
    ) -> OptRepoResult<Achievement, AchievementRepoError> {
        Err(AchievementRepoError::Update.into_report())
    }

    async fn delete(&self, _: AchievementId) -> OptRepoResult<(), AchievementRepoError> {
        Err(AchievementRepoError::Delete.into_report())
    }
}

impl ProjectRepository for FailingRepo {
    async fn get(&self, _: ProjectId) -> OptRepoResult<Project, ProjectRepoError> {
        Err(ProjectRepoError::Get.into_report())
    }

    async fn create(&self, _: NewProject) -> RepoResult<Project, ProjectRepoError> {
        Err(ProjectRepoError::Create.into_report())
    }
}

impl UserRepository for FailingRepo {
    async fn get(&self, _: UserId) -> OptRepoResult<User, UserRepoError> {
        Err(UserRepoError::Get.into_report())
    }
}
