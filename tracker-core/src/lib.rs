use achievement::AchievementRepository;
use defect::DefectRepository;
use project::ProjectRepository;
use review::ReviewRepository;
use user::UserRepository;

pub mod achievement;
pub mod defect;
pub mod project;
pub mod result;
pub mod review;
pub mod user;
pub mod validation;
pub mod wire;

/// Everything the services need from a storage backend, one repository per collection.
pub trait TrackerEngine: Clone + Send + Sync + 'static {
    type Defects: DefectRepository + Send + Sync + 'static;
    type Reviews: ReviewRepository + Send + Sync + 'static;
    type Achievements: AchievementRepository + Send + Sync + 'static;
    type Projects: ProjectRepository + Send + Sync + 'static;
    type Users: UserRepository + Send + Sync + 'static;

    fn defects(&self) -> Self::Defects;
    fn reviews(&self) -> Self::Reviews;
    fn achievements(&self) -> Self::Achievements;
    fn projects(&self) -> Self::Projects;
    fn users(&self) -> Self::Users;
}
