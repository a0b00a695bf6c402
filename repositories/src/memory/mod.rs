//! Repositories that keep everything in process memory.
//!
//! Used by route and service tests. Every clone of an [`InMemoryEngine`] shares the same data.
use tracker_core::TrackerEngine;
use tracker_core::user::User;

mod achievements;
mod defects;
mod failing;
mod projects;
mod reviews;
mod users;

pub use achievements::InMemoryAchievementRepo;
pub use defects::InMemoryDefectRepo;
pub use failing::{FailingEngine, FailingRepo};
pub use projects::InMemoryProjectRepo;
pub use reviews::InMemoryReviewRepo;
pub use users::InMemoryUserRepo;

#[derive(Clone, Default)]
pub struct InMemoryEngine {
    defects: InMemoryDefectRepo,
    reviews: InMemoryReviewRepo,
    achievements: InMemoryAchievementRepo,
    projects: InMemoryProjectRepo,
    users: InMemoryUserRepo,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user so that it can author reviews or pass admin checks.
    pub async fn insert_user(&self, user: User) {
        self.users.insert(user).await;
    }
}

impl TrackerEngine for InMemoryEngine {
    type Defects = InMemoryDefectRepo;
    type Reviews = InMemoryReviewRepo;
    type Achievements = InMemoryAchievementRepo;
    type Projects = InMemoryProjectRepo;
    type Users = InMemoryUserRepo;

    fn defects(&self) -> Self::Defects {
        self.defects.clone()
    }

    fn reviews(&self) -> Self::Reviews {
        self.reviews.clone()
    }

    fn achievements(&self) -> Self::Achievements {
        self.achievements.clone()
    }

    fn projects(&self) -> Self::Projects {
        self.projects.clone()
    }

    fn users(&self) -> Self::Users {
        self.users.clone()
    }
}
