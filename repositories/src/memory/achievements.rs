use engine::ArwLock;
use engine::id::AchievementId;
use indexmap::IndexMap;
use tracker_core::achievement::{
    Achievement, AchievementPatch, AchievementRepository, NewAchievement,
};
use tracker_core::result::{AchievementRepoError, OptRepoResult, RepoResult};

#[derive(Clone, Default)]
pub struct InMemoryAchievementRepo {
    db: ArwLock<IndexMap<AchievementId, Achievement>>,
}

impl InMemoryAchievementRepo {
    pub async fn count(&self) -> usize {
        self.db.read().await.len()
    }

    async fn find(&self, predicate: impl Fn(&Achievement) -> bool) -> Option<Achievement> {
        let db = self.db.read().await;
        db.values().find(|a| predicate(a)).cloned()
    }
}

impl AchievementRepository for InMemoryAchievementRepo {
    async fn get(&self, id: AchievementId) -> OptRepoResult<Achievement, AchievementRepoError> {
        let db = self.db.read().await;
        Ok(db.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Achievement>, AchievementRepoError> {
        let db = self.db.read().await;
        Ok(db.values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> OptRepoResult<Achievement, AchievementRepoError> {
        Ok(self.find(|a| a.name == name).await)
    }

    async fn find_by_code(&self, code: &str) -> OptRepoResult<Achievement, AchievementRepoError> {
        Ok(self.find(|a| a.code == code).await)
    }

    async fn create(
        &self,
        new_achievement: NewAchievement,
    ) -> RepoResult<Achievement, AchievementRepoError> {
        let mut db = self.db.write().await;
        let achievement = Achievement::create(AchievementId::new(), new_achievement);
        db.insert(achievement.id, achievement.clone());

        Ok(achievement)
    }

    async fn update(
        &self,
        id: AchievementId,
        patch: AchievementPatch,
    ) -> OptRepoResult<Achievement, AchievementRepoError> {
        let mut db = self.db.write().await;

        Ok(db.get_mut(&id).map(|achievement| {
            patch.apply(achievement);
            achievement.clone()
        }))
    }

    async fn delete(&self, id: AchievementId) -> OptRepoResult<(), AchievementRepoError> {
        let mut db = self.db.write().await;
        Ok(db.shift_remove(&id).map(|_| ()))
    }
}
