use engine::ArwLock;
use engine::id::UserId;
use indexmap::IndexMap;
use tracker_core::result::{OptRepoResult, UserRepoError};
use tracker_core::user::{User, UserRepository};

#[derive(Clone, Default)]
pub struct InMemoryUserRepo {
    db: ArwLock<IndexMap<UserId, User>>,
}

impl InMemoryUserRepo {
    pub async fn insert(&self, user: User) {
        let mut db = self.db.write().await;
        db.insert(user.id, user);
    }
}

impl UserRepository for InMemoryUserRepo {
    async fn get(&self, id: UserId) -> OptRepoResult<User, UserRepoError> {
        let db = self.db.read().await;
        Ok(db.get(&id).cloned())
    }
}
