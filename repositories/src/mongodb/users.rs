use bson::doc;
use bson::oid::ObjectId;
use engine::id::UserId;
use error_stack::ResultExt;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tracker_core::result::{OptRepoResult, UserRepoError};
use tracker_core::user::{User, UserRepository, UserRole};

const USERS_COLLECTION_NAME: &str = "users";

/// Only the fields needed for snapshots and role checks. Credentials stay with whoever registers users.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MongoUser {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    avatar: Option<String>,
    #[serde(default)]
    user_role: UserRole,
}

impl From<MongoUser> for User {
    fn from(value: MongoUser) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            email: value.email,
            avatar: value.avatar,
            user_role: value.user_role,
        }
    }
}

impl From<User> for MongoUser {
    fn from(value: User) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            email: value.email,
            avatar: value.avatar,
            user_role: value.user_role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserRepo {
    collection: Collection<MongoUser>,
}

impl UserRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION_NAME),
        }
    }

    /// Users are registered outside this service, this only exists to seed data.
    pub async fn insert(&self, user: User) -> Result<(), mongodb::error::Error> {
        self.collection
            .insert_one(MongoUser::from(user))
            .await
            .map(|_| ())
    }
}

impl UserRepository for UserRepo {
    async fn get(&self, id: UserId) -> OptRepoResult<User, UserRepoError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .change_context(UserRepoError::Get)
            .map(|u| u.map(From::from))
    }
}
