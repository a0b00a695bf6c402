use super::{from_bson_date, to_bson_date};
use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use engine::id::ReviewId;
use error_stack::ResultExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tracing::debug;
use tracker_core::result::{OptRepoResult, RepoResult, ReviewRepoError};
use tracker_core::review::{Comment, Like, NewReview, Review, ReviewRepository};

const REVIEWS_COLLECTION_NAME: &str = "reviews";

#[derive(Debug, Serialize, Deserialize)]
struct MongoLike {
    user: ObjectId,
}

#[derive(Debug, Serialize, Deserialize)]
struct MongoComment {
    #[serde(rename = "_id")]
    id: ObjectId,
    user: ObjectId,
    text: String,
    name: String,
    avatar: Option<String>,
    date: bson::DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MongoReview {
    #[serde(rename = "_id")]
    id: ObjectId,
    user: ObjectId,
    author: ObjectId,
    review_text: String,
    name: String,
    avatar: Option<String>,
    review_date: bson::DateTime,
    #[serde(default)]
    likes: Vec<MongoLike>,
    #[serde(default)]
    comments: Vec<MongoComment>,
}

impl From<Like> for MongoLike {
    fn from(value: Like) -> Self {
        Self {
            user: value.user.into(),
        }
    }
}

impl From<MongoLike> for Like {
    fn from(value: MongoLike) -> Self {
        Self {
            user: value.user.into(),
        }
    }
}

impl From<Comment> for MongoComment {
    fn from(value: Comment) -> Self {
        Self {
            id: value.id.into(),
            user: value.user.into(),
            text: value.text,
            name: value.name,
            avatar: value.avatar,
            date: to_bson_date(value.date),
        }
    }
}

impl From<MongoComment> for Comment {
    fn from(value: MongoComment) -> Self {
        Self {
            id: value.id.into(),
            user: value.user.into(),
            text: value.text,
            name: value.name,
            avatar: value.avatar,
            date: from_bson_date(value.date),
        }
    }
}

impl From<Review> for MongoReview {
    fn from(value: Review) -> Self {
        Self {
            id: value.id.into(),
            user: value.user.into(),
            author: value.author.into(),
            review_text: value.review_text,
            name: value.name,
            avatar: value.avatar,
            review_date: to_bson_date(value.review_date),
            likes: value.likes.into_iter().map(From::from).collect(),
            comments: value.comments.into_iter().map(From::from).collect(),
        }
    }
}

impl From<MongoReview> for Review {
    fn from(value: MongoReview) -> Self {
        Self {
            id: value.id.into(),
            user: value.user.into(),
            author: value.author.into(),
            review_text: value.review_text,
            name: value.name,
            avatar: value.avatar,
            review_date: from_bson_date(value.review_date),
            likes: value.likes.into_iter().map(From::from).collect(),
            comments: value.comments.into_iter().map(From::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewRepo {
    collection: Collection<MongoReview>,
}

impl ReviewRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(REVIEWS_COLLECTION_NAME),
        }
    }

    /// Overwrites one embedded array and returns the review as it is after the write.
    async fn replace_array(
        &self,
        id: ReviewId,
        field: &str,
        values: Bson,
    ) -> Result<Option<Review>, mongodb::error::Error> {
        let mut fields = Document::new();
        fields.insert(field, values);

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": fields })
            .with_options(options)
            .await
            .map(|r| r.map(From::from))
    }
}

impl ReviewRepository for ReviewRepo {
    async fn get(&self, id: ReviewId) -> OptRepoResult<Review, ReviewRepoError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .change_context(ReviewRepoError::Get)
            .map(|r| r.map(From::from))
    }

    async fn list(&self) -> RepoResult<Vec<Review>, ReviewRepoError> {
        let options = FindOptions::builder()
            .sort(doc! { "reviewDate": -1, "_id": -1 })
            .build();

        self.collection
            .find(Document::new())
            .with_options(options)
            .await
            .change_context(ReviewRepoError::List)?
            .map(|r| r.map(From::from))
            .collect::<Result<_, _>>()
            .await
            .change_context(ReviewRepoError::List)
    }

    async fn create(&self, new_review: NewReview) -> RepoResult<Review, ReviewRepoError> {
        let document = MongoReview::from(Review::create(ReviewId::new(), new_review));

        self.collection
            .insert_one(&document)
            .await
            .change_context(ReviewRepoError::Create)?;

        debug!("created review {} of user {}", document.id, document.user);

        Ok(document.into())
    }

    async fn update_likes(
        &self,
        id: ReviewId,
        likes: Vec<Like>,
    ) -> OptRepoResult<Review, ReviewRepoError> {
        let likes = likes.into_iter().map(MongoLike::from).collect::<Vec<_>>();
        let likes = bson::to_bson(&likes).change_context(ReviewRepoError::UpdateLikes)?;

        self.replace_array(id, "likes", likes)
            .await
            .change_context(ReviewRepoError::UpdateLikes)
    }

    async fn update_comments(
        &self,
        id: ReviewId,
        comments: Vec<Comment>,
    ) -> OptRepoResult<Review, ReviewRepoError> {
        let comments = comments
            .into_iter()
            .map(MongoComment::from)
            .collect::<Vec<_>>();
        let comments = bson::to_bson(&comments).change_context(ReviewRepoError::UpdateComments)?;

        self.replace_array(id, "comments", comments)
            .await
            .change_context(ReviewRepoError::UpdateComments)
    }

    async fn delete(&self, id: ReviewId) -> OptRepoResult<(), ReviewRepoError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .change_context(ReviewRepoError::Delete)?;

        Ok((result.deleted_count > 0).then_some(()))
    }
}
