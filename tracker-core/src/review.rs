use crate::result::{OptRepoResult, RepoResult, ReviewRepoError};
use crate::user::User;
use crate::validation::{FieldError, Validator};
use chrono::{DateTime, Utc};
use engine::id::{CommentId, ReviewId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Like {
    pub user: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: CommentId,
    pub user: UserId,
    pub text: String,
    pub name: String,
    pub avatar: Option<String>,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: &User, text: String, date: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::new(),
            user: author.id,
            text,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    /// The user being reviewed.
    pub user: UserId,
    pub author: UserId,
    pub review_text: String,
    /// Author name at the time of writing. Not kept in sync with later profile changes.
    pub name: String,
    pub avatar: Option<String>,
    pub review_date: DateTime<Utc>,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LikeConflict {
    #[error("Review already liked")]
    AlreadyLiked,
    #[error("Review has not yet been liked")]
    NotLiked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentRemoval {
    Removed,
    /// No comment has the id. Nothing changed.
    Absent,
    /// The comment exists but belongs to somebody else. Nothing changed.
    NotAuthor,
}

impl Review {
    pub fn create(id: ReviewId, new_review: NewReview) -> Self {
        Self {
            id,
            user: new_review.target,
            author: new_review.author,
            review_text: new_review.text,
            name: new_review.name,
            avatar: new_review.avatar,
            review_date: new_review.date,
            likes: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn is_liked_by(&self, user: UserId) -> bool {
        self.likes.iter().any(|like| like.user == user)
    }

    /// Newest likes come first.
    pub fn like(&mut self, user: UserId) -> Result<(), LikeConflict> {
        if self.is_liked_by(user) {
            return Err(LikeConflict::AlreadyLiked);
        }
        self.likes.insert(0, Like { user });
        Ok(())
    }

    pub fn unlike(&mut self, user: UserId) -> Result<(), LikeConflict> {
        let idx = self
            .likes
            .iter()
            .position(|like| like.user == user)
            .ok_or(LikeConflict::NotLiked)?;
        self.likes.remove(idx);
        Ok(())
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn remove_comment(&mut self, comment_id: CommentId, user: UserId) -> CommentRemoval {
        match self.comments.iter().position(|c| c.id == comment_id) {
            None => CommentRemoval::Absent,
            Some(idx) if self.comments[idx].user != user => CommentRemoval::NotAuthor,
            Some(idx) => {
                self.comments.remove(idx);
                CommentRemoval::Removed
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub target: UserId,
    pub author: UserId,
    pub text: String,
    pub name: String,
    pub avatar: Option<String>,
    pub date: DateTime<Utc>,
}

impl NewReview {
    /// Snapshots the author's current name and avatar.
    pub fn new(target: UserId, author: &User, text: String, date: DateTime<Utc>) -> Self {
        Self {
            target,
            author: author.id,
            text,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            date,
        }
    }
}

pub fn validate_review_text(text: Option<String>) -> Result<String, Vec<FieldError>> {
    let mut v = Validator::new();
    v.require_text("reviewText", text, "Review text is required")
        .ok_or_else(|| v.into_errors())
}

pub fn validate_comment_text(text: Option<String>) -> Result<String, Vec<FieldError>> {
    let mut v = Validator::new();
    v.require_text("text", text, "Comment text is required")
        .ok_or_else(|| v.into_errors())
}

pub trait ReviewRepository {
    fn get(&self, id: ReviewId)
    -> impl Future<Output = OptRepoResult<Review, ReviewRepoError>> + Send;

    /// All reviews, newest first.
    fn list(&self) -> impl Future<Output = RepoResult<Vec<Review>, ReviewRepoError>> + Send;

    fn create(
        &self,
        new_review: NewReview,
    ) -> impl Future<Output = RepoResult<Review, ReviewRepoError>> + Send;

    /// Replaces the stored likes. `None` if the review does not exist.
    fn update_likes(
        &self,
        id: ReviewId,
        likes: Vec<Like>,
    ) -> impl Future<Output = OptRepoResult<Review, ReviewRepoError>> + Send;

    /// Replaces the stored comments. `None` if the review does not exist.
    fn update_comments(
        &self,
        id: ReviewId,
        comments: Vec<Comment>,
    ) -> impl Future<Output = OptRepoResult<Review, ReviewRepoError>> + Send;

    fn delete(&self, id: ReviewId)
    -> impl Future<Output = OptRepoResult<(), ReviewRepoError>> + Send;
}
