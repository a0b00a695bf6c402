use super::{Outcome, Rejection, accept, found};
use crate::error::TrackerServiceError;
use crate::metrics;
use crate::{OptServiceResult, ServiceResult};
use chrono::Utc;
use engine::id::{CommentId, ReviewId, UserId};
use error_stack::ResultExt;
use tracing::{debug, instrument, warn};
use tracker_core::TrackerEngine;
use tracker_core::review::{
    Comment, CommentRemoval, Like, LikeConflict, NewReview, Review, ReviewRepository,
    validate_comment_text, validate_review_text,
};
use tracker_core::user::{User, UserRepository};

const NOT_AUTHORIZED: &str = "User not authorized";

impl From<LikeConflict> for Rejection {
    fn from(value: LikeConflict) -> Self {
        Rejection::Conflict(value.to_string().into())
    }
}

#[derive(Debug, Clone)]
pub struct ReviewService<T> {
    engine: T,
}

impl<T: TrackerEngine> ReviewService<T> {
    pub fn new(engine: T) -> Self {
        Self { engine }
    }

    #[instrument(skip_all, name = "service#get_review")]
    pub async fn get(&self, id: ReviewId) -> OptServiceResult<Review> {
        self.engine
            .reviews()
            .get(id)
            .await
            .change_context(TrackerServiceError)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Review>> {
        self.engine
            .reviews()
            .list()
            .await
            .change_context(TrackerServiceError)
    }

    /// Writes a review of `target` on behalf of `author`.
    #[instrument(skip_all, name = "service#create_review")]
    pub async fn create(
        &self,
        author: UserId,
        target: UserId,
        text: Option<String>,
    ) -> ServiceResult<Outcome<Review>> {
        let text = accept!(validate_review_text(text));
        let author = accept!(self.registered(author).await?);
        found!(self.user(target).await?, "User");

        let review = self
            .engine
            .reviews()
            .create(NewReview::new(target, &author, text, Utc::now()))
            .await
            .change_context(TrackerServiceError)?;

        debug!("review {} of user {target} written by {}", review.id, author.id);
        metrics::increment_reviews_created();

        Ok(Outcome::Done(review))
    }

    #[instrument(skip_all, name = "service#like_review")]
    pub async fn like(&self, user: UserId, id: ReviewId) -> ServiceResult<Outcome<Vec<Like>>> {
        let mut review = found!(self.get(id).await?, "Review");
        accept!(review.like(user));

        let likes = self.store_likes(id, review.likes).await?;
        if likes.is_done() {
            metrics::increment_review_likes();
        }
        Ok(likes)
    }

    #[instrument(skip_all, name = "service#unlike_review")]
    pub async fn unlike(&self, user: UserId, id: ReviewId) -> ServiceResult<Outcome<Vec<Like>>> {
        let mut review = found!(self.get(id).await?, "Review");
        accept!(review.unlike(user));

        let likes = self.store_likes(id, review.likes).await?;
        if likes.is_done() {
            metrics::increment_review_unlikes();
        }
        Ok(likes)
    }

    #[instrument(skip_all, name = "service#comment_review")]
    pub async fn comment(
        &self,
        user: UserId,
        id: ReviewId,
        text: Option<String>,
    ) -> ServiceResult<Outcome<Vec<Comment>>> {
        let text = accept!(validate_comment_text(text));
        let author = accept!(self.registered(user).await?);
        let mut review = found!(self.get(id).await?, "Review");

        review.add_comment(Comment::new(&author, text, Utc::now()));

        self.store_comments(id, review.comments).await
    }

    #[instrument(skip_all, name = "service#remove_review_comment")]
    pub async fn remove_comment(
        &self,
        user: UserId,
        id: ReviewId,
        comment_id: CommentId,
    ) -> ServiceResult<Outcome<Vec<Comment>>> {
        let mut review = found!(self.get(id).await?, "Review");

        match review.remove_comment(comment_id, user) {
            CommentRemoval::Removed => self.store_comments(id, review.comments).await,
            CommentRemoval::Absent => {
                debug!("comment {comment_id} is not on review {id}, nothing to remove");
                Ok(Outcome::Done(review.comments))
            }
            CommentRemoval::NotAuthor => {
                warn!("user {user} tried to remove somebody else's comment {comment_id}");
                Ok(Rejection::Unauthorized(NOT_AUTHORIZED.into()).into())
            }
        }
    }

    /// Only the author of a review may delete it.
    #[instrument(skip_all, name = "service#delete_review")]
    pub async fn delete(&self, user: UserId, id: ReviewId) -> ServiceResult<Outcome<()>> {
        let review = found!(self.get(id).await?, "Review");
        if review.author != user {
            warn!("user {user} tried to delete review {id} written by {}", review.author);
            return Ok(Rejection::Unauthorized(NOT_AUTHORIZED.into()).into());
        }

        let deleted = self
            .engine
            .reviews()
            .delete(id)
            .await
            .change_context(TrackerServiceError)?;

        Ok(Outcome::Done(found!(deleted, "Review")))
    }

    async fn store_likes(
        &self,
        id: ReviewId,
        likes: Vec<Like>,
    ) -> ServiceResult<Outcome<Vec<Like>>> {
        let updated = self
            .engine
            .reviews()
            .update_likes(id, likes)
            .await
            .change_context(TrackerServiceError)?;

        Ok(Outcome::Done(found!(updated, "Review").likes))
    }

    async fn store_comments(
        &self,
        id: ReviewId,
        comments: Vec<Comment>,
    ) -> ServiceResult<Outcome<Vec<Comment>>> {
        let updated = self
            .engine
            .reviews()
            .update_comments(id, comments)
            .await
            .change_context(TrackerServiceError)?;

        Ok(Outcome::Done(found!(updated, "Review").comments))
    }

    async fn user(&self, id: UserId) -> OptServiceResult<User> {
        self.engine
            .users()
            .get(id)
            .await
            .change_context(TrackerServiceError)
            .attach_with(|| format!("user {id}"))
    }

    /// The caller's stored profile. A token for a user that is not stored is not accepted.
    async fn registered(&self, id: UserId) -> ServiceResult<Result<User, Rejection>> {
        Ok(self
            .user(id)
            .await?
            .ok_or_else(|| Rejection::Unauthorized(NOT_AUTHORIZED.into())))
    }
}
