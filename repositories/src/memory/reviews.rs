use engine::ArwLock;
use engine::id::ReviewId;
use indexmap::IndexMap;
use tracker_core::result::{OptRepoResult, RepoResult, ReviewRepoError};
use tracker_core::review::{Comment, Like, NewReview, Review, ReviewRepository};

#[derive(Clone, Default)]
pub struct InMemoryReviewRepo {
    db: ArwLock<IndexMap<ReviewId, Review>>,
}

impl ReviewRepository for InMemoryReviewRepo {
    async fn get(&self, id: ReviewId) -> OptRepoResult<Review, ReviewRepoError> {
        let db = self.db.read().await;
        Ok(db.get(&id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Review>, ReviewRepoError> {
        let db = self.db.read().await;

        // later inserts win ties, like a descending sort on the stored date
        let mut reviews = db.values().rev().cloned().collect::<Vec<_>>();
        reviews.sort_by(|a, b| b.review_date.cmp(&a.review_date));

        Ok(reviews)
    }

    async fn create(&self, new_review: NewReview) -> RepoResult<Review, ReviewRepoError> {
        let mut db = self.db.write().await;
        let review = Review::create(ReviewId::new(), new_review);
        db.insert(review.id, review.clone());

        Ok(review)
    }

    async fn update_likes(
        &self,
        id: ReviewId,
        likes: Vec<Like>,
    ) -> OptRepoResult<Review, ReviewRepoError> {
        let mut db = self.db.write().await;

        Ok(db.get_mut(&id).map(|review| {
            review.likes = likes;
            review.clone()
        }))
    }

    async fn update_comments(
        &self,
        id: ReviewId,
        comments: Vec<Comment>,
    ) -> OptRepoResult<Review, ReviewRepoError> {
        let mut db = self.db.write().await;

        Ok(db.get_mut(&id).map(|review| {
            review.comments = comments;
            review.clone()
        }))
    }

    async fn delete(&self, id: ReviewId) -> OptRepoResult<(), ReviewRepoError> {
        let mut db = self.db.write().await;
        Ok(db.shift_remove(&id).map(|_| ()))
    }
}
