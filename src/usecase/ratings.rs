use uuid::Uuid;

use crate::domain::rating::{MovieRatingStats, Rating};
use crate::usecase::contracts::RatingRepository;
use crate::usecase::error::UsecaseError;

/// Upper bound on the number of entries returned by
/// [`RatingsUseCase::get_latest_ratings_by_user_id`].
pub const LATEST_RATINGS_LIMIT: usize = 20;

pub struct RatingsUseCase<R>
where
    R: RatingRepository,
{
    rating_repository: R,
}

impl<R> RatingsUseCase<R>
where
    R: RatingRepository,
{
    pub fn new(rating_repository: R) -> Self {
        Self { rating_repository }
    }

    /// Creates the rating for `(user_id, movie_id)` or overwrites the score of
    /// the existing one. `value` is stored as given.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, movie_id = %movie_id, rating_value = value))]
    pub async fn upsert(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
        value: i32,
    ) -> Result<Rating, UsecaseError> {
        tracing::debug!("upserting rating");

        let existing = self
            .rating_repository
            .find_by_user_id_and_movie_id(user_id, movie_id)
            .await?;

        if let Some(mut rating) = existing {
            rating.update_value(value);
            let saved = self.rating_repository.save(&rating).await?;

            metrics::counter!("ratings_upserts_total", "outcome" => "updated").increment(1);
            tracing::info!(rating_id = %saved.id, user_id = %saved.user_id, movie_id = %saved.movie_id, "rating updated successfully");
            return Ok(saved);
        }

        let rating = Rating::new(user_id, movie_id, value);
        let saved = self.rating_repository.save(&rating).await?;

        let outcome = insert_outcome(&rating, &saved);
        metrics::counter!("ratings_upserts_total", "outcome" => outcome).increment(1);
        tracing::info!(rating_id = %saved.id, user_id = %saved.user_id, movie_id = %saved.movie_id, outcome, "rating upserted successfully");
        Ok(saved)
    }

    #[tracing::instrument(skip(self), fields(rating_id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Rating, UsecaseError> {
        tracing::debug!("finding rating by id");

        self.rating_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound(format!("Rating with id [{id}] not found")))
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, movie_id = %movie_id))]
    pub async fn find_by_user_id_and_movie_id(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Rating, UsecaseError> {
        tracing::debug!("finding rating");

        self.rating_repository
            .find_by_user_id_and_movie_id(user_id, movie_id)
            .await?
            .ok_or_else(|| {
                UsecaseError::NotFound(format!(
                    "Rating with user id [{user_id}] and movie id [{movie_id}] not found"
                ))
            })
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, movie_id = %movie_id))]
    pub async fn remove_rating(&self, user_id: Uuid, movie_id: Uuid) -> Result<(), UsecaseError> {
        tracing::debug!("removing rating");

        let rating = self.find_by_user_id_and_movie_id(user_id, movie_id).await?;
        self.rating_repository.delete(&rating).await?;

        tracing::info!(rating_id = %rating.id, user_id = %user_id, movie_id = %movie_id, "rating removed successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(movie_id = %movie_id))]
    pub async fn get_average_rating_for_a_movie(&self, movie_id: Uuid) -> Result<f64, UsecaseError> {
        let ratings = self.ratings_for_movie(movie_id).await?;

        let sum: i64 = ratings.iter().map(|r| i64::from(r.value)).sum();
        let average = sum as f64 / ratings.len() as f64;

        tracing::info!(movie_id = %movie_id, average, count = ratings.len(), "calculated average rating");
        Ok(average)
    }

    #[tracing::instrument(skip(self), fields(movie_id = %movie_id))]
    pub async fn get_all_ratings_for_a_movie_count(
        &self,
        movie_id: Uuid,
    ) -> Result<usize, UsecaseError> {
        let count = self.ratings_for_movie(movie_id).await?.len();

        tracing::info!(movie_id = %movie_id, count, "counted ratings for movie");
        Ok(count)
    }

    /// Average and count for one movie, as served by the stats endpoint.
    #[tracing::instrument(skip(self), fields(movie_id = %movie_id))]
    pub async fn get_movie_rating_stats(
        &self,
        movie_id: Uuid,
    ) -> Result<MovieRatingStats, UsecaseError> {
        let average = self.get_average_rating_for_a_movie(movie_id).await?;
        let count = self.get_all_ratings_for_a_movie_count(movie_id).await?;

        Ok(MovieRatingStats { average, count })
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_all_rated_movies_count_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<usize, UsecaseError> {
        let ratings = self.rating_repository.find_all_by_user_id(user_id).await?;

        if ratings.is_empty() {
            return Err(UsecaseError::NotFound(format!(
                "No movies rated by user with id [{user_id}]"
            )));
        }

        tracing::info!(user_id = %user_id, count = ratings.len(), "counted movies rated by user");
        Ok(ratings.len())
    }

    /// The user's ratings, most recently updated first, capped at
    /// [`LATEST_RATINGS_LIMIT`].
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_latest_ratings_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Rating>, UsecaseError> {
        let mut ratings = self
            .rating_repository
            .find_all_by_user_id_order_by_updated_on_desc(user_id)
            .await?;

        if ratings.is_empty() {
            return Err(UsecaseError::NotFound(format!(
                "Latest ratings not found for user with id [{user_id}]"
            )));
        }

        let total = ratings.len();
        ratings.truncate(LATEST_RATINGS_LIMIT);

        tracing::info!(user_id = %user_id, returned = ratings.len(), total, "retrieved latest ratings");
        Ok(ratings)
    }

    async fn ratings_for_movie(&self, movie_id: Uuid) -> Result<Vec<Rating>, UsecaseError> {
        let ratings = self.rating_repository.find_all_by_movie_id(movie_id).await?;

        if ratings.is_empty() {
            return Err(UsecaseError::NotFound(format!(
                "No ratings found for movie with id [{movie_id}]"
            )));
        }

        Ok(ratings)
    }
}

// A concurrent first upsert for the same pair is merged by the store into the
// row that won, so the returned id differs from the one we generated.
fn insert_outcome(inserted: &Rating, saved: &Rating) -> &'static str {
    if saved.id == inserted.id {
        "created"
    } else {
        "updated"
    }
}
