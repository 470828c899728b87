use async_trait::async_trait;
use uuid::Uuid;

use crate::{domain::rating::Rating, repository::errors::RepositoryError};

// Boxed `Send` futures let handlers stay generic over the repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, RepositoryError>;
    async fn find_by_user_id_and_movie_id(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rating>, RepositoryError>;
    async fn find_all_by_movie_id(&self, movie_id: Uuid) -> Result<Vec<Rating>, RepositoryError>;
    async fn find_all_by_user_id(&self, user_id: Uuid) -> Result<Vec<Rating>, RepositoryError>;
    async fn find_all_by_user_id_order_by_updated_on_desc(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Rating>, RepositoryError>;
    /// Inserts the rating, or updates `value` and `updated_on` of the row already
    /// stored for the same `(user_id, movie_id)`. Returns the row as persisted.
    async fn save(&self, rating: &Rating) -> Result<Rating, RepositoryError>;
    async fn delete(&self, rating: &Rating) -> Result<(), RepositoryError>;
}
