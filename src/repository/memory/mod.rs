use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    domain::rating::Rating, repository::errors::RepositoryError,
    usecase::contracts::RatingRepository,
};

/// Keeps ratings in insertion order, with the same conflict rule as the
/// `UNIQUE (user_id, movie_id)` constraint of the Postgres table.
#[derive(Default)]
pub struct InMemoryRatingRepository {
    ratings: RwLock<Vec<Rating>>,
}

impl InMemoryRatingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.ratings.read().await.len()
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, RepositoryError> {
        let ratings = self.ratings.read().await;
        Ok(ratings.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_user_id_and_movie_id(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rating>, RepositoryError> {
        let ratings = self.ratings.read().await;
        Ok(ratings
            .iter()
            .find(|r| r.user_id == user_id && r.movie_id == movie_id)
            .cloned())
    }

    async fn find_all_by_movie_id(&self, movie_id: Uuid) -> Result<Vec<Rating>, RepositoryError> {
        let ratings = self.ratings.read().await;
        Ok(ratings.iter().filter(|r| r.movie_id == movie_id).cloned().collect())
    }

    async fn find_all_by_user_id(&self, user_id: Uuid) -> Result<Vec<Rating>, RepositoryError> {
        let ratings = self.ratings.read().await;
        Ok(ratings.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }

    async fn find_all_by_user_id_order_by_updated_on_desc(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Rating>, RepositoryError> {
        let mut found = self.find_all_by_user_id(user_id).await?;
        found.sort_by(|a, b| b.updated_on.cmp(&a.updated_on));
        Ok(found)
    }

    async fn save(&self, rating: &Rating) -> Result<Rating, RepositoryError> {
        let mut ratings = self.ratings.write().await;

        if let Some(stored) = ratings
            .iter_mut()
            .find(|r| r.user_id == rating.user_id && r.movie_id == rating.movie_id)
        {
            stored.value = rating.value;
            stored.updated_on = rating.updated_on;
            return Ok(stored.clone());
        }

        ratings.push(rating.clone());
        Ok(rating.clone())
    }

    async fn delete(&self, rating: &Rating) -> Result<(), RepositoryError> {
        let mut ratings = self.ratings.write().await;
        let before = ratings.len();
        ratings.retain(|r| r.id != rating.id);

        if ratings.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_conflicting_pair_updates_existing_row() {
        let repo = InMemoryRatingRepository::new();
        let user_id = Uuid::new_v4();
        let movie_id = Uuid::new_v4();

        let first = repo.save(&Rating::new(user_id, movie_id, 2)).await.unwrap();
        let second = repo.save(&Rating::new(user_id, movie_id, 5)).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_on, first.created_on);
        assert_eq!(second.value, 5);
    }

    #[tokio::test]
    async fn test_delete_missing_row() {
        let repo = InMemoryRatingRepository::new();
        let result = repo.delete(&Rating::new(Uuid::new_v4(), Uuid::new_v4(), 1)).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }
}
