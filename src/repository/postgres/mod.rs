use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    domain::rating::Rating, repository::errors::RepositoryError,
    usecase::contracts::RatingRepository,
};

pub struct PostgresRatingRepository {
    pool: PgPool,
}

impl PostgresRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PostgresRatingRepository {
    #[tracing::instrument(skip(self), fields(rating_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, RepositoryError> {
        tracing::debug!("finding rating by id");

        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, movie_id, value, created_on, updated_on
            FROM ratings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(rating)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id, movie_id = %movie_id))]
    async fn find_by_user_id_and_movie_id(
        &self,
        user_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rating>, RepositoryError> {
        tracing::debug!("finding rating by user and movie");

        let rating = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, movie_id, value, created_on, updated_on
            FROM ratings
            WHERE user_id = $1 AND movie_id = $2
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(rating)
    }

    #[tracing::instrument(skip(self), fields(movie_id = %movie_id))]
    async fn find_all_by_movie_id(&self, movie_id: Uuid) -> Result<Vec<Rating>, RepositoryError> {
        tracing::debug!("finding ratings by movie_id");

        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, movie_id, value, created_on, updated_on
            FROM ratings
            WHERE movie_id = $1
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(movie_id = %movie_id, count = ratings.len(), "found ratings");
        Ok(ratings)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    async fn find_all_by_user_id(&self, user_id: Uuid) -> Result<Vec<Rating>, RepositoryError> {
        tracing::debug!("finding ratings by user_id");

        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, movie_id, value, created_on, updated_on
            FROM ratings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(user_id = %user_id, count = ratings.len(), "found ratings");
        Ok(ratings)
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    async fn find_all_by_user_id_order_by_updated_on_desc(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Rating>, RepositoryError> {
        tracing::debug!("finding ratings by user_id ordered by updated_on");

        let ratings = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, user_id, movie_id, value, created_on, updated_on
            FROM ratings
            WHERE user_id = $1
            ORDER BY updated_on DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tracing::debug!(user_id = %user_id, count = ratings.len(), "found ratings");
        Ok(ratings)
    }

    // A concurrent first insert for the same pair lands in the conflict branch,
    // so the earlier row keeps its id and created_on.
    #[tracing::instrument(skip(self, rating), fields(rating_id = %rating.id, user_id = %rating.user_id, movie_id = %rating.movie_id, rating_value = rating.value))]
    async fn save(&self, rating: &Rating) -> Result<Rating, RepositoryError> {
        tracing::debug!("saving rating");

        let saved = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (id, user_id, movie_id, value, created_on, updated_on)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, movie_id)
            DO UPDATE SET value = EXCLUDED.value, updated_on = EXCLUDED.updated_on
            RETURNING id, user_id, movie_id, value, created_on, updated_on
            "#,
        )
        .bind(rating.id)
        .bind(rating.user_id)
        .bind(rating.movie_id)
        .bind(rating.value)
        .bind(rating.created_on)
        .bind(rating.updated_on)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if saved.id != rating.id {
            tracing::warn!(rating_id = %saved.id, discarded_id = %rating.id, "concurrent insert merged into existing rating");
        }

        tracing::debug!(rating_id = %saved.id, "rating saved successfully");
        Ok(saved)
    }

    #[tracing::instrument(skip(self, rating), fields(rating_id = %rating.id))]
    async fn delete(&self, rating: &Rating) -> Result<(), RepositoryError> {
        tracing::debug!("deleting rating");

        let result = sqlx::query(
            r#"
            DELETE FROM ratings
            WHERE id = $1
            "#,
        )
        .bind(rating.id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(rating_id = %rating.id, "rating deleted successfully");
        Ok(())
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
