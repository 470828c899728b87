use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::rating::{MovieRatingStats, Rating};
use crate::usecase::contracts::RatingRepository;
use crate::usecase::error::UsecaseError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub user_id: Uuid,
    pub movie_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub value: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub value: i32,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            user_id: rating.user_id,
            movie_id: rating.movie_id,
            value: rating.value,
            created_on: rating.created_on,
            updated_on: rating.updated_on,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRatingStatsResponse {
    pub average_rating: f64,
    pub total_ratings: usize,
}

impl From<MovieRatingStats> for MovieRatingStatsResponse {
    fn from(stats: MovieRatingStats) -> Self {
        Self {
            average_rating: stats.average,
            total_ratings: stats.count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRatingStatsResponse {
    pub rated_movies: usize,
}

#[tracing::instrument(skip(state, payload), fields(user_id = %payload.user_id, movie_id = %payload.movie_id))]
pub async fn upsert_rating<R: RatingRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Json(payload): Json<RatingRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling upsert rating request");

    if let Err(validation_errors) = payload.validate() {
        tracing::warn!(?validation_errors, "validation failed");
        return Err(UsecaseError::Validation(format!("{:?}", validation_errors)));
    }

    let rating = state
        .ratings_usecase
        .upsert(payload.user_id, payload.movie_id, payload.value)
        .await?;

    Ok((StatusCode::CREATED, Json(RatingResponse::from(rating))))
}

#[tracing::instrument(skip(state))]
pub async fn get_rating<R: RatingRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path((user_id, movie_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get rating request");

    let rating = state
        .ratings_usecase
        .find_by_user_id_and_movie_id(user_id, movie_id)
        .await?;

    Ok((StatusCode::OK, Json(RatingResponse::from(rating))))
}

#[tracing::instrument(skip(state), fields(rating_id = %id))]
pub async fn get_rating_by_id<R: RatingRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling get rating by id request");

    let rating = state.ratings_usecase.find_by_id(id).await?;

    Ok((StatusCode::OK, Json(RatingResponse::from(rating))))
}

#[tracing::instrument(skip(state))]
pub async fn delete_rating<R: RatingRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path((user_id, movie_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling delete rating request");

    state
        .ratings_usecase
        .remove_rating(user_id, movie_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state), fields(movie_id = %movie_id))]
pub async fn movie_rating_stats<R: RatingRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(movie_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling movie rating stats request");

    let stats = state.ratings_usecase.get_movie_rating_stats(movie_id).await?;

    tracing::debug!(movie_id = %movie_id, average = stats.average, count = stats.count, "movie rating stats retrieved");
    Ok((StatusCode::OK, Json(MovieRatingStatsResponse::from(stats))))
}

#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn user_rating_stats<R: RatingRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling user rating stats request");

    let rated_movies = state
        .ratings_usecase
        .get_all_rated_movies_count_by_user(user_id)
        .await?;

    Ok((StatusCode::OK, Json(UserRatingStatsResponse { rated_movies })))
}

#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn latest_ratings<R: RatingRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("handling latest ratings request");

    let ratings = state
        .ratings_usecase
        .get_latest_ratings_by_user_id(user_id)
        .await?;

    let response: Vec<RatingResponse> = ratings.into_iter().map(RatingResponse::from).collect();

    tracing::debug!(user_id = %user_id, count = response.len(), "latest ratings retrieved");
    Ok((StatusCode::OK, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_request_deserialization() {
        let user_id = Uuid::new_v4();
        let movie_id = Uuid::new_v4();
        let body = format!(r#"{{"userId":"{user_id}","movieId":"{movie_id}","value":5}}"#);

        let request: RatingRequest = serde_json::from_str(&body).unwrap();

        assert_eq!(request.user_id, user_id);
        assert_eq!(request.movie_id, movie_id);
        assert_eq!(request.value, 5);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_rating_request_validation_out_of_range() {
        for value in [0, 6, -1] {
            let request = RatingRequest {
                user_id: Uuid::new_v4(),
                movie_id: Uuid::new_v4(),
                value,
            };

            assert!(request.validate().is_err());
        }
    }

    #[test]
    fn test_rating_response_serialization() {
        let rating = Rating::new(Uuid::new_v4(), Uuid::new_v4(), 4);
        let response = RatingResponse::from(rating.clone());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], rating.id.to_string());
        assert_eq!(json["userId"], rating.user_id.to_string());
        assert_eq!(json["movieId"], rating.movie_id.to_string());
        assert_eq!(json["value"], 4);
        assert!(json.get("createdOn").is_some());
        assert!(json.get("updatedOn").is_some());
    }

    #[test]
    fn test_movie_rating_stats_response_serialization() {
        let response = MovieRatingStatsResponse::from(MovieRatingStats {
            average: 4.5,
            count: 10,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["averageRating"], 4.5);
        assert_eq!(json["totalRatings"], 10);
    }

    #[test]
    fn test_user_rating_stats_response_serialization() {
        let json = serde_json::to_value(UserRatingStatsResponse { rated_movies: 5 }).unwrap();
        assert_eq!(json["ratedMovies"], 5);
    }
}
