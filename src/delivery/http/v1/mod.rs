pub mod middleware;
pub mod ratings;

use std::sync::Arc;

use axum::{
    extract::State,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::delivery::http::v1::middleware::metrics_middleware;
use crate::delivery::http::v1::ratings::{
    delete_rating, get_rating, get_rating_by_id, latest_ratings, movie_rating_stats,
    upsert_rating, user_rating_stats,
};
use crate::usecase::contracts::RatingRepository;
use crate::AppState;

pub fn router<R>(state: Arc<AppState<R>>) -> Router
where
    R: RatingRepository + 'static,
{
    // matchit allows only one parameter name per segment position, hence `{id}`
    // for both the user and the movie id in the second segment.
    let ratings_api = Router::new()
        .route("/api/v1/ratings", post(upsert_rating::<R>))
        .route("/api/v1/ratings/by-id/{id}", get(get_rating_by_id::<R>))
        .route(
            "/api/v1/ratings/{id}/{movie_id}",
            get(get_rating::<R>).delete(delete_rating::<R>),
        )
        .route("/api/v1/ratings/{id}/stats", get(movie_rating_stats::<R>))
        .route("/api/v1/ratings/{id}/user", get(user_rating_stats::<R>))
        .route("/api/v1/ratings/{id}/latest-ratings", get(latest_ratings::<R>));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(render_metrics::<R>))
        .merge(ratings_api)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn render_metrics<R: RatingRepository + 'static>(
    State(state): State<Arc<AppState<R>>>,
) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
