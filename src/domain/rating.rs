use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single user's score for a single movie.
///
/// At most one `Rating` exists per `(user_id, movie_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub value: i32,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl Rating {
    pub fn new(user_id: Uuid, movie_id: Uuid, value: i32) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            movie_id,
            value,
            created_on: now,
            updated_on: now,
        }
    }

    /// Replaces the score and moves `updated_on` forward. `created_on` is left alone.
    pub fn update_value(&mut self, value: i32) {
        self.value = value;

        let now = now();
        self.updated_on = if now > self.updated_on {
            now
        } else {
            self.updated_on + Duration::microseconds(1)
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovieRatingStats {
    pub average: f64,
    pub count: usize,
}

// Postgres keeps microseconds, so anything finer would not survive a round trip.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
