//! In-memory review repository: the resource store that shares the problem
//! taxonomy with the identity core. Anonymous reads are allowed; a review may
//! or may not carry the id of the identity that wrote it.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::problem::{Problem, ProblemResult};

pub const REVIEWS_BASE_PATH: &str = "/reviews";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub message: String,
    pub rating: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub message: String,
    pub rating: i32,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFilters {
    pub max_rating: Option<i32>,
}

#[derive(Default)]
pub struct ReviewStore {
    reviews: RwLock<HashMap<String, Review>>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, new: NewReview) -> ProblemResult<Review> {
        check_rating(new.rating)?;
        let id = Uuid::new_v4().to_string();
        let review = Review {
            id: id.clone(),
            message: new.message,
            rating: new.rating,
            user_id: new.user_id,
        };
        self.reviews.write().insert(id, review.clone());
        debug!(id = %review.id, rating = review.rating, "review added");
        Ok(review)
    }

    pub fn get(&self, id: &str) -> ProblemResult<Review> {
        self.reviews
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found_by_id(id))
    }

    /// Replace an existing review. Never upserts: updating an id that was not
    /// created first is refused.
    pub fn update(&self, id: &str, new: NewReview) -> ProblemResult<Review> {
        check_rating(new.rating)?;
        let mut reviews = self.reviews.write();
        if !reviews.contains_key(id) {
            return Err(Problem::update_non_existing("", format!("{REVIEWS_BASE_PATH}/{id}")));
        }
        let review = Review {
            id: id.to_string(),
            message: new.message,
            rating: new.rating,
            user_id: new.user_id,
        };
        reviews.insert(id.to_string(), review.clone());
        Ok(review)
    }

    pub fn delete(&self, id: &str) -> ProblemResult<()> {
        if self.reviews.write().remove(id).is_none() {
            return Err(not_found_by_id(id));
        }
        Ok(())
    }

    /// All reviews, optionally capped at `max_rating` inclusive.
    pub fn list(&self, filters: ReviewFilters) -> Vec<Review> {
        let reviews = self.reviews.read();
        match filters.max_rating {
            Some(max) => reviews.values().filter(|r| r.rating <= max).cloned().collect(),
            None => reviews.values().cloned().collect(),
        }
    }
}

fn check_rating(rating: i32) -> ProblemResult<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(Problem::invalid_request(
            format!("Rating must be between 1 and 5, got {rating}"),
            REVIEWS_BASE_PATH,
        ))
    }
}

fn not_found_by_id(id: &str) -> Problem {
    Problem::not_found(
        format!("Review with uuid, {id}, does not exist."),
        format!("{REVIEWS_BASE_PATH}/{id}"),
    )
}
