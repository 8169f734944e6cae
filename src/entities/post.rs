//! Feed posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntity, RecordFilter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
  pub id: String,
  pub author_id: String,
  pub description: String,
  pub image_url: Option<String>,
  /// Where the post was made, if the author shared a location.
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
  /// Posts written by one user ("my posts", profile pages).
  ByAuthor(String),
}

impl RecordFilter<Post> for PostFilter {
  fn matches(&self, post: &Post) -> bool {
    match self {
      PostFilter::ByAuthor(author_id) => post.author_id == *author_id,
    }
  }
}

impl CacheEntity for Post {
  type Filter = PostFilter;

  fn entity_id(&self) -> String {
    self.id.clone()
  }

  fn entity_type() -> &'static str {
    "post"
  }
}
