//! Blog post record and the example posts shown on first start.
//!
//! # Invariants
//! - `id` is unique within the collection at assignment time.
//! - `author` is a copy of the creator's display name, not a foreign key.
//! - `date` is fixed at creation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Integer post identifier.
pub type PostId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Data URI or URL. Empty when the post has no image.
    #[serde(default)]
    pub image: String,
    pub content: String,
    pub author: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl Post {
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }
}

/// Returns the id the next created post receives.
///
/// Equals `count + 1` while no post has been deleted and never collides with
/// a surviving post afterwards.
pub fn next_post_id(posts: &[Post]) -> PostId {
    let highest = posts.iter().map(|post| post.id).max().unwrap_or(0);
    highest.max(posts.len() as PostId) + 1
}

/// Example posts used when no post record has ever been stored.
pub fn default_posts() -> Vec<Post> {
    vec![
        Post {
            id: 1,
            title: "My First Day in the City".to_string(),
            image: "https://images.unsplash.com/photo-1519501025264-65ba15a82390".to_string(),
            content: "Today was my first day exploring the city. The architecture was amazing and the people were so friendly...".to_string(),
            author: "pankaj tripathi".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default(),
        },
        Post {
            id: 2,
            title: "Cooking Adventures".to_string(),
            image: "https://images.unsplash.com/photo-1546069901-ba9599a7e63c".to_string(),
            content: "Tried making pasta from scratch today. It was a messy but fun experience...".to_string(),
            author: "Amit sharma".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap_or_default(),
        },
    ]
}
