//! Derived read models for renderers.
//!
//! Pure functions of `(posts, session)`; nothing here touches storage.

use crate::model::account::Session;
use crate::model::post::{Post, PostId};
use chrono::NaiveDate;

/// Characters of post content kept in a feed excerpt.
pub const EXCERPT_CHARS: usize = 100;

/// One feed entry as shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub id: PostId,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub date: NaiveDate,
    pub image: String,
    /// Whether the active session authored this post.
    pub can_delete: bool,
}

/// Builds feed cards in collection order.
pub fn feed_cards(posts: &[Post], session: Option<&Session>) -> Vec<PostCard> {
    posts
        .iter()
        .map(|post| PostCard {
            id: post.id,
            title: post.title.clone(),
            excerpt: excerpt(&post.content),
            author: post.author.clone(),
            date: post.date,
            image: post.image.clone(),
            can_delete: is_author(post, session),
        })
        .collect()
}

/// Posts listed on the manage page: the session's own posts, or all posts
/// when nobody is logged in.
pub fn manage_list<'a>(posts: &'a [Post], session: Option<&Session>) -> Vec<&'a Post> {
    match session {
        Some(session) => posts
            .iter()
            .filter(|post| post.author == session.name)
            .collect(),
        None => posts.iter().collect(),
    }
}

pub fn greeting(session: Option<&Session>) -> Option<String> {
    session.map(|session| format!("Welcome, {}", session.name))
}

/// First [`EXCERPT_CHARS`] characters followed by `...`.
pub fn excerpt(content: &str) -> String {
    let mut text: String = content.chars().take(EXCERPT_CHARS).collect();
    text.push_str("...");
    text
}

fn is_author(post: &Post, session: Option<&Session>) -> bool {
    session.is_some_and(|session| post.author == session.name)
}
