use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Owner;
use crate::validation::PostInput;

/// Post entity - represents a blog post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub is_draft: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `owner_id` from validated input.
    pub fn new(owner_id: Uuid, input: PostInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            content: input.content,
            is_draft: input.is_draft.unwrap_or(false),
            published_at: input.published_at.flatten(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply validated changes. Title and content are replaced; the draft
    /// flag and publish time only when the input carries them. An explicit
    /// null publish time unschedules the post.
    pub fn apply(&mut self, input: PostInput) {
        self.title = input.title;
        self.content = input.content;
        if let Some(is_draft) = input.is_draft {
            self.is_draft = is_draft;
        }
        if let Some(published_at) = input.published_at {
            self.published_at = published_at;
        }
        self.updated_at = Utc::now();
    }

    /// Whether the post shows up in general listing and viewing at `now`.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_draft && self.published_at.is_none_or(|at| at <= now)
    }

    /// Sort key for listings: publish time, falling back to creation time.
    pub fn effective_published_at(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// A post together with its owner's public identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithOwner {
    #[serde(flatten)]
    pub post: Post,
    pub owner: Owner,
}
