//! Post visibility and ownership rules.
//!
//! Every operation takes the caller's identity explicitly. Reads only ever
//! see visible posts; writes only ever touch posts the caller owns.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Page, PageRequest, Post, PostWithOwner};
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, PostRepository};
use crate::validation::PostFields;

/// Fixed page size for post listings.
pub const POSTS_PER_PAGE: u64 = 20;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// One page of visible posts, newest first.
    pub async fn list(&self, page: u64) -> Result<Page<PostWithOwner>, DomainError> {
        let request = PageRequest::new(page, POSTS_PER_PAGE);
        Ok(self.posts.list_visible(Utc::now(), request).await?)
    }

    /// A visible post. Hidden posts are reported exactly like missing ones.
    pub async fn get(&self, id: Uuid) -> Result<PostWithOwner, DomainError> {
        self.posts
            .find_visible(id, Utc::now())
            .await?
            .ok_or(not_found(id))
    }

    /// Create a post owned by the caller.
    pub async fn create(&self, caller_id: Uuid, fields: PostFields) -> Result<Post, DomainError> {
        let input = fields.validate(Utc::now())?;
        let post = Post::new(caller_id, input);
        Ok(self.posts.create(post).await?)
    }

    /// Update a post the caller owns.
    pub async fn update(
        &self,
        caller_id: Uuid,
        id: Uuid,
        fields: PostFields,
    ) -> Result<Post, DomainError> {
        let mut post = self.owned_post(caller_id, id).await?;
        let input = fields.validate(Utc::now())?;
        post.apply(input);
        self.posts.update(post).await.map_err(|e| missing_as(e, id))
    }

    /// Delete a post the caller owns.
    pub async fn delete(&self, caller_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let post = self.owned_post(caller_id, id).await?;
        self.posts.delete(post.id).await.map_err(|e| missing_as(e, id))
    }

    async fn owned_post(&self, caller_id: Uuid, id: Uuid) -> Result<Post, DomainError> {
        let post = self.posts.find_by_id(id).await?.ok_or(not_found(id))?;
        if !post.is_owned_by(caller_id) {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }
}

fn not_found(id: Uuid) -> DomainError {
    DomainError::NotFound {
        entity_type: "Post",
        id,
    }
}

// A concurrent delete between the ownership check and the write.
fn missing_as(err: RepoError, id: Uuid) -> DomainError {
    match err {
        RepoError::NotFound => not_found(id),
        other => other.into(),
    }
}
