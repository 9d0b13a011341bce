use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Page, PageRequest, Post, PostWithOwner, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` if it is gone.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// The visible-only queries apply the visibility rule against `now`:
/// not a draft, and either unscheduled or scheduled at or before `now`.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Visible posts, newest publish time first, with owners embedded.
    async fn list_visible(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostWithOwner>, RepoError>;

    /// A single post with its owner, or `None` if missing or not visible.
    async fn find_visible(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PostWithOwner>, RepoError>;
}
