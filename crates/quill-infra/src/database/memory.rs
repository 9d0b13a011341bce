//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Page, PageRequest, Post, PostWithOwner, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn create(&self, mut user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let now = Utc::now();
        user.created_at = now;
        user.updated_at = now;
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, mut user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        let existing = store.get_mut(&user.id).ok_or(RepoError::NotFound)?;

        user.created_at = existing.created_at;
        user.updated_at = Utc::now();
        *existing = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }
}

/// In-memory post store. Owners are resolved against the shared user store.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            users,
        }
    }

    async fn with_owner(&self, post: Post) -> Result<PostWithOwner, RepoError> {
        let owner = self
            .users
            .find_by_id(post.owner_id)
            .await?
            .ok_or_else(|| RepoError::Query(format!("post {} has no owner", post.id)))?
            .as_owner();

        Ok(PostWithOwner { post, owner })
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn create(&self, mut post: Post) -> Result<Post, RepoError> {
        if self.users.find_by_id(post.owner_id).await?.is_none() {
            return Err(RepoError::Constraint(format!(
                "owner {} does not exist",
                post.owner_id
            )));
        }

        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let now = Utc::now();
        post.created_at = now;
        post.updated_at = now;
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        let existing = store.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        post.created_at = existing.created_at;
        post.updated_at = Utc::now();
        *existing = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_visible(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostWithOwner>, RepoError> {
        let mut visible: Vec<Post> = {
            let store = self.store.read().await;
            store
                .values()
                .filter(|p| p.is_visible_at(now))
                .cloned()
                .collect()
        };
        visible.sort_by(|a, b| {
            b.effective_published_at()
                .cmp(&a.effective_published_at())
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total = visible.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let per_page = usize::try_from(page.per_page).unwrap_or(usize::MAX);

        let mut data = Vec::new();
        for post in visible.into_iter().skip(offset).take(per_page) {
            data.push(self.with_owner(post).await?);
        }

        Ok(Page::new(data, page, total))
    }

    async fn find_visible(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PostWithOwner>, RepoError> {
        match self.find_by_id(id).await? {
            Some(post) if post.is_visible_at(now) => Ok(Some(self.with_owner(post).await?)),
            _ => Ok(None),
        }
    }
}
