//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select,
};
use uuid::Uuid;

use quill_core::domain::{Page, PageRequest, PostWithOwner, User};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Posts visible at `now`, ordered by publish time (creation time when
/// unscheduled), newest first.
pub fn visible_posts(now: DateTime<Utc>) -> Select<PostEntity> {
    let now: DateTimeWithTimeZone = now.into();
    let effective_published_at: SimpleExpr = Func::coalesce([
        Expr::col((PostEntity, post::Column::PublishedAt)).into(),
        Expr::col((PostEntity, post::Column::CreatedAt)).into(),
    ])
    .into();

    PostEntity::find()
        .filter(post::Column::IsDraft.eq(false))
        .filter(
            Condition::any()
                .add(post::Column::PublishedAt.is_null())
                .add(post::Column::PublishedAt.lte(now)),
        )
        .order_by_desc(effective_published_at)
        .order_by_desc(post::Column::CreatedAt)
}

fn with_owner(
    (post, owner): (post::Model, Option<user::Model>),
) -> Result<PostWithOwner, RepoError> {
    let owner = owner
        .ok_or_else(|| RepoError::Query(format!("post {} has no owner", post.id)))?
        .as_owner();

    Ok(PostWithOwner {
        post: post.into(),
        owner,
    })
}

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if local.chars().count() > 1 => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        Some((_, domain)) => format!("***@{domain}"),
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_visible(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostWithOwner>, RepoError> {
        let paginator = visible_posts(now)
            .find_also_related(UserEntity)
            .paginate(&self.db, page.per_page);

        let total = paginator.num_items().await.map_err(query_error)?;
        if page.offset() >= total {
            return Ok(Page::new(Vec::new(), page, total));
        }

        let rows = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(query_error)?;

        let data = rows
            .into_iter()
            .map(with_owner)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(data, page, total))
    }

    async fn find_visible(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PostWithOwner>, RepoError> {
        let row = visible_posts(now)
            .filter(post::Column::Id.eq(id))
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(query_error)?;

        row.map(with_owner).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ada@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
