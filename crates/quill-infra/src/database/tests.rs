use std::collections::BTreeMap;

use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait, Value};
use uuid::Uuid;

use quill_core::domain::{PageRequest, Post};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, visible_posts};

fn post_model(owner_id: Uuid, title: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id: Uuid::new_v4(),
        owner_id,
        title: title.to_owned(),
        content: "Content".to_owned(),
        is_draft: false,
        published_at: Some((now - TimeDelta::days(1)).into()),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn user_model(id: Uuid) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        password_hash: "hash".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let user_id = Uuid::new_v4();
    let model = post_model(user_id, "Test Post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.owner_id, user_id);
    assert!(post.published_at.is_some());
}

#[test]
fn test_visible_posts_query_applies_visibility_rule() {
    let sql = visible_posts(Utc::now())
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""posts"."is_draft" = "#), "{sql}");
    assert!(
        sql.contains(r#""posts"."published_at" IS NULL OR "posts"."published_at" <="#),
        "{sql}"
    );
    assert!(
        sql.contains(r#"ORDER BY COALESCE("posts"."published_at", "posts"."created_at") DESC"#),
        "{sql}"
    );
}

#[tokio::test]
async fn test_find_visible_embeds_owner() {
    let owner_id = Uuid::new_v4();
    let model = post_model(owner_id, "Visible");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![(model, user_model(owner_id))]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let found = repo.find_visible(post_id, Utc::now()).await.unwrap().unwrap();

    assert_eq!(found.post.id, post_id);
    assert_eq!(found.owner.id, owner_id);
    assert_eq!(found.owner.name, "Ada");
}

#[tokio::test]
async fn test_find_visible_returns_none_when_hidden() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<(post::Model, user::Model)>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let found = repo.find_visible(Uuid::new_v4(), Utc::now()).await.unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_list_visible_builds_page() {
    let owner_id = Uuid::new_v4();
    let count_row = BTreeMap::from([("num_items", Value::from(2i64))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row]])
        .append_query_results(vec![vec![
            (post_model(owner_id, "First"), user_model(owner_id)),
            (post_model(owner_id, "Second"), user_model(owner_id)),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo
        .list_visible(Utc::now(), PageRequest::new(1, 20))
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    assert_eq!(page.last_page, 1);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].post.title, "First");
    assert_eq!(page.data[1].owner.name, "Ada");
}

#[tokio::test]
async fn test_create_post_returns_inserted_row() {
    let owner_id = Uuid::new_v4();
    let model = post_model(owner_id, "Inserted");
    let domain: Post = model.clone().into();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let created = repo.create(domain.clone()).await.unwrap();

    assert_eq!(created.id, domain.id);
    assert_eq!(created.title, "Inserted");
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = BaseRepository::<Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_list_visible_past_last_page_skips_fetch() {
    let count_row = BTreeMap::from([("num_items", Value::from(3i64))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo
        .list_visible(Utc::now(), PageRequest::new(u64::MAX, 20))
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.current_page, u64::MAX);
    assert!(page.data.is_empty());
}
