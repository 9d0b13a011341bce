//! Post resource handlers.

use actix_web::{HttpResponse, web};
use serde_json::Value;
use uuid::Uuid;

use quill_core::validation::{PostFields, Submitted};
use quill_shared::MessageResponse;
use quill_shared::dto::{ListPostsQuery, PostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn into_fields(req: PostRequest) -> PostFields {
    PostFields {
        title: text(req.title),
        content: text(req.content),
        is_draft: flag(req.is_draft),
        published_at: text(req.published_at),
    }
}

fn text(value: Option<Value>) -> Submitted<String> {
    match value {
        None => Submitted::Absent,
        Some(Value::Null) => Submitted::Null,
        Some(Value::String(s)) => Submitted::Value(s),
        Some(_) => Submitted::WrongType,
    }
}

// true/false, 1/0 and "1"/"0" all count as booleans.
fn flag(value: Option<Value>) -> Submitted<bool> {
    match value {
        None => Submitted::Absent,
        Some(Value::Null) => Submitted::Null,
        Some(Value::Bool(b)) => Submitted::Value(b),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(0) => Submitted::Value(false),
            Some(1) => Submitted::Value(true),
            _ => Submitted::WrongType,
        },
        Some(Value::String(s)) => match s.as_str() {
            "0" => Submitted::Value(false),
            "1" => Submitted::Value(true),
            _ => Submitted::WrongType,
        },
        Some(_) => Submitted::WrongType,
    }
}

/// GET /api/posts
pub async fn index(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.list(query.page.unwrap_or(1)).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/posts/{id}
pub async fn show(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts
pub async fn store(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .create(identity.user_id, into_fields(body.into_inner()))
        .await?;

    tracing::info!(post_id = %post.id, owner_id = %post.owner_id, "Post created");
    Ok(HttpResponse::Created().json(post))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .update(identity.user_id, id, into_fields(body.into_inner()))
        .await
        .inspect_err(|e| {
            if matches!(e, quill_core::DomainError::Forbidden) {
                tracing::warn!(post_id = %id, caller_id = %identity.user_id, "Update denied");
            }
        })?;

    tracing::info!(post_id = %post.id, "Post updated");
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state
        .posts
        .delete(identity.user_id, id)
        .await
        .inspect_err(|e| {
            if matches!(e, quill_core::DomainError::Forbidden) {
                tracing::warn!(post_id = %id, caller_id = %identity.user_id, "Delete denied");
            }
        })?;

    tracing::info!(post_id = %id, "Post deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted")))
}
