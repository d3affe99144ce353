//! `/posts` resource handlers.

use actix_web::{HttpResponse, web};
use chrono::SecondsFormat;

use quill_core::domain::{Author, BlogPost, PostFields, PostId};
use quill_core::error::RepoError;
use quill_shared::dto::{PostRequest, PostResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Outgoing shape: author flattened to `"First Last"`.
fn to_response(post: BlogPost) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        author: post.author_name(),
        created: post.created.to_rfc3339_opts(SecondsFormat::Millis, true),
        title: post.title,
        content: post.content,
    }
}

/// Check a request body for missing and blank fields.
fn to_fields(req: PostRequest) -> AppResult<PostFields> {
    let missing = req.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::Validation(
            missing
                .into_iter()
                .map(|field| format!("Missing `{}` in request body", field))
                .collect(),
        ));
    }

    let author = req.author.unwrap_or_default();
    let fields = PostFields::new(
        req.title.unwrap_or_default(),
        req.content.unwrap_or_default(),
        Author::new(
            author.first_name.unwrap_or_default(),
            author.last_name.unwrap_or_default(),
        ),
    );
    fields.validate()?;

    Ok(fields)
}

fn not_found(id: PostId) -> AppError {
    AppError::NotFound(format!("Post {} not found", id))
}

fn or_not_found(id: PostId) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound => not_found(id),
        other => other.into(),
    }
}

/// GET /posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id: PostId = path.parse()?;

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let fields = to_fields(body.into_inner())?;

    let post = state.posts.insert_one(fields).await?;
    tracing::info!(post_id = %post.id, "Blog post created");

    Ok(HttpResponse::Created().json(to_response(post)))
}

/// PUT /posts/{id}
///
/// Full replace of title, content and author. A body `id`, when present, must
/// name the same post as the path.
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let id: PostId = path.parse()?;
    let req = body.into_inner();

    if let Some(body_id) = req.id.as_deref()
        && body_id.parse::<PostId>().ok() != Some(id)
    {
        return Err(AppError::BadRequest(format!(
            "Request path id ({}) and request body id ({}) must match",
            id, body_id
        )));
    }

    let fields = to_fields(req)?;
    state
        .posts
        .update_by_id(id, fields)
        .await
        .map_err(or_not_found(id))?;
    tracing::info!(post_id = %id, "Blog post updated");

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id: PostId = path.parse()?;

    state
        .posts
        .delete_by_id(id)
        .await
        .map_err(or_not_found(id))?;
    tracing::info!(post_id = %id, "Blog post deleted");

    Ok(HttpResponse::NoContent().finish())
}
