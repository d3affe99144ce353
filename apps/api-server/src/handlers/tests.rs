use std::future::Future;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use quill_core::domain::{BlogPost, PostFields, PostId};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;
use quill_infra::fixtures::SEED_COUNT;
use quill_infra::testing::{InMemoryLifecycle, TestHarness};
use quill_shared::dto::PostResponse;

use super::configure_routes;
use crate::state::AppState;

macro_rules! init_app {
    ($posts:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::with_repository($posts)))
                .configure(configure_routes),
        )
        .await
    };
}

/// Run `case` against a freshly seeded in-memory store.
async fn with_seeded_store<F, Fut>(case: F)
where
    F: FnOnce(Arc<dyn PostRepository>, Vec<BlogPost>) -> Fut,
    Fut: Future<Output = ()>,
{
    let harness = TestHarness::start(InMemoryLifecycle).await.unwrap();
    harness.run(case).await.unwrap();
    harness.stop().await.unwrap();
}

/// Store whose every call fails as if the database were down.
struct UnreachableStore;

fn refused() -> RepoError {
    RepoError::Connection("connection refused by 10.0.0.5:5432".to_string())
}

#[async_trait]
impl PostRepository for UnreachableStore {
    async fn insert_many(&self, _records: Vec<PostFields>) -> Result<Vec<BlogPost>, RepoError> {
        Err(refused())
    }

    async fn insert_one(&self, _record: PostFields) -> Result<BlogPost, RepoError> {
        Err(refused())
    }

    async fn find_all(&self) -> Result<Vec<BlogPost>, RepoError> {
        Err(refused())
    }

    async fn find_by_id(&self, _id: PostId) -> Result<Option<BlogPost>, RepoError> {
        Err(refused())
    }

    async fn find_one(&self) -> Result<Option<BlogPost>, RepoError> {
        Err(refused())
    }

    async fn update_by_id(&self, _id: PostId, _fields: PostFields) -> Result<BlogPost, RepoError> {
        Err(refused())
    }

    async fn delete_by_id(&self, _id: PostId) -> Result<(), RepoError> {
        Err(refused())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Err(refused())
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        Err(refused())
    }
}

fn new_post_body() -> Value {
    json!({
        "title": "X",
        "content": "Y",
        "author": { "firstName": "J", "lastName": "S" }
    })
}

// GET

#[actix_rt::test]
async fn test_list_posts_matches_store_count() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts.clone());

        let req = test::TestRequest::get().uri("/posts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Vec<Value> = test::read_body_json(resp).await;
        assert!(!body.is_empty());
        assert_eq!(body.len() as u64, posts.count().await.unwrap());
        assert_eq!(body.len(), SEED_COUNT);
    })
    .await;
}

#[actix_rt::test]
async fn test_list_posts_shape() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts.clone());

        let req = test::TestRequest::get().uri("/posts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers().get("content-type").unwrap();
        assert_eq!(content_type.to_str().unwrap(), "application/json");

        let body: Vec<Value> = test::read_body_json(resp).await;
        for item in &body {
            let obj = item.as_object().unwrap();
            for key in ["title", "content", "author", "id", "created"] {
                assert!(obj.contains_key(key), "missing key {key}");
            }
            assert!(item["author"].is_string());
        }

        let first: PostResponse = serde_json::from_value(body[0].clone()).unwrap();
        let stored = posts
            .find_by_id(first.id.parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.title, stored.title);
        assert_eq!(first.content, stored.content);
        assert_eq!(first.author, stored.author_name());
    })
    .await;
}

#[actix_rt::test]
async fn test_get_post_by_id() {
    with_seeded_store(|posts, seeded| async move {
        let app = init_app!(posts);
        let target = &seeded[3];

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", target.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: PostResponse = test::read_body_json(resp).await;
        assert_eq!(body.id, target.id.to_string());
        assert_eq!(body.title, target.title);
        assert_eq!(body.author, target.author_name());
        assert!(body.created.ends_with('Z'));
    })
    .await;
}

#[actix_rt::test]
async fn test_get_unknown_post_is_not_found() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts);

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", PostId::new()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["title"], "Not Found");
    })
    .await;
}

#[actix_rt::test]
async fn test_get_malformed_id_is_bad_request() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts);

        let req = test::TestRequest::get().uri("/posts/not-an-id").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    })
    .await;
}

// POST

#[actix_rt::test]
async fn test_create_post() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts.clone());

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(new_post_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        for key in ["title", "content", "author", "id", "created"] {
            assert!(body.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(body["title"], "X");
        assert_eq!(body["content"], "Y");
        assert_eq!(body["author"], "J S");
        assert!(!body["id"].is_null());

        let id: PostId = body["id"].as_str().unwrap().parse().unwrap();
        let stored = posts.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "X");
        assert_eq!(stored.content, "Y");
        assert_eq!(stored.author.first_name, "J");
        assert_eq!(stored.author.last_name, "S");
        assert_eq!(posts.count().await.unwrap(), SEED_COUNT as u64 + 1);
    })
    .await;
}

#[actix_rt::test]
async fn test_created_post_reads_back_with_joined_author() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts);

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(json!({
                "author": { "firstName": "A", "lastName": "B" },
                "title": "T",
                "content": "C"
            }))
            .to_request();
        let created: PostResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", created.id))
            .to_request();
        let fetched: PostResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(fetched, created);
        assert_eq!(fetched.author, "A B");
    })
    .await;
}

#[actix_rt::test]
async fn test_create_ignores_client_supplied_id() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts);
        let requested = PostId::new().to_string();

        let mut body = new_post_body();
        body["id"] = json!(requested);

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(body)
            .to_request();
        let created: PostResponse = test::call_and_read_body_json(&app, req).await;

        assert_ne!(created.id, requested);
    })
    .await;
}

#[actix_rt::test]
async fn test_create_with_missing_fields_is_rejected() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts.clone());

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(json!({ "title": "X", "author": { "firstName": "J" } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("Missing `content` in request body"));
        assert!(detail.contains("Missing `author.lastName` in request body"));

        assert_eq!(posts.count().await.unwrap(), SEED_COUNT as u64);
    })
    .await;
}

#[actix_rt::test]
async fn test_create_with_blank_title_is_rejected() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts);

        let mut body = new_post_body();
        body["title"] = json!("   ");

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    })
    .await;
}

#[actix_rt::test]
async fn test_create_with_malformed_json_is_rejected() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts);

        let req = test::TestRequest::post()
            .uri("/posts")
            .insert_header(ContentType::json())
            .set_payload("{\"title\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 400);
    })
    .await;
}

// PUT

#[actix_rt::test]
async fn test_update_post() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts.clone());
        let original = posts.find_one().await.unwrap().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", original.id))
            .set_json(json!({
                "id": original.id.to_string(),
                "title": "Hello",
                "content": "Good Morning",
                "author": { "firstName": "John", "lastName": "Smith" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(test::read_body(resp).await.is_empty());

        let stored = posts.find_by_id(original.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Hello");
        assert_eq!(stored.content, "Good Morning");
        assert_eq!(stored.author.first_name, "John");
        assert_eq!(stored.author.last_name, "Smith");
        assert_eq!(stored.id, original.id);
        assert_eq!(stored.created, original.created);

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", original.id))
            .to_request();
        let fetched: PostResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched.author, "John Smith");
    })
    .await;
}

#[actix_rt::test]
async fn test_update_without_body_id() {
    with_seeded_store(|posts, seeded| async move {
        let app = init_app!(posts.clone());
        let target = &seeded[0];

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", target.id))
            .set_json(new_post_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let stored = posts.find_by_id(target.id).await.unwrap().unwrap();
        assert_eq!(stored.author_name(), "J S");
    })
    .await;
}

#[actix_rt::test]
async fn test_update_with_mismatched_ids_is_rejected() {
    with_seeded_store(|posts, seeded| async move {
        let app = init_app!(posts.clone());
        let target = &seeded[0];

        let mut body = new_post_body();
        body["id"] = json!(seeded[1].id.to_string());

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", target.id))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let stored = posts.find_by_id(target.id).await.unwrap().unwrap();
        assert_eq!(&stored, target);
    })
    .await;
}

#[actix_rt::test]
async fn test_update_with_missing_fields_is_rejected() {
    with_seeded_store(|posts, seeded| async move {
        let app = init_app!(posts);

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", seeded[0].id))
            .set_json(json!({ "title": "Hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    })
    .await;
}

#[actix_rt::test]
async fn test_update_unknown_post_is_not_found() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts);

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{}", PostId::new()))
            .set_json(new_post_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    })
    .await;
}

// DELETE

#[actix_rt::test]
async fn test_delete_post() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts.clone());
        let target = posts.find_one().await.unwrap().unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", target.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        assert_eq!(posts.find_by_id(target.id).await.unwrap(), None);
        assert_eq!(posts.count().await.unwrap(), SEED_COUNT as u64 - 1);

        let req = test::TestRequest::get()
            .uri(&format!("/posts/{}", target.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", target.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    })
    .await;
}

#[actix_rt::test]
async fn test_delete_malformed_id_is_bad_request() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts.clone());

        let req = test::TestRequest::delete().uri("/posts/42").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(posts.count().await.unwrap(), SEED_COUNT as u64);
    })
    .await;
}

// Health

#[actix_rt::test]
async fn test_health_reports_store_up() {
    with_seeded_store(|posts, _| async move {
        let app = init_app!(posts);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "up");
    })
    .await;
}

#[actix_rt::test]
async fn test_health_reports_store_down() {
    let app = init_app!(Arc::new(UnreachableStore));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"], "down");
}

// Store failures

#[actix_rt::test]
async fn test_unreachable_store_is_internal_error() {
    let app = init_app!(Arc::new(UnreachableStore));
    let id = PostId::new();

    let requests = vec![
        test::TestRequest::get().uri("/posts").to_request(),
        test::TestRequest::get()
            .uri(&format!("/posts/{}", id))
            .to_request(),
        test::TestRequest::post()
            .uri("/posts")
            .set_json(new_post_body())
            .to_request(),
        test::TestRequest::put()
            .uri(&format!("/posts/{}", id))
            .set_json(new_post_body())
            .to_request(),
        test::TestRequest::delete()
            .uri(&format!("/posts/{}", id))
            .to_request(),
    ];

    for req in requests {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 500);
        assert_eq!(body["title"], "Internal Server Error");
        assert!(body.get("detail").is_none());
        assert!(!body.to_string().contains("10.0.0.5"));
    }
}
