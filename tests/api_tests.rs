use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};

use movie_rates::{
    api::{create_router, AppState},
    config::RatePolicy,
    db::{MemoryStore, Store},
    error::{AppError, AppResult},
    models::{CatalogMovie, User},
    services::{
        providers::{Claims, IdentityProvider},
        CatalogProvider,
    },
};

/// Catalog that knows a fixed set of titles
struct StubCatalog {
    titles: HashMap<String, String>,
}

impl StubCatalog {
    fn new() -> Self {
        let titles = [
            ("tt0111161", "The Shawshank Redemption"),
            ("tt0068646", "The Godfather"),
            ("tt1234567", "Some Obscure Film"),
        ]
        .into_iter()
        .map(|(id, title)| (id.to_string(), title.to_string()))
        .collect();

        Self { titles }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StubCatalog {
    async fn lookup(&self, imdb_id: &str) -> AppResult<Option<CatalogMovie>> {
        Ok(self.titles.get(imdb_id).map(|title| CatalogMovie {
            title: title.clone(),
            imdb_id: imdb_id.to_string(),
            response: "True".to_string(),
            ..Default::default()
        }))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Identity where the bearer token is the subject id; `admin-*` subjects are admins
struct StubIdentity;

#[async_trait::async_trait]
impl IdentityProvider for StubIdentity {
    fn validate(&self, token: &str) -> AppResult<Claims> {
        if token == "invalid" {
            return Err(AppError::Unauthorized("Invalid token".to_string()));
        }
        Ok(Claims {
            sub: token.to_string(),
            ..Default::default()
        })
    }

    async fn fetch_profile(&self, token: &str) -> AppResult<User> {
        Ok(User {
            user_id: token.to_string(),
            name: format!("{} display", token),
            avatar: format!("https://example.com/{}.png", token),
            email: format!("{}@example.com", token),
            profile: json!({ "sub": token }),
            admin: token.starts_with("admin-"),
            ..Default::default()
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn create_test_server_with(policy: RatePolicy) -> (TestServer, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(StubCatalog::new()),
        Arc::new(StubIdentity),
        policy,
    );
    let app = create_router(state);
    (TestServer::new(app).unwrap(), store)
}

fn create_test_server() -> (TestServer, MemoryStore) {
    create_test_server_with(RatePolicy::Retain)
}

fn as_user(request: TestRequest, subject: &str) -> TestRequest {
    let value = HeaderValue::from_str(&format!("Bearer {}", subject)).unwrap();
    request.add_header(AUTHORIZATION, value)
}

async fn create_movie(server: &TestServer, subject: &str, input: &str) -> Value {
    let response = as_user(server.post("/movies"), subject)
        .json(&json!({ "imdb": input }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn rate(server: &TestServer, subject: &str, imdb_id: &str, seen: bool, value: i32) {
    let response = as_user(server.post(&format!("/movies/{}", imdb_id)), subject)
        .json(&json!({ "seen": seen, "rate": value }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_movies_require_bearer_token() {
    let (server, _) = create_test_server();

    let response = server.get("/movies").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["kind"], "unauthorized");

    let response = as_user(server.get("/movies"), "invalid").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (server, _) = create_test_server();

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-42"),
        )
        .await;

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-42"
    );
}

#[tokio::test]
async fn test_create_extracts_id_from_free_text() {
    let (server, store) = create_test_server();

    let created = create_movie(&server, "alice", "nonsense tt1234567 extra").await;

    assert_eq!(created["imdbID"], "tt1234567");
    assert_eq!(created["Title"], "Some Obscure Film");
    assert_eq!(created["author"], "alice");
    assert!(created.get("seen").is_none());
    assert!(created.get("index").is_none());
    assert!(store.find_movie("tt1234567").await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_unknown_id_is_not_found() {
    let (server, _) = create_test_server();

    let response = as_user(server.post("/movies"), "alice")
        .json(&json!({ "imdb": "tt0000001" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn test_duplicate_create_is_conflict() {
    let (server, _) = create_test_server();
    create_movie(&server, "alice", "https://www.imdb.com/title/tt0111161/").await;

    let response = as_user(server.post("/movies"), "bob")
        .json(&json!({ "imdb": "tt0111161" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["kind"], "conflict");

    let movies: Vec<Value> = as_user(server.get("/movies"), "alice").await.json();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["author"], "alice");
}

#[tokio::test]
async fn test_malformed_body_is_internal_error() {
    let (server, _) = create_test_server();

    let response = as_user(server.post("/movies"), "alice")
        .text("{ not json")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"]["kind"], "malformed_input");
}

#[tokio::test]
async fn test_rate_unknown_movie_is_not_found() {
    let (server, store) = create_test_server();

    let response = as_user(server.post("/movies/tt0111161"), "alice")
        .json(&json!({ "seen": true, "rate": 5 }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(store.list_rates().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rating_twice_keeps_one_row() {
    let (server, store) = create_test_server();
    create_movie(&server, "alice", "tt0111161").await;

    rate(&server, "bob", "tt0111161", true, 2).await;
    rate(&server, "bob", "tt0111161", false, 4).await;

    let rates = store.rates_for_movie("tt0111161").await.unwrap();
    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0].rate, 4);
    assert!(!rates[0].seen);
    // alice on create, bob on the first rate
    assert_eq!(store.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_author_profile_is_public_view_of_creator() {
    let (server, store) = create_test_server();
    create_movie(&server, "alice", "tt0111161").await;
    assert!(store.find_user("alice").await.unwrap().is_some());

    let movie: Value = as_user(server.get("/movies/tt0111161"), "bob").await.json();
    let author = &movie["authorProfile"];
    assert_eq!(author["userId"], "alice");
    assert_eq!(author["name"], "alice display");
    assert_eq!(author["avatar"], "https://example.com/alice.png");
    assert!(author.get("email").is_none());
    assert!(author.get("profile").is_none());
    assert!(author.get("admin").is_none());
}

#[tokio::test]
async fn test_list_is_enriched_per_viewer() {
    let (server, _) = create_test_server();
    create_movie(&server, "alice", "tt0111161").await;
    create_movie(&server, "alice", "tt0068646").await;

    rate(&server, "alice", "tt0111161", true, 5).await;
    rate(&server, "bob", "tt0111161", true, 3).await;
    rate(&server, "carol", "tt0068646", false, 1).await;

    let movies: Vec<Value> = as_user(server.get("/movies"), "alice").await.json();
    assert_eq!(movies.len(), 2);

    let shawshank = &movies[0];
    assert_eq!(shawshank["imdbID"], "tt0111161");
    assert_eq!(shawshank["seen"], true);
    assert_eq!(shawshank["rate"], 5);
    assert_eq!(shawshank["authorProfile"]["name"], "alice display");

    let others = shawshank["rates"].as_array().unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0]["author"], "bob");
    assert_eq!(others[0]["authorName"], "bob display");
    assert_eq!(others[0]["authorAvatar"], "https://example.com/bob.png");

    let index = shawshank["index"].as_f64().unwrap();
    assert!((index - 8.0 / 3.0).abs() < 1e-9);

    let godfather = &movies[1];
    assert_eq!(godfather["seen"], false);
    assert_eq!(godfather["rate"], 0);
    assert_eq!(godfather["rates"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_single_movie_for_viewer() {
    let (server, _) = create_test_server();
    create_movie(&server, "alice", "tt0111161").await;
    rate(&server, "bob", "tt0111161", true, 4).await;

    let response = as_user(server.get("/movies/tt0111161"), "bob").await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["rate"], 4);
    assert!(movie["rates"].as_array().unwrap().is_empty());

    let response = as_user(server.get("/movies/tt0068646"), "bob").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_by_non_author_is_forbidden() {
    let (server, store) = create_test_server();
    create_movie(&server, "alice", "tt0111161").await;
    rate(&server, "bob", "tt0111161", true, 3).await;

    let response = as_user(server.delete("/movies/tt0111161"), "bob").await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["kind"], "forbidden");
    assert!(store.find_movie("tt0111161").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_by_admin_retains_rates() {
    let (server, store) = create_test_server();
    create_movie(&server, "alice", "tt0111161").await;
    create_movie(&server, "alice", "tt0068646").await;
    rate(&server, "admin-root", "tt0068646", true, 5).await;
    rate(&server, "bob", "tt0111161", true, 3).await;

    let response = as_user(server.delete("/movies/tt0111161"), "admin-root").await;
    response.assert_status(StatusCode::NO_CONTENT);

    assert!(store.find_movie("tt0111161").await.unwrap().is_none());
    assert_eq!(store.rates_for_movie("tt0111161").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_by_author_with_cascade() {
    let (server, store) = create_test_server_with(RatePolicy::Cascade);
    create_movie(&server, "alice", "tt0111161").await;
    rate(&server, "bob", "tt0111161", true, 3).await;

    let response = as_user(server.delete("/movies/tt0111161"), "alice").await;
    response.assert_status(StatusCode::NO_CONTENT);

    assert!(store.rates_for_movie("tt0111161").await.unwrap().is_empty());

    let response = as_user(server.delete("/movies/tt0111161"), "alice").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
