//! In-process stand-in for the pet-adoption REST backend.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const TOKEN: &str = "tok-u1";

/// What the fake backend has been asked to store.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub adoptions: Arc<Mutex<Vec<Value>>>,
    pub lost_pets: Arc<Mutex<Vec<Value>>>,
    pub uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
    pub questions: Arc<Mutex<Vec<Value>>>,
    pub deleted_users: Arc<Mutex<Vec<String>>>,
    /// Every request as `(method, path, sent the test token)`.
    pub requests: Arc<Mutex<Vec<(String, String, bool)>>>,
}

impl FakeBackend {
    /// Whether `method path` was requested, and with the bearer token.
    pub fn saw(&self, method: &str, path: &str) -> Option<bool> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, p, _)| m == method && p == path)
            .map(|(_, _, authed)| *authed)
    }
}

/// Start the fake backend on a random port; returns its API base URL.
pub async fn start_fake_backend() -> (String, FakeBackend) {
    let state = FakeBackend::default();
    let router = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/adoptions", get(list_adoptions).post(create_adoption))
        .route("/api/adoptions/{id}", get(get_adoption).delete(delete_adoption))
        .route("/api/lost-pets", get(list_lost_pets).post(create_lost_pet))
        .route(
            "/api/uploads",
            post(upload).layer(DefaultBodyLimit::max(16 * 1024 * 1024)),
        )
        .route("/api/questions", get(list_questions).post(post_question))
        .route("/api/questions/{id}", get(get_question).delete(delete_question))
        .route("/api/questions/{id}/answers", post(answer_question))
        .route("/api/donations", get(list_donations))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}", delete(delete_user))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}/api"), state)
}

async fn record(State(state): State<FakeBackend>, request: Request, next: Next) -> Response {
    let entry = (
        request.method().to_string(),
        request.uri().path().to_string(),
        authorized(request.headers()),
    );
    state.requests.lock().unwrap().push(entry);
    next.run(request).await
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Please log in"})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    let role = if email.starts_with("admin") { "admin" } else { "regular" };
    Json(json!({"id": "u1", "name": "Uma", "role": role, "token": TOKEN})).into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@example.org" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "Email already registered"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"id": "u2", "name": body["name"], "token": "tok-u2"})),
    )
        .into_response()
}

async fn list_adoptions(State(state): State<FakeBackend>) -> impl IntoResponse {
    let ads: Vec<Value> = state
        .adoptions
        .lock()
        .unwrap()
        .iter()
        .enumerate()
        .map(|(i, ad)| {
            json!({"id": (i + 42).to_string(), "species": ad["species"], "name": ad["name"]})
        })
        .collect();
    Json(ads)
}

async fn create_adoption(
    State(state): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let id = {
        let mut ads = state.adoptions.lock().unwrap();
        ads.push(body.clone());
        (ads.len() + 41).to_string()
    };
    (
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "species": body["species"],
            "name": body["name"],
            "photo_url": body["photo_url"],
            "owner_id": "u1",
            "created_at": "2026-03-01T10:00:00Z",
        })),
    )
        .into_response()
}

async fn get_adoption(State(state): State<FakeBackend>, Path(id): Path<String>) -> Response {
    let found = id
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(42))
        .and_then(|i| state.adoptions.lock().unwrap().get(i).cloned());
    match found {
        Some(ad) => Json(json!({
            "id": id,
            "species": ad["species"],
            "name": ad["name"],
            "city": ad["city"],
            "photo_url": ad["photo_url"],
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Ad not found"})),
        )
            .into_response(),
    }
}

async fn delete_adoption(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == "missing" {
        return (StatusCode::NOT_FOUND, "Ad not found").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Deliberately broken: answers 200 with a body that is not JSON.
async fn list_lost_pets() -> impl IntoResponse {
    "<html>maintenance</html>"
}

async fn create_lost_pet(
    State(state): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.lost_pets.lock().unwrap().push(body.clone());
    let mut created = body;
    created["id"] = json!("7");
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn upload(State(state): State<FakeBackend>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap_or_default();
        if name.starts_with("fail") {
            return (StatusCode::INTERNAL_SERVER_ERROR, "disk full").into_response();
        }
        state
            .uploads
            .lock()
            .unwrap()
            .push((name.clone(), content_type, bytes.len()));
        return Json(json!({"url": format!("/uploads/{name}"), "file_name": name})).into_response();
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "No file"})),
    )
        .into_response()
}

fn question_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Question not found"})),
    )
        .into_response()
}

async fn list_questions(State(state): State<FakeBackend>) -> impl IntoResponse {
    Json(state.questions.lock().unwrap().clone())
}

async fn get_question(State(state): State<FakeBackend>, Path(id): Path<String>) -> Response {
    let questions = state.questions.lock().unwrap();
    match questions.iter().find(|q| q["id"] == id) {
        Some(question) => Json(question.clone()).into_response(),
        None => question_not_found(),
    }
}

async fn post_question(
    State(state): State<FakeBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["title"].as_str().is_none_or(|t| t.trim().is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "A question needs a title"})),
        )
            .into_response();
    }
    let mut questions = state.questions.lock().unwrap();
    let question = json!({
        "id": format!("q{}", questions.len() + 1),
        "title": body["title"],
        "body": body["body"],
        "author": "Uma",
        "answers": [],
        "created_at": "2026-03-02T09:30:00Z",
    });
    questions.push(question.clone());
    (StatusCode::CREATED, Json(question)).into_response()
}

async fn answer_question(
    State(state): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut questions = state.questions.lock().unwrap();
    let Some(question) = questions.iter_mut().find(|q| q["id"] == id) else {
        return question_not_found();
    };
    let Some(answers) = question["answers"].as_array_mut() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let answer = json!({
        "id": format!("a{}", answers.len() + 1),
        "body": body["body"],
        "author": "Uma",
    });
    answers.push(answer.clone());
    (StatusCode::CREATED, Json(answer)).into_response()
}

async fn delete_question(
    State(state): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut questions = state.questions.lock().unwrap();
    let before = questions.len();
    questions.retain(|q| q["id"] != id);
    if questions.len() == before {
        return (StatusCode::NOT_FOUND, "Question not found").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_donations() -> impl IntoResponse {
    Json(json!([
        {
            "id": "d1",
            "name": "Refuge des Lilas",
            "city": "Lyon",
            "website": "https://lilas.example.org",
        },
        {"id": "d2", "name": "Paws Fund"},
    ]))
}

async fn list_users(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        {"id": "u1", "name": "Uma", "email": "admin@example.org", "role": "admin"},
        {"id": "u2", "name": "Nia", "email": "nia@example.org"},
    ]))
    .into_response()
}

async fn delete_user(
    State(state): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == "u1" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "You cannot delete your own account"})),
        )
            .into_response();
    }
    state.deleted_users.lock().unwrap().push(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn stats(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"users": 3, "adoptions": 5, "lost_pets": 2, "questions": 8})).into_response()
}
