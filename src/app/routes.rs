//! Local JSON API over the app shell.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

use super::{App, user_message};
use crate::backend::{Credentials, PhotoFile, Registration};
use crate::error::{BackendError, Error, WizardError};
use crate::wizard::{FieldMap, MAX_PHOTO_BYTES};

/// Room for the multipart framing around a maximum-size photo.
const UPLOAD_BODY_LIMIT: usize = MAX_PHOTO_BYTES + 64 * 1024;

/// Build the Axum router for the app's HTTP surface.
pub fn app_routes(app: App) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/view", get(view))
        .route("/api/session", get(session))
        .route("/api/session/reload", post(reload_session))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/register", post(register))
        .route("/api/wizard", get(wizard))
        .route("/api/wizard/field", post(update_field))
        .route("/api/wizard/advance", post(advance))
        .route(
            "/api/wizard/upload",
            post(upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/wizard/submit", post(submit))
        .layer(CorsLayer::permissive())
        .with_state(app)
}

/// Map an error onto a status code and `{"error": ..}` body.
///
/// Validation failures also carry the per-field messages.
fn error_response(err: Error) -> Response {
    let status = match &err {
        Error::Validation(_) | Error::Wizard(WizardError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::Wizard(WizardError::NoActiveWizard) => StatusCode::NOT_FOUND,
        Error::Wizard(_) => StatusCode::CONFLICT,
        Error::Backend(BackendError::Rejected { status, .. }) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        Error::Backend(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    debug!(status = status.as_u16(), error = %err, "API request failed");

    let mut body = json!({ "error": user_message(&err) });
    let fields = match &err {
        Error::Validation(v) | Error::Wizard(WizardError::Validation(v)) => Some(&v.fields),
        _ => None,
    };
    if let Some(fields) = fields {
        body["fields"] = json!(fields);
    }
    (status, Json(body)).into_response()
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "pawprint"
    }))
}

// ── Navigation & session ────────────────────────────────────────────────

#[derive(Deserialize)]
struct ViewQuery {
    path: Option<String>,
}

async fn view(State(app): State<App>, Query(query): Query<ViewQuery>) -> impl IntoResponse {
    if let Some(path) = query.path {
        app.navigate(&path).await;
    }
    Json(app.snapshot().await)
}

async fn session(State(app): State<App>) -> impl IntoResponse {
    let session = app.session().await.map(|s| {
        json!({
            "user_id": s.user_id,
            "display_name": s.display_name,
            "role": s.role,
        })
    });
    Json(json!({ "session": session }))
}

async fn reload_session(State(app): State<App>) -> impl IntoResponse {
    app.reload_session().await;
    Json(app.snapshot().await)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(State(app): State<App>, Json(body): Json<LoginRequest>) -> Response {
    match app.login(Credentials::new(body.email, body.password)).await {
        Ok(_) => Json(app.snapshot().await).into_response(),
        Err(e) => error_response(e),
    }
}

async fn logout(State(app): State<App>) -> impl IntoResponse {
    app.logout().await;
    Json(app.snapshot().await)
}

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    password: String,
    confirm_password: String,
}

async fn register(State(app): State<App>, Json(body): Json<RegisterRequest>) -> Response {
    let form = Registration {
        name: body.name,
        email: body.email,
        phone: body.phone.filter(|p| !p.trim().is_empty()),
        password: body.password.into(),
        confirm_password: body.confirm_password.into(),
    };
    match app.register(form).await {
        Ok(_) => (StatusCode::CREATED, Json(app.snapshot().await)).into_response(),
        Err(e) => error_response(e),
    }
}

// ── Wizard ──────────────────────────────────────────────────────────────

async fn wizard(State(app): State<App>) -> Response {
    match app.wizard().await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => error_response(WizardError::NoActiveWizard.into()),
    }
}

#[derive(Deserialize)]
struct FieldRequest {
    key: String,
    value: Value,
}

async fn update_field(State(app): State<App>, Json(body): Json<FieldRequest>) -> Response {
    match app.update_field(&body.key, body.value).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct AdvanceRequest {
    #[serde(default)]
    fields: FieldMap,
}

async fn advance(State(app): State<App>, Json(body): Json<AdvanceRequest>) -> Response {
    match app.advance(body.fields).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(e),
    }
}

fn upload_read_error(status: StatusCode) -> Response {
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        format!("The photo must be smaller than {} MB", MAX_PHOTO_BYTES / (1024 * 1024))
    } else {
        "Could not read the uploaded file".to_string()
    };
    (status, Json(json!({ "error": message }))).into_response()
}

/// Multipart upload; the photo is the `file` part.
async fn upload(State(app): State<App>, mut multipart: Multipart) -> Response {
    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let file_name = field.file_name().unwrap_or("photo").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        file = Some(PhotoFile {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read upload body");
                        return upload_read_error(e.status());
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                warn!(error = %e, "Upload over the size limit");
                return upload_read_error(e.status());
            }
            Err(e) => {
                warn!(error = %e, "Malformed multipart request");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "Malformed upload"})),
                )
                    .into_response();
            }
        }
    }

    let Some(file) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing file part"})),
        )
            .into_response();
    };

    match app.upload_photo(file).await {
        Ok(outcome) => {
            let wizard = app.wizard().await;
            Json(json!({ "outcome": outcome, "wizard": wizard })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn submit(State(app): State<App>) -> Response {
    match app.submit_wizard().await {
        Ok(receipt) => (
            StatusCode::CREATED,
            Json(json!({ "created": receipt, "view": app.snapshot().await })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
