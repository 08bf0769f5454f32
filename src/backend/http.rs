//! HTTP implementation of [`Backend`] over reqwest.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::Backend;
use super::model::*;
use crate::error::BackendError;

/// Default timeout for photo uploads.
const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the pet-adoption backend.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
    upload_timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            token: RwLock::new(None),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.current_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), url = %response.url(), "Backend request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = status.as_u16(), message = %message, "Backend rejected request");
        Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), BackendError> {
        self.send(builder).await.map(|_| ())
    }
}

/// Pull a user-facing message out of an error body.
///
/// Accepts `{"message": ..}` and `{"error": ..}` JSON, then plain text, then
/// falls back to the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                if !msg.trim().is_empty() {
                    return msg.trim().to_string();
                }
            }
        }
    }
    let text = body.trim();
    if !text.is_empty() && !text.starts_with('{') && !text.starts_with('<') {
        return text.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

#[async_trait]
impl Backend for HttpBackend {
    fn set_auth_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    async fn register(&self, form: &Registration) -> Result<AuthenticatedUser, BackendError> {
        let body = serde_json::json!({
            "name": form.name.trim(),
            "email": form.email.trim(),
            "phone": form.phone,
            "password": form.password.expose_secret(),
        });
        self.send_json(self.request(Method::POST, "auth/register").json(&body))
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedUser, BackendError> {
        let body = serde_json::json!({
            "email": credentials.email.trim(),
            "password": credentials.password.expose_secret(),
        });
        self.send_json(self.request(Method::POST, "auth/login").json(&body))
            .await
    }

    async fn list_adoptions(&self) -> Result<Vec<AdoptionAd>, BackendError> {
        self.send_json(self.request(Method::GET, "adoptions")).await
    }

    async fn get_adoption(&self, id: &str) -> Result<AdoptionAd, BackendError> {
        self.send_json(self.request(Method::GET, &format!("adoptions/{id}")))
            .await
    }

    async fn create_adoption(&self, ad: &NewAdoption) -> Result<AdoptionAd, BackendError> {
        self.send_json(self.request(Method::POST, "adoptions").json(ad))
            .await
    }

    async fn list_lost_pets(&self) -> Result<Vec<LostPet>, BackendError> {
        self.send_json(self.request(Method::GET, "lost-pets")).await
    }

    async fn create_lost_pet(&self, report: &NewLostPet) -> Result<LostPet, BackendError> {
        self.send_json(self.request(Method::POST, "lost-pets").json(report))
            .await
    }

    async fn list_questions(&self) -> Result<Vec<Question>, BackendError> {
        self.send_json(self.request(Method::GET, "questions")).await
    }

    async fn get_question(&self, id: &str) -> Result<Question, BackendError> {
        self.send_json(self.request(Method::GET, &format!("questions/{id}")))
            .await
    }

    async fn post_question(&self, question: &NewQuestion) -> Result<Question, BackendError> {
        self.send_json(self.request(Method::POST, "questions").json(question))
            .await
    }

    async fn answer_question(&self, id: &str, body: &str) -> Result<Answer, BackendError> {
        let payload = serde_json::json!({ "body": body });
        self.send_json(
            self.request(Method::POST, &format!("questions/{id}/answers"))
                .json(&payload),
        )
        .await
    }

    async fn list_donation_orgs(&self) -> Result<Vec<DonationOrg>, BackendError> {
        self.send_json(self.request(Method::GET, "donations")).await
    }

    async fn upload_photo(&self, file: &PhotoFile) -> Result<UploadedPhoto, BackendError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| BackendError::Transport(format!("Invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        self.send_json(
            self.request(Method::POST, "uploads")
                .multipart(form)
                .timeout(self.upload_timeout),
        )
        .await
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, BackendError> {
        self.send_json(self.request(Method::GET, "admin/stats")).await
    }

    async fn delete_adoption(&self, id: &str) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("adoptions/{id}")))
            .await
    }

    async fn delete_question(&self, id: &str) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("questions/{id}")))
            .await
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, BackendError> {
        self.send_json(self.request(Method::GET, "admin/users")).await
    }

    async fn delete_user(&self, id: &str) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("admin/users/{id}")))
            .await
    }
}
