//! Backend collaborator — the remote REST API, seen as opaque
//! request/response operations.
//!
//! Every call either succeeds with a typed payload or fails with a
//! [`BackendError`] whose `Display` is the message shown to the user.

pub mod http;
pub mod model;

use async_trait::async_trait;

pub use http::HttpBackend;
pub use model::*;

use crate::error::BackendError;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Use `token` for authenticated calls (`None` after logout).
    fn set_auth_token(&self, _token: Option<String>) {}

    // ── Accounts ────────────────────────────────────────────────────

    async fn register(&self, form: &Registration) -> Result<AuthenticatedUser, BackendError>;

    async fn login(&self, credentials: &Credentials) -> Result<AuthenticatedUser, BackendError>;

    // ── Adoption ads ────────────────────────────────────────────────

    async fn list_adoptions(&self) -> Result<Vec<AdoptionAd>, BackendError>;

    async fn get_adoption(&self, id: &str) -> Result<AdoptionAd, BackendError>;

    async fn create_adoption(&self, ad: &NewAdoption) -> Result<AdoptionAd, BackendError>;

    // ── Lost pets ───────────────────────────────────────────────────

    async fn list_lost_pets(&self) -> Result<Vec<LostPet>, BackendError>;

    async fn create_lost_pet(&self, report: &NewLostPet) -> Result<LostPet, BackendError>;

    // ── Q&A ─────────────────────────────────────────────────────────

    async fn list_questions(&self) -> Result<Vec<Question>, BackendError>;

    async fn get_question(&self, id: &str) -> Result<Question, BackendError>;

    async fn post_question(&self, question: &NewQuestion) -> Result<Question, BackendError>;

    async fn answer_question(&self, id: &str, body: &str) -> Result<Answer, BackendError>;

    // ── Donations ───────────────────────────────────────────────────

    async fn list_donation_orgs(&self) -> Result<Vec<DonationOrg>, BackendError>;

    // ── Uploads ─────────────────────────────────────────────────────

    async fn upload_photo(&self, file: &PhotoFile) -> Result<UploadedPhoto, BackendError>;

    // ── Back-office ─────────────────────────────────────────────────

    async fn dashboard_stats(&self) -> Result<DashboardStats, BackendError>;

    async fn delete_adoption(&self, id: &str) -> Result<(), BackendError>;

    async fn delete_question(&self, id: &str) -> Result<(), BackendError>;

    async fn list_users(&self) -> Result<Vec<UserSummary>, BackendError>;

    async fn delete_user(&self, id: &str) -> Result<(), BackendError>;
}
