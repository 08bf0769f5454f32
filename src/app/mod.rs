//! App shell — one owner for session, navigation, the active wizard and the
//! backend.
//!
//! [`AppState`] holds the state and its synchronous transitions. [`App`] is
//! the cloneable handle the HTTP routes and the terminal driver share; it
//! serializes mutations through a `RwLock` and releases the lock while a
//! backend call is in flight.

pub mod routes;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backend::{Backend, Credentials, PhotoFile, Registration};
use crate::error::{Error, WizardError};
use crate::navigation::{NavigationController, RouteTable, ViewSelection};
use crate::session::{Session, SessionManager};
use crate::store::KeyValueStore;
use crate::wizard::{
    FieldMap, Submission, UploadOutcome, WizardController, WizardKind, WizardSnapshot,
};

pub use routes::app_routes;

pub struct AppState {
    session: SessionManager,
    navigation: NavigationController,
    wizard: Option<WizardController>,
}

impl AppState {
    pub fn session(&self) -> Option<&Session> {
        self.session.current()
    }

    pub fn current_path(&self) -> &str {
        self.navigation.current_path()
    }

    pub fn selection(&self) -> &ViewSelection {
        self.navigation.selection()
    }

    pub fn wizard(&self) -> Option<&WizardController> {
        self.wizard.as_ref()
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            path: self.current_path().to_string(),
            selection: self.selection().clone(),
            wizard: self.wizard.as_ref().map(WizardController::snapshot),
        }
    }

    fn navigate(&mut self, path: &str) -> ViewSelection {
        let selection = self
            .navigation
            .navigate(path, self.session.current())
            .clone();
        self.sync_wizard();
        selection
    }

    fn on_session_change(&mut self) -> ViewSelection {
        let selection = self
            .navigation
            .on_session_change(self.session.current())
            .clone();
        self.sync_wizard();
        selection
    }

    /// Mount or drop the wizard to match the selected view.
    ///
    /// A wizard of the right kind that is already open is kept.
    fn sync_wizard(&mut self) {
        let wanted = match self.navigation.selection() {
            ViewSelection::Render { view, .. } => WizardKind::for_view(*view),
            ViewSelection::RedirectToLogin { .. } => None,
        };
        match (wanted, &self.wizard) {
            (Some(kind), Some(open)) if open.kind() == kind => {}
            (Some(kind), _) => {
                self.abandon_wizard();
                self.wizard = Some(WizardController::for_kind(kind));
            }
            (None, Some(_)) => self.abandon_wizard(),
            (None, None) => {}
        }
    }

    fn abandon_wizard(&mut self) {
        if let Some(wizard) = self.wizard.take() {
            info!(
                wizard = %wizard.kind(),
                instance = %wizard.instance(),
                step = wizard.current_step(),
                "Wizard abandoned"
            );
        }
    }

    fn wizard_mut(&mut self) -> Result<&mut WizardController, WizardError> {
        self.wizard.as_mut().ok_or(WizardError::NoActiveWizard)
    }

    /// The open wizard, only if it is still the instance `instance`.
    fn wizard_instance(&mut self, instance: uuid::Uuid) -> Option<&mut WizardController> {
        self.wizard.as_mut().filter(|w| w.instance() == instance)
    }
}

/// Where the user is and what they see.
#[derive(Debug, Clone, Serialize)]
pub struct AppSnapshot {
    pub path: String,
    pub selection: ViewSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wizard: Option<WizardSnapshot>,
}

/// A listing created by a submitted wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub id: String,
    /// Detail page of the new listing.
    pub path: String,
}

#[derive(Clone)]
pub struct App {
    state: Arc<RwLock<AppState>>,
    backend: Arc<dyn Backend>,
}

impl App {
    /// Restore the stored session and start at `/`.
    pub async fn new(store: Arc<dyn KeyValueStore>, backend: Arc<dyn Backend>) -> Self {
        Self::with_routes(store, backend, Arc::new(RouteTable::standard())).await
    }

    pub async fn with_routes(
        store: Arc<dyn KeyValueStore>,
        backend: Arc<dyn Backend>,
        routes: Arc<RouteTable>,
    ) -> Self {
        let session = SessionManager::load(store).await;
        backend.set_auth_token(session.current().and_then(|s| s.token.clone()));
        let navigation = NavigationController::new(routes, session.current());
        let state = AppState {
            session,
            navigation,
            wizard: None,
        };
        Self {
            state: Arc::new(RwLock::new(state)),
            backend,
        }
    }

    pub async fn snapshot(&self) -> AppSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session().cloned()
    }

    pub async fn navigate(&self, path: &str) -> ViewSelection {
        self.state.write().await.navigate(path)
    }

    pub async fn login(&self, credentials: Credentials) -> Result<ViewSelection, Error> {
        credentials.validate()?;
        let user = self.backend.login(&credentials).await?;
        Ok(self.start_session(user.into_session()).await)
    }

    /// Create an account and log straight into it.
    pub async fn register(&self, form: Registration) -> Result<ViewSelection, Error> {
        form.validate()?;
        let user = self.backend.register(&form).await?;
        Ok(self.start_session(user.into_session()).await)
    }

    pub async fn logout(&self) -> ViewSelection {
        let mut state = self.state.write().await;
        state.abandon_wizard();
        state.session.logout().await;
        self.backend.set_auth_token(None);
        state.on_session_change()
    }

    /// Re-read the persisted session and re-resolve the current path.
    ///
    /// A removed or corrupted entry leaves the app anonymous.
    pub async fn reload_session(&self) -> ViewSelection {
        let mut state = self.state.write().await;
        let token = state.session.refresh().await.and_then(|s| s.token.clone());
        self.backend.set_auth_token(token);
        state.on_session_change()
    }

    async fn start_session(&self, session: Session) -> ViewSelection {
        let mut state = self.state.write().await;
        self.backend.set_auth_token(session.token.clone());
        state.session.login(session).await;
        state.on_session_change()
    }

    // ── Wizard passthroughs ─────────────────────────────────────────────

    pub async fn wizard(&self) -> Option<WizardSnapshot> {
        self.state
            .read()
            .await
            .wizard()
            .map(WizardController::snapshot)
    }

    pub async fn update_field(&self, key: &str, value: Value) -> Result<WizardSnapshot, Error> {
        let mut state = self.state.write().await;
        let wizard = state.wizard_mut()?;
        wizard.update_field(key, value)?;
        Ok(wizard.snapshot())
    }

    pub async fn advance(&self, submission: FieldMap) -> Result<WizardSnapshot, Error> {
        let mut state = self.state.write().await;
        let wizard = state.wizard_mut()?;
        wizard.advance(submission)?;
        Ok(wizard.snapshot())
    }

    /// Upload `file` for the current step.
    ///
    /// The lock is released while the backend stores the file. If the
    /// wizard was abandoned or replaced in the meantime the result is
    /// discarded and [`UploadOutcome::Stale`] returned.
    pub async fn upload_photo(&self, file: PhotoFile) -> Result<UploadOutcome, Error> {
        let ticket = self.state.write().await.wizard_mut()?.begin_upload(&file)?;

        let result = self.backend.upload_photo(&file).await;

        let mut state = self.state.write().await;
        match state.wizard_instance(ticket.instance()) {
            Some(wizard) => Ok(wizard.complete_upload(ticket, result)),
            None => {
                debug!(instance = %ticket.instance(), "Upload finished after wizard closed");
                Ok(UploadOutcome::Stale)
            }
        }
    }

    /// Hand the finished wizard to the backend.
    ///
    /// On success the app moves to the new listing's page, which closes the
    /// wizard. On failure the wizard reopens at the last step with the
    /// error message.
    pub async fn submit_wizard(&self) -> Result<SubmitReceipt, Error> {
        let submission = self.state.write().await.wizard_mut()?.submit_final()?;
        let instance = submission.instance;

        let result = self.create_listing(submission).await;

        let mut state = self.state.write().await;
        match result {
            Ok(receipt) => {
                info!(id = %receipt.id, path = %receipt.path, "Listing created");
                if state.wizard_instance(instance).is_some() {
                    state.navigate(&receipt.path);
                }
                Ok(receipt)
            }
            Err(e) => {
                warn!(instance = %instance, error = %e, "Submission failed");
                if let Some(wizard) = state.wizard_instance(instance) {
                    wizard.submission_failed(user_message(&e));
                }
                Err(e)
            }
        }
    }

    async fn create_listing(&self, submission: Submission) -> Result<SubmitReceipt, Error> {
        match submission.kind {
            WizardKind::Adoption => {
                let body = submission.into_new_adoption()?;
                let ad = self.backend.create_adoption(&body).await?;
                Ok(SubmitReceipt {
                    path: format!("/adoptions/{}", ad.id),
                    id: ad.id,
                })
            }
            WizardKind::LostPet => {
                let body = submission.into_new_lost_pet()?;
                let report = self.backend.create_lost_pet(&body).await?;
                Ok(SubmitReceipt {
                    path: format!("/lost/{}", report.id),
                    id: report.id,
                })
            }
        }
    }
}

/// The part of an error worth showing to the user.
pub fn user_message(err: &Error) -> String {
    match err {
        Error::Backend(e) => e.to_string(),
        Error::Validation(e) => e.to_string(),
        Error::Wizard(e) => e.to_string(),
        other => other.to_string(),
    }
}
