//! WizardController — forward-only multi-step form state machine.
//!
//! States are `Step 1 ..= Step N` (each either `Editing` or, on an upload
//! step, `Uploading`) plus the terminal `Submitted`. Every transition is
//! all-or-nothing: a rejected call leaves the step index and the accumulated
//! data exactly as they were.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::definition::{WizardDefinition, WizardKind};
use super::step::{FieldMap, StepSpec};
use super::submission::Submission;
use crate::backend::{PhotoFile, UploadedPhoto};
use crate::error::{BackendError, ValidationError, WizardError};

/// Largest photo accepted for upload.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardPhase {
    Editing,
    /// An upload is in flight; `advance` and `submit_final` are disabled.
    Uploading,
    Submitted,
}

/// Identifies one upload request.
///
/// A completion is applied only if its ticket still matches the wizard
/// instance and the latest upload started on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    instance: Uuid,
    generation: u64,
}

impl UploadTicket {
    pub fn instance(&self) -> Uuid {
        self.instance
    }
}

/// What `complete_upload` did with a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// Upload stored and the wizard moved on to `step`.
    Advanced { step: usize },
    /// Upload failed; the wizard stays on the upload step.
    Failed { message: String },
    /// The ticket no longer matches; the result was discarded.
    Stale,
}

pub struct WizardController {
    definition: WizardDefinition,
    instance: Uuid,
    /// 1-based, always within `1..=total_steps`.
    current_step: usize,
    accumulated: FieldMap,
    /// Edits on the current step not yet committed by `advance`.
    working: FieldMap,
    phase: WizardPhase,
    upload_generation: u64,
    /// Last user-visible failure (upload or submission).
    error: Option<String>,
}

impl WizardController {
    pub fn new(definition: WizardDefinition) -> Self {
        let controller = Self {
            definition,
            instance: Uuid::new_v4(),
            current_step: 1,
            accumulated: FieldMap::new(),
            working: FieldMap::new(),
            phase: WizardPhase::Editing,
            upload_generation: 0,
            error: None,
        };
        info!(
            wizard = %controller.kind(),
            instance = %controller.instance,
            steps = controller.total_steps(),
            "Wizard opened"
        );
        controller
    }

    pub fn for_kind(kind: WizardKind) -> Self {
        Self::new(kind.definition())
    }

    pub fn kind(&self) -> WizardKind {
        self.definition.kind
    }

    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.definition.total_steps()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == self.total_steps()
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn accumulated(&self) -> &FieldMap {
        &self.accumulated
    }

    pub fn working(&self) -> &FieldMap {
        &self.working
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_spec(&self) -> &StepSpec {
        // current_step is kept within 1..=total_steps and definitions are non-empty
        &self.definition.steps[self.current_step - 1]
    }

    /// Edit one field of the current step without advancing.
    pub fn update_field(&mut self, key: impl Into<String>, value: Value) -> Result<(), WizardError> {
        if self.phase == WizardPhase::Submitted {
            return Err(WizardError::AlreadySubmitted);
        }
        let key = key.into();
        self.reject_upload_fields(std::iter::once(key.as_str()))?;
        debug!(instance = %self.instance, step = self.current_step, field = %key, "Field updated");
        self.working.insert(key, value);
        Ok(())
    }

    /// Validate the current step and move to the next one.
    ///
    /// `submission` is merged over the working data; later values win. On
    /// the last step this is a no-op. Returns the (new) current step.
    pub fn advance(&mut self, submission: FieldMap) -> Result<usize, WizardError> {
        self.ensure_editable()?;
        if self.is_last_step() {
            debug!(instance = %self.instance, "Advance on last step ignored");
            return Ok(self.current_step);
        }
        if self.current_spec().upload_field().is_some() {
            return Err(WizardError::UploadRequired {
                step: self.current_step,
            });
        }
        self.reject_upload_fields(submission.keys().map(String::as_str))?;

        let mut step_data = self.working.clone();
        step_data.extend(submission);
        self.validate_step(&step_data)?;

        Ok(self.commit(step_data))
    }

    /// Start uploading `file` on the current (upload) step.
    pub fn begin_upload(&mut self, file: &PhotoFile) -> Result<UploadTicket, WizardError> {
        self.ensure_editable()?;
        let field = self
            .current_spec()
            .upload_field()
            .ok_or(WizardError::NotAnUploadStep {
                step: self.current_step,
            })?
            .to_string();

        validate_photo(&field, file)?;

        self.upload_generation += 1;
        self.phase = WizardPhase::Uploading;
        self.error = None;
        info!(
            instance = %self.instance,
            step = self.current_step,
            file = %file.file_name,
            bytes = file.bytes.len(),
            "Upload started"
        );
        Ok(UploadTicket {
            instance: self.instance,
            generation: self.upload_generation,
        })
    }

    /// Apply the result of the upload identified by `ticket`.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadedPhoto, BackendError>,
    ) -> UploadOutcome {
        if ticket.instance != self.instance
            || ticket.generation != self.upload_generation
            || self.phase != WizardPhase::Uploading
        {
            debug!(instance = %ticket.instance, "Discarding stale upload completion");
            return UploadOutcome::Stale;
        }
        self.phase = WizardPhase::Editing;

        let photo = match result {
            Ok(photo) => photo,
            Err(e) => {
                warn!(instance = %self.instance, error = %e, "Upload failed");
                let message = e.to_string();
                self.error = Some(message.clone());
                return UploadOutcome::Failed { message };
            }
        };

        let Some(field) = self.current_spec().upload_field().map(str::to_string) else {
            return UploadOutcome::Stale;
        };
        let mut step_data = self.working.clone();
        step_data.insert(field, photo_value(&photo));

        if let Err(e) = self.validate_step(&step_data) {
            let message = e.to_string();
            self.error = Some(message.clone());
            return UploadOutcome::Failed { message };
        }

        info!(instance = %self.instance, url = %photo.url, "Upload complete");
        let step = self.commit(step_data);
        UploadOutcome::Advanced { step }
    }

    /// Package the collected record for the backend and enter `Submitted`.
    pub fn submit_final(&mut self) -> Result<Submission, WizardError> {
        self.ensure_editable()?;
        if !self.is_last_step() {
            return Err(WizardError::NotOnLastStep {
                step: self.current_step,
                total: self.total_steps(),
            });
        }

        let mut fields = self.accumulated.clone();
        fields.extend(self.working.clone());
        self.validate_step(&fields)?;

        self.phase = WizardPhase::Submitted;
        self.error = None;
        info!(instance = %self.instance, wizard = %self.kind(), "Wizard submitted");
        Ok(Submission {
            kind: self.kind(),
            instance: self.instance,
            fields,
        })
    }

    /// The backend rejected the submission: reopen the last step with
    /// `message` shown to the user.
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        if self.phase != WizardPhase::Submitted {
            return;
        }
        self.phase = WizardPhase::Editing;
        self.error = Some(message.into());
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let spec = self.current_spec();
        WizardSnapshot {
            kind: self.kind(),
            instance: self.instance,
            step: self.current_step,
            total_steps: self.total_steps(),
            step_id: spec.id.clone(),
            step_title: spec.title.clone(),
            phase: self.phase,
            accumulated: self.accumulated.clone(),
            working: self.working.clone(),
            error: self.error.clone(),
        }
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        match self.phase {
            WizardPhase::Editing => Ok(()),
            WizardPhase::Uploading => Err(WizardError::UploadInProgress),
            WizardPhase::Submitted => Err(WizardError::AlreadySubmitted),
        }
    }

    /// Upload fields are written only by `complete_upload`.
    fn reject_upload_fields<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        for key in keys {
            if self.definition.is_upload_field(key) {
                err.add(key, "can only be set by uploading a file");
            }
        }
        err.into_result()
    }

    /// Check the current step against everything collected so far with
    /// `step_data` laid over it.
    fn validate_step(&self, step_data: &FieldMap) -> Result<(), ValidationError> {
        let mut view = self.accumulated.clone();
        view.extend(step_data.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.current_spec().validate(&view)
    }

    fn commit(&mut self, step_data: FieldMap) -> usize {
        self.accumulated.extend(step_data);
        self.working.clear();
        self.error = None;
        if !self.is_last_step() {
            self.current_step += 1;
        }
        info!(
            instance = %self.instance,
            step = self.current_step,
            fields = self.accumulated.len(),
            "Wizard advanced"
        );
        self.current_step
    }
}

fn validate_photo(field: &str, file: &PhotoFile) -> Result<(), ValidationError> {
    if file.bytes.is_empty() {
        return Err(ValidationError::single(field, "the selected file is empty"));
    }
    if file.bytes.len() > MAX_PHOTO_BYTES {
        return Err(ValidationError::single(
            field,
            format!("must be smaller than {} MB", MAX_PHOTO_BYTES / (1024 * 1024)),
        ));
    }
    if !file.content_type.starts_with("image/") {
        return Err(ValidationError::single(field, "must be an image"));
    }
    Ok(())
}

fn photo_value(photo: &UploadedPhoto) -> Value {
    let mut map = Map::new();
    map.insert("url".into(), Value::String(photo.url.clone()));
    if let Some(ref name) = photo.file_name {
        map.insert("file_name".into(), Value::String(name.clone()));
    }
    Value::Object(map)
}

/// Serializable view of a wizard for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    pub kind: WizardKind,
    pub instance: Uuid,
    pub step: usize,
    pub total_steps: usize,
    pub step_id: String,
    pub step_title: String,
    pub phase: WizardPhase,
    pub accumulated: FieldMap,
    pub working: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
