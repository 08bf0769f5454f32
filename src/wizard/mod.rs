//! Multi-step forms ("wizards") for creating listings.
//!
//! A wizard walks a fixed list of steps, validating each before moving on and
//! accumulating the collected fields. Photo steps upload through the backend;
//! completions carry an [`UploadTicket`] so a result that arrives after the
//! wizard was abandoned or reset is discarded instead of applied.

pub mod controller;
pub mod definition;
pub mod step;
pub mod submission;

pub use controller::{
    MAX_PHOTO_BYTES, UploadOutcome, UploadTicket, WizardController, WizardPhase, WizardSnapshot,
};
pub use definition::{SPECIES, WizardDefinition, WizardKind, adoption_wizard, lost_pet_wizard};
pub use step::{FieldMap, Requirement, StepKind, StepSpec};
pub use submission::Submission;
