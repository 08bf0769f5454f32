//! The application's wizards: adoption ad creation and lost-pet reports.

use serde::{Deserialize, Serialize};

use super::step::{Requirement, StepSpec};
use crate::navigation::View;

/// Species a listing may carry.
pub const SPECIES: &[&str] = &["dog", "cat", "bird", "rabbit", "other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardKind {
    Adoption,
    LostPet,
}

impl WizardKind {
    /// The wizard a view mounts, if any.
    pub fn for_view(view: View) -> Option<Self> {
        match view {
            View::CreateAdoption => Some(Self::Adoption),
            View::ReportLostPet => Some(Self::LostPet),
            _ => None,
        }
    }

    pub fn definition(&self) -> WizardDefinition {
        match self {
            Self::Adoption => adoption_wizard(),
            Self::LostPet => lost_pet_wizard(),
        }
    }
}

impl std::fmt::Display for WizardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Adoption => "adoption",
            Self::LostPet => "lost_pet",
        };
        write!(f, "{s}")
    }
}

/// A fixed, ordered list of steps.
#[derive(Debug, Clone, Serialize)]
pub struct WizardDefinition {
    pub kind: WizardKind,
    pub steps: Vec<StepSpec>,
}

impl WizardDefinition {
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Whether `key` is filled by one of this wizard's upload steps.
    pub fn is_upload_field(&self, key: &str) -> bool {
        self.steps.iter().any(|step| step.upload_field() == Some(key))
    }

    /// Step by 1-based index.
    pub fn step(&self, index: usize) -> Option<&StepSpec> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }
}

/// Species → details → photo → review.
pub fn adoption_wizard() -> WizardDefinition {
    WizardDefinition {
        kind: WizardKind::Adoption,
        steps: vec![
            StepSpec::form(
                "species",
                "What kind of pet?",
                vec![
                    Requirement::required("species"),
                    Requirement::one_of("species", SPECIES),
                ],
            ),
            StepSpec::form(
                "details",
                "Tell us about them",
                vec![
                    Requirement::required("name"),
                    Requirement::max_len("name", 50),
                    Requirement::max_len("age", 30),
                    Requirement::max_len("city", 80),
                    Requirement::max_len("description", 1000),
                ],
            ),
            StepSpec::upload("photo", "Add a photo", "photo"),
            StepSpec::review("review", "Review and publish"),
        ],
    }
}

/// Details → last seen → photo → review.
pub fn lost_pet_wizard() -> WizardDefinition {
    WizardDefinition {
        kind: WizardKind::LostPet,
        steps: vec![
            StepSpec::form(
                "details",
                "Which pet is missing?",
                vec![
                    Requirement::required("name"),
                    Requirement::max_len("name", 50),
                    Requirement::required("species"),
                    Requirement::one_of("species", SPECIES),
                    Requirement::max_len("description", 1000),
                ],
            ),
            StepSpec::form(
                "location",
                "Where was it last seen?",
                vec![
                    Requirement::required("last_seen_location"),
                    Requirement::max_len("last_seen_location", 200),
                    Requirement::required("contact"),
                ],
            ),
            StepSpec::upload("photo", "Add a photo", "photo"),
            StepSpec::review("review", "Review and publish"),
        ],
    }
}
