//! Step definitions — what each wizard step collects and requires.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Field name -> value, as collected by the wizard.
pub type FieldMap = BTreeMap<String, Value>;

/// A per-field rule checked when a step advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Requirement {
    /// Present, not null, and not a blank string.
    Required { field: String },
    /// When present, one of the listed string values.
    OneOf { field: String, options: Vec<String> },
    /// When present, at most `max` characters.
    MaxLen { field: String, max: usize },
    /// An uploaded file reference (`{"url": ..}`).
    File { field: String },
}

impl Requirement {
    pub fn required(field: &str) -> Self {
        Self::Required {
            field: field.to_string(),
        }
    }

    pub fn one_of(field: &str, options: &[&str]) -> Self {
        Self::OneOf {
            field: field.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn max_len(field: &str, max: usize) -> Self {
        Self::MaxLen {
            field: field.to_string(),
            max,
        }
    }

    pub fn file(field: &str) -> Self {
        Self::File {
            field: field.to_string(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Required { field }
            | Self::OneOf { field, .. }
            | Self::MaxLen { field, .. }
            | Self::File { field } => field,
        }
    }

    /// Check the rule against `value`, returning the failure message.
    fn check(&self, value: Option<&Value>) -> Option<String> {
        match self {
            Self::Required { .. } => (!is_present(value)).then(|| "is required".to_string()),
            Self::OneOf { options, .. } => match value {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if options.iter().any(|o| o == s) => None,
                Some(_) => Some(format!("must be one of: {}", options.join(", "))),
            },
            Self::MaxLen { max, .. } => match value {
                Some(Value::String(s)) if s.chars().count() > *max => {
                    Some(format!("must be at most {max} characters"))
                }
                _ => None,
            },
            Self::File { .. } => {
                let has_url = value
                    .and_then(|v| v.get("url"))
                    .and_then(Value::as_str)
                    .is_some_and(|url| !url.trim().is_empty());
                (!has_url).then(|| "a photo is required".to_string())
            }
        }
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(_) => true,
    }
}

/// How a step collects its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Plain form fields.
    Form,
    /// A file upload; the uploaded reference is stored under `field`.
    Upload { field: String },
    /// Read-only summary before submission.
    Review,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepSpec {
    pub id: String,
    pub title: String,
    pub kind: StepKind,
    pub requirements: Vec<Requirement>,
}

impl StepSpec {
    pub fn form(id: &str, title: &str, requirements: Vec<Requirement>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind: StepKind::Form,
            requirements,
        }
    }

    /// An upload step whose file lands in `field`; the file is required.
    pub fn upload(id: &str, title: &str, field: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind: StepKind::Upload {
                field: field.to_string(),
            },
            requirements: vec![Requirement::file(field)],
        }
    }

    pub fn review(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind: StepKind::Review,
            requirements: Vec::new(),
        }
    }

    pub fn upload_field(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Upload { field } => Some(field),
            _ => None,
        }
    }

    /// Validate this step's requirements against `data`.
    pub fn validate(&self, data: &FieldMap) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        for requirement in &self.requirements {
            if let Some(message) = requirement.check(data.get(requirement.field())) {
                err.add(requirement.field(), message);
            }
        }
        err.into_result()
    }
}
