//! The record a finished wizard hands to the backend.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::definition::WizardKind;
use super::step::FieldMap;
use crate::backend::{NewAdoption, NewLostPet};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub kind: WizardKind,
    /// Wizard instance that produced this record.
    pub instance: Uuid,
    pub fields: FieldMap,
}

impl Submission {
    pub fn into_new_adoption(self) -> Result<NewAdoption, ValidationError> {
        let mut err = ValidationError::new();
        let species = self.required_text("species", &mut err);
        let name = self.required_text("name", &mut err);
        let photo_url = self.photo_url("photo", &mut err);
        err.into_result()?;

        Ok(NewAdoption {
            species,
            name,
            age: self.text("age"),
            description: self.text("description"),
            city: self.text("city"),
            photo_url,
        })
    }

    pub fn into_new_lost_pet(self) -> Result<NewLostPet, ValidationError> {
        let mut err = ValidationError::new();
        let name = self.required_text("name", &mut err);
        let species = self.required_text("species", &mut err);
        let last_seen_location = self.required_text("last_seen_location", &mut err);
        let contact = self.required_text("contact", &mut err);
        let photo_url = self.photo_url("photo", &mut err);
        err.into_result()?;

        Ok(NewLostPet {
            name,
            species,
            last_seen_location,
            contact,
            description: self.text("description"),
            photo_url,
        })
    }

    /// Trimmed text for `field`; numbers are rendered, blanks are `None`.
    fn text(&self, field: &str) -> Option<String> {
        let text = match self.fields.get(field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    fn required_text(&self, field: &str, err: &mut ValidationError) -> String {
        self.text(field).unwrap_or_else(|| {
            err.add(field, "is required");
            String::new()
        })
    }

    fn photo_url(&self, field: &str, err: &mut ValidationError) -> String {
        self.fields
            .get(field)
            .and_then(|v| v.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                err.add(field, "a photo is required");
                String::new()
            })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn submission(kind: WizardKind, fields: Value) -> Submission {
        Submission {
            kind,
            instance: Uuid::new_v4(),
            fields: serde_json::from_value(fields).unwrap(),
        }
    }

    #[test]
    fn adoption_body_from_fields() {
        let ad = submission(
            WizardKind::Adoption,
            json!({
                "species": "dog",
                "name": " Rex ",
                "age": 3,
                "city": "",
                "photo": {"url": "/u/rex.jpg", "file_name": "rex.jpg"},
            }),
        )
        .into_new_adoption()
        .unwrap();

        assert_eq!(ad.name, "Rex");
        assert_eq!(ad.age.as_deref(), Some("3"));
        assert!(ad.city.is_none());
        assert_eq!(ad.photo_url, "/u/rex.jpg");
    }

    #[test]
    fn lost_pet_body_reports_missing_fields() {
        let err = submission(WizardKind::LostPet, json!({"name": "Mia", "species": "cat"}))
            .into_new_lost_pet()
            .unwrap_err();
        assert_eq!(err.get("last_seen_location"), Some("is required"));
        assert_eq!(err.get("contact"), Some("is required"));
        assert_eq!(err.get("photo"), Some("a photo is required"));
        assert!(err.get("name").is_none());
    }

    #[test]
    fn lost_pet_body_from_fields() {
        let report = submission(
            WizardKind::LostPet,
            json!({
                "name": "Mia",
                "species": "cat",
                "last_seen_location": "Park Street",
                "contact": "555-0101",
                "photo": {"url": "/u/mia.png"},
            }),
        )
        .into_new_lost_pet()
        .unwrap();
        assert_eq!(report.contact, "555-0101");
        assert!(report.description.is_none());
    }
}
