use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, FieldViolation};

/// A lead as persisted in the document store. `_id` is generated by the store
/// at insert time and is never accepted from clients; `birth_date` is the only
/// optional field and stays `null` whenever enrichment did not produce a value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Lead {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    #[schema(value_type = String, example = "507f1f77bcf86cd799439011")]
    pub id: ObjectId,
    #[schema(example = "Lionel Messi")]
    pub name: String,
    #[schema(example = "lionel@messi.com")]
    pub email: String,
    #[schema(example = "+55 11 99999-9999")]
    pub phone: String,
    #[schema(example = "1998-02-05")]
    pub birth_date: Option<String>,
}

/// In-flight lead record between validation and persistence. Carries the
/// enrichment result but no identity yet.
#[derive(Debug, Clone, Serialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<String>,
}

/// Incoming payload for `POST /leads/`. `birth_date` is deliberately absent:
/// it comes from the external enrichment source, not from the client.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeadCreate {
    #[schema(example = "Lionel Messi")]
    pub name: String,
    #[schema(example = "lionel@messi.com")]
    pub email: String,
    #[schema(example = "+55 11 99999-9999")]
    pub phone: String,
}

impl LeadCreate {
    /// Validates the payload against the lead creation schema, collecting one
    /// violation per offending field so the 422 body can point at all of them.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut violations = Vec::new();

        if self.name.chars().count() < 3 {
            violations.push(FieldViolation {
                field: "name",
                message: "name must be at least 3 characters".to_string(),
            });
        }

        if !is_valid_email(&self.email) {
            violations.push(FieldViolation {
                field: "email",
                message: "value is not a valid email address".to_string(),
            });
        }

        if self.phone.chars().count() < 8 {
            violations.push(FieldViolation {
                field: "phone",
                message: "phone must be at least 8 characters".to_string(),
            });
        } else if !is_valid_phone(&self.phone) {
            violations.push(FieldViolation {
                field: "phone",
                message: "phone may only contain digits, spaces, +, -, ( and )".to_string(),
            });
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(violations))
        }
    }
}

/// Validate email address syntax.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    // RFC 5322 simplified email regex
    // Matches: local@domain.tld
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    email_regex.is_match(email)
}

/// Validate phone number characters. The pattern is deliberately permissive:
/// an optional leading `+` followed by digits, spaces, dashes and parentheses.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone_regex = Regex::new(r"^\+?[0-9\s\-\(\)]+$").unwrap();
    phone_regex.is_match(phone)
}
