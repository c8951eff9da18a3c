//! Setting DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::setting::Setting;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingDto {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<Setting> for SettingDto {
    fn from(s: Setting) -> Self {
        Self {
            key: s.key,
            value: s.value,
            description: s.description,
            updated_at: s.updated_at,
        }
    }
}

/// `description` is kept unchanged when omitted.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertSettingRequest {
    #[validate(length(max = 10_000, message = "value must be at most 10000 characters"))]
    pub value: String,
    #[validate(length(max = 500, message = "description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Keys are dotted identifiers such as `hospital.name`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 100
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_keys() {
        assert!(is_valid_key("hospital.name"));
        assert!(is_valid_key("billing.currency_code"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("has space"));
        assert!(!is_valid_key(&"k".repeat(101)));
    }
}
