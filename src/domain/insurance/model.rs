use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct InsuranceProvider {
    pub id: String,
    /// Unique display name.
    pub name: String,
    pub code: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInsuranceProvider {
    pub name: String,
    pub code: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InsuranceProviderChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: Option<bool>,
}
