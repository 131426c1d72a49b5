//! Contact directory: read-only access to the address book
//!
//! The address book itself is owned by the platform. A [`ContactSource`]
//! hands back raw records; [`ContactDirectory`] normalizes them into
//! [`Contact`] values, sorts and filters them, and turns permission
//! problems into [`PermissionState`] values instead of errors.

mod json;
mod memory;

pub use json::JsonFileSource;
pub use memory::MemorySource;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Display name used when the address book has none
pub const UNKNOWN_NAME: &str = "Unknown";

/// Fields a caller can ask the platform to fill in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    PhoneNumbers,
    Emails,
    ImageAvailable,
}

/// The field set every directory lookup requests
pub const CONTACT_FIELDS: [ContactField; 5] = [
    ContactField::FirstName,
    ContactField::LastName,
    ContactField::PhoneNumbers,
    ContactField::Emails,
    ContactField::ImageAvailable,
];

/// Query handed to a [`ContactSource`]
#[derive(Debug, Clone)]
pub struct ContactQuery {
    pub fields: Vec<ContactField>,
}

impl Default for ContactQuery {
    fn default() -> Self {
        Self {
            fields: CONTACT_FIELDS.to_vec(),
        }
    }
}

/// Permission answer from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Not asked yet
    Undetermined,
}

/// Permission state as seen by callers of [`ContactDirectory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Granted,
    /// The user (or the platform) said no, or has not been asked
    Denied,
    /// Asking the platform failed
    QueryFailed,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
            PermissionState::QueryFailed => "query-failed",
        }
    }

    fn from_status(status: PermissionStatus) -> Self {
        match status {
            PermissionStatus::Granted => PermissionState::Granted,
            PermissionStatus::Denied | PermissionStatus::Undetermined => PermissionState::Denied,
        }
    }
}

/// Phone number entry as the platform reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPhoneNumber {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

/// Email entry as the platform reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEmail {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Address book record before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_numbers: Option<Vec<RawPhoneNumber>>,
    #[serde(default)]
    pub emails: Option<Vec<RawEmail>>,
    #[serde(default)]
    pub image_available: Option<bool>,
}

impl RawContact {
    /// Drop every field that was not requested. `id` and `name` are always kept.
    pub fn select(mut self, fields: &[ContactField]) -> Self {
        if !fields.contains(&ContactField::FirstName) {
            self.first_name = None;
        }
        if !fields.contains(&ContactField::LastName) {
            self.last_name = None;
        }
        if !fields.contains(&ContactField::PhoneNumbers) {
            self.phone_numbers = None;
        }
        if !fields.contains(&ContactField::Emails) {
            self.emails = None;
        }
        if !fields.contains(&ContactField::ImageAvailable) {
            self.image_available = None;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: String,
}

/// Normalized address book entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    /// Never empty, see [`UNKNOWN_NAME`]
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_numbers: Vec<LabeledValue>,
    pub emails: Vec<LabeledValue>,
    pub image_available: bool,
}

impl Contact {
    pub fn from_raw(raw: RawContact) -> Self {
        let name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let phone_numbers = raw
            .phone_numbers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| labeled(p.label, p.number))
            .collect();
        let emails = raw
            .emails
            .unwrap_or_default()
            .into_iter()
            .filter_map(|e| labeled(e.label, e.email))
            .collect();

        Self {
            id: raw.id.unwrap_or_default(),
            name,
            first_name: non_blank(raw.first_name),
            last_name: non_blank(raw.last_name),
            phone_numbers,
            emails,
            image_available: raw.image_available.unwrap_or(false),
        }
    }

    /// Two-letter monogram for avatars
    pub fn initials(&self) -> String {
        fn first_char(s: &str) -> Option<char> {
            s.chars().next()
        }

        let letters: String = match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => first_char(first).into_iter().chain(first_char(last)).collect(),
            (Some(first), None) => first.chars().take(2).collect(),
            _ => {
                let words: Vec<&str> = self.name.split_whitespace().collect();
                if words.len() >= 2 {
                    words[..2].iter().filter_map(|w| first_char(w)).collect()
                } else {
                    self.name.chars().take(2).collect()
                }
            }
        };

        if letters.is_empty() {
            "??".to_string()
        } else {
            letters.to_uppercase()
        }
    }

    fn matches(&self, needle: &str) -> bool {
        let hit = |field: &str| field.to_lowercase().contains(needle);
        hit(self.name.as_str())
            || self.first_name.as_deref().is_some_and(hit)
            || self.last_name.as_deref().is_some_and(hit)
    }

    fn sort_key(&self) -> String {
        self.first_name
            .as_deref()
            .unwrap_or(&self.name)
            .to_lowercase()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn labeled(label: Option<String>, value: Option<String>) -> Option<LabeledValue> {
    non_blank(value).map(|value| LabeledValue {
        label: non_blank(label),
        value,
    })
}

/// Platform address book
pub trait ContactSource: Send + Sync {
    /// Unique identifier, used in logs and errors
    fn id(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Current permission, without prompting
    fn permission_status(&self) -> Result<PermissionStatus>;

    /// Ask for access. May prompt the user.
    fn request_permission(&self) -> Result<PermissionStatus>;

    /// All contacts, in platform order, with the requested fields filled in
    fn query(&self, query: &ContactQuery) -> Result<Vec<RawContact>>;

    fn get_by_id(&self, id: &str, fields: &[ContactField]) -> Result<Option<RawContact>>;
}

/// Read-only view over a [`ContactSource`]
pub struct ContactDirectory {
    source: Box<dyn ContactSource>,
}

impl ContactDirectory {
    pub fn new(source: Box<dyn ContactSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &dyn ContactSource {
        self.source.as_ref()
    }

    pub fn permission_state(&self) -> PermissionState {
        self.resolve_permission("check", self.source.permission_status())
    }

    pub fn request_permission(&self) -> PermissionState {
        self.resolve_permission("request", self.source.request_permission())
    }

    fn resolve_permission(&self, action: &str, status: Result<PermissionStatus>) -> PermissionState {
        match status {
            Ok(status) => {
                let state = PermissionState::from_status(status);
                tracing::debug!(source = self.source.id(), action, state = state.as_str(), "contacts permission");
                state
            }
            Err(e) => {
                tracing::warn!(source = self.source.id(), action, error = %e, "contacts permission query failed");
                PermissionState::QueryFailed
            }
        }
    }

    fn has_access(&self) -> bool {
        let state = self.permission_state();
        if state != PermissionState::Granted {
            tracing::warn!(source = self.source.id(), state = state.as_str(), "contacts not accessible");
            return false;
        }
        true
    }

    /// All contacts sorted by first name. Empty when access is not granted.
    pub fn list_all(&self) -> Result<Vec<Contact>> {
        if !self.has_access() {
            return Ok(vec![]);
        }

        let raw = self
            .source
            .query(&ContactQuery::default())
            .inspect_err(|e| tracing::error!(source = self.source.id(), error = %e, "failed to get contacts"))?;

        let mut contacts: Vec<Contact> = raw.into_iter().map(Contact::from_raw).collect();
        // Stable, so equal first names keep platform order
        contacts.sort_by_cached_key(Contact::sort_key);
        Ok(contacts)
    }

    /// The contact with this id. `None` when access is not granted.
    pub fn get_by_id(&self, contact_id: &str) -> Result<Option<Contact>> {
        if !self.has_access() {
            return Ok(None);
        }

        let raw = self
            .source
            .get_by_id(contact_id, &CONTACT_FIELDS)
            .inspect_err(|e| {
                tracing::error!(source = self.source.id(), contact_id, error = %e, "failed to get contact")
            })?;
        Ok(raw.map(Contact::from_raw))
    }

    /// Contacts whose name, first name or last name contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Result<Vec<Contact>> {
        let needle = query.to_lowercase();
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|c| c.matches(&needle))
            .collect())
    }
}
