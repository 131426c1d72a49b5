//! In-memory contact source

use std::sync::Mutex;

use super::{ContactField, ContactQuery, ContactSource, PermissionStatus, RawContact};
use crate::error::Result;

/// Contacts held in memory, in insertion order.
///
/// `request_permission` grants access unless it was explicitly denied,
/// which is how a first-run prompt that the user accepts behaves.
pub struct MemorySource {
    contacts: Vec<RawContact>,
    permission: Mutex<PermissionStatus>,
}

impl MemorySource {
    pub fn new(contacts: Vec<RawContact>) -> Self {
        Self {
            contacts,
            permission: Mutex::new(PermissionStatus::Granted),
        }
    }

    pub fn with_permission(self, status: PermissionStatus) -> Self {
        Self {
            permission: Mutex::new(status),
            ..self
        }
    }

    fn status(&self) -> PermissionStatus {
        // A poisoned lock still holds a valid status
        *self.permission.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ContactSource for MemorySource {
    fn id(&self) -> &str {
        "memory"
    }

    fn description(&self) -> &str {
        "In-memory contacts"
    }

    fn permission_status(&self) -> Result<PermissionStatus> {
        Ok(self.status())
    }

    fn request_permission(&self) -> Result<PermissionStatus> {
        let mut status = self.permission.lock().unwrap_or_else(|e| e.into_inner());
        if *status == PermissionStatus::Undetermined {
            *status = PermissionStatus::Granted;
        }
        Ok(*status)
    }

    fn query(&self, query: &ContactQuery) -> Result<Vec<RawContact>> {
        Ok(self
            .contacts
            .iter()
            .map(|c| c.clone().select(&query.fields))
            .collect())
    }

    fn get_by_id(&self, id: &str, fields: &[ContactField]) -> Result<Option<RawContact>> {
        Ok(self
            .contacts
            .iter()
            .find(|c| c.id.as_deref() == Some(id))
            .map(|c| c.clone().select(fields)))
    }
}
