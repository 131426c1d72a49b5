//! Address book export reader
//!
//! Reads contacts from a JSON array of platform records, e.g.
//! `[{"id": "1", "name": "Ada Lovelace", "firstName": "Ada",
//!    "phoneNumbers": [{"label": "mobile", "number": "+1 555 0100"}]}]`.
//! Access to the file stands in for the platform permission: readable
//! means granted.

use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{ContactField, ContactQuery, ContactSource, PermissionStatus, RawContact};
use crate::error::{Error, Result};

const SOURCE_ID: &str = "json:ContactsFile";

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        let path = custom_path.unwrap_or_else(|| {
            let home = dirs::home_dir().unwrap_or_default();
            home.join(".local/share/recall/contacts.json")
        });
        Self { path }
    }

    fn load(&self) -> Result<Vec<RawContact>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::directory(SOURCE_ID, format!("{}: {}", self.path.display(), e))
        })?;
        let contacts: Vec<RawContact> = serde_json::from_str(&content)?;
        Ok(contacts)
    }
}

impl ContactSource for JsonFileSource {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn description(&self) -> &str {
        "Contacts exported to a JSON file"
    }

    fn permission_status(&self) -> Result<PermissionStatus> {
        match File::open(&self.path) {
            Ok(_) => Ok(PermissionStatus::Granted),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Ok(PermissionStatus::Denied),
            // Nothing exported yet
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(PermissionStatus::Undetermined),
            Err(e) => Err(e.into()),
        }
    }

    fn request_permission(&self) -> Result<PermissionStatus> {
        // A file cannot prompt; the answer is whatever the filesystem says.
        self.permission_status()
    }

    fn query(&self, query: &ContactQuery) -> Result<Vec<RawContact>> {
        Ok(self
            .load()?
            .into_iter()
            .map(|c| c.select(&query.fields))
            .collect())
    }

    fn get_by_id(&self, id: &str, fields: &[ContactField]) -> Result<Option<RawContact>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|c| c.id.as_deref() == Some(id))
            .map(|c| c.select(fields)))
    }
}
