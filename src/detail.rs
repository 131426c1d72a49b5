//! Merged contact + note views

use std::collections::HashMap;

use serde::Serialize;

use crate::contacts::{Contact, ContactDirectory};
use crate::error::Result;
use crate::store::{ContactNote, NoteStore};

/// Label shown for notes whose contact no longer exists
pub const UNKNOWN_CONTACT: &str = "Unknown Contact";

const PREVIEW_CHARS: usize = 100;

/// A contact and its note, if it has one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactWithNote {
    #[serde(flatten)]
    pub contact: Contact,
    pub note: Option<ContactNote>,
}

/// A note with the display name of its contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteWithContact {
    #[serde(flatten)]
    pub note: ContactNote,
    pub contact_name: String,
}

impl NoteWithContact {
    /// First 100 characters of the note, with `...` when cut
    pub fn preview(&self) -> String {
        let content = &self.note.content;
        match content.char_indices().nth(PREVIEW_CHARS) {
            Some((cut, _)) => format!("{}...", &content[..cut]),
            None => content.clone(),
        }
    }
}

/// Joins directory lookups with stored notes
pub struct Aggregator<'a> {
    directory: &'a ContactDirectory,
    store: &'a NoteStore,
}

impl<'a> Aggregator<'a> {
    pub fn new(directory: &'a ContactDirectory, store: &'a NoteStore) -> Self {
        Self { directory, store }
    }

    /// The contact with its note. `None` when the contact does not exist,
    /// even if a note was left behind for it.
    pub fn get_detail(&self, contact_id: &str) -> Result<Option<ContactWithNote>> {
        let contact = match self.directory.get_by_id(contact_id)? {
            Some(c) => c,
            None => return Ok(None),
        };

        let note = self.store.get_by_contact(contact_id)?;
        Ok(Some(ContactWithNote { contact, note }))
    }

    /// Attach contact names to notes. Never fails: contacts that cannot be
    /// resolved get [`UNKNOWN_CONTACT`]. The directory is read once per call.
    pub fn enrich(&self, notes: Vec<ContactNote>) -> Vec<NoteWithContact> {
        let names: HashMap<String, String> = match self.directory.list_all() {
            Ok(contacts) => contacts.into_iter().map(|c| (c.id, c.name)).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "could not load contacts for notes");
                HashMap::new()
            }
        };

        notes
            .into_iter()
            .map(|note| {
                let contact_name = match names.get(&note.contact_id) {
                    Some(name) => name.clone(),
                    None => {
                        tracing::debug!(contact_id = %note.contact_id, "note refers to a missing contact");
                        UNKNOWN_CONTACT.to_string()
                    }
                };
                NoteWithContact { note, contact_name }
            })
            .collect()
    }

    /// Every note, most recently updated first, with contact names
    pub fn notes_feed(&self) -> Result<Vec<NoteWithContact>> {
        Ok(self.enrich(self.store.list_all()?))
    }

    pub fn search_feed(&self, query: &str) -> Result<Vec<NoteWithContact>> {
        Ok(self.enrich(self.store.search(query)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{
        ContactField, ContactQuery, ContactSource, JsonFileSource, MemorySource, PermissionStatus,
        RawContact,
    };
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn raw(id: &str, name: &str) -> RawContact {
        RawContact {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn directory() -> ContactDirectory {
        ContactDirectory::new(Box::new(MemorySource::new(vec![
            raw("c1", "Ada Lovelace"),
            raw("c2", "Grace Hopper"),
        ])))
    }

    #[test]
    fn test_detail_with_and_without_note() {
        let directory = directory();
        let store = NoteStore::open_in_memory().unwrap();
        store.save("c1", "Likes jazz").unwrap();
        let aggregator = Aggregator::new(&directory, &store);

        let ada = aggregator.get_detail("c1").unwrap().unwrap();
        assert_eq!(ada.contact.name, "Ada Lovelace");
        assert_eq!(ada.note.unwrap().content, "Likes jazz");

        let grace = aggregator.get_detail("c2").unwrap().unwrap();
        assert!(grace.note.is_none());
    }

    #[test]
    fn test_detail_for_removed_contact_is_absent() {
        let directory = directory();
        let store = NoteStore::open_in_memory().unwrap();
        store.save("gone", "orphaned note").unwrap();
        let aggregator = Aggregator::new(&directory, &store);

        assert!(aggregator.get_detail("gone").unwrap().is_none());
    }

    #[test]
    fn test_feed_falls_back_for_removed_contacts() {
        let directory = directory();
        let store = NoteStore::open_in_memory().unwrap();
        store.save("c2", "Invented the compiler").unwrap();
        store.save("gone", "orphaned note").unwrap();
        let aggregator = Aggregator::new(&directory, &store);

        let feed = aggregator.notes_feed().unwrap();
        assert_eq!(feed.len(), 2);
        for entry in &feed {
            let expected = if entry.note.contact_id == "c2" {
                "Grace Hopper"
            } else {
                UNKNOWN_CONTACT
            };
            assert_eq!(entry.contact_name, expected);
        }

        let hits = aggregator.search_feed("COMPILER").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].contact_name, "Grace Hopper");
    }

    #[test]
    fn test_detail_without_permission_is_absent() {
        let source = MemorySource::new(vec![raw("c1", "Ada Lovelace")])
            .with_permission(PermissionStatus::Denied);
        let directory = ContactDirectory::new(Box::new(source));
        let store = NoteStore::open_in_memory().unwrap();
        store.save("c1", "Likes jazz").unwrap();
        let aggregator = Aggregator::new(&directory, &store);

        assert!(aggregator.get_detail("c1").unwrap().is_none());
        assert_eq!(aggregator.notes_feed().unwrap()[0].contact_name, UNKNOWN_CONTACT);
    }

    #[test]
    fn test_detail_with_missing_export_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(Some(dir.path().join("none.json")));
        let directory = ContactDirectory::new(Box::new(source));
        let store = NoteStore::open_in_memory().unwrap();
        store.save("c1", "Likes jazz").unwrap();
        let aggregator = Aggregator::new(&directory, &store);

        assert!(aggregator.get_detail("c1").unwrap().is_none());
        assert_eq!(aggregator.notes_feed().unwrap()[0].contact_name, UNKNOWN_CONTACT);
    }

    /// Counts how often the address book is read
    struct CountingSource {
        inner: MemorySource,
        reads: Arc<AtomicUsize>,
    }

    impl ContactSource for CountingSource {
        fn id(&self) -> &str {
            "counting"
        }
        fn description(&self) -> &str {
            "counts reads"
        }
        fn permission_status(&self) -> Result<PermissionStatus> {
            self.inner.permission_status()
        }
        fn request_permission(&self) -> Result<PermissionStatus> {
            self.inner.request_permission()
        }
        fn query(&self, query: &ContactQuery) -> Result<Vec<RawContact>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.query(query)
        }
        fn get_by_id(&self, id: &str, fields: &[ContactField]) -> Result<Option<RawContact>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_id(id, fields)
        }
    }

    #[test]
    fn test_feed_reads_directory_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            inner: MemorySource::new(vec![raw("c1", "Ada Lovelace"), raw("c2", "Grace Hopper")]),
            reads: Arc::clone(&reads),
        };
        let directory = ContactDirectory::new(Box::new(source));
        let store = NoteStore::open_in_memory().unwrap();
        for contact in ["c1", "c2", "gone"] {
            store.save(contact, "note").unwrap();
        }
        let aggregator = Aggregator::new(&directory, &store);

        let feed = aggregator.notes_feed().unwrap();
        assert_eq!(feed.len(), 3);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    struct FailingLookups;

    impl ContactSource for FailingLookups {
        fn id(&self) -> &str {
            "failing"
        }
        fn description(&self) -> &str {
            "lookups always fail"
        }
        fn permission_status(&self) -> Result<PermissionStatus> {
            Ok(PermissionStatus::Granted)
        }
        fn request_permission(&self) -> Result<PermissionStatus> {
            Ok(PermissionStatus::Granted)
        }
        fn query(&self, _query: &ContactQuery) -> Result<Vec<RawContact>> {
            Err(Error::directory("failing", "unavailable"))
        }
        fn get_by_id(&self, _id: &str, _fields: &[ContactField]) -> Result<Option<RawContact>> {
            Err(Error::directory("failing", "unavailable"))
        }
    }

    #[test]
    fn test_enrich_survives_lookup_errors() {
        let directory = ContactDirectory::new(Box::new(FailingLookups));
        let store = NoteStore::open_in_memory().unwrap();
        store.save("c1", "still listed").unwrap();
        let aggregator = Aggregator::new(&directory, &store);

        let feed = aggregator.notes_feed().unwrap();
        assert_eq!(feed[0].contact_name, UNKNOWN_CONTACT);
        assert!(aggregator.get_detail("c1").is_err());
    }

    #[test]
    fn test_preview_truncates_long_notes() {
        let note = |content: String| NoteWithContact {
            note: ContactNote {
                id: "n".into(),
                contact_id: "c".into(),
                content,
                created_at: 0,
                updated_at: 0,
            },
            contact_name: "x".into(),
        };

        assert_eq!(note("short".into()).preview(), "short");
        assert_eq!(note("é".repeat(100)).preview(), "é".repeat(100));

        let long = note("ü".repeat(150)).preview();
        assert_eq!(long, format!("{}...", "ü".repeat(100)));
    }
}
