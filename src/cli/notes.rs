//! Note editing and the notes feed

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};

use super::{print_json, truncate};
use crate::contacts::ContactDirectory;
use crate::detail::Aggregator;
use crate::store::{NoteStore, SaveOutcome};

pub fn set(
    store: &NoteStore,
    directory: &ContactDirectory,
    contact_id: &str,
    content: &str,
) -> Result<()> {
    let contact = directory
        .get_by_id(contact_id)
        .context("Failed to look up contact")?;
    let Some(contact) = contact else {
        bail!("Contact '{}' not found", contact_id);
    };

    match store.save(contact_id, content).context("Failed to save note")? {
        SaveOutcome::Saved(_) => println!("Note saved for {}.", contact.name),
        SaveOutcome::Deleted => println!("Note deleted for {}.", contact.name),
    }
    Ok(())
}

pub fn delete(store: &NoteStore, contact_id: &str) -> Result<()> {
    store.delete(contact_id).context("Failed to delete note")?;
    println!("Note deleted for '{}'.", contact_id);
    Ok(())
}

pub fn feed(aggregator: &Aggregator, query: Option<&str>, json: bool) -> Result<()> {
    let notes = match query {
        Some(q) => aggregator.search_feed(q),
        None => aggregator.notes_feed(),
    }
    .context("Failed to load notes")?;

    if json {
        return print_json(&notes);
    }

    if notes.is_empty() {
        println!("No notes found.");
        return Ok(());
    }

    for entry in &notes {
        let date = DateTime::<Utc>::from_timestamp_millis(entry.note.updated_at)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<30} {:>10}  ({})",
            truncate(&entry.contact_name, 30),
            date,
            entry.note.contact_id
        );
        println!("  {}", entry.preview().replace('\n', " "));
        println!("{}", "-".repeat(60));
    }

    Ok(())
}
