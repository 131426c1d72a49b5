//! Contact list, search and detail commands

use anyhow::{bail, Result};

use super::{print_json, truncate};
use crate::contacts::{Contact, ContactDirectory, PermissionState};
use crate::detail::Aggregator;

pub fn list(directory: &ContactDirectory, query: Option<&str>, json: bool) -> Result<()> {
    let contacts = match query {
        Some(q) => directory.search(q)?,
        None => directory.list_all()?,
    };

    if json {
        return print_json(&contacts);
    }

    if contacts.is_empty() {
        match directory.permission_state() {
            PermissionState::Granted if query.is_some() => println!("No contacts match."),
            PermissionState::Granted => println!("No contacts found."),
            state => println!(
                "Contacts are not accessible ({}). Run 'recall permission request'.",
                state.as_str()
            ),
        }
        return Ok(());
    }

    println!("{:<4} {:<24} {:<30} {}", "", "Name", "Phone", "ID");
    println!("{}", "-".repeat(80));
    for contact in &contacts {
        let phone = contact
            .phone_numbers
            .first()
            .map(|p| p.value.as_str())
            .unwrap_or("-");
        println!(
            "{:<4} {:<24} {:<30} {}",
            contact.initials(),
            truncate(&contact.name, 24),
            truncate(phone, 30),
            contact.id
        );
    }

    Ok(())
}

pub fn show(aggregator: &Aggregator, contact_id: &str, json: bool) -> Result<()> {
    let detail = match aggregator.get_detail(contact_id)? {
        Some(d) => d,
        None => bail!("Contact '{}' not found", contact_id),
    };

    if json {
        return print_json(&detail);
    }

    print_contact(&detail.contact);
    println!("{}", "-".repeat(40));
    match &detail.note {
        Some(note) => println!("Note:\n{}", note.content),
        None => println!("No note yet. Add one with 'recall note set {} <text>'.", contact_id),
    }

    Ok(())
}

fn print_contact(contact: &Contact) {
    println!("\n[{}] {}", contact.initials(), contact.name);

    if !contact.phone_numbers.is_empty() {
        println!("Phone");
        for phone in &contact.phone_numbers {
            match &phone.label {
                Some(label) => println!("  {}: {}", label, phone.value),
                None => println!("  {}", phone.value),
            }
        }
    }

    if !contact.emails.is_empty() {
        println!("Email");
        for email in &contact.emails {
            match &email.label {
                Some(label) => println!("  {}: {}", label, email.value),
                None => println!("  {}", email.value),
            }
        }
    }
}
