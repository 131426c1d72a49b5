//! SQLite schema for the notes database
//!
//! One row per contact note. The contact itself lives in the device
//! address book and is never copied here, so `contactId` is a loose
//! reference: notes outlive the contacts they were written for.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id TEXT PRIMARY KEY NOT NULL,          -- UUID v4, assigned on first save
    contactId TEXT NOT NULL,               -- address book identifier
    content TEXT NOT NULL,                 -- trimmed, never empty
    createdAt INTEGER NOT NULL,            -- unix millis, immutable
    updatedAt INTEGER NOT NULL             -- unix millis, bumped on every save
);

CREATE INDEX IF NOT EXISTS idx_contactId ON notes(contactId);
"#;
