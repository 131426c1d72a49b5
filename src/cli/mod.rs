//! Command implementations

pub mod contacts;
pub mod notes;
pub mod permission;
pub mod stats;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate to `max` characters for table columns
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or(text);
    match line.char_indices().nth(max.saturating_sub(3)) {
        Some((cut, _)) if line.chars().count() > max => format!("{}...", &line[..cut]),
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("first line\nsecond", 20), "first line");
        assert_eq!(truncate("abcdefghijkl", 10), "abcdefg...");
        assert_eq!(truncate("abcdefghij", 10), "abcdefghij");
    }
}
