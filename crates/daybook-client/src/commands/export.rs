use std::collections::BTreeMap;

use daybook_shared::entry;
use daybook_shared::DayDate;
use daybook_store::DayRecord;

/// Render every day as plain text, oldest first:
///
/// ```text
/// === Monday, January 6, 2025 ===
/// [9:00 AM] ...
/// ```
///
/// Days are separated by a blank line.
pub fn export_all(days: &BTreeMap<DayDate, DayRecord>) -> String {
    days.iter()
        .map(|(date, record)| format!("=== {} ===\n{}", long_date(*date), record.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The raw text of the selected entries, in the order they were written.
pub fn copy_selected(content: &str, indices: &[usize]) -> String {
    entry::select_entries(content, indices)
}

fn long_date(date: DayDate) -> String {
    date.naive().format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use daybook_shared::OwnerId;
    use uuid::Uuid;

    use super::*;

    fn record(date: &str, content: &str) -> (DayDate, DayRecord) {
        let date = DayDate::parse(date).unwrap();
        let record = DayRecord {
            id: Uuid::new_v4(),
            owner: OwnerId::new("user_2alice").unwrap(),
            date,
            content: content.to_string(),
            entry_count: entry::entry_count(content) as u32,
            last_updated: Utc::now(),
            attachments: Vec::new(),
        };
        (date, record)
    }

    #[test]
    fn export_orders_by_date() {
        let days = BTreeMap::from([
            record("2025-01-07", "[8:00 AM] second day"),
            record("2025-01-06", "[9:00 AM] first\n\n[1:05 PM] later"),
        ]);

        assert_eq!(
            export_all(&days),
            "=== Monday, January 6, 2025 ===\n[9:00 AM] first\n\n[1:05 PM] later\n\n\
             === Tuesday, January 7, 2025 ===\n[8:00 AM] second day"
        );
        assert_eq!(export_all(&BTreeMap::new()), "");
    }

    #[test]
    fn copy_keeps_blob_order() {
        let content = "[9:00 AM] A\n\n[10:00 AM] B\n\n[11:00 AM] C";
        assert_eq!(copy_selected(content, &[2, 0]), "[9:00 AM] A\n\n[11:00 AM] C");
        assert_eq!(copy_selected(content, &[7]), "");
    }
}
