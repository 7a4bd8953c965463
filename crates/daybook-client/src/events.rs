use serde::Serialize;
use tokio::sync::broadcast;

use daybook_shared::DayDate;

pub const EVENT_DAY_CHANGED: &str = "day-changed";
pub const EVENT_DAY_REMOVED: &str = "day-removed";
pub const EVENT_DRAFTS_CHANGED: &str = "drafts-changed";

/// Capacity of the subscription channel. Slow subscribers that fall this
/// far behind see `RecvError::Lagged` and should re-pull everything.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Emitted after every successful mutation so views can re-pull.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JournalEvent {
    #[serde(rename_all = "camelCase")]
    DayChanged { date: DayDate, entry_count: u32 },
    DayRemoved { date: DayDate },
    DraftsChanged,
}

impl JournalEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DayChanged { .. } => EVENT_DAY_CHANGED,
            Self::DayRemoved { .. } => EVENT_DAY_REMOVED,
            Self::DraftsChanged => EVENT_DRAFTS_CHANGED,
        }
    }
}

pub fn emit_event(tx: &broadcast::Sender<JournalEvent>, event: JournalEvent) {
    let name = event.name();
    if tx.send(event).is_err() {
        tracing::debug!(event = name, "No subscribers for event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_payload() {
        let date = DayDate::parse("2025-01-06").unwrap();
        let event = JournalEvent::DayChanged { date, entry_count: 2 };
        assert_eq!(event.name(), "day-changed");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"type": "dayChanged", "date": "2025-01-06", "entryCount": 2})
        );
    }

    #[tokio::test]
    async fn subscribers_receive() {
        let (tx, mut rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        emit_event(&tx, JournalEvent::DraftsChanged);
        assert_eq!(rx.recv().await.unwrap(), JournalEvent::DraftsChanged);
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let (tx, rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        drop(rx);
        emit_event(&tx, JournalEvent::DraftsChanged);
    }
}
