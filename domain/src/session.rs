use crate::intent::{Entities, Intent};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One processed turn, kept for audit and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRecord {
    pub utterance: String,
    pub intent: Intent,
    pub entities: Entities,
    pub at: DateTime<Utc>,
}

/// Conversational state for one session id.
///
/// `last_active_at` never moves before `created_at`. A context whose
/// `last_active_at` is older than the TTL is expired and must not feed slot
/// filling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub history: Vec<TurnRecord>,
    pub current_book: Option<String>,
    pub current_city: Option<String>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            created_at: now,
            last_active_at: now,
            history: Vec::new(),
            current_book: None,
            current_city: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_active_at) > ttl
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[TurnRecord] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Append a turn and refresh activity. Book and city are only overwritten
    /// by definite values; `None` leaves the previous value in place.
    pub fn record_turn(
        &mut self,
        record: TurnRecord,
        book: Option<String>,
        city: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.history.push(record);
        if now > self.last_active_at {
            self.last_active_at = now;
        }
        if let Some(book) = book {
            self.current_book = Some(book);
        }
        if let Some(city) = city {
            self.current_city = Some(city);
        }
    }
}
