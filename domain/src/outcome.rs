use crate::error::{Collaborator, CollaboratorError};
use crate::intent::{Intent, MissingSlots};
use crate::models::{BookRecord, StoreAvailability, Ticket};
use serde::Serialize;
use std::collections::BTreeMap;

/// Stores for a title, optionally narrowed to the city the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreListing {
    pub title: String,
    pub requested_city: Option<String>,
    /// Physical stores. Every location when no city was asked for, otherwise
    /// only the locations matching `requested_city`.
    pub by_city: BTreeMap<String, Vec<String>>,
    /// Always the complete online list.
    pub online: Vec<String>,
}

impl StoreListing {
    pub fn new(availability: StoreAvailability, requested_city: Option<String>) -> Self {
        Self {
            title: availability.title,
            requested_city,
            by_city: availability.by_city,
            online: availability.online,
        }
    }

    /// A city was asked for but nothing physical matched it; only the online
    /// list is on offer.
    pub fn is_online_fallback(&self) -> bool {
        self.requested_city.is_some() && self.by_city.is_empty()
    }
}

/// Terminal result of one turn. Every branch of the router ends in one of
/// these; none of them is raised as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    BookDetails(BookRecord),
    Stores(StoreListing),
    TicketOpened(Ticket),
    /// Domain miss: no book matched. `query` is `None` when no title could be
    /// resolved at all.
    NotFound { query: Option<String> },
    /// Validation gap: required slots were absent from the utterance.
    NeedsInput { intent: Intent, missing: MissingSlots },
    /// Unknown intent.
    Help,
    /// A collaborator failed; session state was left untouched.
    Unavailable { collaborator: Collaborator, reason: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl From<CollaboratorError> for Outcome {
    fn from(err: CollaboratorError) -> Self {
        Self::Unavailable {
            collaborator: err.collaborator(),
            reason: err.reason().to_string(),
        }
    }
}
