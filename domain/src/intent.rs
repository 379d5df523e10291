use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    BookDetails,
    StoreLookup,
    SupportTicket,
    Unknown,
}

impl Intent {
    /// Intents a caller can actually reach, in help-text order.
    pub const SUPPORTED: [Intent; 3] = [Intent::BookDetails, Intent::StoreLookup, Intent::SupportTicket];

    pub fn label(self) -> &'static str {
        match self {
            Self::BookDetails => "book details",
            Self::StoreLookup => "store lookup",
            Self::SupportTicket => "support ticket",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Title,
    City,
    Name,
    Email,
    Subject,
    Message,
}

impl Slot {
    /// Slots a support ticket cannot be opened without.
    pub const TICKET: [Slot; 4] = [Slot::Name, Slot::Email, Slot::Subject, Slot::Message];

    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::City => "city",
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Missing required slots; no intent has more than four.
pub type MissingSlots = ArrayVec<Slot, 4>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactFields {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        let value = match slot {
            Slot::Name => &self.name,
            Slot::Email => &self.email,
            Slot::Subject => &self.subject,
            Slot::Message => &self.message,
            Slot::Title | Slot::City => return None,
        };
        value.as_deref()
    }

    pub fn missing(&self) -> MissingSlots {
        Slot::TICKET
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }

    pub fn present_count(&self) -> usize {
        Slot::TICKET.len() - self.missing().len()
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }
}

/// Entities found in a single utterance. Every field is optional; absence is
/// not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub book_title: Option<String>,
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "ContactFields::is_empty")]
    pub contact: ContactFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotSource {
    /// Found in the current utterance.
    Extracted,
    /// Carried over from the session.
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotValue {
    pub value: String,
    pub source: SlotSource,
}

impl SlotValue {
    pub fn extracted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: SlotSource::Extracted,
        }
    }

    pub fn from_context(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: SlotSource::Context,
        }
    }
}

/// Classified intent with its slots filled. Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentResolution {
    pub intent: Intent,
    pub title: Option<SlotValue>,
    pub city: Option<SlotValue>,
    pub contact: ContactFields,
    pub missing: MissingSlots,
}

impl IntentResolution {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_ref().map(|slot| slot.value.as_str())
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_ref().map(|slot| slot.value.as_str())
    }
}
