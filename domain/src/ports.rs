//! Collaborator contracts consumed by the routing core.

use crate::error::CollaboratorError;
use crate::models::{BookRecord, Catalog, StoreAvailability, Ticket};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Mutex;

pub type PortResult<T> = Result<T, CollaboratorError>;

/// Read access to the book catalog.
pub trait CatalogReader: Send + Sync {
    fn lookup_by_title(&self, query: &str) -> PortResult<Option<BookRecord>>;

    /// Every title in the catalog, used to build the entity extractor.
    fn titles(&self) -> PortResult<Vec<String>>;

    /// Every city appearing as an availability key (excluding "Online").
    fn cities(&self) -> PortResult<Vec<String>>;

    fn list_availability(
        &self,
        query: &str,
        city: Option<&str>,
    ) -> PortResult<Option<StoreAvailability>> {
        Ok(self
            .lookup_by_title(query)?
            .map(|book| book.availability_for(city)))
    }
}

/// A loaded catalog answers lookups from memory.
impl CatalogReader for Catalog {
    fn lookup_by_title(&self, query: &str) -> PortResult<Option<BookRecord>> {
        Ok(self.find_title(query).cloned())
    }

    fn titles(&self) -> PortResult<Vec<String>> {
        Ok(Catalog::titles(self))
    }

    fn cities(&self) -> PortResult<Vec<String>> {
        Ok(Catalog::cities(self))
    }
}

/// Append-only ticket storage.
pub trait TicketSink: Send + Sync {
    /// Persist `ticket` and return its id.
    fn append(&self, ticket: &Ticket) -> PortResult<String>;

    fn list(&self) -> PortResult<Vec<Ticket>>;
}

/// Partial entities suggested by an oracle. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OracleEntities {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Optional model-backed entity extraction.
#[async_trait]
pub trait EntityOracle: Send + Sync {
    async fn extract_entities(&self, text: &str) -> PortResult<OracleEntities>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
