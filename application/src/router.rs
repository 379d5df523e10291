//! Turn orchestration: session, extraction, classification, dispatch, commit.

use crate::catalog_service::CatalogService;
use crate::entity_extractor::EntityExtractor;
use crate::intent_classifier::IntentClassifier;
use crate::session_store::{SessionStore, DEFAULT_TTL_MINUTES};
use crate::ticket_service::TicketService;
use chrono::Duration;
use domain::intent::{Intent, IntentResolution, SlotSource};
use domain::outcome::Outcome;
use domain::ports::{CatalogReader, Clock, EntityOracle, PortResult, SystemClock, TicketSink};
use domain::session::TurnRecord;
use serde::Serialize;
use shared::telemetry::Telemetry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sessions held before a turn triggers an expiry sweep.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10;

/// What one call to [`Router::process`] produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnResult {
    /// Id the caller must send back to continue the conversation.
    pub session_id: String,
    pub intent: Intent,
    pub outcome: Outcome,
}

pub struct RouterBuilder {
    catalog: Arc<dyn CatalogReader>,
    tickets: Arc<dyn TicketSink>,
    sessions: Option<Arc<SessionStore>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    oracle: Option<Arc<dyn EntityOracle>>,
    extra_cities: Vec<String>,
    sweep_threshold: usize,
}

impl RouterBuilder {
    pub fn new(catalog: Arc<dyn CatalogReader>, tickets: Arc<dyn TicketSink>) -> Self {
        Self {
            catalog,
            tickets,
            sessions: None,
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
            clock: Arc::new(SystemClock),
            oracle: None,
            extra_cities: Vec::new(),
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }

    /// Share an existing store. Overrides [`RouterBuilder::with_ttl`].
    pub fn with_sessions(mut self, sessions: Arc<SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn EntityOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// City names recognized even when no book is stocked there.
    pub fn with_extra_cities(mut self, cities: impl IntoIterator<Item = String>) -> Self {
        self.extra_cities.extend(cities);
        self
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    /// Reads the catalog's titles and cities once to seed the extractor.
    pub fn build(self) -> PortResult<Router> {
        let mut extractor = EntityExtractor::from_catalog(self.catalog.as_ref(), &self.extra_cities)?;
        if let Some(oracle) = self.oracle {
            extractor = extractor.with_oracle(oracle);
        }
        let ttl = self.ttl;

        Ok(Router {
            sessions: self.sessions.unwrap_or_else(|| Arc::new(SessionStore::new(ttl))),
            extractor,
            classifier: IntentClassifier::new(),
            catalog: CatalogService::new(self.catalog),
            tickets: TicketService::new(self.tickets, self.clock.clone()),
            clock: self.clock,
            sweep_threshold: self.sweep_threshold,
        })
    }
}

pub struct Router {
    sessions: Arc<SessionStore>,
    extractor: EntityExtractor,
    classifier: IntentClassifier,
    catalog: CatalogService,
    tickets: TicketService,
    clock: Arc<dyn Clock>,
    sweep_threshold: usize,
}

impl Router {
    pub fn builder(catalog: Arc<dyn CatalogReader>, tickets: Arc<dyn TicketSink>) -> RouterBuilder {
        RouterBuilder::new(catalog, tickets)
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn tickets(&self) -> &TicketService {
        &self.tickets
    }

    /// Run one turn. Never fails: misses, gaps and collaborator errors all come
    /// back as an [`Outcome`]. Session state is committed only after the
    /// outcome is known, and not at all when a collaborator failed.
    pub async fn process(&self, text: &str, session_id: Option<&str>) -> TurnResult {
        let telemetry = Telemetry::new();
        let requested = session_id.map(str::trim).filter(|id| !id.is_empty());
        let _turn = match requested {
            Some(id) => Some(self.sessions.lock_turn(id).await),
            None => None,
        };

        let now = self.clock.now();
        if self.sessions.len() > self.sweep_threshold {
            self.sessions.sweep_expired(now);
        }
        let (context, session_id) = self.sessions.resolve(requested, now);

        let entities = self.extractor.extract_with_oracle(text).await;
        let resolution = self.classifier.resolve(text, &entities, &context);
        let outcome = self.dispatch(&resolution);

        if let Outcome::Unavailable { collaborator, reason } = &outcome {
            warn!(session_id = %session_id, %collaborator, %reason, "turn failed; session left untouched");
        } else {
            let (book, city) = context_updates(&outcome, &resolution);
            let record = TurnRecord {
                utterance: text.to_string(),
                intent: resolution.intent,
                entities,
                at: now,
            };
            self.sessions.touch(&session_id, record, book, city, self.clock.now());
        }

        debug!(
            session_id = %session_id,
            intent = %resolution.intent,
            elapsed_ms = telemetry.elapsed_ms() as u64,
            "turn processed"
        );

        TurnResult {
            session_id,
            intent: resolution.intent,
            outcome,
        }
    }

    fn dispatch(&self, resolution: &IntentResolution) -> Outcome {
        match resolution.intent {
            Intent::BookDetails => match resolution.title() {
                Some(title) => self.catalog.book_details(title),
                None => Outcome::NotFound { query: None },
            },
            Intent::StoreLookup => match resolution.title() {
                Some(title) => self.catalog.stores(title, resolution.city()),
                None => Outcome::NotFound { query: None },
            },
            Intent::SupportTicket => {
                let contact = &resolution.contact;
                match (
                    contact.name.as_deref(),
                    contact.email.as_deref(),
                    contact.subject.as_deref(),
                    contact.message.as_deref(),
                ) {
                    (Some(name), Some(email), Some(subject), Some(message)) => {
                        match self.tickets.open(name, email, subject, message) {
                            Ok(ticket) => Outcome::TicketOpened(ticket),
                            Err(err) => err.into(),
                        }
                    }
                    _ => Outcome::NeedsInput {
                        intent: Intent::SupportTicket,
                        missing: contact.missing(),
                    },
                }
            }
            Intent::Unknown => Outcome::Help,
        }
    }
}

/// Book and city values a successful turn commits to the session. Only a
/// found book counts, and only a city stated in this utterance.
fn context_updates(outcome: &Outcome, resolution: &IntentResolution) -> (Option<String>, Option<String>) {
    match outcome {
        Outcome::BookDetails(book) => (Some(book.title.clone()), None),
        Outcome::Stores(listing) => {
            let city = resolution
                .city
                .as_ref()
                .filter(|slot| slot.source == SlotSource::Extracted)
                .map(|slot| slot.value.clone());
            (Some(listing.title.clone()), city)
        }
        _ => (None, None),
    }
}
