use async_trait::async_trait;
use domain::error::CollaboratorError;
use domain::models::{BookRecord, Catalog, Ticket, ONLINE_KEY};
use domain::ports::{CatalogReader, EntityOracle, OracleEntities, PortResult, TicketSink};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn book(title: &str, author: &str, release_date: &str, availability: Vec<(&str, Vec<&str>)>) -> BookRecord {
    BookRecord {
        title: title.into(),
        author: author.into(),
        imprint: "Elo Editora".into(),
        release_date: release_date.into(),
        synopsis: format!("{title}: uma história ilustrada."),
        availability: availability
            .into_iter()
            .map(|(city, stores)| (city.to_string(), stores.into_iter().map(str::to_string).collect()))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub fn sample_catalog() -> Catalog {
    Catalog {
        books: vec![
            book(
                "A Abelha",
                "Milton Célio de Oliveira Filho",
                "12/03/2021",
                vec![
                    ("São Paulo", vec!["Livraria Cultura", "Livraria da Vila"]),
                    ("Curitiba", vec!["Livrarias Curitiba"]),
                    (ONLINE_KEY, vec!["Amazon", "Elo Store"]),
                ],
            ),
            book(
                "A Baleia-azul",
                "Milton Célio de Oliveira Filho",
                "05/08/2020",
                vec![
                    ("São Paulo", vec!["Livraria Cultura"]),
                    ("Rio de Janeiro", vec!["Livraria Travessa"]),
                    (ONLINE_KEY, vec!["Amazon"]),
                ],
            ),
            book(
                "A Borboleta",
                "Milton Célio de Oliveira Filho",
                "20/10/2022",
                vec![(ONLINE_KEY, vec!["Elo Store"])],
            ),
        ],
    }
}

pub struct FailingCatalog;

impl CatalogReader for FailingCatalog {
    fn lookup_by_title(&self, _query: &str) -> PortResult<Option<BookRecord>> {
        Err(CollaboratorError::Catalog("catalog file unreadable".into()))
    }

    fn titles(&self) -> PortResult<Vec<String>> {
        Ok(sample_catalog().titles())
    }

    fn cities(&self) -> PortResult<Vec<String>> {
        Ok(sample_catalog().cities())
    }
}

#[derive(Default)]
pub struct RecordingTicketSink {
    tickets: Mutex<Vec<Ticket>>,
}

impl RecordingTicketSink {
    pub fn tickets(&self) -> Vec<Ticket> {
        self.tickets.lock().unwrap().clone()
    }
}

impl TicketSink for RecordingTicketSink {
    fn append(&self, ticket: &Ticket) -> PortResult<String> {
        self.tickets.lock().unwrap().push(ticket.clone());
        Ok(ticket.id.clone())
    }

    fn list(&self) -> PortResult<Vec<Ticket>> {
        Ok(self.tickets())
    }
}

pub struct FailingTicketSink;

impl TicketSink for FailingTicketSink {
    fn append(&self, _ticket: &Ticket) -> PortResult<String> {
        Err(CollaboratorError::TicketSink("disk full".into()))
    }

    fn list(&self) -> PortResult<Vec<Ticket>> {
        Err(CollaboratorError::TicketSink("disk full".into()))
    }
}

/// Oracle answering the same suggestion every time and counting calls.
pub struct FixedOracle {
    answer: OracleEntities,
    calls: AtomicUsize,
}

impl FixedOracle {
    pub fn new(title: Option<&str>, city: Option<&str>) -> Self {
        Self {
            answer: OracleEntities {
                title: title.map(str::to_string),
                city: city.map(str::to_string),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntityOracle for FixedOracle {
    async fn extract_entities(&self, _text: &str) -> PortResult<OracleEntities> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

pub struct FailingOracle;

#[async_trait]
impl EntityOracle for FailingOracle {
    async fn extract_entities(&self, _text: &str) -> PortResult<OracleEntities> {
        Err(CollaboratorError::Oracle("connection refused".into()))
    }
}
