//! Fixtures shared by the integration suites: a catalog on disk, a JSON
//! ticket file and a router driven by a manual clock.

use application::router::{Router, RouterBuilder, TurnResult};
use chrono::{DateTime, TimeZone, Utc};
use domain::ports::ManualClock;
use infrastructure::json_catalog::JsonCatalog;
use infrastructure::json_ticket_sink::JsonTicketSink;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const TITLES: [&str; 3] = ["A Abelha", "A Baleia-azul", "A Borboleta"];

pub const CATALOG_JSON: &str = r#"{
  "books": [
    {
      "title": "A Abelha",
      "author": "Milton Célio de Oliveira Filho",
      "imprint": "Elo Editora",
      "release_date": "12/03/2021",
      "synopsis": "Uma abelha curiosa.",
      "availability": {
        "São Paulo": ["Livraria Cultura", "Livraria da Vila"],
        "Curitiba": ["Livrarias Curitiba"],
        "Online": ["Amazon", "Elo Store"]
      }
    },
    {
      "title": "A Baleia-azul",
      "author": "Ana Lúcia Ribeiro",
      "imprint": "Elo Editora",
      "release_date": "05/08/2020",
      "synopsis": "A maior criatura do planeta.",
      "availability": {
        "São Paulo": ["Livraria Cultura"],
        "Rio de Janeiro": ["Livraria Travessa"],
        "Online": ["Amazon"]
      }
    },
    {
      "title": "A Borboleta",
      "author": "Carla Mendes",
      "imprint": "Elo Kids",
      "release_date": "20/10/2022",
      "synopsis": "Da lagarta ao voo.",
      "availability": {
        "Salvador": ["Livraria LDM"],
        "Online": ["Elo Store", "Magazine Luiza"]
      }
    }
  ]
}"#;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
        .single()
        .expect("valid start time")
}

pub struct Harness {
    pub dir: TempDir,
    pub router: Router,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    /// Router over fresh catalog and ticket files; `configure` may add an
    /// oracle, change the TTL, etc.
    pub fn with(configure: impl FnOnce(RouterBuilder) -> RouterBuilder) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let catalog_path = dir.path().join("catalog.json");
        fs::write(&catalog_path, CATALOG_JSON).expect("write catalog");

        let catalog = Arc::new(JsonCatalog::open(&catalog_path).expect("open catalog"));
        let tickets = Arc::new(JsonTicketSink::open(dir.path().join("tickets.json")).expect("open tickets"));
        let clock = Arc::new(ManualClock::new(start_time()));

        let builder = Router::builder(catalog, tickets)
            .with_clock(clock.clone())
            .with_extra_cities(["Recife".to_string(), "Fortaleza".to_string()]);
        let router = configure(builder).build().expect("build router");

        Self { dir, router, clock }
    }

    pub fn tickets_path(&self) -> PathBuf {
        self.dir.path().join("tickets.json")
    }

    pub async fn say(&self, text: &str, session: &str) -> TurnResult {
        self.router.process(text, Some(session)).await
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
