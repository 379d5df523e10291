pub mod config;
pub mod json_catalog;
pub mod json_ticket_sink;
pub mod ollama_oracle;
pub mod sqlite_ticket_sink;

use domain::ports::TicketSink;
use json_ticket_sink::JsonTicketSink;
use shared::types::Result;
use sqlite_ticket_sink::SqliteTicketSink;
use std::path::Path;
use std::sync::Arc;

/// Open the ticket store at `path`. `.db`, `.sqlite` and `.sqlite3` select
/// SQLite; anything else is a JSON array file.
pub fn open_ticket_sink(path: &Path) -> Result<Arc<dyn TicketSink>> {
    let is_sqlite = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "db" | "sqlite" | "sqlite3"));

    if is_sqlite {
        Ok(Arc::new(SqliteTicketSink::open(path)?))
    } else {
        Ok(Arc::new(JsonTicketSink::open(path)?))
    }
}
