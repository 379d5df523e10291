use chrono::{DateTime, Utc};
use domain::error::CollaboratorError;
use domain::models::{Ticket, TicketStatus};
use domain::ports::{PortResult, TicketSink};
use rusqlite::{params, Connection, Result as SqlResult};
use shared::types::Result;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Append-only ticket table. Ids are not unique: same-second tickets keep
/// the same id, so rows are ordered by `seq`.
pub struct SqliteTicketSink {
    conn: Mutex<Connection>,
}

impl SqliteTicketSink {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        Self::setup_db(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::setup_db(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn setup_db(conn: &Connection) -> SqlResult<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            CREATE TABLE IF NOT EXISTS tickets (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'open'
            );
            CREATE INDEX IF NOT EXISTS idx_tickets_id ON tickets(id);
        ",
        )
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert(&self, ticket: &Ticket) -> Result<()> {
        self.conn().execute(
            "INSERT INTO tickets (id, name, email, subject, message, created_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ticket.id,
                ticket.name,
                ticket.email,
                ticket.subject,
                ticket.message,
                ticket.created_at.to_rfc3339(),
                "open"
            ],
        )?;
        debug!(ticket_id = %ticket.id, "ticket row inserted");
        Ok(())
    }

    fn select_all(&self) -> Result<Vec<Ticket>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, email, subject, message, created_at FROM tickets ORDER BY seq",
        )?;
        let mut rows = stmt.query([])?;
        let mut tickets = Vec::new();
        while let Some(row) = rows.next()? {
            let created_at: String = row.get(5)?;
            tickets.push(Ticket {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                subject: row.get(3)?,
                message: row.get(4)?,
                created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
                status: TicketStatus::Open,
            });
        }
        Ok(tickets)
    }
}

impl TicketSink for SqliteTicketSink {
    fn append(&self, ticket: &Ticket) -> PortResult<String> {
        self.insert(ticket)
            .map_err(|err| CollaboratorError::TicketSink(format!("{err:#}")))?;
        Ok(ticket.id.clone())
    }

    fn list(&self) -> PortResult<Vec<Ticket>> {
        self.select_all()
            .map_err(|err| CollaboratorError::TicketSink(format!("{err:#}")))
    }
}
