use anyhow::Context;
use domain::error::CollaboratorError;
use domain::models::Ticket;
use domain::ports::{PortResult, TicketSink};
use shared::types::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Tickets kept as a JSON array on disk. The file starts as `[]` and only
/// grows. Each append rewrites through a temp file and a rename so a crash
/// never leaves a half-written array.
pub struct JsonTicketSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonTicketSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        if !path.exists() {
            fs::write(&path, "[]").with_context(|| format!("initializing {}", path.display()))?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Ticket>> {
        let raw = fs::read_to_string(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn write_all(&self, tickets: &[Ticket]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(tickets)?;
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    fn try_append(&self, ticket: &Ticket) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut tickets = self.read_all()?;
        tickets.push(ticket.clone());
        self.write_all(&tickets)?;
        debug!(ticket_id = %ticket.id, total = tickets.len(), "ticket appended");
        Ok(())
    }
}

fn sink_error(err: anyhow::Error) -> CollaboratorError {
    CollaboratorError::TicketSink(format!("{err:#}"))
}

impl TicketSink for JsonTicketSink {
    fn append(&self, ticket: &Ticket) -> PortResult<String> {
        self.try_append(ticket).map_err(sink_error)?;
        Ok(ticket.id.clone())
    }

    fn list(&self) -> PortResult<Vec<Ticket>> {
        self.read_all().map_err(sink_error)
    }
}
