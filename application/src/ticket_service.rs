use chrono::{DateTime, Local, Utc};
use domain::models::{Ticket, TicketStatus};
use domain::ports::{Clock, PortResult, TicketSink};
use std::sync::Arc;
use tracing::info;

pub const TICKET_PREFIX: &str = "TCK-";

/// Ticket id for a creation instant: `TCK-` plus the local wall-clock time to
/// the second. Two tickets opened in the same second share an id.
pub fn ticket_id(now: DateTime<Utc>) -> String {
    format!("{TICKET_PREFIX}{}", now.with_timezone(&Local).format("%Y%m%d%H%M%S"))
}

pub struct TicketService {
    sink: Arc<dyn TicketSink>,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    pub fn new(sink: Arc<dyn TicketSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    /// Build an open ticket and append it. The sink is called exactly once.
    pub fn open(&self, name: &str, email: &str, subject: &str, message: &str) -> PortResult<Ticket> {
        let created_at = self.clock.now();
        let mut ticket = Ticket {
            id: ticket_id(created_at),
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
            created_at,
            status: TicketStatus::Open,
        };

        ticket.id = self.sink.append(&ticket)?;
        info!(ticket_id = %ticket.id, "support ticket opened");
        Ok(ticket)
    }

    pub fn list(&self) -> PortResult<Vec<Ticket>> {
        self.sink.list()
    }
}
