use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The external component a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Collaborator {
    Catalog,
    TicketSink,
    Oracle,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Catalog => "catalog",
            Self::TicketSink => "ticket store",
            Self::Oracle => "entity oracle",
        };
        f.write_str(name)
    }
}

/// Failure reported by a collaborator port. Domain misses (unknown title,
/// city without stores) are not errors and never use this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("catalog unavailable: {0}")]
    Catalog(String),

    #[error("ticket store unavailable: {0}")]
    TicketSink(String),

    #[error("entity oracle unavailable: {0}")]
    Oracle(String),
}

impl CollaboratorError {
    pub fn collaborator(&self) -> Collaborator {
        match self {
            Self::Catalog(_) => Collaborator::Catalog,
            Self::TicketSink(_) => Collaborator::TicketSink,
            Self::Oracle(_) => Collaborator::Oracle,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Catalog(reason) | Self::TicketSink(reason) | Self::Oracle(reason) => reason,
        }
    }
}
