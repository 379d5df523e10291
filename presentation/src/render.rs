use colored::Colorize;
use domain::intent::{Intent, Slot};
use domain::models::{BookRecord, Ticket};
use domain::outcome::{Outcome, StoreListing};

/// Example utterance shown in help for each supported intent.
pub fn example_for(intent: Intent) -> &'static str {
    match intent {
        Intent::BookDetails => "Tell me about A Abelha",
        Intent::StoreLookup => "Where can I buy A Baleia-azul in São Paulo?",
        Intent::SupportTicket => "I need help with an order",
        Intent::Unknown => "",
    }
}

pub fn help_text() -> String {
    let mut out = format!("{}\n", "I can help you with:".bold());
    for intent in Intent::SUPPORTED {
        out.push_str(&format!("  • {}: \"{}\"\n", intent.label(), example_for(intent).cyan()));
    }
    out.push_str("In chat, type history to see recent turns or exit to leave.");
    out
}

fn render_book(book: &BookRecord) -> String {
    format!(
        "{}\n  Author: {}\n  Imprint: {}\n  Release date: {}\n  Synopsis: {}",
        book.title.bold(),
        book.author,
        book.imprint,
        book.release_date,
        book.synopsis
    )
}

fn render_stores(listing: &StoreListing) -> String {
    let online = listing.online.join(", ");

    if listing.is_online_fallback() {
        let city = listing.requested_city.as_deref().unwrap_or_default();
        return if listing.online.is_empty() {
            format!(
                "No stores in {} carry {}, and it is not sold online right now.",
                city.bold(),
                listing.title.bold()
            )
        } else {
            format!(
                "No stores in {} carry {}. You can buy it online at: {}",
                city.bold(),
                listing.title.bold(),
                online.green()
            )
        };
    }

    if listing.by_city.is_empty() && listing.online.is_empty() {
        return format!("No stores currently list {}.", listing.title.bold());
    }

    let mut out = format!("Where to find {}:\n", listing.title.bold());
    for (city, stores) in &listing.by_city {
        out.push_str(&format!("  {}: {}\n", city.cyan(), stores.join(", ")));
    }
    if !listing.online.is_empty() {
        out.push_str(&format!("  {}: {}\n", "Online".cyan(), online.green()));
    }
    out.trim_end().to_string()
}

fn render_ticket(ticket: &Ticket) -> String {
    format!(
        "Support ticket {} opened for {}. We will reply to {}.",
        ticket.id.green().bold(),
        ticket.name,
        ticket.email
    )
}

fn render_missing(intent: Intent, missing: &[Slot]) -> String {
    let fields: Vec<&str> = missing.iter().map(|slot| slot.label()).collect();
    let mut out = format!("To open a {} I still need: {}.", intent.label(), fields.join(", ").yellow());
    if intent == Intent::SupportTicket {
        out.push_str("\nSend everything in one message, e.g. name: Ana; email: ana@example.com; subject: Order; message: ...");
    }
    out
}

/// Text for one turn's outcome. Misses and gaps read as guidance, not errors.
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::BookDetails(book) => render_book(book),
        Outcome::Stores(listing) => render_stores(listing),
        Outcome::TicketOpened(ticket) => render_ticket(ticket),
        Outcome::NotFound { query: Some(query) } => format!(
            "I couldn't find \"{}\" in the catalog. Check the title and try again.",
            query.yellow()
        ),
        Outcome::NotFound { query: None } => format!(
            "Which book do you mean? Name the title, e.g. \"{}\".",
            example_for(Intent::BookDetails).cyan()
        ),
        Outcome::NeedsInput { intent, missing } => render_missing(*intent, missing),
        Outcome::Help => help_text(),
        Outcome::Unavailable { collaborator, .. } => format!(
            "{} The {} is temporarily unavailable, please try again shortly.",
            "Sorry!".red(),
            collaborator
        ),
    }
}

pub fn render_ticket_list(tickets: &[Ticket]) -> String {
    if tickets.is_empty() {
        return "No tickets yet.".to_string();
    }
    tickets
        .iter()
        .map(|t| {
            format!(
                "{}  {}  {} <{}>  {}",
                t.id.green(),
                t.created_at.format("%Y-%m-%d %H:%M:%S"),
                t.name,
                t.email,
                t.subject.bold()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
