use crate::render::{help_text, render_outcome, render_ticket_list};
use anyhow::Context;
use application::router::{Router, TurnResult};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use infrastructure::config::Config;
use infrastructure::json_catalog::JsonCatalog;
use infrastructure::ollama_oracle::OllamaOracle;
use infrastructure::open_ticket_sink;
use shared::prompt::{ask_chat_turn, is_exit_command};
use shared::telemetry::Verbosity;
use shared::types::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Turns shown by the `history` chat command.
const HISTORY_WINDOW: usize = 5;

#[derive(Parser)]
#[command(name = "bookdesk")]
#[command(about = "Ask about books, find stores and open support tickets")]
pub struct Cli {
    /// Catalog JSON file (overrides CATALOG_PATH)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Ticket store; .db or .sqlite selects SQLite (overrides TICKETS_PATH)
    #[arg(long, global = true)]
    pub tickets: Option<PathBuf>,

    /// Minutes of inactivity before a session expires
    #[arg(long, global = true)]
    pub ttl_minutes: Option<i64>,

    /// Consult the local language model for entities
    #[arg(long, global = true)]
    pub llm: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a single message
    Ask {
        /// Session id from a previous answer
        #[arg(long)]
        session: Option<String>,

        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Interactive conversation
    Chat {
        #[arg(long)]
        session: Option<String>,
    },
    /// List stored support tickets
    Tickets,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    /// Flags win over the environment.
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(path) = &self.catalog {
            config.catalog_path = path.clone();
        }
        if let Some(path) = &self.tickets {
            config.tickets_path = path.clone();
        }
        if let Some(minutes) = self.ttl_minutes {
            config.session_ttl_minutes = minutes;
        }
        if self.llm {
            config.llm.enabled = true;
        }
        config
    }
}

pub struct CliApp {
    router: Router,
}

impl CliApp {
    pub fn new(config: &Config) -> Result<Self> {
        anyhow::ensure!(config.session_ttl_minutes > 0, "session TTL must be positive");

        let catalog = Arc::new(JsonCatalog::open(&config.catalog_path)?);
        let tickets = open_ticket_sink(&config.tickets_path)?;

        let mut builder = Router::builder(catalog, tickets)
            .with_ttl(Duration::minutes(config.session_ttl_minutes))
            .with_extra_cities(config.known_cities.iter().cloned());
        if config.llm.enabled {
            info!(model = %config.llm.model, "entity oracle enabled");
            builder = builder.with_oracle(Arc::new(OllamaOracle::new(&config.llm)?));
        }
        let router = builder.build().context("building router")?;

        Ok(Self { router })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Ask { session, text } => {
                let result = self.router.process(&text.join(" "), session.as_deref()).await;
                print_turn(&result);
            }
            Command::Chat { session } => self.chat(session).await?,
            Command::Tickets => {
                let tickets = self.router.tickets().list()?;
                println!("{}", render_ticket_list(&tickets));
            }
        }
        Ok(())
    }

    async fn chat(&mut self, mut session: Option<String>) -> Result<()> {
        println!("{}", help_text());
        loop {
            let input = ask_chat_turn("You")?;
            if is_exit_command(&input) {
                println!("{}", "Bye!".green());
                break;
            }
            if input.trim().is_empty() {
                continue;
            }
            if input.trim().eq_ignore_ascii_case("history") {
                self.print_history(session.as_deref());
                continue;
            }

            let swept = self.router.sessions().sweep_expired(Utc::now());
            if swept > 0 {
                info!(swept, "expired sessions removed");
            }

            let result = self.router.process(&input, session.as_deref()).await;
            println!("{}\n", render_outcome(&result.outcome));
            session = Some(result.session_id);
        }
        Ok(())
    }

    fn print_history(&self, session: Option<&str>) {
        let context = session.and_then(|id| self.router.sessions().get(id, Utc::now()));
        let Some(context) = context else {
            println!("{}", "No conversation yet.".yellow());
            return;
        };
        for turn in context.recent(HISTORY_WINDOW) {
            println!(
                "{}  {}  {}",
                turn.at.format("%H:%M:%S").to_string().dimmed(),
                turn.intent.label().cyan(),
                turn.utterance
            );
        }
    }
}

fn print_turn(result: &TurnResult) {
    println!("{}", render_outcome(&result.outcome));
    println!("{}", format!("session: {}", result.session_id).dimmed());
}
