//! Ordered keyword rules mapping an utterance to an [`Intent`], plus slot
//! filling from session context once the intent is fixed.

use domain::intent::{Entities, Intent, IntentResolution, MissingSlots, Slot, SlotValue};
use domain::session::SessionContext;
use shared::utils::{contains_phrase, normalize_text};
use tracing::debug;

const SUPPORT_KEYWORDS: &[&str] = &[
    "help",
    "ajuda",
    "support",
    "suporte",
    "problem",
    "problema",
    "ticket",
    "complaint",
    "reclamação",
    "reclamacao",
    "issue",
    "pedido",
    "contact",
    "trouble",
    "assistance",
    "refund",
    "reembolso",
];

const STORE_KEYWORDS: &[&str] = &[
    "where",
    "buy",
    "purchase",
    "store",
    "stores",
    "shop",
    "bookstore",
    "selling",
    "sell",
    "sells",
    "comprar",
    "onde",
    "loja",
    "lojas",
    "available",
    "disponível",
];

const DETAILS_KEYWORDS: &[&str] = &[
    "tell me about",
    "about",
    "details",
    "detail",
    "information",
    "info",
    "synopsis",
    "author",
    "summary",
    "describe",
    "what is",
    "sobre",
    "detalhes",
    "sinopse",
    "autor",
    "fale sobre",
];

type Predicate = fn(&str, &Entities) -> bool;

/// One classification rule. `text` handed to the predicate is normalized.
pub struct Rule {
    pub name: &'static str,
    pub intent: Intent,
    predicate: Predicate,
}

impl Rule {
    pub fn matches(&self, normalized: &str, entities: &Entities) -> bool {
        (self.predicate)(normalized, entities)
    }
}

fn any_keyword(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| contains_phrase(normalized, keyword))
}

/// Evaluated top to bottom; the first match wins. Support keywords come
/// first, then store lookup, then book details. A bare contact form only
/// counts when no keyword matched.
pub const RULES: [Rule; 5] = [
    Rule {
        name: "support-keyword",
        intent: Intent::SupportTicket,
        predicate: |text, _| any_keyword(text, SUPPORT_KEYWORDS),
    },
    Rule {
        name: "store-keyword",
        intent: Intent::StoreLookup,
        predicate: |text, _| any_keyword(text, STORE_KEYWORDS),
    },
    Rule {
        name: "details-keyword",
        intent: Intent::BookDetails,
        predicate: |text, _| any_keyword(text, DETAILS_KEYWORDS),
    },
    Rule {
        name: "contact-form",
        intent: Intent::SupportTicket,
        predicate: |_, entities| entities.contact.present_count() >= 2,
    },
    Rule {
        name: "bare-title",
        intent: Intent::BookDetails,
        predicate: |_, entities| entities.book_title.is_some(),
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Pick the intent from the utterance and its own entities. Session
    /// context is deliberately not an input here.
    pub fn classify(&self, text: &str, entities: &Entities) -> Intent {
        let normalized = normalize_text(text);
        match RULES.iter().find(|rule| rule.matches(&normalized, entities)) {
            Some(rule) => {
                debug!(rule = rule.name, intent = %rule.intent, "intent classified");
                rule.intent
            }
            None => Intent::Unknown,
        }
    }

    /// Classify, then fill slots. Only the title may come from context, and
    /// only for the book intents; city and contact fields must be stated in
    /// this utterance.
    pub fn resolve(&self, text: &str, entities: &Entities, context: &SessionContext) -> IntentResolution {
        let intent = self.classify(text, entities);
        let mut missing = MissingSlots::new();

        let (title, city, contact) = match intent {
            Intent::BookDetails | Intent::StoreLookup => {
                let title = entities
                    .book_title
                    .clone()
                    .map(SlotValue::extracted)
                    .or_else(|| context.current_book.clone().map(SlotValue::from_context));
                if title.is_none() {
                    missing.push(Slot::Title);
                }
                let city = match intent {
                    Intent::StoreLookup => entities.city.clone().map(SlotValue::extracted),
                    _ => None,
                };
                (title, city, Default::default())
            }
            Intent::SupportTicket => {
                missing = entities.contact.missing();
                (None, None, entities.contact.clone())
            }
            Intent::Unknown => (None, None, Default::default()),
        };

        IntentResolution {
            intent,
            title,
            city,
            contact,
            missing,
        }
    }
}
