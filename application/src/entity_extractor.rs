//! Rule-based entity extraction with an optional oracle for enrichment.
//!
//! Titles and cities are matched against known names (catalog titles,
//! catalog cities and configured extra cities). Title matching prefers the
//! longest known title found in the text; when nothing known matches, a
//! quoted phrase or the phrase after a cue ("about", "buy", ...) is kept as a
//! candidate so the lookup can report it as not found. Pronouns and generic
//! nouns ("the book", "it online") are left empty for context. Contact fields come
//! from `label: value` pairs plus a few natural phrasings.

use domain::intent::{ContactFields, Entities};
use domain::ports::{CatalogReader, EntityOracle, PortResult};
use regex::Regex;
use shared::utils::{find_phrase, normalize_text};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// Words that may introduce a city: "in São Paulo", "em Curitiba".
const CITY_PREPOSITIONS: [&str; 7] = ["in", "em", "at", "near", "no", "na", "para"];

/// Anaphora that must be resolved from context, never looked up as titles.
const PRONOUN_TITLES: [&str; 14] = [
    "it",
    "this",
    "that",
    "this one",
    "that one",
    "this book",
    "that book",
    "the book",
    "ele",
    "ela",
    "isso",
    "esse",
    "esse livro",
    "este livro",
];

/// Words trailing a cue phrase that qualify the request, not the title.
const TRAILING_QUALIFIERS: [&str; 8] = ["online", "now", "today", "please", "pls", "agora", "hoje", "por favor"];

/// Nouns that stand for "the book" without naming one.
const GENERIC_NOUNS: [&str; 8] = ["book", "books", "copy", "a copy", "one", "livro", "o livro", "exemplar"];

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“]([^"”]{2,})["”]|(?:^|\s)'([^']{2,}?)'(?:$|[\s?.!,])"#).expect("valid quote regex")
});

static CUE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:tell me about|information about|info about|details (?:of|about|on)|about|fale sobre|sobre|detalhes d[oae]|buy|purchase|comprar)\s+(?:the book\s+|the\s+|o livro\s+)?(.+?)\s*[?.!]*\s*$",
    )
    .expect("valid cue regex")
});

static TRAILING_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:in|em|at|from|no|na)\s+.*$").expect("valid location regex"));

static CONTACT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(name|nome|e-?mail|subject|assunto|message|mensagem)\s*[:=]\s*").expect("valid label regex")
});

static NAME_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:my name is|meu nome é|me chamo)\s+(\p{L}[\p{L}'\- ]*?)\s*(?:[,.;]|\band\b|\be\b|$)")
        .expect("valid name regex")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)+").expect("valid email regex")
});

fn longest_known_in<'a>(names: &'a [KnownName], normalized: &str) -> Option<&'a KnownName> {
    names.iter().find(|name| find_phrase(normalized, &name.normalized).is_some())
}

#[derive(Debug, Clone)]
struct KnownName {
    display: String,
    normalized: String,
}

fn known_names<I, S>(names: I) -> Vec<KnownName>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut known: Vec<KnownName> = names
        .into_iter()
        .map(Into::into)
        .map(|display| KnownName {
            normalized: normalize_text(&display),
            display,
        })
        .filter(|name| !name.normalized.is_empty() && seen.insert(name.normalized.clone()))
        .collect();
    // Longest first so "a baleia azul" beats any shorter title inside it.
    known.sort_by(|a, b| b.normalized.len().cmp(&a.normalized.len()));
    known
}

pub struct EntityExtractor {
    titles: Vec<KnownName>,
    cities: Vec<KnownName>,
    oracle: Option<Arc<dyn EntityOracle>>,
}

impl EntityExtractor {
    pub fn new<T, C, S1, S2>(titles: T, cities: C) -> Self
    where
        T: IntoIterator<Item = S1>,
        C: IntoIterator<Item = S2>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            titles: known_names(titles),
            cities: known_names(cities),
            oracle: None,
        }
    }

    /// Build from the catalog's titles and cities plus extra city names.
    pub fn from_catalog(catalog: &dyn CatalogReader, extra_cities: &[String]) -> PortResult<Self> {
        let titles = catalog.titles()?;
        let mut cities = catalog.cities()?;
        cities.extend(extra_cities.iter().cloned());
        debug!(titles = titles.len(), cities = cities.len(), "entity extractor built");
        Ok(Self::new(titles, cities))
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn EntityOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// Pure rule-based extraction.
    pub fn extract(&self, text: &str) -> Entities {
        let normalized = normalize_text(text);
        Entities {
            book_title: self.match_title(text, &normalized),
            city: self.match_city(&normalized),
            contact: extract_contact(text),
        }
    }

    /// Rule-based extraction, then at most one oracle call when no known title
    /// was found. Oracle suggestions are only accepted if they name a known
    /// title or city; an oracle failure leaves the rule-based result unchanged.
    pub async fn extract_with_oracle(&self, text: &str) -> Entities {
        let mut entities = self.extract(text);
        let Some(oracle) = &self.oracle else {
            return entities;
        };
        let has_known_title = entities
            .book_title
            .as_deref()
            .is_some_and(|title| self.canonical_title(title).is_some());
        if has_known_title {
            return entities;
        }

        match oracle.extract_entities(text).await {
            Ok(suggested) => {
                if let Some(title) = suggested.title.as_deref().and_then(|t| self.canonical_title(t)) {
                    entities.book_title = Some(title);
                }
                if entities.city.is_none() {
                    entities.city = suggested.city.as_deref().and_then(|c| self.canonical_city(c));
                }
                debug!(title = ?entities.book_title, city = ?entities.city, "oracle enrichment applied");
            }
            Err(err) => warn!(%err, "entity oracle failed; keeping rule-based entities"),
        }
        entities
    }

    /// Map free text to a known title, if it names one.
    pub fn canonical_title(&self, candidate: &str) -> Option<String> {
        let normalized = normalize_text(candidate);
        self.titles
            .iter()
            .find(|t| t.normalized == normalized)
            .or_else(|| longest_known_in(&self.titles, &normalized))
            .map(|t| t.display.clone())
    }

    pub fn canonical_city(&self, candidate: &str) -> Option<String> {
        let normalized = normalize_text(candidate);
        self.cities
            .iter()
            .find(|c| c.normalized == normalized)
            .map(|c| c.display.clone())
    }

    fn match_title(&self, text: &str, normalized: &str) -> Option<String> {
        if let Some(known) = longest_known_in(&self.titles, normalized) {
            return Some(known.display.clone());
        }

        let candidate = QUOTED
            .captures(text)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().trim().to_string())
            .or_else(|| {
                CUE_PHRASE.captures(text).and_then(|caps| caps.get(1)).map(|m| {
                    let without_location = TRAILING_LOCATION.replace(m.as_str(), "");
                    strip_qualifiers(&without_location).to_string()
                })
            })?;

        let candidate_norm = normalize_text(&candidate);
        let refers_back = PRONOUN_TITLES.contains(&candidate_norm.as_str())
            || GENERIC_NOUNS.contains(&candidate_norm.as_str());
        if candidate_norm.chars().count() <= 2 || refers_back {
            return None;
        }
        Some(self.canonical_title(&candidate).unwrap_or(candidate))
    }

    fn match_city(&self, normalized: &str) -> Option<String> {
        let mut fallback = None;
        for city in &self.cities {
            let Some(pos) = find_phrase(normalized, &city.normalized) else {
                continue;
            };
            let after_preposition = normalized[..pos]
                .split_whitespace()
                .last()
                .is_some_and(|word| CITY_PREPOSITIONS.contains(&word));
            if after_preposition {
                return Some(city.display.clone());
            }
            fallback.get_or_insert_with(|| city.display.clone());
        }
        fallback
    }
}

/// Drop trailing qualifiers such as "online" or "please", repeatedly.
fn strip_qualifiers(candidate: &str) -> &str {
    let mut rest = candidate.trim();
    loop {
        let stripped = TRAILING_QUALIFIERS.iter().find_map(move |qualifier| {
            let start = rest.len().checked_sub(qualifier.len())?;
            let tail = rest.get(start..)?;
            let head = &rest[..start];
            let at_word_boundary = head.is_empty() || head.ends_with(|c: char| c.is_whitespace() || c == ',');
            (tail.eq_ignore_ascii_case(qualifier) && at_word_boundary)
                .then(|| head.trim_end_matches(|c: char| c.is_whitespace() || c == ','))
        });
        match stripped {
            Some(shorter) => rest = shorter,
            None => return rest,
        }
    }
}

fn clean_value(raw: &str) -> Option<String> {
    let value = raw.trim().trim_end_matches([';', ',']).trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn valid_email(raw: &str) -> Option<String> {
    let value = raw.trim().trim_end_matches(['.', ';', ',']);
    EMAIL
        .find(value)
        .filter(|m| m.start() == 0 && m.end() == value.len())
        .map(|m| m.as_str().to_string())
}

/// Contact fields stated in this utterance only.
pub fn extract_contact(text: &str) -> ContactFields {
    let mut contact = ContactFields::default();
    let labels: Vec<_> = CONTACT_LABEL.captures_iter(text).collect();

    for (i, caps) in labels.iter().enumerate() {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = labels
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let raw = &text[whole.end()..end];

        match label.as_str().to_lowercase().as_str() {
            "name" | "nome" => contact.name = clean_value(raw.trim_end_matches('.')),
            "email" | "e-mail" => contact.email = valid_email(raw),
            "subject" | "assunto" => contact.subject = clean_value(raw.trim_end_matches('.')),
            _ => contact.message = clean_value(raw),
        }
    }

    if contact.name.is_none() {
        contact.name = NAME_PHRASE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| clean_value(m.as_str()));
    }
    if contact.email.is_none() {
        contact.email = EMAIL.find(text).map(|m| m.as_str().to_string());
    }
    contact
}
