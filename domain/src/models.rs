use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::utils::normalize_text;
use std::collections::{BTreeMap, BTreeSet};

/// Availability key listing online retailers rather than a city.
pub const ONLINE_KEY: &str = "Online";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub imprint: String,
    /// Kept verbatim from the catalog (`DD/MM/YYYY`).
    pub release_date: String,
    pub synopsis: String,
    /// City name (or [`ONLINE_KEY`]) to store names.
    #[serde(default)]
    pub availability: BTreeMap<String, Vec<String>>,
}

impl BookRecord {
    pub fn online_stores(&self) -> &[String] {
        self.availability
            .get(ONLINE_KEY)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn physical_locations(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.availability
            .iter()
            .filter(|(location, _)| location.as_str() != ONLINE_KEY)
    }

    /// Split availability into physical stores (optionally narrowed to a city)
    /// and the online list. City matching is case-insensitive containment, so
    /// "paulo" finds "São Paulo".
    pub fn availability_for(&self, city: Option<&str>) -> StoreAvailability {
        let wanted = city.map(normalize_text).filter(|c| !c.is_empty());
        let by_city = self
            .physical_locations()
            .filter(|(location, _)| match &wanted {
                Some(wanted) => normalize_text(location).contains(wanted.as_str()),
                None => true,
            })
            .map(|(location, stores)| (location.clone(), stores.clone()))
            .collect();

        StoreAvailability {
            title: self.title.clone(),
            by_city,
            online: self.online_stores().to_vec(),
        }
    }
}

/// On-disk catalog document: `{"books": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub books: Vec<BookRecord>,
}

impl Catalog {
    /// Case-insensitive title lookup. An exact match wins; otherwise the
    /// first book whose title contains the query or is contained in it.
    pub fn find_title(&self, query: &str) -> Option<&BookRecord> {
        let query = normalize_text(query);
        if query.is_empty() {
            return None;
        }
        let titles: Vec<(String, &BookRecord)> = self
            .books
            .iter()
            .map(|book| (normalize_text(&book.title), book))
            .collect();

        titles
            .iter()
            .find(|(title, _)| *title == query)
            .or_else(|| {
                titles
                    .iter()
                    .find(|(title, _)| title.contains(query.as_str()) || query.contains(title.as_str()))
            })
            .map(|(_, book)| *book)
    }

    pub fn titles(&self) -> Vec<String> {
        self.books.iter().map(|book| book.title.clone()).collect()
    }

    /// Distinct physical locations across every book, sorted.
    pub fn cities(&self) -> Vec<String> {
        let cities: BTreeSet<&String> = self
            .books
            .iter()
            .flat_map(|book| book.physical_locations().map(|(city, _)| city))
            .collect();
        cities.into_iter().cloned().collect()
    }
}

/// Stores carrying one title, as answered by a catalog reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreAvailability {
    pub title: String,
    pub by_city: BTreeMap<String, Vec<String>>,
    pub online: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub status: TicketStatus,
}
