use domain::outcome::{Outcome, StoreListing};
use domain::ports::CatalogReader;
use std::sync::Arc;
use tracing::debug;

/// Book and store lookups. Misses become [`Outcome::NotFound`]; collaborator
/// failures become [`Outcome::Unavailable`].
pub struct CatalogService {
    catalog: Arc<dyn CatalogReader>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    pub fn reader(&self) -> &dyn CatalogReader {
        self.catalog.as_ref()
    }

    pub fn book_details(&self, title: &str) -> Outcome {
        match self.catalog.lookup_by_title(title) {
            Ok(Some(book)) => Outcome::BookDetails(book),
            Ok(None) => {
                debug!(title, "book not in catalog");
                Outcome::NotFound {
                    query: Some(title.to_string()),
                }
            }
            Err(err) => err.into(),
        }
    }

    /// Stores carrying `title`. With no city every physical location is
    /// listed; a city with no stores falls back to the online list alone.
    pub fn stores(&self, title: &str, city: Option<&str>) -> Outcome {
        match self.catalog.list_availability(title, city) {
            Ok(Some(availability)) => {
                let listing = StoreListing::new(availability, city.map(str::to_string));
                if listing.is_online_fallback() {
                    debug!(title, city, "no physical stores in city; online only");
                }
                Outcome::Stores(listing)
            }
            Ok(None) => Outcome::NotFound {
                query: Some(title.to_string()),
            },
            Err(err) => err.into(),
        }
    }
}
