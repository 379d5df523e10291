use anyhow::Context;
use domain::models::{BookRecord, Catalog};
use domain::ports::{CatalogReader, PortResult};
use shared::types::Result;
use std::fs;
use std::path::Path;
use tracing::info;

/// Catalog read once from a `{"books": [...]}` JSON document and kept in
/// memory for the life of the process.
pub struct JsonCatalog {
    catalog: Catalog,
}

fn read_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading catalog {}", path.display()))?;
    let catalog: Catalog =
        serde_json::from_str(&raw).with_context(|| format!("parsing catalog {}", path.display()))?;
    Ok(catalog)
}

impl JsonCatalog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let catalog = read_catalog(path)?;
        info!(path = %path.display(), books = catalog.books.len(), "catalog loaded");
        Ok(Self { catalog })
    }
}

impl CatalogReader for JsonCatalog {
    fn lookup_by_title(&self, query: &str) -> PortResult<Option<BookRecord>> {
        Ok(self.catalog.find_title(query).cloned())
    }

    fn titles(&self) -> PortResult<Vec<String>> {
        Ok(self.catalog.titles())
    }

    fn cities(&self) -> PortResult<Vec<String>> {
        Ok(self.catalog.cities())
    }
}
