pub mod catalog_service;
pub mod entity_extractor;
pub mod intent_classifier;
pub mod router;
pub mod session_store;
pub mod ticket_service;

#[cfg(test)]
pub(crate) mod test_support;
