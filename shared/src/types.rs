/// Result alias used at application edges (configuration, storage setup, CLI).
pub type Result<T> = anyhow::Result<T>;
