// Static seed document for the metric synthesizer
use crate::domain::metrics::MetricSnapshot;
use anyhow::{Context, Result};
use std::path::Path;

/// Read the seed records and return the first one, if any
pub async fn load_seed(path: impl AsRef<Path>) -> Result<Option<MetricSnapshot>> {
    let path = path.as_ref();
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read seed data {}", path.display()))?;
    let records: Vec<MetricSnapshot> = serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to parse seed data {}", path.display()))?;

    tracing::info!("Loaded {} seed records from {}", records.len(), path.display());
    Ok(records.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loads_bundled_seed() {
        let seed = load_seed("data/hourly_time_series.json").await.unwrap().unwrap();
        assert_eq!(seed.kpis.total_units, 1_000_000.0);
        assert_eq!(seed.shareholding.promoter, 5.0);
    }

    #[tokio::test]
    async fn test_empty_document_has_no_seed() {
        let path = std::env::temp_dir().join(format!("seed-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "[]").await.unwrap();

        assert!(load_seed(&path).await.unwrap().is_none());
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        assert!(load_seed("data/does-not-exist.json").await.is_err());
    }
}
