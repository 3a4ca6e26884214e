// JSON key-value file holding the saved polygons under one key
use crate::application::polygon_repository::PolygonRepository;
use crate::domain::polygon::Polygon;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    key: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    async fn read_entries(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };
        if raw.is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let body = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

#[async_trait]
impl PolygonRepository for JsonFileStore {
    async fn load_saved(&self) -> Result<Vec<Polygon>> {
        let entries = self.read_entries().await?;
        let Some(value) = entries.get(&self.key) else {
            return Ok(Vec::new());
        };

        let stored: Vec<Polygon> = serde_json::from_value(value.clone())
            .with_context(|| format!("Malformed polygons under '{}'", self.key))?;
        let total = stored.len();

        let polygons: Vec<Polygon> = stored
            .into_iter()
            .filter(|p| match p.geo_json.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Skipping saved polygon {}: {}", p.id, e);
                    false
                }
            })
            .collect();

        tracing::debug!("Loaded {}/{} saved polygons", polygons.len(), total);
        Ok(polygons)
    }

    async fn store_saved(&self, polygons: &[Polygon]) -> Result<()> {
        let mut entries = self.read_entries().await?;
        entries.insert(self.key.clone(), serde_json::to_value(polygons)?);
        self.write_entries(&entries).await
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.read_entries().await?;
        if entries.remove(&self.key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::LngLat;
    use crate::domain::polygon::tests::square;
    use crate::domain::polygon::{ColorRule, ComparisonOperator, GeoPolygon};
    use chrono::Utc;

    fn temp_store() -> JsonFileStore {
        let path = std::env::temp_dir().join(format!("polygons-{}.json", uuid::Uuid::new_v4()));
        JsonFileStore::new(path, "saved-polygons")
    }

    fn polygon(id: &str, geo_json: GeoPolygon) -> Polygon {
        Polygon {
            id: id.to_string(),
            name: "Plant A".to_string(),
            geo_json,
            color: "#3B82F6".to_string(),
            data_source: Some("precipitation".to_string()),
            color_rules: vec![ColorRule {
                id: "rule_1".to_string(),
                operator: ComparisonOperator::GreaterThan,
                value: 20.0,
                color: "#FF0000".to_string(),
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let store = temp_store();
        assert!(store.load_saved().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let store = temp_store();
        let saved = vec![polygon("polygon_a", square())];
        store.store_saved(&saved).await.unwrap();

        assert_eq!(store.load_saved().await.unwrap(), saved);
        tokio::fs::remove_file(&store.path).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_rings_are_filtered() {
        let store = temp_store();
        let open_ring = GeoPolygon {
            kind: "Polygon".to_string(),
            coordinates: vec![vec![LngLat(0.0, 0.0), LngLat(1.0, 0.0), LngLat(1.0, 1.0)]],
        };
        store
            .store_saved(&[polygon("polygon_a", square()), polygon("polygon_b", open_ring)])
            .await
            .unwrap();

        let loaded = store.load_saved().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "polygon_a");
        tokio::fs::remove_file(&store.path).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_keeps_other_keys() {
        let store = temp_store();
        tokio::fs::write(&store.path, r#"{"theme":"dark"}"#).await.unwrap();
        store.store_saved(&[polygon("polygon_a", square())]).await.unwrap();

        store.clear().await.unwrap();

        let raw = tokio::fs::read(&store.path).await.unwrap();
        let entries: Map<String, Value> = serde_json::from_slice(&raw).unwrap();
        assert!(!entries.contains_key("saved-polygons"));
        assert_eq!(entries["theme"], "dark");
        tokio::fs::remove_file(&store.path).await.unwrap();
    }
}
