// Repository trait for saved polygon persistence
use crate::domain::polygon::Polygon;
use async_trait::async_trait;

#[async_trait]
pub trait PolygonRepository: Send + Sync {
    /// Read the saved polygons; polygons with malformed rings are dropped
    async fn load_saved(&self) -> anyhow::Result<Vec<Polygon>>;

    /// Overwrite the saved polygons wholesale
    async fn store_saved(&self, polygons: &[Polygon]) -> anyhow::Result<()>;

    /// Remove the saved polygons entirely
    async fn clear(&self) -> anyhow::Result<()>;
}
