// User-drawn polygon domain models
use super::errors::DomainError;
use super::geometry::{centroid, LngLat};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smallest closed ring: a triangle plus its closing vertex
pub const MIN_RING_VERTICES: usize = 4;

/// GeoJSON `Polygon` geometry. Only the outer ring is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    #[serde(rename = "type", default = "GeoPolygon::kind")]
    pub kind: String,
    pub coordinates: Vec<Vec<LngLat>>,
}

impl GeoPolygon {
    fn kind() -> String {
        "Polygon".to_string()
    }

    /// Close an open list of drawn vertices into a ring
    pub fn from_drawn_vertices(mut vertices: Vec<LngLat>) -> Self {
        if let Some(first) = vertices.first().copied() {
            vertices.push(first);
        }
        Self {
            kind: Self::kind(),
            coordinates: vec![vertices],
        }
    }

    pub fn outer_ring(&self) -> &[LngLat] {
        self.coordinates.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// A valid ring has at least four vertices and ends where it starts
    pub fn validate(&self) -> Result<(), DomainError> {
        let ring = self.outer_ring();
        let closed = ring.first() == ring.last();
        if ring.len() < MIN_RING_VERTICES || !closed {
            return Err(DomainError::InvalidRing {
                vertices: ring.len(),
            });
        }
        Ok(())
    }

    pub fn centroid(&self) -> Result<LngLat, DomainError> {
        centroid(self.outer_ring())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
}

impl ComparisonOperator {
    pub fn matches(&self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOperator::GreaterThan => value > threshold,
            ComparisonOperator::LessThan => value < threshold,
        }
    }
}

/// Single threshold predicate with the fill color it selects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRule {
    pub id: String,
    pub operator: ComparisonOperator,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    pub id: String,
    pub name: String,
    pub geo_json: GeoPolygon,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(default)]
    pub color_rules: Vec<ColorRule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a drawing gesture completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonDraft {
    pub name: String,
    pub geo_json: GeoPolygon,
    pub color: String,
    #[serde(default)]
    pub data_source: Option<String>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geo_json: Option<GeoPolygon>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
}

impl PolygonUpdate {
    /// Whether the update changes what weather data the polygon needs
    pub fn affects_weather(&self) -> bool {
        self.geo_json.is_some() || self.data_source.is_some()
    }
}

/// Rule fields supplied by the user; the id is assigned on insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRuleDraft {
    pub operator: ComparisonOperator,
    pub value: f64,
    pub color: String,
}

impl Polygon {
    pub fn apply(&mut self, update: &PolygonUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(geo_json) = &update.geo_json {
            self.geo_json = geo_json.clone();
        }
        if let Some(color) = &update.color {
            self.color = color.clone();
        }
        if let Some(data_source) = &update.data_source {
            self.data_source = Some(data_source.clone());
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn square() -> GeoPolygon {
        GeoPolygon::from_drawn_vertices(vec![
            LngLat(88.43, 22.70),
            LngLat(88.45, 22.70),
            LngLat(88.45, 22.72),
            LngLat(88.43, 22.72),
        ])
    }

    #[test]
    fn test_drawn_vertices_are_closed() {
        let geo = square();
        let ring = geo.outer_ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert!(geo.validate().is_ok());
    }

    #[test]
    fn test_short_ring_rejected() {
        let geo = GeoPolygon::from_drawn_vertices(vec![LngLat(0.0, 0.0), LngLat(1.0, 1.0)]);
        assert_eq!(geo.validate(), Err(DomainError::InvalidRing { vertices: 3 }));
    }

    #[test]
    fn test_open_ring_rejected() {
        let geo = GeoPolygon {
            kind: "Polygon".to_string(),
            coordinates: vec![vec![
                LngLat(0.0, 0.0),
                LngLat(1.0, 0.0),
                LngLat(1.0, 1.0),
                LngLat(0.0, 1.0),
            ]],
        };
        assert!(geo.validate().is_err());
    }

    #[test]
    fn test_geojson_shape() {
        let json = serde_json::to_value(square()).unwrap();
        assert_eq!(json["type"], "Polygon");
        assert_eq!(json["coordinates"][0][0][0], 88.43);
    }

    #[test]
    fn test_operator_wire_format() {
        let rule: ColorRule =
            serde_json::from_str(r##"{"id":"r1","operator":">","value":20,"color":"#FF0000"}"##)
                .unwrap();
        assert_eq!(rule.operator, ComparisonOperator::GreaterThan);
        assert!(rule.operator.matches(21.0, 20.0));
        assert!(!rule.operator.matches(20.0, 20.0));
    }

    #[test]
    fn test_apply_update() {
        let t0 = Utc.with_ymd_and_hms(2024, 12, 16, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 12, 16, 13, 0, 0).unwrap();
        let mut polygon = Polygon {
            id: "polygon_1".to_string(),
            name: "Plant A".to_string(),
            geo_json: square(),
            color: "#3B82F6".to_string(),
            data_source: None,
            color_rules: vec![],
            created_at: t0,
            updated_at: t0,
        };

        let update = PolygonUpdate {
            name: Some("Plant B".to_string()),
            data_source: Some("precipitation".to_string()),
            ..Default::default()
        };
        assert!(update.affects_weather());
        polygon.apply(&update, t1);

        assert_eq!(polygon.name, "Plant B");
        assert_eq!(polygon.data_source.as_deref(), Some("precipitation"));
        assert_eq!(polygon.color, "#3B82F6");
        assert_eq!(polygon.updated_at, t1);
    }
}
