// Polygon store - Working polygons, the saved subset, selection and visibility
use crate::domain::errors::DomainError;
use crate::domain::polygon::{ColorRule, ColorRuleDraft, Polygon, PolygonDraft, PolygonUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named, serializable changes to [`PolygonState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PolygonIntent {
    Add { draft: PolygonDraft },
    Remove { id: String },
    Select { id: Option<String> },
    SetDrawing { drawing: bool },
    Update { id: String, update: PolygonUpdate },
    AddRule { polygon_id: String, rule: ColorRuleDraft },
    RemoveRule { polygon_id: String, rule_id: String },
    ToggleVisibility { id: String },
    Save { id: String },
    SaveAll,
    ClearUnsaved,
    ClearAll,
}

/// What the caller must do after an intent was applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    /// The saved list changed and must be written back to storage
    pub persist: bool,
    /// Polygon whose weather inputs changed
    pub refetch: Option<String>,
    /// Polygon that was removed
    pub removed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonState {
    pub polygons: Vec<Polygon>,
    pub saved_polygons: Vec<Polygon>,
    pub selected_polygon: Option<String>,
    pub is_drawing: bool,
    pub hidden_polygons: Vec<String>,
}

impl PolygonState {
    /// Start from previously saved polygons; they are shown as working copies too
    pub fn hydrated(saved: Vec<Polygon>) -> Self {
        let mut state = Self::default();
        state.load_saved(saved);
        state
    }

    pub fn find(&self, id: &str) -> Option<&Polygon> {
        self.polygons.iter().find(|p| p.id == id)
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden_polygons.iter().any(|h| h == id)
    }

    /// Merge `saved` into the store without duplicating working polygons
    pub fn load_saved(&mut self, saved: Vec<Polygon>) {
        for polygon in &saved {
            if self.find(&polygon.id).is_none() {
                self.polygons.push(polygon.clone());
            }
        }
        self.saved_polygons = saved;
    }

    pub fn apply(&mut self, intent: PolygonIntent, now: DateTime<Utc>) -> Result<Applied, DomainError> {
        match intent {
            PolygonIntent::Add { draft } => self.add(draft, now),
            PolygonIntent::Remove { id } => self.remove(&id),
            PolygonIntent::Select { id } => {
                self.selected_polygon = id;
                Ok(Applied::default())
            }
            PolygonIntent::SetDrawing { drawing } => {
                self.is_drawing = drawing;
                Ok(Applied::default())
            }
            PolygonIntent::Update { id, update } => self.update(&id, update, now),
            PolygonIntent::AddRule { polygon_id, rule } => {
                self.add_rule(&polygon_id, rule, now)
            }
            PolygonIntent::RemoveRule { polygon_id, rule_id } => {
                self.remove_rule(&polygon_id, &rule_id, now)
            }
            PolygonIntent::ToggleVisibility { id } => {
                if self.is_hidden(&id) {
                    self.hidden_polygons.retain(|h| h != &id);
                } else {
                    self.hidden_polygons.push(id);
                }
                Ok(Applied::default())
            }
            PolygonIntent::Save { id } => self.save(&id, now),
            PolygonIntent::SaveAll => {
                let ids: Vec<String> = self.polygons.iter().map(|p| p.id.clone()).collect();
                for id in &ids {
                    self.save(id, now)?;
                }
                Ok(Applied {
                    persist: true,
                    ..Default::default()
                })
            }
            PolygonIntent::ClearUnsaved => {
                let saved = &self.saved_polygons;
                self.polygons
                    .retain(|p| saved.iter().any(|s| s.id == p.id));
                Ok(Applied::default())
            }
            PolygonIntent::ClearAll => {
                *self = Self::default();
                Ok(Applied {
                    persist: true,
                    ..Default::default()
                })
            }
        }
    }

    fn add(&mut self, draft: PolygonDraft, now: DateTime<Utc>) -> Result<Applied, DomainError> {
        draft.geo_json.validate()?;

        let polygon = Polygon {
            id: format!("polygon_{}", Uuid::new_v4().simple()),
            name: draft.name,
            geo_json: draft.geo_json,
            color: draft.color,
            data_source: draft.data_source,
            color_rules: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let id = polygon.id.clone();
        self.polygons.push(polygon);
        self.is_drawing = false;

        Ok(Applied {
            refetch: Some(id),
            ..Default::default()
        })
    }

    fn remove(&mut self, id: &str) -> Result<Applied, DomainError> {
        let known = self.find(id).is_some() || self.saved_polygons.iter().any(|p| p.id == id);
        if !known {
            return Err(DomainError::PolygonNotFound { id: id.to_string() });
        }

        self.polygons.retain(|p| p.id != id);
        self.saved_polygons.retain(|p| p.id != id);
        if self.selected_polygon.as_deref() == Some(id) {
            self.selected_polygon = None;
        }
        self.hidden_polygons.retain(|h| h != id);

        Ok(Applied {
            persist: true,
            removed: Some(id.to_string()),
            ..Default::default()
        })
    }

    fn update(&mut self, id: &str, update: PolygonUpdate, now: DateTime<Utc>) -> Result<Applied, DomainError> {
        if let Some(geo_json) = &update.geo_json {
            geo_json.validate()?;
        }

        let working = self.polygons.iter_mut().find(|p| p.id == id);
        let found = working.is_some();
        if let Some(polygon) = working {
            polygon.apply(&update, now);
        }

        let saved = self.saved_polygons.iter_mut().find(|p| p.id == id);
        let persist = saved.is_some();
        if let Some(polygon) = saved {
            polygon.apply(&update, now);
        }

        if !found && !persist {
            return Err(DomainError::PolygonNotFound { id: id.to_string() });
        }

        Ok(Applied {
            persist,
            refetch: update.affects_weather().then(|| id.to_string()),
            ..Default::default()
        })
    }

    fn add_rule(
        &mut self,
        polygon_id: &str,
        draft: ColorRuleDraft,
        now: DateTime<Utc>,
    ) -> Result<Applied, DomainError> {
        let rule = ColorRule {
            id: format!("rule_{}", Uuid::new_v4().simple()),
            operator: draft.operator,
            value: draft.value,
            color: draft.color,
        };
        self.each_copy(polygon_id, |polygon| {
            polygon.color_rules.push(rule.clone());
            polygon.updated_at = now;
        })
    }

    fn remove_rule(
        &mut self,
        polygon_id: &str,
        rule_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Applied, DomainError> {
        let exists = self
            .find(polygon_id)
            .is_some_and(|p| p.color_rules.iter().any(|r| r.id == rule_id));
        if !exists {
            return Err(DomainError::RuleNotFound {
                polygon_id: polygon_id.to_string(),
                rule_id: rule_id.to_string(),
            });
        }
        self.each_copy(polygon_id, |polygon| {
            polygon.color_rules.retain(|r| r.id != rule_id);
            polygon.updated_at = now;
        })
    }

    /// Run `f` on the working and saved copies of a polygon
    fn each_copy<F>(&mut self, id: &str, mut f: F) -> Result<Applied, DomainError>
    where
        F: FnMut(&mut Polygon),
    {
        let mut found = false;
        if let Some(polygon) = self.polygons.iter_mut().find(|p| p.id == id) {
            f(polygon);
            found = true;
        }

        let mut persist = false;
        if let Some(polygon) = self.saved_polygons.iter_mut().find(|p| p.id == id) {
            f(polygon);
            persist = true;
        }

        if !found && !persist {
            return Err(DomainError::PolygonNotFound { id: id.to_string() });
        }
        Ok(Applied {
            persist,
            ..Default::default()
        })
    }

    fn save(&mut self, id: &str, now: DateTime<Utc>) -> Result<Applied, DomainError> {
        let mut copy = self
            .find(id)
            .cloned()
            .ok_or_else(|| DomainError::PolygonNotFound { id: id.to_string() })?;
        copy.updated_at = now;

        match self.saved_polygons.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = copy,
            None => self.saved_polygons.push(copy),
        }

        Ok(Applied {
            persist: true,
            ..Default::default()
        })
    }
}
