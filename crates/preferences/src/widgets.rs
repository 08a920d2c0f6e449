use crate::catalog::{self, WidgetDescriptor};
use crate::error::PreferenceError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_enabled() -> bool {
    true
}

fn default_order() -> i32 {
    999
}

/// Whether a widget is shown and where it sits on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSetting {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_order")]
    pub order: i32,
}

impl WidgetSetting {
    pub fn new(enabled: bool, order: i32) -> Self {
        Self { enabled, order }
    }
}

/// The immutable layout every user starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDefaults {
    widgets: IndexMap<String, WidgetSetting>,
}

impl WidgetDefaults {
    pub fn new<I, S>(widgets: I) -> Self
    where
        I: IntoIterator<Item = (S, WidgetSetting)>,
        S: Into<String>,
    {
        Self {
            widgets: widgets.into_iter().map(|(id, s)| (id.into(), s)).collect(),
        }
    }

    /// The six built-in widgets, all enabled, ordered 1 through 6.
    pub fn standard() -> Self {
        Self::new(
            catalog::CATALOG
                .iter()
                .enumerate()
                .map(|(index, (id, _))| (*id, WidgetSetting::new(true, index as i32 + 1))),
        )
    }

    pub fn get(&self, widget_id: &str) -> Option<WidgetSetting> {
        self.widgets.get(widget_id).copied()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.widgets).unwrap_or(Value::Null)
    }
}

impl Default for WidgetDefaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// A partial widget configuration as submitted by a client.
///
/// Entries may omit `enabled` (defaults to true) or `order` (defaults to 999).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetUpdate {
    entries: IndexMap<String, WidgetSetting>,
}

impl WidgetUpdate {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, WidgetSetting)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(id, s)| (id.into(), s)).collect(),
        }
    }

    /// Parses a `{"widgets": {id: {enabled, order}}}` payload.
    ///
    /// A missing `widgets` key is an empty update. Anything of the wrong shape is rejected.
    pub fn from_payload(payload: &Value) -> Result<Self, PreferenceError> {
        let Some(root) = payload.as_object() else {
            return Err(PreferenceError::InvalidPayload("expected a JSON object".to_string()));
        };
        let Some(widgets) = root.get("widgets") else {
            return Ok(Self::default());
        };
        let Some(widgets) = widgets.as_object() else {
            return Err(PreferenceError::InvalidPayload("'widgets' must be an object".to_string()));
        };

        let mut entries = IndexMap::with_capacity(widgets.len());
        for (id, raw) in widgets {
            let setting: WidgetSetting = serde_json::from_value(raw.clone())
                .map_err(|e| PreferenceError::InvalidPayload(format!("widget '{}': {}", id, e)))?;
            entries.insert(id.clone(), setting);
        }
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A user's current widget configuration, backed by the defaults it was created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetLayout {
    widgets: IndexMap<String, WidgetSetting>,
    defaults: WidgetDefaults,
}

impl WidgetLayout {
    pub fn from_defaults(defaults: WidgetDefaults) -> Self {
        Self {
            widgets: defaults.widgets.clone(),
            defaults,
        }
    }

    /// Rebuilds a layout from stored JSON.
    ///
    /// A missing, non-object or empty value yields the defaults. Individual entries
    /// that fail to decode are dropped; lookups for them then fall back to the defaults.
    pub fn from_stored(stored: Option<&Value>, defaults: WidgetDefaults) -> Self {
        let Some(map) = stored.and_then(Value::as_object) else {
            if stored.is_some_and(|v| !v.is_null()) {
                tracing::warn!("Stored dashboard widget configuration is not an object, using defaults.");
            }
            return Self::from_defaults(defaults);
        };

        let mut widgets = IndexMap::with_capacity(map.len());
        for (id, raw) in map {
            match serde_json::from_value::<WidgetSetting>(raw.clone()) {
                Ok(setting) => {
                    widgets.insert(id.clone(), setting);
                }
                Err(e) => {
                    tracing::warn!(widget = %id, error = %e, "Skipping undecodable widget entry.");
                }
            }
        }

        if widgets.is_empty() {
            return Self::from_defaults(defaults);
        }
        Self { widgets, defaults }
    }

    pub fn widgets(&self) -> &IndexMap<String, WidgetSetting> {
        &self.widgets
    }

    /// Looks `widget_id` up in the current map, then in the defaults; unknown ids are enabled.
    pub fn is_enabled(&self, widget_id: &str) -> bool {
        self.widgets
            .get(widget_id)
            .copied()
            .or_else(|| self.defaults.get(widget_id))
            .map(|s| s.enabled)
            .unwrap_or(true)
    }

    /// Ids of the enabled widgets, ascending by `order`.
    ///
    /// The sort is stable, so widgets sharing an `order` keep map order. For a
    /// layout decoded from storage that is the key order of the stored JSON
    /// object, which is alphabetical rather than the order the widgets were saved in.
    pub fn ordered_enabled_widgets(&self) -> Vec<&str> {
        let mut enabled: Vec<(&str, i32)> = self
            .widgets
            .iter()
            .filter(|(_, s)| s.enabled)
            .map(|(id, s)| (id.as_str(), s.order))
            .collect();
        enabled.sort_by_key(|(_, order)| *order);
        enabled.into_iter().map(|(id, _)| id).collect()
    }

    /// Merges `update` into the layout and returns the ids it ignored.
    ///
    /// Only widgets already present are touched; the update cannot add new ones.
    pub fn apply_update(&mut self, update: &WidgetUpdate) -> Vec<String> {
        let mut ignored = Vec::new();
        for (id, setting) in &update.entries {
            match self.widgets.get_mut(id) {
                Some(current) => *current = *setting,
                None => ignored.push(id.clone()),
            }
        }
        ignored
    }

    pub fn reset(&mut self) {
        self.widgets = self.defaults.widgets.clone();
    }

    /// Every configured widget with its display metadata, ascending by `order`.
    pub fn settings(&self) -> Vec<WidgetDescriptor> {
        let mut rows: Vec<WidgetDescriptor> = self
            .widgets
            .iter()
            .map(|(id, setting)| {
                let (name, description) = catalog::describe(id);
                WidgetDescriptor {
                    id: id.clone(),
                    name,
                    description,
                    enabled: setting.enabled,
                    order: setting.order,
                }
            })
            .collect();
        rows.sort_by_key(|row| row.order);
        rows
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.widgets).unwrap_or(Value::Null)
    }
}
