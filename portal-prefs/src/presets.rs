use std::collections::HashSet;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Preferences;
use crate::schema::{
    BORDER_RADIUS_RANGE, ColorScheme, HeaderStyle, HexColor, SidebarStyle,
};

/// Persisted key holding the whole catalog as one JSON array.
pub const CATALOG_STORAGE_KEY: &str = "dashboard-saved-themes";

/// Identifier of a saved theme preset.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PresetId(String);

impl PresetId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh preset identifiers.
pub trait PresetIdGenerator {
    fn next_id(&mut self) -> PresetId;
}

/// Random v4 identifiers.
#[derive(Debug, Default)]
pub struct UuidIds;

impl PresetIdGenerator for UuidIds {
    fn next_id(&mut self) -> PresetId {
        PresetId::new(Uuid::new_v4().to_string())
    }
}

/// `theme-1`, `theme-2`, ... in call order.
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: u64,
}

impl PresetIdGenerator for SequentialIds {
    fn next_id(&mut self) -> PresetId {
        self.issued += 1;
        PresetId::new(format!("theme-{}", self.issued))
    }
}

/// Named, immutable snapshot of the theme-defining settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetTheme {
    id: PresetId,
    name: String,
    color_scheme: ColorScheme,
    accent_color: HexColor,
    border_radius: u32,
    sidebar_style: SidebarStyle,
    header_style: HeaderStyle,
    #[serde(default)]
    created_at: u64,
}

impl PresetTheme {
    pub(crate) fn capture(
        id: PresetId,
        name: String,
        preferences: &Preferences,
    ) -> Self {
        Self {
            id,
            name,
            color_scheme: preferences.color_scheme(),
            accent_color: preferences.accent_color().clone(),
            border_radius: preferences.border_radius(),
            sidebar_style: preferences.sidebar_style(),
            header_style: preferences.header_style(),
            created_at: unix_millis(),
        }
    }

    pub fn id(&self) -> &PresetId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub fn accent_color(&self) -> &HexColor {
        &self.accent_color
    }

    pub fn border_radius(&self) -> u32 {
        self.border_radius
    }

    pub fn sidebar_style(&self) -> SidebarStyle {
        self.sidebar_style
    }

    pub fn header_style(&self) -> HeaderStyle {
        self.header_style
    }

    /// Milliseconds since the Unix epoch; `0` for entries saved without it.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.id.as_str().is_empty()
            && BORDER_RADIUS_RANGE.contains(&self.border_radius)
    }
}

/// Ordered preset catalog; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetCatalog {
    themes: Vec<PresetTheme>,
}

impl PresetCatalog {
    pub fn themes(&self) -> &[PresetTheme] {
        &self.themes
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn find(&self, id: &PresetId) -> Option<&PresetTheme> {
        self.themes.iter().find(|theme| &theme.id == id)
    }

    pub fn contains(&self, id: &PresetId) -> bool {
        self.find(id).is_some()
    }

    pub(crate) fn push(&mut self, theme: PresetTheme) {
        self.themes.push(theme);
    }

    pub(crate) fn remove(&mut self, id: &PresetId) -> Option<PresetTheme> {
        let index = self.themes.iter().position(|theme| &theme.id == id)?;
        Some(self.themes.remove(index))
    }

    pub(crate) fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.themes)
    }

    /// Decode a persisted catalog. Malformed entries and repeated ids are
    /// dropped; a payload that is not an array yields an empty catalog.
    pub(crate) fn from_json(payload: &str) -> Self {
        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(
            payload,
        ) {
            Ok(entries) => entries,
            Err(err) => {
                log::debug!("saved themes unreadable, starting empty: {err}");
                return Self::default();
            },
        };

        let mut seen = HashSet::new();
        let mut themes = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<PresetTheme>(entry) {
                Ok(theme) if theme.is_valid() => {
                    if seen.insert(theme.id.clone()) {
                        themes.push(theme);
                    } else {
                        log::warn!(
                            "dropping duplicate saved theme {}",
                            theme.id
                        );
                    }
                },
                Ok(theme) => {
                    log::debug!("dropping invalid saved theme {}", theme.id);
                },
                Err(err) => {
                    log::debug!("dropping malformed saved theme: {err}")
                },
            }
        }

        Self { themes }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        PresetCatalog, PresetId, PresetIdGenerator, PresetTheme, SequentialIds,
        UuidIds,
    };
    use crate::model::Preferences;
    use crate::schema::ColorScheme;

    fn theme(id: &str, name: &str) -> PresetTheme {
        PresetTheme::capture(
            PresetId::new(id),
            name.to_string(),
            &Preferences::default(),
        )
    }

    #[test]
    fn given_catalog_when_serialized_then_uses_camel_case_fields() {
        let mut catalog = PresetCatalog::default();
        catalog.push(theme("theme-1", "Calm"));

        let payload = catalog.to_json().expect("catalog should serialize");
        let value: serde_json::Value =
            serde_json::from_str(&payload).expect("payload is JSON");

        assert_eq!(value[0]["id"], "theme-1");
        assert_eq!(value[0]["colorScheme"], "system");
        assert_eq!(value[0]["accentColor"], "#3b82f6");
        assert_eq!(value[0]["sidebarStyle"], "default");
        assert_eq!(PresetCatalog::from_json(&payload), catalog);
    }

    #[test]
    fn given_payload_with_bad_entries_when_decoded_then_only_valid_remain() {
        let payload = json!([
            {
                "id": "1700000000000",
                "name": "Legacy",
                "colorScheme": "dark",
                "accentColor": "#10b981",
                "borderRadius": 12,
                "sidebarStyle": "compact",
                "headerStyle": "elevated"
            },
            {
                "id": "bad-color",
                "name": "Broken",
                "colorScheme": "dark",
                "accentColor": "green",
                "borderRadius": 12,
                "sidebarStyle": "compact",
                "headerStyle": "elevated"
            },
            {
                "id": "1700000000000",
                "name": "Duplicate",
                "colorScheme": "light",
                "accentColor": "#10b981",
                "borderRadius": 4,
                "sidebarStyle": "minimal",
                "headerStyle": "default"
            },
            "not an object"
        ])
        .to_string();

        let catalog = PresetCatalog::from_json(&payload);

        assert_eq!(catalog.len(), 1);
        let legacy = &catalog.themes()[0];
        assert_eq!(legacy.name(), "Legacy");
        assert_eq!(legacy.color_scheme(), ColorScheme::Dark);
        assert_eq!(legacy.created_at(), 0);
    }

    #[test]
    fn given_non_array_payload_when_decoded_then_catalog_is_empty() {
        assert!(PresetCatalog::from_json("{\"id\": 1}").is_empty());
        assert!(PresetCatalog::from_json("not json").is_empty());
    }

    #[test]
    fn given_catalog_when_removing_middle_entry_then_order_is_kept() {
        let mut catalog = PresetCatalog::default();
        catalog.push(theme("a", "A"));
        catalog.push(theme("b", "B"));
        catalog.push(theme("c", "C"));

        let removed = catalog.remove(&PresetId::new("b"));

        assert_eq!(
            removed.map(|theme| theme.name().to_string()),
            Some("B".into())
        );
        let names: Vec<&str> =
            catalog.themes().iter().map(PresetTheme::name).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert!(catalog.remove(&PresetId::new("missing")).is_none());
    }

    #[test]
    fn given_generators_when_called_repeatedly_then_ids_are_distinct() {
        let mut sequential = SequentialIds::default();
        let mut uuids = UuidIds;

        let first = sequential.next_id();
        let second = sequential.next_id();

        assert_eq!(first.as_str(), "theme-1");
        assert_ne!(first, second);
        assert_ne!(uuids.next_id(), uuids.next_id());
    }
}
