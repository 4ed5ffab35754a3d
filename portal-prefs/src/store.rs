use crate::errors::{PreferencesError, Result};
use crate::model::Preferences;
use crate::presets::{
    CATALOG_STORAGE_KEY, PresetCatalog, PresetId, PresetIdGenerator,
    PresetTheme, UuidIds,
};
use crate::projection::{
    ColorMode, Environment, EnvironmentSignals, Projection, project,
};
use crate::prompt::Prompt;
use crate::schema::{
    AnimationSpeed, ColorScheme, FontFamily, HeaderStyle, HexColor,
    LayoutDensity, SettingKey, SettingValue, SidebarPosition, SidebarStyle,
};
use crate::storage::Storage;

/// Settings captured by a preset, in capture order.
pub const PRESET_KEYS: [SettingKey; 5] = [
    SettingKey::ColorScheme,
    SettingKey::AccentColor,
    SettingKey::BorderRadius,
    SettingKey::SidebarStyle,
    SettingKey::HeaderStyle,
];

/// Draws from the id generator before a save is abandoned.
const MAX_ID_ATTEMPTS: usize = 16;

#[derive(Debug)]
struct PendingWrite {
    key: &'static str,
    payload: String,
}

/// Owner of every dashboard preference and the saved theme catalog.
///
/// Mutations update memory synchronously, re-apply the projection once per
/// change batch and queue a write-through. Queued writes reach storage on
/// [`PreferencesStore::flush`], on [`PreferencesStore::close`] or when the
/// store is dropped. Storage failures are logged and never roll back memory.
pub struct PreferencesStore<S: Storage, E: Environment> {
    storage: S,
    environment: E,
    ids: Box<dyn PresetIdGenerator>,
    preferences: Preferences,
    catalog: PresetCatalog,
    catalog_synced: bool,
    signals: EnvironmentSignals,
    projection: Projection,
    pending: Vec<PendingWrite>,
    hydrated: bool,
}

impl<S: Storage, E: Environment> PreferencesStore<S, E> {
    /// Create a store holding defaults. Storage is not read until
    /// [`PreferencesStore::hydrate`].
    pub fn new(storage: S, environment: E) -> Self {
        let preferences = Preferences::default();
        let signals = EnvironmentSignals::default();
        let projection = project(&preferences, &signals);
        let mut store = Self {
            storage,
            environment,
            ids: Box::new(UuidIds),
            preferences,
            catalog: PresetCatalog::default(),
            catalog_synced: false,
            signals,
            projection,
            pending: Vec::new(),
            hydrated: false,
        };
        store.environment.apply(&store.projection);
        store
    }

    /// Create a store and immediately read persisted values.
    pub fn load(storage: S, environment: E) -> Self {
        let mut store = Self::new(storage, environment);
        store.hydrate();
        store
    }

    pub fn with_id_generator(
        mut self,
        ids: impl PresetIdGenerator + 'static,
    ) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Read persisted values over the defaults.
    ///
    /// Absent, unreadable and malformed entries keep their current value.
    /// Keys with a queued write are skipped so a change made before
    /// hydration is not overwritten by an older persisted value.
    pub fn hydrate(&mut self) {
        for key in SettingKey::ALL {
            if self.is_pending(key.storage_key()) {
                continue;
            }
            let Some(raw) = read_entry(&self.storage, key.storage_key()) else {
                continue;
            };

            match decode_setting(&raw) {
                Some(value) => {
                    if let Err(err) = self.preferences.assign(key, &value) {
                        log::debug!("persisted {key} ignored: {err}");
                    }
                },
                None => log::debug!("persisted {key} is malformed: {raw}"),
            }
        }

        if !self.is_pending(CATALOG_STORAGE_KEY) {
            match self.storage.load(CATALOG_STORAGE_KEY) {
                Ok(raw) => {
                    if let Some(raw) = raw {
                        self.catalog = PresetCatalog::from_json(&raw);
                    }
                    self.catalog_synced = true;
                },
                Err(err) => {
                    log::warn!("saved themes unreadable: {err}");
                    self.catalog_synced = false;
                },
            }
        }

        self.hydrated = true;
        log::debug!(
            "preferences hydrated with {} saved themes",
            self.catalog.len()
        );
        self.apply_projection();
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Return current values.
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.preferences.value(key)
    }

    /// Validate and store `value` under `key`.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<()> {
        self.preferences.assign(key, &value)?;
        self.settle(&[key]);
        Ok(())
    }

    /// Functional update over the latest in-memory value of `key`.
    pub fn update<F>(&mut self, key: SettingKey, f: F) -> Result<()>
    where
        F: FnOnce(&SettingValue) -> SettingValue,
    {
        let next = f(&self.preferences.value(key));
        self.set(key, next)
    }

    /// Apply several changes with a single projection.
    pub fn batch<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Batch<'_>) -> R,
    {
        let mut batch = Batch {
            preferences: &mut self.preferences,
            changed: Vec::new(),
        };
        let result = f(&mut batch);
        let changed = batch.changed;
        self.settle(&changed);
        result
    }

    pub fn set_sidebar_style(&mut self, value: SidebarStyle) {
        self.preferences.set_sidebar_style(value);
        self.settle(&[SettingKey::SidebarStyle]);
    }

    pub fn set_sidebar_position(&mut self, value: SidebarPosition) {
        self.preferences.set_sidebar_position(value);
        self.settle(&[SettingKey::SidebarPosition]);
    }

    pub fn set_sidebar_collapsed(&mut self, value: bool) {
        self.preferences.set_sidebar_collapsed(value);
        self.settle(&[SettingKey::SidebarCollapsed]);
    }

    pub fn toggle_sidebar(&mut self) {
        let collapsed = self.preferences.sidebar_collapsed();
        self.set_sidebar_collapsed(!collapsed);
    }

    pub fn set_sidebar_width(&mut self, value: u32) -> Result<()> {
        self.preferences.set_sidebar_width(value)?;
        self.settle(&[SettingKey::SidebarWidth]);
        Ok(())
    }

    pub fn set_header_style(&mut self, value: HeaderStyle) {
        self.preferences.set_header_style(value);
        self.settle(&[SettingKey::HeaderStyle]);
    }

    pub fn set_header_fixed(&mut self, value: bool) {
        self.preferences.set_header_fixed(value);
        self.settle(&[SettingKey::HeaderFixed]);
    }

    pub fn set_header_height(&mut self, value: u32) -> Result<()> {
        self.preferences.set_header_height(value)?;
        self.settle(&[SettingKey::HeaderHeight]);
        Ok(())
    }

    pub fn set_color_scheme(&mut self, value: ColorScheme) {
        self.preferences.set_color_scheme(value);
        self.settle(&[SettingKey::ColorScheme]);
    }

    pub fn set_accent_color(&mut self, value: &str) -> Result<()> {
        let color = parse_color(SettingKey::AccentColor, value)?;
        self.preferences.set_accent_color(color);
        self.settle(&[SettingKey::AccentColor]);
        Ok(())
    }

    pub fn set_secondary_color(&mut self, value: &str) -> Result<()> {
        let color = parse_color(SettingKey::SecondaryColor, value)?;
        self.preferences.set_secondary_color(color);
        self.settle(&[SettingKey::SecondaryColor]);
        Ok(())
    }

    pub fn set_border_radius(&mut self, value: u32) -> Result<()> {
        self.preferences.set_border_radius(value)?;
        self.settle(&[SettingKey::BorderRadius]);
        Ok(())
    }

    pub fn set_content_width(&mut self, value: u32) -> Result<()> {
        self.preferences.set_content_width(value)?;
        self.settle(&[SettingKey::ContentWidth]);
        Ok(())
    }

    pub fn set_layout_density(&mut self, value: LayoutDensity) {
        self.preferences.set_layout_density(value);
        self.settle(&[SettingKey::LayoutDensity]);
    }

    pub fn set_font_size(&mut self, value: u32) -> Result<()> {
        self.preferences.set_font_size(value)?;
        self.settle(&[SettingKey::FontSize]);
        Ok(())
    }

    pub fn set_font_family(&mut self, value: FontFamily) {
        self.preferences.set_font_family(value);
        self.settle(&[SettingKey::FontFamily]);
    }

    pub fn set_animation_speed(&mut self, value: AnimationSpeed) {
        self.preferences.set_animation_speed(value);
        self.settle(&[SettingKey::AnimationSpeed]);
    }

    pub fn set_animations_enabled(&mut self, value: bool) {
        self.preferences.set_animations_enabled(value);
        self.settle(&[SettingKey::AnimationsEnabled]);
    }

    /// Reset every setting to its default after the prompt confirms.
    /// Saved themes are kept.
    pub fn reset_to_defaults(&mut self, prompt: &mut dyn Prompt) -> bool {
        if !prompt.confirm_reset() {
            return false;
        }

        self.preferences = Preferences::default();
        self.settle(&SettingKey::ALL);
        log::info!("preferences reset to defaults");
        true
    }

    pub fn themes(&self) -> &[PresetTheme] {
        self.catalog.themes()
    }

    pub fn find_theme(&self, id: &PresetId) -> Option<&PresetTheme> {
        self.catalog.find(id)
    }

    /// Capture the current theme settings under a prompted name.
    ///
    /// A cancelled or blank name creates nothing.
    pub fn save_current_theme(
        &mut self,
        prompt: &mut dyn Prompt,
    ) -> Option<PresetId> {
        let name = prompt.theme_name()?;
        let name = name.trim();
        if name.is_empty() {
            log::debug!("theme save skipped: empty name");
            return None;
        }

        self.sync_catalog();
        let Some(id) = self.fresh_id() else {
            log::warn!("theme `{name}` not saved: no unused id available");
            return None;
        };
        let theme = PresetTheme::capture(
            id.clone(),
            name.to_string(),
            &self.preferences,
        );
        self.catalog.push(theme);
        self.queue_catalog();
        log::info!("saved theme `{name}` as {id}");
        Some(id)
    }

    /// Overwrite the captured settings with the preset's values. Unknown
    /// ids are ignored.
    pub fn apply_theme(&mut self, id: &PresetId) -> bool {
        let Some(theme) = self.catalog.find(id).cloned() else {
            log::debug!("apply of unknown theme {id} ignored");
            return false;
        };

        self.preferences.set_color_scheme(theme.color_scheme());
        self.preferences.set_accent_color(theme.accent_color().clone());
        let radius = theme.border_radius();
        if let Err(err) = self.preferences.set_border_radius(radius) {
            log::warn!("theme {id} radius not applied: {err}");
        }
        self.preferences.set_sidebar_style(theme.sidebar_style());
        self.preferences.set_header_style(theme.header_style());
        self.settle(&PRESET_KEYS);
        log::info!("applied theme `{}`", theme.name());
        true
    }

    /// Remove a preset. Unknown ids are ignored.
    pub fn delete_theme(&mut self, id: &PresetId) -> bool {
        self.sync_catalog();
        match self.catalog.remove(id) {
            Some(theme) => {
                self.queue_catalog();
                log::info!("deleted theme `{}`", theme.name());
                true
            },
            None => {
                log::debug!("delete of unknown theme {id} ignored");
                false
            },
        }
    }

    /// Settings as a JSON object keyed by setting name.
    pub fn export_settings(&self) -> serde_json::Value {
        let entries = SettingKey::ALL
            .into_iter()
            .map(|key| (key.name().to_string(), self.get(key).to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(entries)
    }

    /// Apply an exported settings object in one batch. Unknown names and
    /// invalid values are skipped. Returns how many settings were applied.
    pub fn import_settings(
        &mut self,
        value: &serde_json::Value,
    ) -> Result<usize> {
        let Some(entries) = value.as_object() else {
            return Err(PreferencesError::InvalidImport);
        };

        let applied = self.batch(|batch| {
            let mut applied = 0;
            for (name, raw) in entries {
                let Some(key) = SettingKey::from_name(name) else {
                    log::warn!("import skipped unknown setting `{name}`");
                    continue;
                };
                let Some(value) = SettingValue::from_json(raw) else {
                    log::warn!("import skipped {key}: unsupported value {raw}");
                    continue;
                };
                match batch.set(key, value) {
                    Ok(()) => applied += 1,
                    Err(err) => log::warn!("import skipped {key}: {err}"),
                }
            }
            applied
        });

        Ok(applied)
    }

    pub fn signals(&self) -> &EnvironmentSignals {
        &self.signals
    }

    /// Feed new host signals and re-project if they changed.
    pub fn set_signals(&mut self, signals: EnvironmentSignals) {
        if self.signals == signals {
            return;
        }
        self.signals = signals;
        self.apply_projection();
    }

    pub fn is_mobile(&self) -> bool {
        self.signals.is_mobile()
    }

    pub fn is_tablet(&self) -> bool {
        self.signals.is_tablet()
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.signals.is_reduced_motion()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.projection.mode()
    }

    /// Last applied projection.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Recompute the projection and hand it to the environment.
    pub fn apply_projection(&mut self) {
        self.projection = project(&self.preferences, &self.signals);
        self.environment.apply(&self.projection);
        log::debug!(
            "projection applied: mode={}",
            self.projection.mode().class()
        );
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Write queued changes to storage in call order. Failed writes are
    /// logged and dropped. Returns how many writes succeeded.
    pub fn flush(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let mut written = 0;
        for write in pending {
            match self.storage.save(write.key, &write.payload) {
                Ok(()) => written += 1,
                Err(err) => {
                    log::warn!(
                        "preferences write of {} failed: {err}",
                        write.key
                    )
                },
            }
        }
        written
    }

    /// Tear the store down, flushing queued writes.
    pub fn close(mut self) -> usize {
        self.flush()
    }

    fn settle(&mut self, changed: &[SettingKey]) {
        for key in changed {
            let payload = self.preferences.value(*key).to_json().to_string();
            self.queue(key.storage_key(), payload);
        }

        if changed.iter().any(|key| key.is_projected()) {
            self.apply_projection();
        }
    }

    fn queue_catalog(&mut self) {
        if !self.catalog_synced {
            log::warn!(
                "saved themes kept in memory: persisted catalog unreadable"
            );
            return;
        }
        match self.catalog.to_json() {
            Ok(payload) => self.queue(CATALOG_STORAGE_KEY, payload),
            Err(err) => log::warn!("saved themes not serialized: {err}"),
        }
    }

    fn queue(&mut self, key: &'static str, payload: String) {
        self.pending.retain(|write| write.key != key);
        self.pending.push(PendingWrite { key, payload });
    }

    fn is_pending(&self, key: &str) -> bool {
        self.pending.iter().any(|write| write.key == key)
    }

    /// Pick up the persisted catalog when hydration could not read it.
    /// Themes saved in memory since then are appended after it.
    fn sync_catalog(&mut self) {
        if self.catalog_synced {
            return;
        }
        match self.storage.load(CATALOG_STORAGE_KEY) {
            Ok(raw) => {
                let mut persisted = raw
                    .map(|raw| PresetCatalog::from_json(&raw))
                    .unwrap_or_default();
                for theme in self.catalog.themes() {
                    if !persisted.contains(theme.id()) {
                        persisted.push(theme.clone());
                    }
                }
                self.catalog = persisted;
                self.catalog_synced = true;
            },
            Err(err) => log::warn!("saved themes still unreadable: {err}"),
        }
    }

    fn fresh_id(&mut self) -> Option<PresetId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !self.catalog.contains(&id) {
                return Some(id);
            }
            log::warn!("preset id {id} already in use, drawing another");
        }
        None
    }
}

impl<S: Storage, E: Environment> Drop for PreferencesStore<S, E> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            self.flush();
        }
    }
}

/// Change set handed to [`PreferencesStore::batch`].
pub struct Batch<'a> {
    preferences: &'a mut Preferences,
    changed: Vec<SettingKey>,
}

impl Batch<'_> {
    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.preferences.value(key)
    }

    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<()> {
        self.preferences.assign(key, &value)?;
        if !self.changed.contains(&key) {
            self.changed.push(key);
        }
        Ok(())
    }

    pub fn update<F>(&mut self, key: SettingKey, f: F) -> Result<()>
    where
        F: FnOnce(&SettingValue) -> SettingValue,
    {
        let next = f(&self.preferences.value(key));
        self.set(key, next)
    }
}

fn read_entry<S: Storage>(storage: &S, key: &str) -> Option<String> {
    match storage.load(key) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("preferences read of {key} failed: {err}");
            None
        },
    }
}

fn decode_setting(raw: &str) -> Option<SettingValue> {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .as_ref()
        .and_then(SettingValue::from_json)
}

fn parse_color(key: SettingKey, value: &str) -> Result<HexColor> {
    HexColor::parse(value).ok_or_else(|| {
        PreferencesError::invalid(
            key.name(),
            format!("`{value}` is not a #rrggbb color"),
        )
    })
}
