//! Dashboard preferences store for the student portal.
//!
//! The crate owns every user-configurable dashboard setting and the catalog
//! of saved theme presets:
//! - [`PreferencesStore`] holds current values, validates every change,
//!   projects settings into style variables and classes, and writes through
//!   to a [`Storage`] adapter.
//! - [`project`] is the pure mapping from [`Preferences`] and host
//!   [`EnvironmentSignals`] to a [`Projection`], handed to an
//!   [`Environment`] once per change batch.
//! - [`PresetTheme`]s are immutable snapshots of the color scheme, accent
//!   color, border radius, sidebar style and header style.
//!
//! Hosts usually:
//! 1. Build a store over [`FileStorage`] (or [`MemoryStorage`] in tests) and
//!    call [`PreferencesStore::hydrate`] once persisted values are wanted.
//! 2. Feed [`EnvironmentSignals`] whenever the system color scheme,
//!    reduced-motion preference or viewport changes.
//! 3. Call [`PreferencesStore::flush`] after handling each user action.

mod errors;
mod model;
mod presets;
mod projection;
mod prompt;
mod schema;
mod storage;
mod store;

pub use errors::{PreferencesError, Result, StorageError};
pub use model::Preferences;
pub use presets::{
    CATALOG_STORAGE_KEY, PresetCatalog, PresetId, PresetIdGenerator,
    PresetTheme, SequentialIds, UuidIds,
};
pub use projection::{
    ANIMATION_DURATION_VAR, ColorMode, Environment, EnvironmentSignals,
    MOBILE_BREAKPOINT, MemoryEnvironment, NO_ANIMATIONS_CLASS, Projection,
    TABLET_BREAKPOINT, animation_duration, project, resolve_mode,
};
pub use prompt::{Prompt, ScriptedPrompt};
pub use schema::{
    AnimationSpeed, ChoiceSetting, ColorScheme, Effect, FontFamily,
    HeaderStyle, HexColor, LayoutDensity, STORAGE_PREFIX, SettingKey,
    SettingKind, SettingValue, SidebarPosition, SidebarStyle, validate,
};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Batch, PRESET_KEYS, PreferencesStore};
