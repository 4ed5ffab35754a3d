//! Mapping from current preferences to environment-visible style state.
//!
//! [`project`] is pure: the same preferences and signals always produce the
//! same [`Projection`], and applying a projection replaces whatever the
//! environment held before. That keeps re-application idempotent.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::Preferences;
use crate::schema::{
    AnimationSpeed, ColorScheme, Effect, FontFamily, SettingKey,
};

pub const MOBILE_BREAKPOINT: u32 = 768;
pub const TABLET_BREAKPOINT: u32 = 1024;
const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

pub const NO_ANIMATIONS_CLASS: &str = "no-animations";
pub const ANIMATION_DURATION_VAR: &str = "--animation-duration";

/// Host-supplied signals the store reads but never persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentSignals {
    pub prefers_dark: bool,
    pub reduced_motion: bool,
    pub viewport_width: u32,
}

impl Default for EnvironmentSignals {
    fn default() -> Self {
        Self {
            prefers_dark: false,
            reduced_motion: false,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
        }
    }
}

impl EnvironmentSignals {
    pub fn is_mobile(&self) -> bool {
        self.viewport_width < MOBILE_BREAKPOINT
    }

    pub fn is_tablet(&self) -> bool {
        (MOBILE_BREAKPOINT..TABLET_BREAKPOINT).contains(&self.viewport_width)
    }

    pub fn is_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
}

/// Concrete light/dark mode after resolving `system`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Light,
    Dark,
}

impl ColorMode {
    pub fn class(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }
}

/// Full environment state derived from preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    mode: ColorMode,
    variables: BTreeMap<&'static str, String>,
    classes: BTreeSet<String>,
}

impl Projection {
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &BTreeMap<&'static str, String> {
        &self.variables
    }

    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// Receiver of projections, e.g. a document root or a terminal theme.
pub trait Environment {
    fn apply(&mut self, projection: &Projection);
}

/// Environment that keeps the last applied projection.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    current: Option<Projection>,
    applications: usize,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Projection> {
        self.current.as_ref()
    }

    /// How many times a projection was applied.
    pub fn applications(&self) -> usize {
        self.applications
    }
}

impl Environment for MemoryEnvironment {
    fn apply(&mut self, projection: &Projection) {
        self.current = Some(projection.clone());
        self.applications += 1;
    }
}

pub fn resolve_mode(scheme: ColorScheme, prefers_dark: bool) -> ColorMode {
    match scheme {
        ColorScheme::Light => ColorMode::Light,
        ColorScheme::Dark => ColorMode::Dark,
        ColorScheme::System if prefers_dark => ColorMode::Dark,
        ColorScheme::System => ColorMode::Light,
    }
}

/// Disabled animations and reduced motion both force `0s`.
pub fn animation_duration(
    speed: AnimationSpeed,
    enabled: bool,
    reduced_motion: bool,
) -> &'static str {
    if !enabled || reduced_motion {
        return "0s";
    }

    match speed {
        AnimationSpeed::Fast => "0.15s",
        AnimationSpeed::Normal => "0.3s",
        AnimationSpeed::Slow => "0.5s",
        AnimationSpeed::Off => "0s",
    }
}

fn font_stack(family: FontFamily) -> &'static str {
    match family {
        FontFamily::Inter => "Inter, ui-sans-serif, system-ui, sans-serif",
        FontFamily::System => {
            "system-ui, -apple-system, 'Segoe UI', Roboto, sans-serif"
        },
        FontFamily::Serif => "Georgia, 'Times New Roman', serif",
        FontFamily::Mono => "'JetBrains Mono', ui-monospace, monospace",
    }
}

pub fn project(
    preferences: &Preferences,
    signals: &EnvironmentSignals,
) -> Projection {
    let mode = resolve_mode(preferences.color_scheme(), signals.prefers_dark);
    let mut variables = BTreeMap::new();
    let mut classes = BTreeSet::new();
    classes.insert(mode.class().to_string());

    for key in SettingKey::ALL {
        match key.effect() {
            Effect::Variable(name) => {
                variables.insert(name, variable_value(preferences, key));
            },
            Effect::Class(prefix) => {
                classes.insert(format!(
                    "{prefix}-{}",
                    preferences.value(key)
                ));
            },
            Effect::Mode | Effect::AnimationDuration | Effect::None => {},
        }
    }

    let duration = animation_duration(
        preferences.animation_speed(),
        preferences.animations_enabled(),
        signals.reduced_motion,
    );
    variables.insert(ANIMATION_DURATION_VAR, duration.to_string());
    if duration == "0s" {
        classes.insert(NO_ANIMATIONS_CLASS.to_string());
    }

    Projection {
        mode,
        variables,
        classes,
    }
}

fn variable_value(preferences: &Preferences, key: SettingKey) -> String {
    match key {
        SettingKey::FontFamily => {
            font_stack(preferences.font_family()).to_string()
        },
        SettingKey::AccentColor => preferences.accent_color().to_string(),
        SettingKey::SecondaryColor => {
            preferences.secondary_color().to_string()
        },
        _ => format!("{}px", preferences.value(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ColorMode, EnvironmentSignals, NO_ANIMATIONS_CLASS, animation_duration,
        project, resolve_mode,
    };
    use crate::model::Preferences;
    use crate::schema::{
        AnimationSpeed, ColorScheme, LayoutDensity, SettingKey, SettingValue,
    };

    #[test]
    fn given_enabled_normal_speed_when_resolved_then_duration_is_point_three() {
        let enabled = |speed| animation_duration(speed, true, false);

        assert_eq!(enabled(AnimationSpeed::Normal), "0.3s");
        assert_eq!(enabled(AnimationSpeed::Fast), "0.15s");
        assert_eq!(enabled(AnimationSpeed::Slow), "0.5s");
        assert_eq!(enabled(AnimationSpeed::Off), "0s");
    }

    #[test]
    fn given_reduced_motion_when_resolved_then_any_speed_is_zero() {
        for speed in [
            AnimationSpeed::Fast,
            AnimationSpeed::Normal,
            AnimationSpeed::Slow,
            AnimationSpeed::Off,
        ] {
            for enabled in [true, false] {
                assert_eq!(animation_duration(speed, enabled, true), "0s");
            }
            assert_eq!(animation_duration(speed, false, false), "0s");
        }
    }

    #[test]
    fn given_system_scheme_when_resolved_then_follows_host_preference() {
        assert_eq!(resolve_mode(ColorScheme::System, true), ColorMode::Dark);
        assert_eq!(resolve_mode(ColorScheme::System, false), ColorMode::Light);
        assert_eq!(resolve_mode(ColorScheme::Light, true), ColorMode::Light);
        assert_eq!(resolve_mode(ColorScheme::Dark, false), ColorMode::Dark);
    }

    #[test]
    fn given_unchanged_preferences_when_projected_twice_then_results_match() {
        let preferences = Preferences::default();
        let signals = EnvironmentSignals::default();

        let first = project(&preferences, &signals);
        let second = project(&preferences, &signals);

        assert_eq!(first, second);
    }

    #[test]
    fn given_default_preferences_when_projected_then_variables_are_one_to_one()
    {
        let mut preferences = Preferences::default();
        preferences.set_layout_density(LayoutDensity::Compact);
        preferences
            .assign(SettingKey::BorderRadius, &SettingValue::Number(12))
            .expect("radius in range");

        let projection = project(&preferences, &EnvironmentSignals::default());

        assert_eq!(projection.variable("--border-radius"), Some("12px"));
        assert_eq!(projection.variable("--sidebar-width"), Some("280px"));
        assert_eq!(projection.variable("--accent-color"), Some("#3b82f6"));
        assert_eq!(projection.variable("--animation-duration"), Some("0.3s"));
        assert!(projection.has_class("density-compact"));
        assert!(projection.has_class("light"));
        assert!(!projection.has_class(NO_ANIMATIONS_CLASS));
    }

    #[test]
    fn given_system_scheme_and_dark_host_when_projected_then_mode_is_dark() {
        let preferences = Preferences::default();
        let signals = EnvironmentSignals {
            prefers_dark: true,
            ..EnvironmentSignals::default()
        };

        let projection = project(&preferences, &signals);

        assert_eq!(projection.mode(), ColorMode::Dark);
        assert!(projection.has_class("dark"));
        assert!(!projection.has_class("light"));
    }

    #[test]
    fn given_viewport_widths_when_classified_then_breakpoints_apply() {
        let signals = |viewport_width| EnvironmentSignals {
            viewport_width,
            ..EnvironmentSignals::default()
        };

        assert!(signals(480).is_mobile());
        assert!(!signals(480).is_tablet());
        assert!(signals(768).is_tablet());
        assert!(signals(1023).is_tablet());
        assert!(!signals(1024).is_tablet());
        assert!(!signals(1024).is_mobile());
    }
}
