use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::errors::{PreferencesError, Result};

/// Prefix shared by every persisted preferences key.
pub const STORAGE_PREFIX: &str = "dashboard-";

pub const SIDEBAR_WIDTH_RANGE: RangeInclusive<u32> = 200..=400;
pub const HEADER_HEIGHT_RANGE: RangeInclusive<u32> = 48..=96;
pub const BORDER_RADIUS_RANGE: RangeInclusive<u32> = 0..=24;
pub const CONTENT_WIDTH_RANGE: RangeInclusive<u32> = 960..=1920;
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 12..=20;

/// Enumerated setting backed by a fixed set of string options.
pub trait ChoiceSetting: Copy + Sized + 'static {
    const OPTIONS: &'static [&'static str];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self>;
}

macro_rules! choice_setting {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl ChoiceSetting for $name {
            const OPTIONS: &'static [&'static str] = &[$($label),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn parse(value: &str) -> Option<Self> {
                match value {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for SettingValue {
            fn from(value: $name) -> Self {
                SettingValue::Text(value.as_str().to_string())
            }
        }
    };
}

choice_setting! {
    /// User-selected color scheme; `System` follows the host preference.
    ColorScheme {
        Light => "light",
        Dark => "dark",
        System => "system",
    }
    default System
}

choice_setting! {
    SidebarStyle {
        Standard => "default",
        Compact => "compact",
        Floating => "floating",
        Minimal => "minimal",
    }
    default Standard
}

choice_setting! {
    SidebarPosition {
        Left => "left",
        Right => "right",
    }
    default Left
}

choice_setting! {
    HeaderStyle {
        Standard => "default",
        Compact => "compact",
        Transparent => "transparent",
        Elevated => "elevated",
    }
    default Standard
}

choice_setting! {
    LayoutDensity {
        Compact => "compact",
        Comfortable => "comfortable",
        Spacious => "spacious",
    }
    default Comfortable
}

choice_setting! {
    FontFamily {
        Inter => "inter",
        System => "system",
        Serif => "serif",
        Mono => "mono",
    }
    default Inter
}

choice_setting! {
    AnimationSpeed {
        Fast => "fast",
        Normal => "normal",
        Slow => "slow",
        Off => "none",
    }
    default Normal
}

/// `#rrggbb` color string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(value: &str) -> Option<Self> {
        is_valid_hex_color(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if is_valid_hex_color(&value) {
            Ok(Self(value))
        } else {
            Err(format!("`{value}` is not a #rrggbb color"))
        }
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<HexColor> for SettingValue {
    fn from(value: HexColor) -> Self {
        SettingValue::Text(value.0)
    }
}

pub fn is_valid_hex_color(value: &str) -> bool {
    let mut chars = value.chars();
    if chars.next() != Some('#') || value.len() != 7 {
        return false;
    }
    chars.all(|ch| ch.is_ascii_hexdigit())
}

/// Untyped setting value as it crosses the generic get/set surface and the
/// persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Text(String),
    Number(u32),
    Flag(bool),
}

impl SettingValue {
    /// Decode a persisted JSON value. Returns `None` for shapes that no
    /// setting uses.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(text) => Some(Self::Text(text.clone())),
            serde_json::Value::Bool(flag) => Some(Self::Flag(*flag)),
            serde_json::Value::Number(number) => number
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Self::Number),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Number(number) => serde_json::Value::from(*number),
            Self::Flag(flag) => serde_json::Value::Bool(*flag),
        }
    }

    /// Parse free-form text (command line, form input) for `key`.
    pub fn parse_for(key: SettingKey, input: &str) -> Result<Self> {
        let input = input.trim();
        match key.kind() {
            SettingKind::Flag => match input {
                "true" | "on" | "yes" => Ok(Self::Flag(true)),
                "false" | "off" | "no" => Ok(Self::Flag(false)),
                _ => Err(PreferencesError::invalid(
                    key.name(),
                    format!("`{input}` is not a boolean"),
                )),
            },
            SettingKind::Number { .. } => {
                input.parse::<u32>().map(Self::Number).map_err(|err| {
                    PreferencesError::invalid(key.name(), format!("{err}"))
                })
            },
            SettingKind::Choice(_) | SettingKind::Color => {
                Ok(Self::Text(input.to_string()))
            },
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Semantic type of a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingKind {
    Choice(&'static [&'static str]),
    Number { min: u32, max: u32 },
    Flag,
    Color,
}

impl SettingKind {
    fn number(range: RangeInclusive<u32>) -> Self {
        Self::Number {
            min: *range.start(),
            max: *range.end(),
        }
    }
}

/// How a setting shows up in the projected environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Read by consumers only.
    None,
    /// Resolves the light/dark mode class.
    Mode,
    /// Contributes to `--animation-duration`.
    AnimationDuration,
    /// Projects 1:1 into a style variable.
    Variable(&'static str),
    /// Adds a `<prefix>-<value>` class.
    Class(&'static str),
}

/// Every setting owned by the preferences store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    SidebarStyle,
    SidebarPosition,
    SidebarCollapsed,
    SidebarWidth,
    HeaderStyle,
    HeaderFixed,
    HeaderHeight,
    ColorScheme,
    AccentColor,
    SecondaryColor,
    BorderRadius,
    ContentWidth,
    LayoutDensity,
    FontSize,
    FontFamily,
    AnimationSpeed,
    AnimationsEnabled,
}

impl SettingKey {
    pub const ALL: [SettingKey; 17] = [
        SettingKey::SidebarStyle,
        SettingKey::SidebarPosition,
        SettingKey::SidebarCollapsed,
        SettingKey::SidebarWidth,
        SettingKey::HeaderStyle,
        SettingKey::HeaderFixed,
        SettingKey::HeaderHeight,
        SettingKey::ColorScheme,
        SettingKey::AccentColor,
        SettingKey::SecondaryColor,
        SettingKey::BorderRadius,
        SettingKey::ContentWidth,
        SettingKey::LayoutDensity,
        SettingKey::FontSize,
        SettingKey::FontFamily,
        SettingKey::AnimationSpeed,
        SettingKey::AnimationsEnabled,
    ];

    /// Name used by consumers, exports and the command line.
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::SidebarStyle => "sidebarStyle",
            SettingKey::SidebarPosition => "sidebarPosition",
            SettingKey::SidebarCollapsed => "sidebarCollapsed",
            SettingKey::SidebarWidth => "sidebarWidth",
            SettingKey::HeaderStyle => "headerStyle",
            SettingKey::HeaderFixed => "headerFixed",
            SettingKey::HeaderHeight => "headerHeight",
            SettingKey::ColorScheme => "colorScheme",
            SettingKey::AccentColor => "accentColor",
            SettingKey::SecondaryColor => "secondaryColor",
            SettingKey::BorderRadius => "borderRadius",
            SettingKey::ContentWidth => "contentWidth",
            SettingKey::LayoutDensity => "layoutDensity",
            SettingKey::FontSize => "fontSize",
            SettingKey::FontFamily => "fontFamily",
            SettingKey::AnimationSpeed => "animationSpeed",
            SettingKey::AnimationsEnabled => "animationsEnabled",
        }
    }

    /// Persisted key, always prefixed with [`STORAGE_PREFIX`].
    pub fn storage_key(self) -> &'static str {
        match self {
            SettingKey::SidebarStyle => "dashboard-sidebar-style",
            SettingKey::SidebarPosition => "dashboard-sidebar-position",
            SettingKey::SidebarCollapsed => "dashboard-sidebar-collapsed",
            SettingKey::SidebarWidth => "dashboard-sidebar-width",
            SettingKey::HeaderStyle => "dashboard-header-style",
            SettingKey::HeaderFixed => "dashboard-header-fixed",
            SettingKey::HeaderHeight => "dashboard-header-height",
            SettingKey::ColorScheme => "dashboard-color-scheme",
            SettingKey::AccentColor => "dashboard-accent-color",
            SettingKey::SecondaryColor => "dashboard-secondary-color",
            SettingKey::BorderRadius => "dashboard-border-radius",
            SettingKey::ContentWidth => "dashboard-content-width",
            SettingKey::LayoutDensity => "dashboard-layout-density",
            SettingKey::FontSize => "dashboard-font-size",
            SettingKey::FontFamily => "dashboard-font-family",
            SettingKey::AnimationSpeed => "dashboard-animation-speed",
            SettingKey::AnimationsEnabled => "dashboard-animations-enabled",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    pub fn kind(self) -> SettingKind {
        match self {
            SettingKey::SidebarStyle => {
                SettingKind::Choice(SidebarStyle::OPTIONS)
            },
            SettingKey::SidebarPosition => {
                SettingKind::Choice(SidebarPosition::OPTIONS)
            },
            SettingKey::HeaderStyle => {
                SettingKind::Choice(HeaderStyle::OPTIONS)
            },
            SettingKey::ColorScheme => {
                SettingKind::Choice(ColorScheme::OPTIONS)
            },
            SettingKey::LayoutDensity => {
                SettingKind::Choice(LayoutDensity::OPTIONS)
            },
            SettingKey::FontFamily => SettingKind::Choice(FontFamily::OPTIONS),
            SettingKey::AnimationSpeed => {
                SettingKind::Choice(AnimationSpeed::OPTIONS)
            },
            SettingKey::SidebarCollapsed
            | SettingKey::HeaderFixed
            | SettingKey::AnimationsEnabled => SettingKind::Flag,
            SettingKey::SidebarWidth => {
                SettingKind::number(SIDEBAR_WIDTH_RANGE)
            },
            SettingKey::HeaderHeight => {
                SettingKind::number(HEADER_HEIGHT_RANGE)
            },
            SettingKey::BorderRadius => {
                SettingKind::number(BORDER_RADIUS_RANGE)
            },
            SettingKey::ContentWidth => {
                SettingKind::number(CONTENT_WIDTH_RANGE)
            },
            SettingKey::FontSize => SettingKind::number(FONT_SIZE_RANGE),
            SettingKey::AccentColor | SettingKey::SecondaryColor => {
                SettingKind::Color
            },
        }
    }

    pub fn effect(self) -> Effect {
        match self {
            SettingKey::SidebarStyle | SettingKey::SidebarPosition => {
                Effect::Class("sidebar")
            },
            SettingKey::HeaderStyle => Effect::Class("header"),
            SettingKey::LayoutDensity => Effect::Class("density"),
            SettingKey::SidebarCollapsed | SettingKey::HeaderFixed => {
                Effect::None
            },
            SettingKey::SidebarWidth => Effect::Variable("--sidebar-width"),
            SettingKey::HeaderHeight => Effect::Variable("--header-height"),
            SettingKey::ColorScheme => Effect::Mode,
            SettingKey::AccentColor => Effect::Variable("--accent-color"),
            SettingKey::SecondaryColor => Effect::Variable("--secondary-color"),
            SettingKey::BorderRadius => Effect::Variable("--border-radius"),
            SettingKey::ContentWidth => Effect::Variable("--content-width"),
            SettingKey::FontSize => Effect::Variable("--font-size"),
            SettingKey::FontFamily => Effect::Variable("--font-family"),
            SettingKey::AnimationSpeed | SettingKey::AnimationsEnabled => {
                Effect::AnimationDuration
            },
        }
    }

    /// Whether a change to this setting alters the projected environment.
    pub fn is_projected(self) -> bool {
        self.effect() != Effect::None
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validate a value against the semantic type of `key`.
pub fn validate(key: SettingKey, value: &SettingValue) -> Result<()> {
    match (key.kind(), value) {
        (SettingKind::Choice(options), SettingValue::Text(text)) => {
            if options.contains(&text.as_str()) {
                Ok(())
            } else {
                Err(PreferencesError::invalid(
                    key.name(),
                    format!("`{text}` is not one of {}", options.join(", ")),
                ))
            }
        },
        (SettingKind::Number { min, max }, SettingValue::Number(number)) => {
            if (min..=max).contains(number) {
                Ok(())
            } else {
                Err(PreferencesError::invalid(
                    key.name(),
                    format!("{number} is outside {min}..={max}"),
                ))
            }
        },
        (SettingKind::Flag, SettingValue::Flag(_)) => Ok(()),
        (SettingKind::Color, SettingValue::Text(text)) => {
            if is_valid_hex_color(text) {
                Ok(())
            } else {
                Err(PreferencesError::invalid(
                    key.name(),
                    format!("`{text}` is not a #rrggbb color"),
                ))
            }
        },
        (kind, value) => Err(PreferencesError::invalid(
            key.name(),
            format!("expected {kind:?}, got {value:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        AnimationSpeed, ChoiceSetting, ColorScheme, HexColor, STORAGE_PREFIX,
        SettingKey, SettingValue, is_valid_hex_color, validate,
    };

    #[test]
    fn given_all_keys_when_listing_storage_keys_then_prefixed_and_unique() {
        let mut seen = HashSet::new();
        for key in SettingKey::ALL {
            assert!(key.storage_key().starts_with(STORAGE_PREFIX));
            assert!(seen.insert(key.storage_key()), "duplicate {key}");
            assert_eq!(SettingKey::from_name(key.name()), Some(key));
        }
    }

    #[test]
    fn given_choice_label_when_parsed_then_round_trips_through_as_str() {
        for label in AnimationSpeed::OPTIONS {
            let parsed = AnimationSpeed::parse(label).expect("known label");
            assert_eq!(parsed.as_str(), *label);
        }
        assert_eq!(ColorScheme::parse("sepia"), None);
        assert_eq!(ColorScheme::default(), ColorScheme::System);
    }

    #[test]
    fn given_out_of_domain_values_when_validated_then_they_are_rejected() {
        assert!(
            validate(
                SettingKey::ColorScheme,
                &SettingValue::Text(String::from("sepia"))
            )
            .is_err()
        );
        assert!(
            validate(SettingKey::SidebarWidth, &SettingValue::Number(999))
                .is_err()
        );
        assert!(
            validate(SettingKey::AnimationsEnabled, &SettingValue::Number(1))
                .is_err()
        );
        assert!(
            validate(
                SettingKey::AccentColor,
                &SettingValue::Text(String::from("blue"))
            )
            .is_err()
        );
        assert!(
            validate(SettingKey::BorderRadius, &SettingValue::Number(0))
                .is_ok()
        );
    }

    #[test]
    fn given_cli_text_when_parsed_for_key_then_kind_is_respected() {
        assert_eq!(
            SettingValue::parse_for(SettingKey::HeaderFixed, "off").ok(),
            Some(SettingValue::Flag(false))
        );
        assert_eq!(
            SettingValue::parse_for(SettingKey::FontSize, " 18 ").ok(),
            Some(SettingValue::Number(18))
        );
        assert!(SettingValue::parse_for(SettingKey::FontSize, "big").is_err());
    }

    #[test]
    fn given_hex_color_value_when_validated_then_result_matches_format() {
        assert!(is_valid_hex_color("#aBc123"));
        assert!(!is_valid_hex_color("#12345"));
        assert!(!is_valid_hex_color("123456"));
        assert!(HexColor::parse("#zzzzzz").is_none());
    }

    #[test]
    fn given_json_number_beyond_u32_when_decoded_then_value_is_rejected() {
        let value = serde_json::json!(u64::MAX);

        assert_eq!(SettingValue::from_json(&value), None);
    }
}
