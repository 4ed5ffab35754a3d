use crate::errors::{PreferencesError, Result};
use crate::schema::{
    AnimationSpeed, BORDER_RADIUS_RANGE, CONTENT_WIDTH_RANGE, ChoiceSetting,
    ColorScheme, FONT_SIZE_RANGE, FontFamily, HEADER_HEIGHT_RANGE,
    HeaderStyle, HexColor, LayoutDensity, SIDEBAR_WIDTH_RANGE, SettingKey,
    SettingValue, SidebarPosition, SidebarStyle, validate,
};

const DEFAULT_ACCENT_COLOR: &str = "#3b82f6";
const DEFAULT_SECONDARY_COLOR: &str = "#8b5cf6";
const DEFAULT_SIDEBAR_WIDTH: u32 = 280;
const DEFAULT_HEADER_HEIGHT: u32 = 64;
const DEFAULT_BORDER_RADIUS: u32 = 8;
const DEFAULT_CONTENT_WIDTH: u32 = 1280;
const DEFAULT_FONT_SIZE: u32 = 16;

/// Current value of every dashboard setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    sidebar_style: SidebarStyle,
    sidebar_position: SidebarPosition,
    sidebar_collapsed: bool,
    sidebar_width: u32,
    header_style: HeaderStyle,
    header_fixed: bool,
    header_height: u32,
    color_scheme: ColorScheme,
    accent_color: HexColor,
    secondary_color: HexColor,
    border_radius: u32,
    content_width: u32,
    layout_density: LayoutDensity,
    font_size: u32,
    font_family: FontFamily,
    animation_speed: AnimationSpeed,
    animations_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sidebar_style: SidebarStyle::default(),
            sidebar_position: SidebarPosition::default(),
            sidebar_collapsed: false,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
            header_style: HeaderStyle::default(),
            header_fixed: true,
            header_height: DEFAULT_HEADER_HEIGHT,
            color_scheme: ColorScheme::default(),
            accent_color: HexColor::from_static(DEFAULT_ACCENT_COLOR),
            secondary_color: HexColor::from_static(DEFAULT_SECONDARY_COLOR),
            border_radius: DEFAULT_BORDER_RADIUS,
            content_width: DEFAULT_CONTENT_WIDTH,
            layout_density: LayoutDensity::default(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            animation_speed: AnimationSpeed::default(),
            animations_enabled: true,
        }
    }
}

impl Preferences {
    pub fn sidebar_style(&self) -> SidebarStyle {
        self.sidebar_style
    }

    pub fn sidebar_position(&self) -> SidebarPosition {
        self.sidebar_position
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn sidebar_width(&self) -> u32 {
        self.sidebar_width
    }

    pub fn header_style(&self) -> HeaderStyle {
        self.header_style
    }

    pub fn header_fixed(&self) -> bool {
        self.header_fixed
    }

    pub fn header_height(&self) -> u32 {
        self.header_height
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub fn accent_color(&self) -> &HexColor {
        &self.accent_color
    }

    pub fn secondary_color(&self) -> &HexColor {
        &self.secondary_color
    }

    pub fn border_radius(&self) -> u32 {
        self.border_radius
    }

    pub fn content_width(&self) -> u32 {
        self.content_width
    }

    pub fn layout_density(&self) -> LayoutDensity {
        self.layout_density
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn font_family(&self) -> FontFamily {
        self.font_family
    }

    pub fn animation_speed(&self) -> AnimationSpeed {
        self.animation_speed
    }

    pub fn animations_enabled(&self) -> bool {
        self.animations_enabled
    }

    /// Return the value of `key` through the untyped surface.
    pub fn value(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::SidebarStyle => self.sidebar_style.into(),
            SettingKey::SidebarPosition => self.sidebar_position.into(),
            SettingKey::SidebarCollapsed => self.sidebar_collapsed.into(),
            SettingKey::SidebarWidth => self.sidebar_width.into(),
            SettingKey::HeaderStyle => self.header_style.into(),
            SettingKey::HeaderFixed => self.header_fixed.into(),
            SettingKey::HeaderHeight => self.header_height.into(),
            SettingKey::ColorScheme => self.color_scheme.into(),
            SettingKey::AccentColor => self.accent_color.clone().into(),
            SettingKey::SecondaryColor => self.secondary_color.clone().into(),
            SettingKey::BorderRadius => self.border_radius.into(),
            SettingKey::ContentWidth => self.content_width.into(),
            SettingKey::LayoutDensity => self.layout_density.into(),
            SettingKey::FontSize => self.font_size.into(),
            SettingKey::FontFamily => self.font_family.into(),
            SettingKey::AnimationSpeed => self.animation_speed.into(),
            SettingKey::AnimationsEnabled => self.animations_enabled.into(),
        }
    }

    /// Validate and store `value` under `key`. Leaves `self` untouched on
    /// error.
    pub(crate) fn assign(
        &mut self,
        key: SettingKey,
        value: &SettingValue,
    ) -> Result<()> {
        validate(key, value)?;

        match key {
            SettingKey::SidebarStyle => {
                self.sidebar_style = choice(key, value)?
            },
            SettingKey::SidebarPosition => {
                self.sidebar_position = choice(key, value)?
            },
            SettingKey::SidebarCollapsed => {
                self.sidebar_collapsed = flag(key, value)?
            },
            SettingKey::SidebarWidth => {
                self.sidebar_width = number(key, value)?
            },
            SettingKey::HeaderStyle => self.header_style = choice(key, value)?,
            SettingKey::HeaderFixed => self.header_fixed = flag(key, value)?,
            SettingKey::HeaderHeight => {
                self.header_height = number(key, value)?
            },
            SettingKey::ColorScheme => self.color_scheme = choice(key, value)?,
            SettingKey::AccentColor => self.accent_color = color(key, value)?,
            SettingKey::SecondaryColor => {
                self.secondary_color = color(key, value)?
            },
            SettingKey::BorderRadius => {
                self.border_radius = number(key, value)?
            },
            SettingKey::ContentWidth => {
                self.content_width = number(key, value)?
            },
            SettingKey::LayoutDensity => {
                self.layout_density = choice(key, value)?
            },
            SettingKey::FontSize => self.font_size = number(key, value)?,
            SettingKey::FontFamily => self.font_family = choice(key, value)?,
            SettingKey::AnimationSpeed => {
                self.animation_speed = choice(key, value)?
            },
            SettingKey::AnimationsEnabled => {
                self.animations_enabled = flag(key, value)?
            },
        }

        Ok(())
    }

    pub(crate) fn set_sidebar_style(&mut self, value: SidebarStyle) {
        self.sidebar_style = value;
    }

    pub(crate) fn set_sidebar_position(&mut self, value: SidebarPosition) {
        self.sidebar_position = value;
    }

    pub(crate) fn set_sidebar_collapsed(&mut self, value: bool) {
        self.sidebar_collapsed = value;
    }

    pub(crate) fn set_sidebar_width(&mut self, value: u32) -> Result<()> {
        self.sidebar_width =
            bounded(SettingKey::SidebarWidth, value, SIDEBAR_WIDTH_RANGE)?;
        Ok(())
    }

    pub(crate) fn set_header_style(&mut self, value: HeaderStyle) {
        self.header_style = value;
    }

    pub(crate) fn set_header_fixed(&mut self, value: bool) {
        self.header_fixed = value;
    }

    pub(crate) fn set_header_height(&mut self, value: u32) -> Result<()> {
        self.header_height =
            bounded(SettingKey::HeaderHeight, value, HEADER_HEIGHT_RANGE)?;
        Ok(())
    }

    pub(crate) fn set_color_scheme(&mut self, value: ColorScheme) {
        self.color_scheme = value;
    }

    pub(crate) fn set_accent_color(&mut self, value: HexColor) {
        self.accent_color = value;
    }

    pub(crate) fn set_secondary_color(&mut self, value: HexColor) {
        self.secondary_color = value;
    }

    pub(crate) fn set_border_radius(&mut self, value: u32) -> Result<()> {
        self.border_radius =
            bounded(SettingKey::BorderRadius, value, BORDER_RADIUS_RANGE)?;
        Ok(())
    }

    pub(crate) fn set_content_width(&mut self, value: u32) -> Result<()> {
        self.content_width =
            bounded(SettingKey::ContentWidth, value, CONTENT_WIDTH_RANGE)?;
        Ok(())
    }

    pub(crate) fn set_layout_density(&mut self, value: LayoutDensity) {
        self.layout_density = value;
    }

    pub(crate) fn set_font_size(&mut self, value: u32) -> Result<()> {
        self.font_size = bounded(SettingKey::FontSize, value, FONT_SIZE_RANGE)?;
        Ok(())
    }

    pub(crate) fn set_font_family(&mut self, value: FontFamily) {
        self.font_family = value;
    }

    pub(crate) fn set_animation_speed(&mut self, value: AnimationSpeed) {
        self.animation_speed = value;
    }

    pub(crate) fn set_animations_enabled(&mut self, value: bool) {
        self.animations_enabled = value;
    }
}

fn choice<T: ChoiceSetting>(
    key: SettingKey,
    value: &SettingValue,
) -> Result<T> {
    match value {
        SettingValue::Text(text) => T::parse(text).ok_or_else(|| {
            PreferencesError::invalid(key.name(), format!("unknown `{text}`"))
        }),
        other => Err(PreferencesError::invalid(
            key.name(),
            format!("expected text, got {other:?}"),
        )),
    }
}

fn flag(key: SettingKey, value: &SettingValue) -> Result<bool> {
    match value {
        SettingValue::Flag(flag) => Ok(*flag),
        other => Err(PreferencesError::invalid(
            key.name(),
            format!("expected boolean, got {other:?}"),
        )),
    }
}

fn number(key: SettingKey, value: &SettingValue) -> Result<u32> {
    match value {
        SettingValue::Number(number) => Ok(*number),
        other => Err(PreferencesError::invalid(
            key.name(),
            format!("expected number, got {other:?}"),
        )),
    }
}

fn color(key: SettingKey, value: &SettingValue) -> Result<HexColor> {
    match value {
        SettingValue::Text(text) => HexColor::parse(text).ok_or_else(|| {
            PreferencesError::invalid(key.name(), format!("bad color `{text}`"))
        }),
        other => Err(PreferencesError::invalid(
            key.name(),
            format!("expected color, got {other:?}"),
        )),
    }
}

fn bounded(
    key: SettingKey,
    value: u32,
    range: std::ops::RangeInclusive<u32>,
) -> Result<u32> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(PreferencesError::invalid(
            key.name(),
            format!("{value} is outside {}..={}", range.start(), range.end()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::Preferences;
    use crate::schema::{ColorScheme, SettingKey, SettingValue};

    #[test]
    fn given_valid_values_when_assigned_then_value_reads_them_back() {
        let mut preferences = Preferences::default();
        let samples = [
            (SettingKey::ColorScheme, SettingValue::Text("dark".into())),
            (SettingKey::SidebarWidth, SettingValue::Number(320)),
            (SettingKey::HeaderFixed, SettingValue::Flag(false)),
            (SettingKey::AccentColor, SettingValue::Text("#112233".into())),
            (SettingKey::AnimationSpeed, SettingValue::Text("none".into())),
        ];

        for (key, value) in samples {
            preferences
                .assign(key, &value)
                .expect("sample value should be valid");
            assert_eq!(preferences.value(key), value);
        }
    }

    #[test]
    fn given_invalid_value_when_assigned_then_preferences_are_unchanged() {
        let mut preferences = Preferences::default();
        let before = preferences.clone();

        let result = preferences.assign(
            SettingKey::ColorScheme,
            &SettingValue::Text(String::from("sepia")),
        );

        assert!(result.is_err());
        assert_eq!(preferences, before);
    }

    #[test]
    fn given_default_preferences_when_read_then_every_value_is_in_domain() {
        let preferences = Preferences::default();

        for key in SettingKey::ALL {
            crate::schema::validate(key, &preferences.value(key))
                .expect("defaults must validate");
        }
        assert_eq!(preferences.color_scheme(), ColorScheme::System);
    }

    #[test]
    fn given_out_of_range_width_when_set_then_error_and_value_kept() {
        let mut preferences = Preferences::default();

        assert!(preferences.set_sidebar_width(120).is_err());
        assert_eq!(preferences.sidebar_width(), 280);
        assert!(preferences.set_sidebar_width(400).is_ok());
        assert_eq!(preferences.sidebar_width(), 400);
    }
}
