use std::io::{self, Write};

use portal_prefs::{
    EnvironmentSignals, Preferences, PresetTheme, Projection, SettingKey,
};

pub(crate) fn write_settings<W: Write>(
    out: &mut W,
    preferences: &Preferences,
) -> io::Result<()> {
    let width = SettingKey::ALL
        .iter()
        .map(|key| key.name().len())
        .max()
        .unwrap_or_default();
    for key in SettingKey::ALL {
        writeln!(out, "{:width$}  {}", key.name(), preferences.value(key))?;
    }
    Ok(())
}

pub(crate) fn write_themes<W: Write>(
    out: &mut W,
    themes: &[PresetTheme],
) -> io::Result<()> {
    if themes.is_empty() {
        return writeln!(out, "no saved themes");
    }

    for theme in themes {
        writeln!(
            out,
            "{}\t{}\t{} {} radius={} sidebar={} header={}",
            theme.id(),
            theme.name(),
            theme.color_scheme(),
            theme.accent_color(),
            theme.border_radius(),
            theme.sidebar_style(),
            theme.header_style(),
        )?;
    }
    Ok(())
}

pub(crate) fn write_projection<W: Write>(
    out: &mut W,
    projection: &Projection,
    signals: &EnvironmentSignals,
) -> io::Result<()> {
    writeln!(out, "mode: {}", projection.mode().class())?;
    writeln!(
        out,
        "viewport: {}px mobile={} tablet={} reduced-motion={}",
        signals.viewport_width,
        signals.is_mobile(),
        signals.is_tablet(),
        signals.is_reduced_motion(),
    )?;

    writeln!(out, "variables:")?;
    for (name, value) in projection.variables() {
        writeln!(out, "  {name}: {value}")?;
    }

    let classes: Vec<&str> =
        projection.classes().iter().map(String::as_str).collect();
    writeln!(out, "classes: {}", classes.join(" "))
}

#[cfg(test)]
mod tests {
    use portal_prefs::{
        ColorScheme, EnvironmentSignals, MemoryEnvironment, MemoryStorage,
        PreferencesStore,
    };

    use super::{write_projection, write_settings, write_themes};

    #[test]
    fn given_default_preferences_when_written_then_every_setting_listed() {
        let store = PreferencesStore::new(
            MemoryStorage::new(),
            MemoryEnvironment::new(),
        );
        let mut out = Vec::new();

        write_settings(&mut out, store.preferences()).expect("write succeeds");
        let text = String::from_utf8(out).expect("utf-8");

        assert_eq!(text.lines().count(), 17);
        assert!(text.lines().any(|line| {
            line.starts_with("colorScheme") && line.ends_with("system")
        }));
    }

    #[test]
    fn given_no_themes_when_written_then_placeholder_shown() {
        let mut out = Vec::new();

        write_themes(&mut out, &[]).expect("write succeeds");

        assert_eq!(out, b"no saved themes\n");
    }

    #[test]
    fn given_dark_scheme_when_projection_written_then_mode_and_vars_listed() {
        let mut store = PreferencesStore::new(
            MemoryStorage::new(),
            MemoryEnvironment::new(),
        );
        store.set_color_scheme(ColorScheme::Dark);
        let mut out = Vec::new();

        write_projection(
            &mut out,
            store.projection(),
            &EnvironmentSignals::default(),
        )
        .expect("write succeeds");
        let text = String::from_utf8(out).expect("utf-8");

        assert!(text.starts_with("mode: dark\n"));
        assert!(text.contains("  --accent-color: #3b82f6\n"));
        assert!(text.contains("classes: "));
    }
}
