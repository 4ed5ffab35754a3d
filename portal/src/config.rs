use std::ffi::OsString;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "portal";
const PREFERENCES_FILE: &str = "preferences.json";

/// Resolve the preferences file: explicit override first, then
/// `$HOME/.config/portal/preferences.json`, then the temp dir.
pub(crate) fn storage_path(override_path: Option<PathBuf>) -> PathBuf {
    match override_path {
        Some(path) => path,
        None => default_storage_path(std::env::var_os("HOME")),
    }
}

fn default_storage_path(home: Option<OsString>) -> PathBuf {
    if let Some(home) = home {
        return Path::new(&home)
            .join(".config")
            .join(APP_DIR)
            .join(PREFERENCES_FILE);
    }

    std::env::temp_dir().join(APP_DIR).join(PREFERENCES_FILE)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::PathBuf;

    use super::{default_storage_path, storage_path};

    #[test]
    fn given_home_when_resolving_default_path_then_uses_config_dir() {
        let path = default_storage_path(Some(OsString::from("/home/student")));

        assert_eq!(
            path,
            PathBuf::from("/home/student/.config/portal/preferences.json")
        );
    }

    #[test]
    fn given_no_home_when_resolving_default_path_then_uses_temp_dir() {
        let path = default_storage_path(None);

        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with("portal/preferences.json"));
    }

    #[test]
    fn given_override_when_resolving_then_override_wins() {
        let custom = PathBuf::from("/tmp/custom-prefs.json");

        assert_eq!(storage_path(Some(custom.clone())), custom);
    }
}
