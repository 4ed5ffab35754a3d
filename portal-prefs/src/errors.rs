use thiserror::Error;

/// Errors returned to callers of the preferences store.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// The value is outside the setting's domain; state was not changed.
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },
    /// No setting is registered under this name.
    #[error("unknown setting `{0}`")]
    UnknownSetting(String),
    /// Settings import payload was not a JSON object.
    #[error("settings import expects a JSON object")]
    InvalidImport,
}

impl PreferencesError {
    pub(crate) fn invalid(
        key: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }
}

/// Errors emitted by persistence adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage JSON failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage is unavailable")]
    Unavailable,
}

pub type Result<T> = std::result::Result<T, PreferencesError>;
