//! Optional settings file.

use serde::{Deserialize, Serialize};
use snailmail_core::Error;
use std::io;
use std::path::{Path, PathBuf};

/// Defaults read from `settings.json`. Command-line flags win over these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// From address.
    pub sender: Option<String>,
    /// Mail host.
    pub mailhost: Option<String>,
    /// Mail host port.
    pub port: Option<u16>,
    /// Login name.
    pub username: Option<String>,
    /// Base wait between mails, in seconds.
    pub wait: Option<i64>,
    /// Name announced in EHLO.
    pub helo_name: Option<String>,
}

impl Settings {
    /// `<config dir>/snailmail/settings.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snailmail")
            .join("settings.json")
    }

    /// Loads settings; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileAccess`] if the file exists but cannot be read and
    /// [`Error::Config`] if it is not valid settings JSON.
    pub async fn load(path: &Path) -> snailmail_core::Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file");
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::file_access(path, e)),
        };

        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.json")).await.unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn partial_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"mailhost": "smtp.x.com", "port": 587}"#).unwrap();

        let settings = Settings::load(&path).await.unwrap();
        assert_eq!(settings.mailhost.as_deref(), Some("smtp.x.com"));
        assert_eq!(settings.port, Some(587));
        assert_eq!(settings.sender, None);
    }

    #[tokio::test]
    async fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"port": "not a number"}"#).unwrap();

        let err = Settings::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn default_path_ends_in_app_dir() {
        assert!(Settings::default_path().ends_with("snailmail/settings.json"));
    }
}
