//! API key lookup for external services

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, error};

/// Resolves API keys from the environment, then from a JSON secrets file
///
/// For service `openweather` the variable `OPENWEATHER_API_KEY` is checked
/// first, then the `"openweather"` key of the secrets file.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    secrets_path: Option<PathBuf>,
}

impl ApiKeys {
    pub fn new(secrets_path: impl Into<PathBuf>) -> Self {
        Self {
            secrets_path: Some(secrets_path.into()),
        }
    }

    /// Lookup that only consults the environment
    pub fn env_only() -> Self {
        Self { secrets_path: None }
    }

    /// API key for a service, if one is configured
    pub fn get(&self, service: &str) -> Option<String> {
        let var = format!("{}_API_KEY", service.to_uppercase());
        if let Ok(key) = std::env::var(&var) {
            if !key.trim().is_empty() {
                debug!(service, source = "env", "api key resolved");
                return Some(key);
            }
        }

        let path = self.secrets_path.as_deref()?;
        let key = read_secret(path, service)?;
        debug!(service, source = "secrets file", "api key resolved");
        Some(key)
    }
}

fn read_secret(path: &Path, service: &str) -> Option<String> {
    if !path.exists() {
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to read secrets file");
            return None;
        }
    };

    match serde_json::from_str::<Map<String, Value>>(&content) {
        Ok(mut secrets) => match secrets.remove(service) {
            Some(Value::String(key)) if !key.trim().is_empty() => Some(key),
            Some(Value::String(_)) | None => None,
            Some(_) => {
                error!(service, "secret is not a string");
                None
            }
        },
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to parse secrets file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".secrets");
        std::fs::write(&path, r#"{"vatest_file_service":"abc123"}"#).unwrap();

        let keys = ApiKeys::new(&path);
        assert_eq!(keys.get("vatest_file_service").as_deref(), Some("abc123"));
        assert_eq!(keys.get("vatest_other_service"), None);
    }

    #[test]
    fn test_non_string_entries_do_not_hide_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".secrets");
        std::fs::write(
            &path,
            r#"{"vatest_nested":{"token":"x"},"vatest_count":3,"vatest_plain":"k-1"}"#,
        )
        .unwrap();

        let keys = ApiKeys::new(&path);
        assert_eq!(keys.get("vatest_plain").as_deref(), Some("k-1"));
        assert_eq!(keys.get("vatest_count"), None);
        assert_eq!(keys.get("vatest_nested"), None);
    }

    #[test]
    fn test_env_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".secrets");
        std::fs::write(&path, r#"{"vatest_env_service":"from-file"}"#).unwrap();
        std::env::set_var("VATEST_ENV_SERVICE_API_KEY", "from-env");

        let keys = ApiKeys::new(&path);
        assert_eq!(keys.get("vatest_env_service").as_deref(), Some("from-env"));

        std::env::remove_var("VATEST_ENV_SERVICE_API_KEY");
    }

    #[test]
    fn test_missing_or_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".secrets");
        assert_eq!(ApiKeys::new(&path).get("vatest_missing"), None);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(ApiKeys::new(&path).get("vatest_missing"), None);
        assert_eq!(ApiKeys::env_only().get("vatest_missing"), None);
    }
}
