use crate::error::AuthError;
use crate::settings::Settings;
use serde::Deserialize;
use std::path::Path;

/// Provider-issued application descriptor, read once at interactive-flow
/// start from the JSON file the provider's console exports.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub installed: InstalledApp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ClientSecrets {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AuthError::Configuration(format!(
                "Failed to read client secrets file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// The secrets file wins; CLIENT_ID/CLIENT_SECRET from the environment
    /// are the fallback for deployments without one.
    pub fn resolve(settings: &Settings) -> Result<InstalledApp, AuthError> {
        if Path::new(&settings.client_secrets).exists() {
            return Ok(Self::load(&settings.client_secrets)?.installed);
        }

        match (&settings.client_id, &settings.client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(InstalledApp {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                auth_uri: default_auth_uri(),
                token_uri: default_token_uri(),
                redirect_uris: Vec::new(),
            }),
            _ => Err(AuthError::Configuration(format!(
                "client secrets file {} not found and CLIENT_ID/CLIENT_SECRET are not set",
                settings.client_secrets
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_provider_export_format() {
        let json = r#"{
            "installed": {
                "client_id": "id.apps.example.com",
                "client_secret": "shhh",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost"]
            }
        }"#;
        let secrets: ClientSecrets = serde_json::from_str(json).unwrap();
        assert_eq!(secrets.installed.client_id, "id.apps.example.com");
        assert_eq!(secrets.installed.redirect_uris.len(), 1);
    }

    #[test]
    fn missing_uris_fall_back_to_provider_defaults() {
        let json = r#"{"installed": {"client_id": "id", "client_secret": "s"}}"#;
        let secrets: ClientSecrets = serde_json::from_str(json).unwrap();
        assert!(secrets.installed.token_uri.contains("googleapis.com"));
    }

    #[test]
    fn missing_file_is_fatal_for_the_flow() {
        let result = ClientSecrets::load("/no/such/client_secrets.json");
        assert!(matches!(result, Err(AuthError::Configuration(_))));
    }
}
