use config::{Config, ConfigError};
use serde::Deserialize;

/// Out-of-band configuration, supplied through the environment (optionally
/// via a `.env` file loaded by the binary). Each field is validated by the
/// first component that needs it.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    #[serde(default = "default_client_secrets_path")]
    pub client_secrets: String,
    pub token_path: Option<String>,
}

fn default_client_secrets_path() -> String {
    "client_secrets.json".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(uri) = &self.redirect_uri {
            if !uri.starts_with("http") {
                return Err("REDIRECT_URI must be a valid HTTP(S) URL".to_string());
            }
        }
        Ok(())
    }
}
