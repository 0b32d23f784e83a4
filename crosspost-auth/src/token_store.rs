use crate::error::AuthError;
use crate::models::StoredToken;
use chrono::{Duration, Utc};
use std::fs;
use std::path::PathBuf;

const EXPIRY_BUFFER: Duration = Duration::minutes(5);

pub struct TokenStore {
    token_path: PathBuf,
}

impl TokenStore {
    pub fn new() -> Result<Self, AuthError> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| AuthError::Configuration("Could not find cache directory".to_string()))?
            .join("crosspost");

        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| {
                AuthError::TokenStorage(format!("Failed to create cache directory: {}", e))
            })?;
        }

        Ok(Self {
            token_path: cache_dir.join("token.json"),
        })
    }

    /// Store backed by an explicit path. Used when the path is configured
    /// and by tests.
    pub fn at(token_path: PathBuf) -> Self {
        Self { token_path }
    }

    /// All-or-nothing persist: serialize to a sibling temp file, then
    /// rename over the target so a crash never leaves a partial token.
    pub fn save_token(&self, token: &StoredToken) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(token)?;

        let tmp_path = self.token_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| AuthError::TokenStorage(format!("Failed to save token: {}", e)))?;

        // Owner read/write only; the file holds live credentials.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&tmp_path)
                .map_err(|e| {
                    AuthError::TokenStorage(format!("Failed to get file permissions: {}", e))
                })?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp_path, perms).map_err(|e| {
                AuthError::TokenStorage(format!("Failed to set file permissions: {}", e))
            })?;
        }

        fs::rename(&tmp_path, &self.token_path)
            .map_err(|e| AuthError::TokenStorage(format!("Failed to save token: {}", e)))?;

        Ok(())
    }

    pub fn load_token(&self) -> Result<Option<StoredToken>, AuthError> {
        if !self.token_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.token_path)
            .map_err(|e| AuthError::TokenStorage(format!("Failed to read token: {}", e)))?;

        let token: StoredToken = serde_json::from_str(&json)?;
        Ok(Some(token))
    }

    pub fn delete_token(&self) -> Result<(), AuthError> {
        if self.token_path.exists() {
            fs::remove_file(&self.token_path)
                .map_err(|e| AuthError::TokenStorage(format!("Failed to delete token: {}", e)))?;
        }
        Ok(())
    }

    /// Expire tokens 5 minutes early so an in-flight operation never races
    /// the real expiry.
    pub fn is_token_expired(&self, token: &StoredToken) -> bool {
        token.expires_at <= (Utc::now() + EXPIRY_BUFFER)
    }
}
