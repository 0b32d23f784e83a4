mod error;
mod listener;
mod models;
mod oauth;
mod secrets;
mod settings;
mod token_store;

pub use error::AuthError;
pub use listener::{CallbackListener, DEFAULT_PORT_START, MAX_PORT_ATTEMPTS};
pub use models::{StoredToken, TokenPair};
pub use oauth::{generate_state_token, OAuthClient, SCOPES};
pub use secrets::{ClientSecrets, InstalledApp};
pub use settings::Settings;
pub use token_store::TokenStore;

use std::path::PathBuf;

/// Return a valid, non-expired credential, acquiring or refreshing one as
/// needed. The refresh-then-reauthorize fallback is the only retry built
/// into the system.
pub async fn obtain(settings: &Settings) -> Result<StoredToken, AuthError> {
    settings
        .validate()
        .map_err(AuthError::Configuration)?;

    let token_store = match &settings.token_path {
        Some(path) => TokenStore::at(PathBuf::from(path)),
        None => TokenStore::new()?,
    };

    obtain_with(settings, &token_store).await
}

pub async fn obtain_with(
    settings: &Settings,
    token_store: &TokenStore,
) -> Result<StoredToken, AuthError> {
    match next_step(token_store, token_store.load_token()?) {
        NextStep::UseStored(token) => Ok(token),
        NextStep::Refresh { refresh_token } => {
            tracing::info!("access token expired, attempting refresh");
            let app = ClientSecrets::resolve(settings)?;
            let redirect = settings
                .redirect_uri
                .clone()
                .unwrap_or_else(|| format!("http://localhost:{}/", DEFAULT_PORT_START));
            let oauth = OAuthClient::new(&app, redirect)?;

            match oauth.refresh_access_token(&refresh_token).await {
                Ok(pair) => {
                    let token = StoredToken::from(pair);
                    token_store.save_token(&token)?;
                    Ok(token)
                }
                Err(e) => {
                    // A failed refresh falls through to a full
                    // re-authorization.
                    tracing::warn!(error = %e, "token refresh failed, re-authorizing");
                    token_store.delete_token()?;
                    interactive(settings, token_store).await
                }
            }
        }
        NextStep::Reauthorize => interactive(settings, token_store).await,
    }
}

#[derive(Debug)]
enum NextStep {
    UseStored(StoredToken),
    Refresh { refresh_token: String },
    Reauthorize,
}

/// An expired credential that still carries a refresh token is always
/// refreshed first; the interactive flow is the last resort.
fn next_step(token_store: &TokenStore, stored: Option<StoredToken>) -> NextStep {
    match stored {
        Some(token) if !token_store.is_token_expired(&token) => NextStep::UseStored(token),
        Some(token) => match token.refresh_token {
            Some(refresh_token) => NextStep::Refresh { refresh_token },
            None => NextStep::Reauthorize,
        },
        None => NextStep::Reauthorize,
    }
}

/// Interactive installed-app flow: bind a local callback listener, open
/// the consent page, block until the provider redirects back with a grant.
async fn interactive(
    settings: &Settings,
    token_store: &TokenStore,
) -> Result<StoredToken, AuthError> {
    let app = ClientSecrets::resolve(settings)?;

    // The listener is bound before anything touches the network, so port
    // exhaustion fails without a single request sent.
    let listener = CallbackListener::bind(DEFAULT_PORT_START, MAX_PORT_ATTEMPTS).await?;
    let redirect = settings
        .redirect_uri
        .clone()
        .unwrap_or_else(|| listener.redirect_uri());

    let oauth = OAuthClient::new(&app, redirect)?;
    let state = generate_state_token();
    let auth_url = oauth.build_authorization_url(&state);

    if let Err(e) = open::that(&auth_url) {
        tracing::warn!(error = %e, "failed to open browser automatically");
        println!("Please open this URL in your browser:\n{}\n", auth_url);
    } else {
        println!("Browser opened. Please authorize the application...");
    }

    println!("Waiting for authorization...");
    let code = listener.wait_for_grant(&state).await?;

    let token = StoredToken::from(oauth.exchange_code(&code).await?);
    token_store.save_token(&token)?;
    tracing::info!("credentials saved");

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn token(expires_in: Duration, refresh_token: Option<&str>) -> StoredToken {
        StoredToken {
            access_token: "access".to_string(),
            refresh_token: refresh_token.map(String::from),
            expires_at: Utc::now() + expires_in,
            scopes: vec![],
        }
    }

    fn settings_without_secrets() -> Settings {
        Settings {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            client_secrets: "does_not_exist.json".to_string(),
            token_path: None,
        }
    }

    fn store_in(dir: &TempDir) -> TokenStore {
        TokenStore::at(dir.path().join("token.json"))
    }

    #[test]
    fn unexpired_token_is_used_as_is() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let step = next_step(&store, Some(token(Duration::hours(1), Some("r"))));
        assert!(matches!(step, NextStep::UseStored(_)));
    }

    #[test]
    fn expired_token_with_refresh_token_never_reauthorizes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let step = next_step(&store, Some(token(Duration::hours(-1), Some("r"))));
        assert!(matches!(step, NextStep::Refresh { .. }));

        // Inside the expiry buffer counts as expired too.
        let step = next_step(&store, Some(token(Duration::minutes(3), Some("r"))));
        assert!(matches!(step, NextStep::Refresh { .. }));
    }

    #[test]
    fn expired_token_without_refresh_token_reauthorizes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let step = next_step(&store, Some(token(Duration::hours(-1), None)));
        assert!(matches!(step, NextStep::Reauthorize));
    }

    #[test]
    fn missing_token_reauthorizes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(matches!(next_step(&store, None), NextStep::Reauthorize));
    }

    #[tokio::test]
    async fn valid_stored_token_short_circuits_the_whole_ladder() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save_token(&token(Duration::hours(1), Some("r")))
            .unwrap();

        // The settings name a nonexistent secrets file: any attempt to
        // resolve secrets or talk to the network would fail this test.
        let got = obtain_with(&settings_without_secrets(), &store)
            .await
            .unwrap();
        assert_eq!(got.access_token, "access");
    }
}
