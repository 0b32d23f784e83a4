use chrono::Utc;
use oauth2::{
    basic::{BasicClient, BasicTokenResponse},
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, HttpRequest, HttpResponse,
    RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use rand::Rng;

use crate::error::AuthError;
use crate::models::TokenPair;
use crate::secrets::InstalledApp;

/// Scopes required for content operations on the authenticated channel.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/youtube.force-ssl",
    "https://www.googleapis.com/auth/youtube",
];

// Simple async HTTP client for OAuth2
async fn http_client(request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
    let client = reqwest::Client::new();
    let mut builder = client
        .request(request.method().clone(), request.uri().to_string())
        .body(request.body().clone());

    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_bytes());
    }

    let response = builder.send().await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();

    let mut http_response = HttpResponse::new(body);
    *http_response.status_mut() = status;

    Ok(http_response)
}

pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
}

impl OAuthClient {
    pub fn new(app: &InstalledApp, redirect_uri: String) -> Result<Self, AuthError> {
        let auth_url = AuthUrl::new(app.auth_uri.clone())
            .map_err(|e| AuthError::Configuration(format!("Invalid auth URL: {}", e)))?;

        let token_url = TokenUrl::new(app.token_uri.clone())
            .map_err(|e| AuthError::Configuration(format!("Invalid token URL: {}", e)))?;

        let redirect_url = RedirectUrl::new(redirect_uri)
            .map_err(|e| AuthError::Configuration(format!("Invalid redirect URI: {}", e)))?;

        Ok(Self {
            client_id: app.client_id.clone(),
            client_secret: app.client_secret.clone(),
            auth_url,
            token_url,
            redirect_url,
        })
    }

    /// Build the consent URL with a state parameter for CSRF protection.
    /// Offline access is requested so the grant carries a refresh token.
    pub fn build_authorization_url(&self, state: &str) -> String {
        let csrf_token = CsrfToken::new(state.to_string());
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone());
        let mut request = client.authorize_url(|| csrf_token);
        for scope in SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (auth_url, _) = request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();
        auth_url.to_string()
    }

    /// Exchange an authorization grant for an access/refresh token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair, AuthError> {
        let token_result = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        let pair = self.to_token_pair(&token_result, None)?;
        tracing::debug!(expires_at = %pair.expires_at, "exchanged code for tokens");
        Ok(pair)
    }

    /// Refresh an expired access token. The provider may omit the refresh
    /// token from the response, in which case the previous one stays valid
    /// and is carried over.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let token_result = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        let pair = self.to_token_pair(&token_result, Some(refresh_token))?;
        tracing::debug!(expires_at = %pair.expires_at, "refreshed tokens");
        Ok(pair)
    }

    fn to_token_pair(
        &self,
        token_result: &BasicTokenResponse,
        prior_refresh_token: Option<&str>,
    ) -> Result<TokenPair, AuthError> {
        let access_token = token_result.access_token().secret().to_string();

        let refresh_token = token_result
            .refresh_token()
            .map(|t| t.secret().to_string())
            .or_else(|| prior_refresh_token.map(str::to_string));

        let expires_in = token_result
            .expires_in()
            .ok_or_else(|| AuthError::OAuth("No expiration time in response".to_string()))?;

        let scopes = token_result
            .scopes()
            .map(|s| s.iter().map(|scope| scope.to_string()).collect())
            .unwrap_or_else(|| SCOPES.iter().map(|s| s.to_string()).collect());

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at: Utc::now() + expires_in,
            scopes,
        })
    }
}

/// Generate a random CSRF state token
pub fn generate_state_token() -> String {
    use base64::Engine;
    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.random()).collect();
    base64::prelude::BASE64_URL_SAFE_NO_PAD.encode(&random_bytes)
}
