use anyhow::Result;
use crosspost_auth::{AuthError, Settings, StoredToken};
use tube_api::endpoints::channels::ChannelIdentity;
use tube_api::{Client, Request};

/// Caller-owned context for the video platform: one credential, one
/// verified channel, passed by reference into each operation. Replaces any
/// ambient global state.
pub struct Session {
    pub token: StoredToken,
    pub client: Client,
    pub channel: ChannelIdentity,
}

impl Session {
    /// Obtain a credential and verify the channel, in that order. Runs
    /// once per session; downstream operations assume a verified identity.
    pub async fn establish() -> Result<Self> {
        let settings = Settings::new().map_err(|e| AuthError::Configuration(e.to_string()))?;

        let token = crosspost_auth::obtain(&settings).await?;
        let client = Client::new(&token.access_token);
        let channel = verify_channel(&client).await?;

        tracing::info!(channel = %channel.title, "connected to channel");
        println!("Connected to channel: {}", channel.title);

        Ok(Self {
            token,
            client,
            channel,
        })
    }
}

/// Fails with `AuthError::NoChannel` when the authenticated account has no
/// associated channel.
pub async fn verify_channel(client: &Client) -> Result<ChannelIdentity> {
    let response = client.send(Request::channels().mine()).await?;
    Ok(response.into_identity().ok_or(AuthError::NoChannel)?)
}
