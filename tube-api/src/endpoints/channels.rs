use super::ChannelId;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub snippet: ChannelSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
}

/// The remote account's channel, resolved once per session. Read-only after
/// verification; downstream operations assume it exists.
#[derive(Debug, Clone)]
pub struct ChannelIdentity {
    pub id: ChannelId,
    pub title: String,
}

impl From<Channel> for ChannelIdentity {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            title: channel.snippet.title,
        }
    }
}

// Requests

#[derive(Debug, Clone, Serialize)]
pub struct ListMyChannels {
    part: String,
    mine: bool,
}

impl ListMyChannels {
    pub fn new() -> Self {
        Self {
            part: "id,snippet".to_string(),
            mine: true,
        }
    }
}

impl Default for ListMyChannels {
    fn default() -> Self {
        Self::new()
    }
}

impl Request for ListMyChannels {
    type Data = Self;
    type Response = ChannelListResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/channels".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<Channel>,
}

impl ChannelListResponse {
    /// `None` means the authenticated account has no channel at all.
    pub fn into_identity(self) -> Option<ChannelIdentity> {
        self.items.into_iter().next().map(ChannelIdentity::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_comes_from_the_first_channel() {
        let json = r#"{"items": [
            {"id": "UC1", "snippet": {"title": "Main channel", "description": ""}},
            {"id": "UC2", "snippet": {"title": "Second channel", "description": ""}}
        ]}"#;
        let response: ChannelListResponse = serde_json::from_str(json).unwrap();
        let identity = response.into_identity().unwrap();
        assert_eq!(identity.id.as_str(), "UC1");
        assert_eq!(identity.title, "Main channel");
    }

    #[test]
    fn missing_items_means_no_channel() {
        let response: ChannelListResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_identity().is_none());
    }
}
