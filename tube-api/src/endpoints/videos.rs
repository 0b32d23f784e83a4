use super::{PageInfo, VideoId};
use crate::TubeApiError;
use crate::macros::setter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{EmptyResponse, Method, Request, RequestData};

// Common

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: VideoId,
    pub snippet: VideoSnippet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_details: Option<ContentDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<super::ChannelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    pub privacy_status: PrivacyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_declared_made_for_kids: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    pub duration: Option<String>,
    pub definition: Option<String>,
}

/// The provider serializes counters as decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    #[default]
    Private,
    Unlisted,
}

impl std::fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
            Self::Unlisted => write!(f, "unlisted"),
        }
    }
}

impl std::str::FromStr for PrivacyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "unlisted" => Ok(Self::Unlisted),
            other => Err(format!(
                "invalid privacy status '{other}': expected public, private or unlisted"
            )),
        }
    }
}

// Requests

#[derive(Debug, Clone, Serialize)]
pub struct GetVideo {
    id: VideoId,
    part: String,
}

impl GetVideo {
    pub fn new(id: VideoId) -> Self {
        Self {
            id,
            part: "snippet,contentDetails,statistics".to_string(),
        }
    }

    setter!(part: String);
}

impl Request for GetVideo {
    type Data = Self;
    type Response = VideoListResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/videos".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    pub items: Vec<Video>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
}

impl VideoListResponse {
    /// Single-item lookups must never yield an empty success.
    pub fn into_video(self) -> Result<Video, TubeApiError> {
        self.items.into_iter().next().ok_or(TubeApiError::NotFound)
    }
}

/// Full-record replacement of a video's snippet. The caller is expected to
/// fetch the current snippet, overlay changes with [`apply_update`], and
/// submit the whole record back.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateVideo {
    id: VideoId,
    snippet: VideoSnippet,
}

impl UpdateVideo {
    pub fn new(id: VideoId, snippet: VideoSnippet) -> Self {
        Self { id, snippet }
    }
}

impl Request for UpdateVideo {
    type Data = Self;
    type Response = Video;
    const METHOD: Method = Method::PUT;

    fn endpoint(&self) -> Cow<'_, str> {
        "/videos?part=snippet".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Json(self)
    }
}

/// Caller-supplied fields for an update. Empty strings count as "not
/// supplied", matching the interactive form leaving a field blank.
#[derive(Default, Debug, Clone)]
pub struct SnippetUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl SnippetUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(opt title: String);
    setter!(opt description: String);

    pub fn is_empty(&self) -> bool {
        !self.title.as_deref().is_some_and(|t| !t.is_empty())
            && !self.description.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Overlay the non-empty fields of `update` onto a fetched snippet. Every
/// other field is left untouched so the write-back is a faithful
/// replacement of the current record.
pub fn apply_update(snippet: &mut VideoSnippet, update: &SnippetUpdate) {
    if let Some(title) = update.title.as_deref() {
        if !title.is_empty() {
            snippet.title = title.to_string();
        }
    }
    if let Some(description) = update.description.as_deref() {
        if !description.is_empty() {
            snippet.description = description.to_string();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteVideo {
    id: VideoId,
}

impl DeleteVideo {
    pub fn new(id: VideoId) -> Self {
        Self { id }
    }
}

impl Request for DeleteVideo {
    type Data = Self;
    type Response = EmptyResponse;
    const METHOD: Method = Method::DELETE;

    fn endpoint(&self) -> Cow<'_, str> {
        "/videos".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet() -> VideoSnippet {
        VideoSnippet {
            title: "Original title".to_string(),
            description: "Original description".to_string(),
            published_at: None,
            channel_id: None,
            channel_title: Some("A channel".to_string()),
            tags: Some(vec!["one".to_string(), "two".to_string()]),
            category_id: Some("22".to_string()),
        }
    }

    #[test]
    fn update_with_no_fields_is_a_noop() {
        let mut current = snippet();
        let before = serde_json::to_string(&current).unwrap();

        apply_update(&mut current, &SnippetUpdate::new());

        assert_eq!(serde_json::to_string(&current).unwrap(), before);
    }

    #[test]
    fn empty_strings_count_as_not_supplied() {
        let mut current = snippet();
        let before = serde_json::to_string(&current).unwrap();

        let update = SnippetUpdate::new().title("").description("");
        assert!(update.is_empty());
        apply_update(&mut current, &update);

        assert_eq!(serde_json::to_string(&current).unwrap(), before);
    }

    #[test]
    fn update_overlays_only_supplied_fields() {
        let mut current = snippet();
        apply_update(&mut current, &SnippetUpdate::new().title("New title"));

        assert_eq!(current.title, "New title");
        assert_eq!(current.description, "Original description");
        assert_eq!(current.tags, Some(vec!["one".to_string(), "two".to_string()]));
    }

    #[test]
    fn empty_lookup_response_is_not_found() {
        let response = VideoListResponse {
            items: vec![],
            page_info: None,
        };
        assert!(matches!(
            response.into_video(),
            Err(TubeApiError::NotFound)
        ));
    }

    #[test]
    fn video_round_trips_through_provider_shape() {
        let json = r#"{
            "id": "abc123",
            "snippet": {
                "title": "A video",
                "description": "Words",
                "categoryId": "22",
                "tags": ["x"]
            },
            "status": {"privacyStatus": "unlisted"}
        }"#;
        let video: Video = serde_json::from_str(json).unwrap();
        assert_eq!(video.id.as_str(), "abc123");
        assert_eq!(
            video.status.unwrap().privacy_status,
            PrivacyStatus::Unlisted
        );
    }
}
