use super::{PageInfo, VideoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::{Request, RequestData};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: SearchSnippet,
}

/// Search results carry a compound id; only video hits have a `videoId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<VideoId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
}

// Requests

/// Up to `max_results` most-recent videos owned by the authenticated
/// account. First page only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMyVideos {
    part: String,
    for_mine: bool,
    #[serde(rename = "type")]
    kind: String,
    max_results: u32,
}

impl SearchMyVideos {
    pub fn new(max_results: u32) -> Self {
        Self {
            part: "snippet".to_string(),
            for_mine: true,
            kind: "video".to_string(),
            max_results,
        }
    }
}

impl Request for SearchMyVideos {
    type Data = Self;
    type Response = SearchListResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/search".into()
    }

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Query(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_provider_parameter_names() {
        let req = SearchMyVideos::new(10);
        let query = serde_json::to_value(&req).unwrap();
        assert_eq!(query["forMine"], true);
        assert_eq!(query["type"], "video");
        assert_eq!(query["maxResults"], 10);
    }

    #[test]
    fn non_video_hits_have_no_video_id() {
        let json = r#"{"items": [{"id": {}, "snippet": {"title": "t", "description": ""}}]}"#;
        let response: SearchListResponse = serde_json::from_str(json).unwrap();
        assert!(response.items[0].id.video_id.is_none());
    }
}
