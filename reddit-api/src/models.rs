use crate::error::RedditApiError;
use serde::Deserialize;

/// A self post, as much of it as the tool displays.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
}

// Wire shapes. Reddit wraps everything twice: an api_type=json envelope
// for writes, a Listing of kinded children for reads.

#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope {
    pub json: ApiJson,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiJson {
    #[serde(default)]
    pub errors: Vec<Vec<serde_json::Value>>,
    pub data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitData {
    pub id: Option<String>,
    pub name: Option<String>,
}

// A media asset lease: a pre-signed S3 form handed back by
// /api/media/asset.json. The upload action arrives scheme-relative and the
// asset's final URL is the action plus the form's `key` field.

#[derive(Debug, Deserialize)]
pub(crate) struct MediaLease {
    pub args: LeaseArgs,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaseArgs {
    pub action: String,
    #[serde(default)]
    pub fields: Vec<LeaseField>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeaseField {
    pub name: String,
    pub value: String,
}

impl MediaLease {
    pub(crate) fn upload_url(&self) -> String {
        match self.args.action.strip_prefix("//") {
            Some(rest) => format!("https://{rest}"),
            None => self.args.action.clone(),
        }
    }

    pub(crate) fn key(&self) -> Result<&str, RedditApiError> {
        self.args
            .fields
            .iter()
            .find(|f| f.name == "key")
            .map(|f| f.value.as_str())
            .ok_or_else(|| RedditApiError::Api("upload lease carried no key field".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub data: Post,
}

/// Extract the created post id from a submit/edit envelope, surfacing the
/// API's own error list if present.
pub(crate) fn parse_envelope(body: &str) -> Result<Option<String>, RedditApiError> {
    let envelope: ApiEnvelope = serde_json::from_str(body)?;

    if let Some(first) = envelope.json.errors.first() {
        let detail = first
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(": ");
        return Err(RedditApiError::Api(detail));
    }

    Ok(envelope.json.data.and_then(|d| {
        d.id.or_else(|| d.name.map(|n| n.trim_start_matches("t3_").to_string()))
    }))
}

pub(crate) fn parse_listing(body: &str) -> Result<Post, RedditApiError> {
    let listing: Listing = serde_json::from_str(body)?;
    listing
        .data
        .children
        .into_iter()
        .next()
        .map(|thing| thing.data)
        .ok_or(RedditApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_submit_response() {
        let body = r#"{"json": {"errors": [], "data": {"id": "1abc2d", "name": "t3_1abc2d", "url": "https://reddit.com/r/test/1abc2d"}}}"#;
        assert_eq!(parse_envelope(body).unwrap().as_deref(), Some("1abc2d"));
    }

    #[test]
    fn surfaces_api_errors_from_the_envelope() {
        let body = r#"{"json": {"errors": [["SUBREDDIT_NOEXIST", "that subreddit doesn't exist", "sr"]]}}"#;
        match parse_envelope(body) {
            Err(RedditApiError::Api(detail)) => {
                assert!(detail.contains("SUBREDDIT_NOEXIST"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn lease_resolves_upload_url_and_key() {
        let body = r#"{"args": {
            "action": "//reddit-uploaded-media.s3-accelerate.amazonaws.com",
            "fields": [
                {"name": "acl", "value": "private"},
                {"name": "key", "value": "abc/def.png"}
            ]
        }, "asset": {"asset_id": "xyz"}}"#;
        let lease: MediaLease = serde_json::from_str(body).unwrap();
        assert_eq!(
            lease.upload_url(),
            "https://reddit-uploaded-media.s3-accelerate.amazonaws.com"
        );
        assert_eq!(lease.key().unwrap(), "abc/def.png");
    }

    #[test]
    fn lease_without_key_is_an_api_error() {
        let body = r#"{"args": {"action": "//host", "fields": []}}"#;
        let lease: MediaLease = serde_json::from_str(body).unwrap();
        assert!(matches!(lease.key(), Err(RedditApiError::Api(_))));
    }

    #[test]
    fn parses_an_info_listing() {
        let body = r#"{"kind": "Listing", "data": {"children": [
            {"kind": "t3", "data": {
                "id": "1abc2d",
                "title": "A post",
                "selftext": "words",
                "author": "someone",
                "subreddit": "test",
                "permalink": "/r/test/comments/1abc2d/a_post/"
            }}
        ]}}"#;
        let post = parse_listing(body).unwrap();
        assert_eq!(post.id, "1abc2d");
        assert_eq!(post.subreddit, "test");
    }

    #[test]
    fn empty_listing_is_not_found() {
        let body = r#"{"kind": "Listing", "data": {"children": []}}"#;
        assert!(matches!(parse_listing(body), Err(RedditApiError::NotFound)));
    }
}
