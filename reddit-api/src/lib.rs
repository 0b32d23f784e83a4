mod error;
mod models;

pub use error::RedditApiError;
pub use models::Post;

use models::{parse_envelope, parse_listing, MediaLease};
use serde::Deserialize;
use std::path::Path;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Script-app credential quadruplet plus the user agent Reddit requires.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl RedditCredentials {
    /// `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET`, `REDDIT_USERNAME`,
    /// `REDDIT_PASSWORD`, `REDDIT_USER_AGENT`. Any missing variable fails
    /// the first Reddit operation.
    pub fn from_env() -> Result<Self, RedditApiError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("REDDIT"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

pub struct Client {
    http: reqwest::Client,
    access_token: String,
    user_agent: String,
}

impl Client {
    /// Password-grant login. The token is held for the client's lifetime;
    /// this is a single-user, single-session tool.
    pub async fn login(credentials: RedditCredentials) -> Result<Self, RedditApiError> {
        let http = reqwest::Client::new();

        let response = http
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(reqwest::header::USER_AGENT, &credentials.user_agent)
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<TokenResponse>()
            .await?;

        let access_token = match (response.access_token, response.error) {
            (Some(token), _) => token,
            (None, Some(error)) => return Err(RedditApiError::Auth(error)),
            (None, None) => {
                return Err(RedditApiError::Auth("no access token in response".to_string()));
            }
        };

        tracing::debug!("authenticated with Reddit");
        Ok(Self {
            http,
            access_token,
            user_agent: credentials.user_agent,
        })
    }

    pub async fn submit_self_post(
        &self,
        subreddit: &str,
        title: &str,
        text: &str,
    ) -> Result<String, RedditApiError> {
        let body = self
            .post_form(
                "/api/submit",
                &[
                    ("api_type", "json"),
                    ("kind", "self"),
                    ("sr", subreddit),
                    ("title", title),
                    ("text", text),
                ],
            )
            .await?;

        parse_envelope(&body)?
            .ok_or_else(|| RedditApiError::Api("submit response carried no post id".to_string()))
    }

    /// Create a link post to an uploaded image. Media submits are announced
    /// out of band, so the envelope may carry no post id.
    pub async fn submit_image_post(
        &self,
        subreddit: &str,
        title: &str,
        image_path: &Path,
    ) -> Result<Option<String>, RedditApiError> {
        let url = self.upload_media(image_path).await?;
        let body = self
            .post_form(
                "/api/submit",
                &[
                    ("api_type", "json"),
                    ("kind", "image"),
                    ("sr", subreddit),
                    ("title", title),
                    ("url", url.as_str()),
                ],
            )
            .await?;

        parse_envelope(&body)
    }

    pub async fn submit_video_post(
        &self,
        subreddit: &str,
        title: &str,
        video_path: &Path,
    ) -> Result<Option<String>, RedditApiError> {
        let url = self.upload_media(video_path).await?;
        // The submit endpoint requires a poster frame for videos; a blank
        // one stands in when the caller has no thumbnail.
        let poster_url = self
            .upload_media_bytes("poster.png", "image/png", BLANK_POSTER_PNG.to_vec())
            .await?;
        let body = self
            .post_form(
                "/api/submit",
                &[
                    ("api_type", "json"),
                    ("kind", "video"),
                    ("sr", subreddit),
                    ("title", title),
                    ("url", url.as_str()),
                    ("video_poster_url", poster_url.as_str()),
                ],
            )
            .await?;

        parse_envelope(&body)
    }

    async fn upload_media(&self, path: &Path) -> Result<String, RedditApiError> {
        let mimetype = media_mimetype(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        self.upload_media_bytes(&filename, mimetype, bytes).await
    }

    /// Lease a media asset slot, then push the bytes to the pre-signed
    /// form. Returns the asset URL the submit endpoint expects.
    async fn upload_media_bytes(
        &self,
        filename: &str,
        mimetype: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RedditApiError> {
        let body = self
            .post_form(
                "/api/media/asset.json",
                &[("filepath", filename), ("mimetype", mimetype)],
            )
            .await?;
        let lease: MediaLease = serde_json::from_str(&body)?;
        let upload_url = lease.upload_url();
        let asset_url = format!("{}/{}", upload_url, lease.key()?);

        let mut form = reqwest::multipart::Form::new();
        for field in lease.args.fields {
            form = form.text(field.name, field.value);
        }
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mimetype)?;
        form = form.part("file", part);

        self.http
            .post(&upload_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(url = %asset_url, "media asset uploaded");
        Ok(asset_url)
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, RedditApiError> {
        let response = self
            .http
            .get(format!("{API_BASE}/api/info"))
            .query(&[("id", fullname(id))])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;

        parse_listing(&response.text().await?)
    }

    pub async fn edit_post(&self, id: &str, text: &str) -> Result<(), RedditApiError> {
        let body = self
            .post_form(
                "/api/editusertext",
                &[
                    ("api_type", "json"),
                    ("thing_id", fullname(id).as_str()),
                    ("text", text),
                ],
            )
            .await?;

        parse_envelope(&body)?;
        Ok(())
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), RedditApiError> {
        self.post_form("/api/del", &[("id", fullname(id).as_str())])
            .await?;
        Ok(())
    }

    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<String, RedditApiError> {
        let response = self
            .http
            .post(format!("{API_BASE}{endpoint}"))
            .bearer_auth(&self.access_token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .form(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

// 1x1 transparent PNG, the poster frame used when no thumbnail is supplied.
const BLANK_POSTER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0B, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x60,
    0x00, 0x02, 0x00, 0x00, 0x05, 0x00, 0x01, 0x7A, 0x5E, 0xAB, 0x3F, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// The lease endpoint wants a mimetype up front; it is sniffed from the
/// file extension the way the upload widget does.
fn media_mimetype(path: &Path) -> Result<&'static str, RedditApiError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => Ok("image/png"),
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("gif") => Ok("image/gif"),
        Some("mp4") => Ok("video/mp4"),
        Some("mov") => Ok("video/quicktime"),
        _ => Err(RedditApiError::UnsupportedMedia(
            path.display().to_string(),
        )),
    }
}

/// Post ids travel as `t3_`-prefixed fullnames on the wire; bare ids are
/// accepted everywhere in this crate.
fn fullname(id: &str) -> String {
    if id.starts_with("t3_") {
        id.to_string()
    } else {
        format!("t3_{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ids_get_the_link_prefix() {
        assert_eq!(fullname("1abc2d"), "t3_1abc2d");
        assert_eq!(fullname("t3_1abc2d"), "t3_1abc2d");
    }

    #[test]
    fn mimetypes_follow_the_extension() {
        assert_eq!(media_mimetype(Path::new("a.PNG")).unwrap(), "image/png");
        assert_eq!(media_mimetype(Path::new("b.jpeg")).unwrap(), "image/jpeg");
        assert_eq!(media_mimetype(Path::new("c.mp4")).unwrap(), "video/mp4");
        assert!(matches!(
            media_mimetype(Path::new("d.webm")),
            Err(RedditApiError::UnsupportedMedia(_))
        ));
        assert!(matches!(
            media_mimetype(Path::new("no_extension")),
            Err(RedditApiError::UnsupportedMedia(_))
        ));
    }

    #[test]
    fn poster_placeholder_is_a_png() {
        assert_eq!(&BLANK_POSTER_PNG[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&BLANK_POSTER_PNG[12..16], b"IHDR");
    }
}
