use super::{UploadBody, UploadError};
use crate::endpoints::videos::Video;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, LOCATION, RANGE};

const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";

/// Provider-assigned URI identifying one resumable transfer.
#[derive(Debug, Clone)]
pub struct SessionUri(String);

impl SessionUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the provider answered for one transferred chunk.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// Intermediate acknowledgement: `received` bytes are safely stored.
    Resume { received: u64 },
    /// Terminal response carrying the created resource.
    Done(Video),
}

/// Capability seam between the upload state machine and the wire. The
/// machine only ever needs to start a session and push one chunk, so tests
/// can drive it with a fake.
pub trait ResumableTransport {
    fn begin(
        &self,
        body: &UploadBody,
        total_len: u64,
    ) -> impl Future<Output = Result<SessionUri, UploadError>>;

    fn put_chunk(
        &self,
        uri: &SessionUri,
        offset: u64,
        chunk: Vec<u8>,
        total_len: u64,
    ) -> impl Future<Output = Result<ChunkOutcome, UploadError>>;
}

/// Production transport speaking the provider's resumable protocol.
pub struct HttpTransport {
    http: reqwest::Client,
    access_token: String,
}

impl HttpTransport {
    pub fn new(access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: access_token.to_string(),
        }
    }
}

impl ResumableTransport for HttpTransport {
    async fn begin(&self, body: &UploadBody, total_len: u64) -> Result<SessionUri, UploadError> {
        let response = self
            .http
            .post(UPLOAD_URL)
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Length", total_len)
            .header("X-Upload-Content-Type", "video/*")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_rejection(status, detail));
        }

        let uri = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                UploadError::Session("provider did not return a session URI".to_string())
            })?;

        tracing::debug!(total_len, "resumable upload session opened");
        Ok(SessionUri::new(uri))
    }

    async fn put_chunk(
        &self,
        uri: &SessionUri,
        offset: u64,
        chunk: Vec<u8>,
        total_len: u64,
    ) -> Result<ChunkOutcome, UploadError> {
        let end = offset + chunk.len() as u64 - 1;
        let response = self
            .http
            .put(uri.as_str())
            .bearer_auth(&self.access_token)
            .header(CONTENT_RANGE, format!("bytes {offset}-{end}/{total_len}"))
            .body(chunk)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            // 308 Resume Incomplete: the Range header acknowledges how far
            // the provider got.
            308 => {
                let received = response
                    .headers()
                    .get(RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_range_end)
                    .map(|last| last + 1)
                    .unwrap_or(0);
                Ok(ChunkOutcome::Resume { received })
            }
            200 | 201 => {
                let video = response.json::<Video>().await?;
                Ok(ChunkOutcome::Done(video))
            }
            _ => {
                let detail = response.text().await.unwrap_or_default();
                Err(classify_rejection(status, detail))
            }
        }
    }
}

/// Transfer-level failures (interruption, quota, server hiccups) are
/// recoverable by starting a fresh session; malformed metadata is not.
fn classify_rejection(status: StatusCode, detail: String) -> UploadError {
    match status.as_u16() {
        400 | 404 | 411 => UploadError::Validation(detail),
        403 => UploadError::Transient(format!("upload rejected ({status}): {detail}")),
        408 | 500..=599 => UploadError::Transient(format!("transfer interrupted ({status})")),
        _ => UploadError::Session(format!("unexpected upload response ({status}): {detail}")),
    }
}

/// In a `Range: bytes=0-N` acknowledgement, N is the last byte the
/// provider has stored.
fn parse_range_end(value: &str) -> Option<u64> {
    value.rsplit_once('-')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_range_acknowledgement() {
        assert_eq!(parse_range_end("bytes=0-1048575"), Some(1_048_575));
        assert_eq!(parse_range_end("bytes=0-0"), Some(0));
        assert_eq!(parse_range_end("garbage"), None);
    }

    #[test]
    fn classifies_provider_rejections() {
        assert!(matches!(
            classify_rejection(StatusCode::BAD_REQUEST, String::new()),
            UploadError::Validation(_)
        ));
        assert!(matches!(
            classify_rejection(StatusCode::FORBIDDEN, String::new()),
            UploadError::Transient(_)
        ));
        assert!(matches!(
            classify_rejection(StatusCode::SERVICE_UNAVAILABLE, String::new()),
            UploadError::Transient(_)
        ));
    }
}
