mod transport;

pub use transport::{ChunkOutcome, HttpTransport, ResumableTransport, SessionUri};

use crate::endpoints::videos::{PrivacyStatus, Video, VideoSnippet, VideoStatus};
use crate::macros::setter;
use serde::Serialize;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Fixed transfer unit, regardless of file size.
pub const CHUNK_SIZE: u64 = 1_048_576;

const DEFAULT_CATEGORY_ID: &str = "22";

#[derive(Debug)]
pub enum UploadError {
    /// The source path does not resolve to a readable file.
    SourceNotFound(String),
    /// Zero-byte sources are rejected before any network traffic.
    EmptySource,
    /// Transient transfer failure (quota, interruption). Recoverable by
    /// creating a fresh session.
    Transient(String),
    /// Provider-side fatal rejection of the body or metadata. Not
    /// retryable without caller correction.
    Validation(String),
    /// Protocol violation or misuse of a finished session.
    Session(String),
    Http(reqwest::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::SourceNotFound(path) => write!(f, "Video file not found: {path}"),
            UploadError::EmptySource => write!(f, "Source file is empty"),
            UploadError::Transient(msg) => write!(f, "Upload failed: {msg}"),
            UploadError::Validation(msg) => write!(f, "Upload rejected: {msg}"),
            UploadError::Session(msg) => write!(f, "Upload session error: {msg}"),
            UploadError::Http(e) => write!(f, "HTTP error during upload: {e}"),
            UploadError::Io(e) => write!(f, "I/O error during upload: {e}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        UploadError::Http(e)
    }
}

impl From<std::io::Error> for UploadError {
    fn from(e: std::io::Error) -> Self {
        UploadError::Io(e)
    }
}

/// Target metadata for a new video.
#[derive(Debug, Clone)]
pub struct VideoMeta {
    title: String,
    description: String,
    privacy: PrivacyStatus,
    category_id: String,
    tags: Vec<String>,
}

impl VideoMeta {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            privacy: PrivacyStatus::default(),
            category_id: DEFAULT_CATEGORY_ID.to_string(),
            tags: Vec::new(),
        }
    }

    setter!(description: String);
    setter!(privacy: PrivacyStatus);
    setter!(category_id: String);
    setter!(tags: Vec<String>);

    fn into_body(self) -> UploadBody {
        UploadBody {
            snippet: VideoSnippet {
                title: self.title,
                description: self.description,
                published_at: None,
                channel_id: None,
                channel_title: None,
                tags: if self.tags.is_empty() {
                    None
                } else {
                    Some(self.tags)
                },
                category_id: Some(self.category_id),
            },
            status: VideoStatus {
                privacy_status: self.privacy,
                upload_status: None,
                self_declared_made_for_kids: Some(false),
            },
        }
    }
}

/// Insert body sent when opening the resumable session.
#[derive(Debug, Clone, Serialize)]
pub struct UploadBody {
    pub snippet: VideoSnippet,
    pub status: VideoStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Created,
    Uploading,
    Completed,
    Failed,
}

#[derive(Debug)]
pub enum UploadStatus {
    /// One chunk acknowledged; fraction of the file the provider holds.
    InProgress(f64),
    /// Terminal response with the created resource.
    Complete(Video),
}

/// One in-progress resumable transfer.
///
/// `Created → Uploading → Completed | Failed`. The session is owned by the
/// call that created it; a failed session stays failed and a fresh one must
/// be opened to retry.
pub struct UploadSession<T> {
    transport: T,
    file: File,
    body: UploadBody,
    total_len: u64,
    uri: Option<SessionUri>,
    acked: u64,
    state: UploadState,
}

impl<T: ResumableTransport> UploadSession<T> {
    pub async fn open(
        transport: T,
        path: impl AsRef<Path>,
        meta: VideoMeta,
    ) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .map_err(|_| UploadError::SourceNotFound(path.display().to_string()))?;
        let total_len = file.metadata().await?.len();
        if total_len == 0 {
            return Err(UploadError::EmptySource);
        }

        Ok(Self {
            transport,
            file,
            body: meta.into_body(),
            total_len,
            uri: None,
            acked: 0,
            state: UploadState::Created,
        })
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    /// Fraction of the file the provider has acknowledged, 0.0–1.0.
    pub fn progress(&self) -> f64 {
        self.acked as f64 / self.total_len as f64
    }

    /// Transfer the next chunk. An error other than the terminal response
    /// poisons the session.
    pub async fn next_chunk(&mut self) -> Result<UploadStatus, UploadError> {
        match self.state {
            UploadState::Completed | UploadState::Failed => {
                return Err(UploadError::Session(
                    "session already finished; open a new one".to_string(),
                ));
            }
            UploadState::Created | UploadState::Uploading => {}
        }

        match self.advance().await {
            Ok(status) => {
                if matches!(status, UploadStatus::Complete(_)) {
                    self.state = UploadState::Completed;
                }
                Ok(status)
            }
            Err(e) => {
                self.state = UploadState::Failed;
                Err(e)
            }
        }
    }

    async fn advance(&mut self) -> Result<UploadStatus, UploadError> {
        if self.uri.is_none() {
            let uri = self.transport.begin(&self.body, self.total_len).await?;
            self.uri = Some(uri);
            self.state = UploadState::Uploading;
        }
        // Set above if it was missing.
        let uri = self.uri.as_ref().ok_or_else(|| {
            UploadError::Session("upload session lost its session URI".to_string())
        })?;

        let want = CHUNK_SIZE.min(self.total_len - self.acked) as usize;
        self.file.seek(SeekFrom::Start(self.acked)).await?;
        let mut chunk = vec![0u8; want];
        self.file.read_exact(&mut chunk).await?;

        let outcome = self
            .transport
            .put_chunk(uri, self.acked, chunk, self.total_len)
            .await?;

        match outcome {
            ChunkOutcome::Resume { received } => {
                if received > self.total_len {
                    return Err(UploadError::Session(format!(
                        "provider acknowledged {received} of {} bytes",
                        self.total_len
                    )));
                }
                self.acked = received;
                Ok(UploadStatus::InProgress(self.progress()))
            }
            ChunkOutcome::Done(video) => {
                self.acked = self.total_len;
                Ok(UploadStatus::Complete(video))
            }
        }
    }

    /// Drive the session to its terminal state, surfacing progress after
    /// every chunk. 1.0 is always reported before the terminal result.
    pub async fn run(mut self, mut on_progress: impl FnMut(f64)) -> Result<Video, UploadError> {
        loop {
            match self.next_chunk().await? {
                UploadStatus::InProgress(fraction) => on_progress(fraction),
                UploadStatus::Complete(video) => {
                    on_progress(1.0);
                    return Ok(video);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::VideoId;
    use std::io::Write;
    use std::sync::Mutex;

    fn video(id: &str) -> Video {
        Video {
            id: VideoId::new(id),
            snippet: VideoSnippet {
                title: "t".to_string(),
                description: String::new(),
                published_at: None,
                channel_id: None,
                channel_title: None,
                tags: None,
                category_id: None,
            },
            status: None,
            content_details: None,
            statistics: None,
        }
    }

    /// Acknowledges every chunk in full and completes on the last one.
    struct FakeTransport {
        chunk_sizes: Mutex<Vec<usize>>,
    }

    impl FakeTransport {
        fn new() -> Self {
            Self {
                chunk_sizes: Mutex::new(Vec::new()),
            }
        }
    }

    impl ResumableTransport for &FakeTransport {
        async fn begin(&self, _body: &UploadBody, _total: u64) -> Result<SessionUri, UploadError> {
            Ok(SessionUri::new("fake://session"))
        }

        async fn put_chunk(
            &self,
            _uri: &SessionUri,
            offset: u64,
            chunk: Vec<u8>,
            total_len: u64,
        ) -> Result<ChunkOutcome, UploadError> {
            self.chunk_sizes.lock().unwrap().push(chunk.len());
            let received = offset + chunk.len() as u64;
            if received == total_len {
                Ok(ChunkOutcome::Done(video("uploaded-id")))
            } else {
                Ok(ChunkOutcome::Resume { received })
            }
        }
    }

    /// Fails every chunk transfer with a transient error.
    struct BrokenTransport;

    impl ResumableTransport for BrokenTransport {
        async fn begin(&self, _body: &UploadBody, _total: u64) -> Result<SessionUri, UploadError> {
            Ok(SessionUri::new("fake://session"))
        }

        async fn put_chunk(
            &self,
            _uri: &SessionUri,
            _offset: u64,
            _chunk: Vec<u8>,
            _total: u64,
        ) -> Result<ChunkOutcome, UploadError> {
            Err(UploadError::Transient("network interruption".to_string()))
        }
    }

    fn source_file(len: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0xAB; len]).unwrap();
        file.flush().unwrap();
        file
    }

    async fn run_collecting(
        len: usize,
    ) -> (Vec<usize>, Vec<f64>, Video) {
        let transport = FakeTransport::new();
        let file = source_file(len);
        let session = UploadSession::open(&transport, file.path(), VideoMeta::new("title"))
            .await
            .unwrap();

        let mut progress = Vec::new();
        let video = session.run(|p| progress.push(p)).await.unwrap();
        let sizes = transport.chunk_sizes.lock().unwrap().clone();
        (sizes, progress, video)
    }

    #[tokio::test]
    async fn small_file_completes_in_one_chunk() {
        let (sizes, progress, video) = run_collecting(1000).await;

        assert_eq!(sizes, vec![1000]);
        assert_eq!(progress, vec![1.0]);
        assert_eq!(video.id.as_str(), "uploaded-id");
    }

    #[tokio::test]
    async fn exactly_one_chunk_is_one_iteration() {
        let (sizes, _, _) = run_collecting(CHUNK_SIZE as usize).await;
        assert_eq!(sizes, vec![CHUNK_SIZE as usize]);
    }

    #[tokio::test]
    async fn one_byte_over_a_chunk_takes_two_iterations() {
        let (sizes, _, _) = run_collecting(CHUNK_SIZE as usize + 1).await;
        assert_eq!(sizes, vec![CHUNK_SIZE as usize, 1]);
    }

    #[tokio::test]
    async fn two_and_a_half_mib_takes_three_iterations() {
        let len = 5 * CHUNK_SIZE as usize / 2;
        let (sizes, progress, video) = run_collecting(len).await;

        assert_eq!(sizes.len(), 3);
        assert_eq!(sizes.iter().sum::<usize>(), len);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&1.0));
        assert_eq!(video.id.as_str(), "uploaded-id");
    }

    #[tokio::test]
    async fn missing_source_fails_before_any_transfer() {
        let transport = FakeTransport::new();
        let result = UploadSession::open(
            &transport,
            "/no/such/file.mp4",
            VideoMeta::new("title"),
        )
        .await;

        assert!(matches!(result, Err(UploadError::SourceNotFound(_))));
        assert!(transport.chunk_sizes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_source_is_rejected() {
        let transport = FakeTransport::new();
        let file = source_file(0);
        let result = UploadSession::open(&transport, file.path(), VideoMeta::new("title")).await;

        assert!(matches!(result, Err(UploadError::EmptySource)));
    }

    #[tokio::test]
    async fn transient_failure_poisons_the_session() {
        let file = source_file(1000);
        let mut session =
            UploadSession::open(BrokenTransport, file.path(), VideoMeta::new("title"))
                .await
                .unwrap();

        let first = session.next_chunk().await;
        assert!(matches!(first, Err(UploadError::Transient(_))));
        assert_eq!(session.state(), UploadState::Failed);

        // A poisoned session refuses further work; the caller must open a
        // fresh one.
        let second = session.next_chunk().await;
        assert!(matches!(second, Err(UploadError::Session(_))));
    }

    #[tokio::test]
    async fn metadata_body_carries_defaults() {
        let body = VideoMeta::new("My title")
            .description("Words")
            .privacy(PrivacyStatus::Unlisted)
            .into_body();

        assert_eq!(body.snippet.title, "My title");
        assert_eq!(body.snippet.category_id.as_deref(), Some("22"));
        assert_eq!(body.status.privacy_status, PrivacyStatus::Unlisted);
        assert_eq!(body.status.self_declared_made_for_kids, Some(false));
    }
}
