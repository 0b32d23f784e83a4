pub mod endpoints;
mod error;
mod macros;
pub mod repositories;
pub mod upload;

pub use crate::error::{ErrorDetail, TubeApiError};
use repositories::*;
use tower_api_client::{Client as ApiClient, Request as ApiRequest};

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

pub struct Client {
    inner: ApiClient,
}

impl Client {
    pub fn new(access_token: &str) -> Self {
        Self {
            inner: ApiClient::new(BASE_URL).bearer_auth(access_token),
        }
    }

    pub async fn send<R>(&self, request: R) -> Result<R::Response, TubeApiError>
    where
        R: ApiRequest,
    {
        self.inner.send(request).await.map_err(From::from)
    }
}

pub struct Request;

impl Request {
    pub fn new() -> Self {
        Self {}
    }

    pub fn channels() -> ChannelRepository {
        ChannelRepository::new()
    }

    pub fn search() -> SearchRepository {
        SearchRepository::new()
    }

    pub fn videos() -> VideoRepository {
        VideoRepository::new()
    }
}
