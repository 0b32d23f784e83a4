use crate::endpoints::{
    VideoId,
    channels::ListMyChannels,
    search::SearchMyVideos,
    videos::{DeleteVideo, GetVideo, UpdateVideo, VideoSnippet},
};

pub struct ChannelRepository;

impl ChannelRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn mine(&self) -> ListMyChannels {
        ListMyChannels::new()
    }
}

impl Default for ChannelRepository {
    fn default() -> Self {
        Self::new()
    }
}

pub struct VideoRepository;

impl VideoRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn get(&self, id: VideoId) -> GetVideo {
        GetVideo::new(id)
    }

    pub fn update(&self, id: VideoId, snippet: VideoSnippet) -> UpdateVideo {
        UpdateVideo::new(id, snippet)
    }

    pub fn delete(&self, id: VideoId) -> DeleteVideo {
        DeleteVideo::new(id)
    }
}

impl Default for VideoRepository {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SearchRepository;

impl SearchRepository {
    pub fn new() -> Self {
        Self {}
    }

    pub fn my_videos(&self, max_results: u32) -> SearchMyVideos {
        SearchMyVideos::new(max_results)
    }
}

impl Default for SearchRepository {
    fn default() -> Self {
        Self::new()
    }
}
