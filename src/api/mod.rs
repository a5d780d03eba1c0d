mod channel;
mod client;
mod error;

pub use channel::{pump_progress, ChannelEvent, ProgressChannel};
pub use client::ApiClient;
pub use error::{ApiError, ApiResult};

#[cfg(test)]
pub(crate) use channel::tests;

use crate::models::{VideoFormat, VideoInfo};

/// Backend calls the controller depends on.
pub trait VideoApi: Send + Sync {
    fn get_video_info(&self, url: &str) -> ApiResult<VideoInfo>;

    fn get_video_formats(&self, url: &str) -> ApiResult<Vec<VideoFormat>>;

    fn get_best_format(&self, url: &str, prefer_quality: &str) -> ApiResult<VideoFormat>;

    /// Opens the progress socket and sends the initiation frame.
    fn start_download(
        &self,
        url: &str,
        format_id: Option<&str>,
    ) -> ApiResult<Box<dyn ProgressChannel>>;
}
