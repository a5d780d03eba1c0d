use serde::{Deserialize, Serialize};

/// One downloadable encoding as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFormat {
    pub format_id: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub vcodec: String,
    #[serde(default)]
    pub acodec: String,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub format_note: Option<String>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub tbr: Option<f64>,
}

impl VideoFormat {
    /// Height part of a `WxH` resolution, or the whole string when there is no `x`.
    pub fn height_label(&self) -> &str {
        match self.resolution.split('x').nth(1) {
            Some(height) if !height.is_empty() => height,
            _ => &self.resolution,
        }
    }

    /// Dropdown label, e.g. `720p - mp4`.
    pub fn option_label(&self) -> String {
        format!("{}p - {}", self.height_label(), self.ext)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub formats: Vec<VideoFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Downloading,
    Complete,
    Error,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl ProgressStatus {
    /// Terminal statuses end the download session.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::Cancelled)
    }
}

/// A single status update pushed over the download socket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressFrame {
    pub status: ProgressStatus,
    #[serde(default)]
    pub downloaded_bytes: Option<f64>,
    #[serde(default)]
    pub total_bytes: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub eta: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Initiation frame sent once after the socket opens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: &'a str,
    pub format_id: Option<&'a str>,
}

impl<'a> DownloadRequest<'a> {
    pub fn new(url: &'a str, format_id: Option<&'a str>) -> Self {
        Self {
            kind: "download",
            url,
            format_id,
        }
    }
}

/// Error body returned by the backend on non-success responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Everything the window shows. Reset on every launch.
#[derive(Debug, Default)]
pub struct AppState {
    pub url: String,
    pub formats: Vec<VideoFormat>,
    pub selected_format: Option<String>,
    pub format_info: String,
    pub video_summary: Option<String>,
    pub is_checking: bool,
    pub show_formats: bool,
    pub download_enabled: bool,
    pub is_downloading: bool,
    pub show_progress: bool,
    pub progress: f32,
    pub progress_text: String,
    pub output_path: Option<String>,
    pub alert: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(resolution: &str, vcodec: &str, acodec: &str) -> VideoFormat {
        VideoFormat {
            format_id: "f".to_string(),
            resolution: resolution.to_string(),
            ext: "mp4".to_string(),
            vcodec: vcodec.to_string(),
            acodec: acodec.to_string(),
            filesize: None,
            format_note: None,
            fps: None,
            tbr: None,
        }
    }

    #[test]
    fn option_label_uses_height() {
        assert_eq!(format("1280x720", "avc1", "mp4a").option_label(), "720p - mp4");
        assert_eq!(format("audio only", "none", "opus").option_label(), "audio onlyp - mp4");
    }

    #[test]
    fn progress_frame_parses_backend_json() {
        let frame: ProgressFrame = serde_json::from_str(
            r#"{"status":"downloading","downloaded_bytes":512,"total_bytes":1024,"speed":2048.5,"eta":12}"#,
        )
        .unwrap();
        assert_eq!(frame.status, ProgressStatus::Downloading);
        assert_eq!(frame.total_bytes, Some(1024.0));
        assert_eq!(frame.eta, Some(12.0));

        let frame: ProgressFrame =
            serde_json::from_str(r#"{"status":"complete","file_path":"/tmp/a.mp4"}"#).unwrap();
        assert!(frame.status.is_terminal());

        let frame: ProgressFrame =
            serde_json::from_str(r#"{"status":"queued","speed":null}"#).unwrap();
        assert_eq!(frame.status, ProgressStatus::Unknown);
        assert!(!frame.status.is_terminal());
    }

    #[test]
    fn download_request_wire_shape() {
        let json = serde_json::to_value(DownloadRequest::new("https://v", Some("22"))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "download", "url": "https://v", "format_id": "22"})
        );
    }
}
