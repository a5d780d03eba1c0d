use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::channel::{ProgressChannel, WsChannel};
use super::error::{ApiError, ApiResult};
use super::VideoApi;
use crate::config::Config;
use crate::models::{DownloadRequest, ErrorPayload, VideoFormat, VideoInfo};

/// Blocking HTTP + WebSocket client for the download backend.
pub struct ApiClient {
    http: Client,
    server: Url,
    ws_endpoint: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let ws_endpoint = config
            .ws_endpoint()
            .map_err(|e| ApiError::Channel(e.to_string()))?;

        Ok(Self {
            http,
            server: config.server.clone(),
            ws_endpoint,
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        fallback: &str,
    ) -> ApiResult<T> {
        let endpoint = self
            .server
            .join(path)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        info!("GET {}", endpoint);

        let response = self.http.get(endpoint).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            let payload: ErrorPayload = response.json().unwrap_or_default();
            warn!("backend returned {}: {:?}", status, payload.detail);
            return Err(ApiError::Backend(
                payload.detail.unwrap_or_else(|| fallback.to_string()),
            ));
        }

        Ok(response.json()?)
    }

    /// Opens the progress socket without sending anything.
    pub fn create_channel(&self) -> ApiResult<WsChannel> {
        WsChannel::connect(self.ws_endpoint.as_str())
    }
}

impl VideoApi for ApiClient {
    fn get_video_info(&self, url: &str) -> ApiResult<VideoInfo> {
        self.get_json("/api/video/info", &[("url", url)], "获取视频信息失败")
            .map_err(|e| e.context("API错误"))
    }

    fn get_video_formats(&self, url: &str) -> ApiResult<Vec<VideoFormat>> {
        let formats: Vec<VideoFormat> =
            self.get_json("/api/video/formats", &[("url", url)], "获取视频格式失败")?;
        debug!("received {} formats", formats.len());
        Ok(formats)
    }

    fn get_best_format(&self, url: &str, prefer_quality: &str) -> ApiResult<VideoFormat> {
        self.get_json(
            "/api/video/best-format",
            &[("url", url), ("prefer_quality", prefer_quality)],
            "未找到合适的视频格式",
        )
    }

    fn start_download(
        &self,
        url: &str,
        format_id: Option<&str>,
    ) -> ApiResult<Box<dyn ProgressChannel>> {
        let open = || -> ApiResult<WsChannel> {
            let mut channel = self.create_channel()?;
            channel.send_request(&DownloadRequest::new(url, format_id))?;
            Ok(channel)
        };

        match open() {
            Ok(channel) => Ok(Box::new(channel)),
            Err(e) => Err(e.context("下载错误")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serves one canned HTTP response and hands back the request line.
    fn serve_once(status: &str, body: &str) -> (Config, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let request = String::from_utf8_lossy(&buf);
            let line = request.lines().next().unwrap_or_default().to_string();
            tx.send(line).unwrap();
            stream.write_all(response.as_bytes()).unwrap();
        });

        let config = Config {
            server: Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap(),
            ..Config::default()
        };
        (config, rx)
    }

    const TWO_FORMATS: &str = r#"[
        {"format_id":"18","ext":"mp4","resolution":"640x360","filesize":1048576,"vcodec":"avc1","acodec":"mp4a","format_note":"360p","fps":30.0,"tbr":500.5},
        {"format_id":"22","ext":"webm","resolution":"1280x720","filesize":null,"vcodec":"vp9","acodec":"opus","format_note":"720p","fps":null,"tbr":null}
    ]"#;

    #[test]
    fn formats_are_returned_in_order_with_encoded_url() {
        let (config, requests) = serve_once("200 OK", TWO_FORMATS);
        let client = ApiClient::new(&config).unwrap();

        let formats = client
            .get_video_formats("https://www.youtube.com/watch?v=abc&t=1")
            .unwrap();

        assert_eq!(formats.len(), 2);
        assert_eq!(formats[0].format_id, "18");
        assert_eq!(formats[1].filesize, None);

        let line = requests.recv().unwrap();
        assert!(line.starts_with("GET /api/video/formats?url=https%3A%2F%2Fwww.youtube.com"));
        assert!(line.contains("v%3Dabc%26t%3D1"));
    }

    #[test]
    fn formats_error_surfaces_detail() {
        let (config, _requests) = serve_once("500 Internal Server Error", r#"{"detail":"视频不可用"}"#);
        let client = ApiClient::new(&config).unwrap();

        let err = client.get_video_formats("https://v").unwrap_err();
        assert_eq!(err, ApiError::Backend("视频不可用".to_string()));
        assert_eq!(err.to_string(), "视频不可用");
    }

    #[test]
    fn formats_error_without_detail_uses_generic_message() {
        let (config, _requests) = serve_once("404 Not Found", "not json");
        let client = ApiClient::new(&config).unwrap();

        let err = client.get_video_formats("https://v").unwrap_err();
        assert_eq!(err.to_string(), "获取视频格式失败");
    }

    #[test]
    fn info_errors_are_prefixed() {
        let (config, _requests) = serve_once("404 Not Found", r#"{"detail":"无法获取视频信息"}"#);
        let client = ApiClient::new(&config).unwrap();

        let err = client.get_video_info("https://v").unwrap_err();
        assert_eq!(err.to_string(), "API错误: 无法获取视频信息");
    }

    #[test]
    fn info_parses_video_metadata() {
        let body = format!(
            r#"{{"id":"abc","title":"Demo","description":null,"duration":65,"thumbnail":null,"uploader":"someone","formats":{}}}"#,
            TWO_FORMATS
        );
        let (config, _requests) = serve_once("200 OK", &body);
        let client = ApiClient::new(&config).unwrap();

        let info = client.get_video_info("https://v").unwrap();
        assert_eq!(info.title, "Demo");
        assert_eq!(info.duration, Some(65));
        assert_eq!(info.formats.len(), 2);
    }

    #[test]
    fn best_format_sends_preferred_quality() {
        let body = r#"{"format_id":"22","ext":"mp4","resolution":"1280x720","filesize":null,"vcodec":"avc1","acodec":"mp4a"}"#;
        let (config, requests) = serve_once("200 OK", body);
        let client = ApiClient::new(&config).unwrap();

        let best = client.get_best_format("https://v", "720p").unwrap();
        assert_eq!(best.format_id, "22");
        assert!(requests.recv().unwrap().contains("prefer_quality=720p"));
    }

    #[test]
    fn unreachable_server_has_dedicated_message() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = Config {
            server: Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();

        let err = client.get_video_formats("https://v").unwrap_err();
        assert!(err.is_unreachable());
        assert_eq!(err.to_string(), "无法连接到服务器，请检查网络连接");

        let err = client.start_download("https://v", Some("22")).err().unwrap();
        assert!(err.is_unreachable());
        assert_eq!(err.to_string(), "下载错误: 无法连接到服务器，请检查网络连接");
    }
}
