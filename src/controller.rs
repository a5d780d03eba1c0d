use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};

use crate::api::{pump_progress, ApiError, ApiResult, ChannelEvent, VideoApi};
use crate::format::{format_bytes, format_duration, format_eta, format_percent, format_speed};
use crate::models::{AppState, ProgressFrame, ProgressStatus, VideoFormat, VideoInfo};

pub const MSG_ENTER_URL: &str = "请输入视频URL";
pub const MSG_SELECT_FORMAT: &str = "请选择下载格式";
pub const MSG_CHECK_FIRST: &str = "请先获取视频格式";
pub const MSG_BEST_NOT_LISTED: &str = "推荐格式不在当前列表中";
pub const MSG_PREPARING: &str = "准备下载...";
pub const MSG_COMPLETE: &str = "下载完成！";
pub const MSG_CANCELLED: &str = "下载已取消";
pub const MSG_UNKNOWN_ERROR: &str = "未知错误";

/// Results reported back to the UI thread by worker threads.
#[derive(Debug)]
pub enum UiEvent {
    FormatsLoaded(ApiResult<Vec<VideoFormat>>),
    InfoLoaded(VideoInfo),
    BestFormat(ApiResult<VideoFormat>),
    LookupFinished,
    DownloadSetupFailed(ApiError),
    Channel(ChannelEvent),
}

type Repaint = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
struct Notifier {
    tx: Sender<UiEvent>,
    repaint: Repaint,
}

impl Notifier {
    fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            debug!("UI went away, dropping event");
        }
        (self.repaint)();
    }
}

// Clears the busy flag of a lookup even if the worker panics
struct LookupGuard(Notifier);

impl Drop for LookupGuard {
    fn drop(&mut self) {
        self.0.send(UiEvent::LookupFinished);
    }
}

pub struct Controller {
    pub state: AppState,
    api: Arc<dyn VideoApi>,
    preferred_quality: String,
    notifier: Notifier,
    events: Receiver<UiEvent>,
}

impl Controller {
    pub fn new(api: Arc<dyn VideoApi>, preferred_quality: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state: AppState::default(),
            api,
            preferred_quality: preferred_quality.into(),
            notifier: Notifier {
                tx,
                repaint: Arc::new(|| {}),
            },
            events: rx,
        }
    }

    /// Called by workers after each event so the window redraws.
    pub fn set_repaint<F>(&mut self, repaint: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.repaint = Arc::new(repaint);
    }

    /// `(format_id, label)` pairs in the order the backend sent them.
    pub fn dropdown_options(&self) -> Vec<(String, String)> {
        self.state
            .formats
            .iter()
            .map(|f| (f.format_id.clone(), f.option_label()))
            .collect()
    }

    pub fn selected_format(&self) -> Option<&VideoFormat> {
        let id = self.state.selected_format.as_deref()?;
        self.state.formats.iter().find(|f| f.format_id == id)
    }

    pub fn select_format(&mut self, format_id: Option<String>) {
        self.state.selected_format = format_id.filter(|id| !id.is_empty());
        self.state.download_enabled =
            self.state.selected_format.is_some() && !self.state.is_downloading;

        self.state.format_info = match self.selected_format() {
            Some(f) => format!(
                "分辨率: {}, 编码: {}/{}, 大小: {}",
                f.resolution,
                f.vcodec,
                f.acodec,
                format_bytes(f.filesize.unwrap_or(0))
            ),
            None => String::new(),
        };
    }

    pub fn dismiss_alert(&mut self) {
        self.state.alert = None;
    }

    fn alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("alert: {}", message);
        self.state.alert = Some(message);
    }

    pub fn check_formats(&mut self) {
        if self.state.is_checking {
            return;
        }

        let url = self.state.url.trim().to_string();
        if url.is_empty() {
            self.alert(MSG_ENTER_URL);
            return;
        }

        info!("fetching formats for {}", url);
        self.state.is_checking = true;

        let api = Arc::clone(&self.api);
        let notifier = self.notifier.clone();
        thread::spawn(move || {
            let guard = LookupGuard(notifier.clone());
            let result = api.get_video_formats(&url);
            let loaded = result.is_ok();
            notifier.send(UiEvent::FormatsLoaded(result));
            drop(guard);

            if loaded {
                match api.get_video_info(&url) {
                    Ok(info) => notifier.send(UiEvent::InfoLoaded(info)),
                    Err(e) => debug!("video info unavailable: {}", e),
                }
            }
        });
    }

    pub fn pick_best_format(&mut self) {
        if self.state.is_checking {
            return;
        }

        let url = self.state.url.trim().to_string();
        if url.is_empty() {
            self.alert(MSG_ENTER_URL);
            return;
        }
        if self.state.formats.is_empty() {
            self.alert(MSG_CHECK_FIRST);
            return;
        }

        self.state.is_checking = true;

        let api = Arc::clone(&self.api);
        let notifier = self.notifier.clone();
        let quality = self.preferred_quality.clone();
        thread::spawn(move || {
            let _guard = LookupGuard(notifier.clone());
            notifier.send(UiEvent::BestFormat(api.get_best_format(&url, &quality)));
        });
    }

    pub fn start_download(&mut self) {
        if self.state.is_downloading {
            return;
        }

        let url = self.state.url.trim().to_string();
        let format_id = match self.state.selected_format.clone() {
            Some(id) if !url.is_empty() => id,
            _ => {
                self.alert(MSG_SELECT_FORMAT);
                return;
            }
        };

        info!("starting download of {} as format {}", url, format_id);
        self.state.show_progress = true;
        self.state.is_downloading = true;
        self.state.download_enabled = false;
        self.state.progress = 0.0;
        self.state.output_path = None;
        self.state.progress_text = MSG_PREPARING.to_string();

        let api = Arc::clone(&self.api);
        let notifier = self.notifier.clone();
        thread::spawn(move || match api.start_download(&url, Some(&format_id)) {
            Ok(mut channel) => {
                pump_progress(channel.as_mut(), |event| notifier.send(UiEvent::Channel(event)));
            }
            Err(e) => notifier.send(UiEvent::DownloadSetupFailed(e)),
        });
    }

    /// Applies everything the workers reported since the last frame.
    pub fn process_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            changed = true;
        }
        changed
    }

    fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::FormatsLoaded(Ok(formats)) => {
                debug!("loaded formats: {:?}", formats);
                self.state.formats = formats;
                self.state.video_summary = None;
                self.state.show_formats = true;
                self.select_format(None);
            }
            UiEvent::FormatsLoaded(Err(e)) => {
                if e.is_unreachable() {
                    error!("backend unreachable while fetching formats");
                } else {
                    error!("failed to fetch formats: {}", e);
                }
                self.alert(e.to_string());
            }
            UiEvent::InfoLoaded(info) => {
                self.state.video_summary = Some(summarize(&info));
            }
            UiEvent::BestFormat(Ok(best)) => {
                if self.state.formats.iter().any(|f| f.format_id == best.format_id) {
                    self.select_format(Some(best.format_id));
                } else {
                    self.alert(MSG_BEST_NOT_LISTED);
                }
            }
            UiEvent::BestFormat(Err(e)) => self.alert(e.to_string()),
            UiEvent::LookupFinished => self.state.is_checking = false,
            UiEvent::DownloadSetupFailed(e) => {
                error!("failed to start download: {}", e);
                self.alert(e.to_string());
                self.state.show_progress = false;
                self.finish_download();
            }
            UiEvent::Channel(ChannelEvent::Frame(frame)) => self.apply_frame(frame),
            UiEvent::Channel(ChannelEvent::Closed) => {
                if self.state.is_downloading {
                    warn!("progress stream ended before the download finished");
                    self.finish_download();
                }
            }
            UiEvent::Channel(ChannelEvent::Failed(e)) => {
                self.state.progress_text = format!("错误: {}", e);
                self.finish_download();
            }
        }
    }

    fn apply_frame(&mut self, frame: ProgressFrame) {
        match frame.status {
            ProgressStatus::Downloading => {
                let percent = format_percent(frame.downloaded_bytes, frame.total_bytes);
                self.state.progress = match (frame.downloaded_bytes, frame.total_bytes) {
                    (Some(done), Some(total)) if total > 0.0 => (done / total) as f32,
                    _ => 0.0,
                };
                self.state.progress_text = format!(
                    "下载进度: {}% | 速度: {} | 剩余时间: {}",
                    percent,
                    format_speed(frame.speed.unwrap_or(0.0)),
                    format_eta(frame.eta)
                );
            }
            ProgressStatus::Complete => {
                info!("download complete: {:?}", frame.file_path);
                self.state.progress = 1.0;
                self.state.progress_text = MSG_COMPLETE.to_string();
                self.state.output_path = frame.file_path;
                self.finish_download();
            }
            ProgressStatus::Error => {
                let message = frame.message.as_deref().unwrap_or(MSG_UNKNOWN_ERROR);
                error!("download failed: {}", message);
                self.state.progress_text = format!("错误: {}", message);
                self.finish_download();
            }
            ProgressStatus::Cancelled => {
                self.state.progress_text = MSG_CANCELLED.to_string();
                self.finish_download();
            }
            ProgressStatus::Unknown => debug!("ignoring frame: {:?}", frame),
        }
    }

    fn finish_download(&mut self) {
        self.state.is_downloading = false;
        self.state.download_enabled = true;
    }
}

fn summarize(info: &VideoInfo) -> String {
    let mut parts = vec![info.title.clone()];
    if let Some(uploader) = &info.uploader {
        parts.push(uploader.clone());
    }
    if let Some(duration) = info.duration {
        parts.push(format_duration(duration));
    }
    parts.join(" · ")
}
