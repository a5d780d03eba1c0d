use std::sync::Arc;

use anyhow::{anyhow, Result};
use eframe::egui;
use log::info;

mod api;
mod app;
mod config;
mod controller;
mod format;
mod localizations;
mod models;
mod theme;
mod ui;

use api::{ApiClient, VideoApi};
use app::DownloaderApp;
use config::Config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    info!("using backend {}", config.server);
    let api: Arc<dyn VideoApi> = Arc::new(ApiClient::new(&config)?);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 480.0])
            .with_min_inner_size([520.0, 380.0])
            .with_title("Video Downloader"),
        ..Default::default()
    };

    eframe::run_native(
        "Video Downloader",
        options,
        Box::new(move |cc| Box::new(DownloaderApp::new(cc, api, &config))),
    )
    .map_err(|e| anyhow!("failed to start window: {}", e))
}
