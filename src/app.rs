use std::sync::Arc;

use eframe::egui;
use log::info;

use crate::api::VideoApi;
use crate::config::Config;
use crate::controller::Controller;
use crate::localizations::Localizations;
use crate::theme;
use crate::ui;

pub struct DownloaderApp {
    controller: Controller,
    localizer: Localizations,
}

impl DownloaderApp {
    pub fn new(cc: &eframe::CreationContext<'_>, api: Arc<dyn VideoApi>, config: &Config) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        theme::install_cjk_font(&cc.egui_ctx);

        let mut controller = Controller::new(api, config.preferred_quality.clone());
        let ctx = cc.egui_ctx.clone();
        controller.set_repaint(move || ctx.request_repaint());

        let localizer = Localizations::new(&config.language);
        info!("UI language {}", localizer.current_lang());

        Self {
            controller,
            localizer,
        }
    }

    pub fn update_ui(&mut self, ctx: &egui::Context) {
        self.controller.process_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.localizer.text("app-title"));
            ui.add_space(20.0);

            if ui::render_url_input(ui, &mut self.controller.state, &self.localizer) {
                self.controller.check_formats();
            }
            ui::render_video_summary(ui, &self.controller.state);

            if self.controller.state.show_formats {
                ui.add_space(16.0);
                let options = self.controller.dropdown_options();
                if let Some(choice) =
                    ui::render_format_selector(ui, &self.controller.state, &options, &self.localizer)
                {
                    self.controller.select_format(choice);
                }

                ui.add_space(10.0);
                let (best, download) =
                    ui::render_actions(ui, &self.controller.state, &self.localizer);
                if best {
                    self.controller.pick_best_format();
                }
                if download {
                    self.controller.start_download();
                }
            }

            if self.controller.state.show_progress {
                ui.add_space(20.0);
                ui::render_progress(ui, &self.controller.state, &self.localizer);
            }
        });

        if let Some(message) = self.controller.state.alert.clone() {
            if ui::render_alert(ctx, &message, &self.localizer) {
                self.controller.dismiss_alert();
            }
        }
    }
}

impl eframe::App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_ui(ctx);
    }
}
