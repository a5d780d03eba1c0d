use eframe::egui::{self, RichText, Stroke};

use crate::localizations::Localizations;
use crate::models::AppState;
use crate::theme::*;

fn styled_button(text: String, fill: egui::Color32) -> impl egui::Widget {
    egui::Button::new(
        RichText::new(text)
            .size(BUTTON_FONT_SIZE)
            .color(BUTTON_MAIN_TEXT),
    )
    .min_size(MIN_SIZE_BUTTON)
    .fill(fill)
    .rounding(ROUNDING_BUTTON)
    .stroke(Stroke::new(1.0, BORDER_COLOR))
}

/// URL field plus the check button. Returns true when a lookup was requested.
pub fn render_url_input(ui: &mut egui::Ui, state: &mut AppState, localizer: &Localizations) -> bool {
    ui.label(localizer.text("url-label"));

    let mut requested = false;
    ui.horizontal(|ui| {
        let response = egui::Frame::group(ui.style())
            .fill(INPUT_BG)
            .stroke(Stroke::new(1.0, egui::Color32::LIGHT_GRAY))
            .rounding(ROUNDING_FRAME)
            .show(ui, |ui| {
                ui.add_sized(
                    [ui.available_width() - MIN_SIZE_BUTTON.x - 16.0, 32.0],
                    egui::TextEdit::singleline(&mut state.url)
                        .hint_text(localizer.text("url-placeholder"))
                        .font(egui::FontId::proportional(16.0)),
                )
            })
            .inner;

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            requested = true;
        }

        let label = if state.is_checking {
            localizer.text("check-busy")
        } else {
            localizer.text("check-button")
        };
        if ui
            .add_enabled(!state.is_checking, styled_button(label, PRIMARY_BUTTON_BG))
            .clicked()
        {
            requested = true;
        }
    });

    requested && !state.is_checking
}

pub fn render_video_summary(ui: &mut egui::Ui, state: &AppState) {
    if let Some(summary) = &state.video_summary {
        ui.label(RichText::new(summary).strong());
    }
}

/// Format dropdown. Returns the new selection when the user changed it.
pub fn render_format_selector(
    ui: &mut egui::Ui,
    state: &AppState,
    options: &[(String, String)],
    localizer: &Localizations,
) -> Option<Option<String>> {
    let placeholder = localizer.text("format-placeholder");
    let selected_text = state
        .selected_format
        .as_ref()
        .and_then(|id| options.iter().find(|(value, _)| value == id))
        .map(|(_, label)| label.clone())
        .unwrap_or_else(|| placeholder.clone());

    let mut choice = state.selected_format.clone();
    ui.horizontal(|ui| {
        ui.label(localizer.text("format-label"));
        egui::ComboBox::from_id_source("formats")
            .width(260.0)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut choice, None, placeholder);
                for (value, label) in options {
                    ui.selectable_value(&mut choice, Some(value.clone()), label.as_str());
                }
            });
    });

    if !state.format_info.is_empty() {
        ui.label(RichText::new(&state.format_info).color(SECONDARY_TEXT));
    }

    (choice != state.selected_format).then_some(choice)
}

/// Recommended-format and download buttons as `(best_clicked, download_clicked)`.
pub fn render_actions(ui: &mut egui::Ui, state: &AppState, localizer: &Localizations) -> (bool, bool) {
    let mut best = false;
    let mut download = false;
    ui.horizontal(|ui| {
        best = ui
            .add_enabled(
                !state.is_checking,
                styled_button(localizer.text("best-button"), SECONDARY_BUTTON_BG),
            )
            .clicked();
        download = ui
            .add_enabled(
                state.download_enabled,
                styled_button(localizer.text("download-button"), PRIMARY_BUTTON_BG),
            )
            .clicked();
    });
    (best, download)
}

pub fn render_progress(ui: &mut egui::Ui, state: &AppState, localizer: &Localizations) {
    egui::Frame::group(ui.style())
        .fill(PANEL_BG)
        .rounding(ROUNDING_FRAME * 2.0)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(localizer.text("progress-title")).strong());
                ui.add_space(6.0);

                let color = if state.progress_text.starts_with("错误") {
                    TEXT_ERROR
                } else if !state.is_downloading && state.progress >= 1.0 {
                    TEXT_SUCCESS
                } else {
                    egui::Color32::DARK_GRAY
                };
                ui.label(RichText::new(&state.progress_text).color(color));

                if state.is_downloading {
                    ui.add_space(6.0);
                    ui.add(egui::ProgressBar::new(state.progress).show_percentage());
                }

                if let Some(path) = &state.output_path {
                    ui.add_space(6.0);
                    ui.label(format!("保存位置: {}", path));
                }
            });
        });
}

/// Modal notice. Returns true once the user dismissed it.
pub fn render_alert(ctx: &egui::Context, message: &str, localizer: &Localizations) -> bool {
    let mut dismissed = false;
    egui::Window::new(localizer.text("alert-title"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(10.0);
            if ui.button(localizer.text("alert-ok")).clicked() {
                dismissed = true;
            }
        });
    dismissed
}
