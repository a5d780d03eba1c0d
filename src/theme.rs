use eframe::egui::Color32;

// Buttons
pub const PRIMARY_BUTTON_BG: Color32 = Color32::from_rgb(76, 154, 255);
pub const SECONDARY_BUTTON_BG: Color32 = Color32::from_rgb(120, 130, 145);
pub const BUTTON_MAIN_TEXT: Color32 = Color32::from_rgb(255, 255, 255);

// Surfaces
pub const INPUT_BG: Color32 = Color32::from_rgb(250, 250, 250);
pub const PANEL_BG: Color32 = Color32::from_rgb(248, 248, 248);
pub const BORDER_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 60, 67, 15);

// Text
pub const SECONDARY_TEXT: Color32 = Color32::from_rgb(110, 110, 115);
pub const TEXT_ERROR: Color32 = Color32::from_rgb(200, 30, 30);
pub const TEXT_SUCCESS: Color32 = Color32::from_rgb(30, 140, 60);

// Sizing & Spacing
pub const ROUNDING_FRAME: f32 = 4.0;
pub const ROUNDING_BUTTON: f32 = 6.0;
pub const MIN_SIZE_BUTTON: egui::Vec2 = egui::Vec2::new(120.0, 40.0);
pub const BUTTON_FONT_SIZE: f32 = 16.0;

// egui ships without CJK glyphs, so borrow one from the system
const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

pub fn install_cjk_font(ctx: &egui::Context) {
    let Some((path, bytes)) = CJK_FONT_CANDIDATES
        .iter()
        .find_map(|path| std::fs::read(path).ok().map(|bytes| (path, bytes)))
    else {
        log::warn!("no CJK font found, Chinese text may not render");
        return;
    };

    log::info!("using CJK font {}", path);
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("cjk".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push("cjk".to_owned());
    }
    ctx.set_fonts(fonts);
}
