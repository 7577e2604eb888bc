use eframe::egui::{self, Color32, CornerRadius, Stroke};

// ===== UI 主题配置 =====
pub struct Theme {
    pub bg_color: Color32,
    pub card_color: Color32,
    pub input_bg: Color32,
    pub accent_color: Color32,
    pub green_color: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub danger_color: Color32,
    pub income_line: Color32,
    pub expense_line: Color32,
    pub axis_color: Color32,
    pub guide_color: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg_color: Color32::from_rgb(25, 28, 32),
            card_color: Color32::from_rgb(35, 39, 45),
            input_bg: Color32::from_rgb(45, 50, 58),
            accent_color: Color32::from_rgb(64, 169, 255),
            green_color: Color32::from_rgb(82, 196, 126),
            text_primary: Color32::from_rgb(230, 230, 235),
            text_secondary: Color32::from_rgb(140, 145, 155),
            danger_color: Color32::from_rgb(220, 80, 80),
            income_line: Color32::from_rgb(0x1E, 0x88, 0xE5),
            expense_line: Color32::from_rgb(0xE5, 0x39, 0x35),
            axis_color: Color32::GRAY,
            guide_color: Color32::from_rgb(70, 75, 85),
        }
    }
}

impl Theme {
    /// 全局控件样式
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        style.visuals.widgets.inactive.bg_fill = self.input_bg;
        style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, Color32::from_rgb(60, 65, 75));
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(8);
        style.visuals.widgets.hovered.bg_fill = Color32::from_rgb(55, 60, 70);
        style.visuals.widgets.active.bg_fill = Color32::from_rgb(50, 55, 65);
        style.visuals.selection.bg_fill = self.accent_color;
        style.visuals.window_fill = self.card_color;
        ctx.set_style(style);
    }
}

// ===== 布局常量配置 =====
pub struct LayoutConfig {
    pub content_width: f32,
    pub panel_margin: f32,
    pub card_rounding: f32,
    pub card_inner_margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            content_width: 720.0,
            panel_margin: 32.0,
            card_rounding: 14.0,
            card_inner_margin: 18.0,
        }
    }
}
