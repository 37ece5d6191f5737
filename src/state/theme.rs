use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

use crate::render::surfaces::HighlightState;

/// Grey tint shown under the pointer on a non-highlighted grid row.
pub const ROW_HOVER_TINT: Color32 = Color32::from_rgb(0x9e, 0x9e, 0x9e);

/// Text drawn on top of a model-coloured (highlighted) row.
pub const HIGHLIGHT_TEXT: Color32 = Color32::from_rgb(0xde, 0xff, 0xff);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    pub fn plot_bg(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(20, 20, 20),
            Theme::Light => Color32::from_rgb(255, 255, 255),
        }
    }

    pub fn axis_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(200),
            Theme::Light => Color32::from_gray(30),
        }
    }

    /// Text colour of a regular grid row.
    pub fn neutral_text(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(210),
            Theme::Light => Color32::from_rgb(0x4a, 0x4a, 0x4a),
        }
    }

    /// The palette is dark; lift it on the dark background so lines stay visible.
    fn model_on_background(&self, model: Color32) -> Color32 {
        match self {
            Theme::Dark => lerp_color(model, Color32::WHITE, 0.35),
            Theme::Light => model,
        }
    }

    pub fn path_stroke(&self, model: Color32, state: HighlightState) -> egui::Stroke {
        let color = self.model_on_background(model);
        match state {
            HighlightState::Highlighted => egui::Stroke::new(3.0, color),
            HighlightState::Regular => egui::Stroke::new(1.2, color.gamma_multiply(0.35)),
        }
    }

    pub fn symbol_fill(&self, model: Color32, state: HighlightState) -> Color32 {
        let color = self.model_on_background(model);
        match state {
            HighlightState::Highlighted => color,
            HighlightState::Regular => color.gamma_multiply(0.75),
        }
    }

    /// Background and text colour of a grid row. Hover only tints rows that
    /// are not highlighted.
    pub fn row_colors(
        &self,
        model: Color32,
        state: HighlightState,
        hovered: bool,
    ) -> (Color32, Color32) {
        match (state, hovered) {
            (HighlightState::Highlighted, _) => (model, HIGHLIGHT_TEXT),
            (HighlightState::Regular, true) => (ROW_HOVER_TINT, self.neutral_text()),
            (HighlightState::Regular, false) => (Color32::TRANSPARENT, self.neutral_text()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()), a.a())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_never_overrides_highlight() {
        let model = Color32::from_rgb(4, 94, 15);
        let theme = Theme::Light;
        assert_eq!(
            theme.row_colors(model, HighlightState::Highlighted, true),
            (model, HIGHLIGHT_TEXT)
        );
        assert_eq!(
            theme.row_colors(model, HighlightState::Regular, true).0,
            ROW_HOVER_TINT
        );
        assert_eq!(
            theme.row_colors(model, HighlightState::Regular, false).0,
            Color32::TRANSPARENT
        );
    }

    #[test]
    fn highlighted_paths_are_thicker() {
        let model = Color32::from_rgb(38, 17, 254);
        for theme in [Theme::Dark, Theme::Light] {
            let lit = theme.path_stroke(model, HighlightState::Highlighted);
            let dim = theme.path_stroke(model, HighlightState::Regular);
            assert!(lit.width > dim.width);
            assert!(lit.color.a() > dim.color.a());
        }
    }
}
