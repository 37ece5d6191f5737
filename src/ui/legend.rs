use eframe::egui;

use crate::render::surfaces::HighlightSurface;
use crate::state::session::ChartSession;
use crate::state::theme::Theme;
use crate::ui::chart_panel::paint_symbol;

/// Symbol legend: one entry per model in sorted order.
pub fn show_legend(session: &ChartSession, ui: &mut egui::Ui, theme: &Theme, symbol_size: f32) {
    ui.label(egui::RichText::new("Models").strong());
    ui.add_space(2.0);

    let swatch = symbol_size.sqrt().max(8.0) + 6.0;
    egui::ScrollArea::vertical()
        .id_salt("legend")
        .max_height(260.0)
        .show(ui, |ui| {
            for id in session.rows().order() {
                let style = session.styles().style(id);
                let state = session.symbols().state(id);
                ui.horizontal(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(swatch, swatch), egui::Sense::hover());
                    paint_symbol(
                        ui.painter(),
                        style.symbol,
                        rect.center(),
                        symbol_size,
                        theme.symbol_fill(style.color32(), state),
                        egui::Stroke::NONE,
                    );
                    let text = egui::RichText::new(id);
                    ui.label(if state.is_highlighted() { text.strong() } else { text });
                });
            }
        });
}
