use eframe::egui;

use crate::render::surfaces::HighlightSurface;
use crate::state::session::{ChartEvent, ChartSession, HoverTarget};
use crate::state::theme::Theme;

/// Header shown above the identifier column.
const ID_HEADER: &str = "name";

/// Helper to create a consistently-sized toolbar button.
fn toolbar_btn(ui: &mut egui::Ui, label: &str) -> egui::Response {
    ui.add(egui::Button::new(label).min_size(egui::vec2(0.0, 26.0)))
}

/// Data grid beneath the chart: one row per model, sorted by id. Rows are
/// coloured from the grid surface's highlight flags.
pub fn show_grid(session: &ChartSession, ui: &mut egui::Ui, theme: &Theme) -> Vec<ChartEvent> {
    use egui_extras::{Column, TableBuilder};

    let mut events = Vec::new();

    ui.horizontal(|ui| {
        if toolbar_btn(ui, "Select All").clicked() {
            events.push(ChartEvent::SelectAll);
        }
        let any_selected = !session.selection().is_empty();
        if ui
            .add_enabled(
                any_selected,
                egui::Button::new("Deselect All").min_size(egui::vec2(0.0, 26.0)),
            )
            .clicked()
        {
            events.push(ChartEvent::DeselectAll);
        }
        ui.separator();
        ui.label(
            egui::RichText::new(format!(
                "{} of {} selected",
                session.selection().len(),
                session.dataset().len()
            ))
            .weak(),
        );
    });
    ui.add_space(4.0);

    let dataset = session.dataset();
    let rows = session.rows();
    let order = rows.order();
    let variables = dataset.variables();

    let hovered: std::cell::Cell<Option<usize>> = std::cell::Cell::new(None);
    let clicked: std::cell::Cell<Option<usize>> = std::cell::Cell::new(None);

    TableBuilder::new(ui)
        .id_salt("model_grid")
        .striped(false)
        .resizable(true)
        .sense(egui::Sense::click())
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(80.0), variables.len())
        .min_scrolled_height(200.0)
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong(ID_HEADER);
            });
            for variable in variables {
                header.col(|ui| {
                    ui.strong(variable);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, order.len(), |mut row| {
                let index = row.index();
                let id = &order[index];
                let (fill, text) = theme.row_colors(
                    session.styles().style(id).color32(),
                    rows.state(id),
                    session.is_row_hovered(id),
                );
                let record = dataset.row(id);

                row.col(|ui| {
                    ui.painter().rect_filled(ui.max_rect(), 0.0, fill);
                    ui.label(egui::RichText::new(id).color(text));
                });
                for variable in variables {
                    row.col(|ui| {
                        ui.painter().rect_filled(ui.max_rect(), 0.0, fill);
                        let cell = match record.and_then(|r| r.value(variable)) {
                            Some(v) if v.is_finite() => format!("{v:.3}"),
                            _ => "-".to_string(),
                        };
                        ui.label(egui::RichText::new(cell).color(text));
                    });
                }

                let response = row.response();
                if response.clicked() {
                    clicked.set(Some(index));
                }
                if response.hovered() {
                    hovered.set(Some(index));
                }
            });
        });

    if let Some(index) = clicked.get() {
        events.push(ChartEvent::RowClicked(order[index].clone()));
    }

    match (hovered.get(), session.hover()) {
        (Some(index), Some(HoverTarget::Row(current))) if *current == order[index] => {}
        (Some(index), _) => events.push(ChartEvent::HoverRow(order[index].clone())),
        (None, Some(HoverTarget::Row(_))) => events.push(ChartEvent::HoverEnd),
        (None, _) => {}
    }

    events
}
