use eframe::egui;
use egui::{pos2, vec2, Color32, Pos2, Rect, Shape, Stroke};

use crate::render::axis;
use crate::render::surfaces::{HighlightState, HighlightSurface};
use crate::state::palette::SymbolShape;
use crate::state::session::{ChartEvent, ChartSession, HoverTarget};
use crate::state::theme::Theme;

const TOP_MARGIN: f32 = 36.0;
const BOTTOM_MARGIN: f32 = 12.0;
const SIDE_MARGIN: f32 = 8.0;
/// Pointer distance (points) within which a path counts as clicked.
const PATH_TOLERANCE: f32 = 4.0;

/// Draw the parallel-coordinates chart and translate pointer input into
/// events. The session is only resized here; the selection is changed by
/// the caller dispatching the returned events.
pub fn show_chart(
    session: &mut ChartSession,
    ui: &mut egui::Ui,
    theme: &Theme,
    title: &str,
    height: f32,
    symbol_size: f32,
) -> Vec<ChartEvent> {
    let mut events = Vec::new();

    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(title).strong().size(16.0));
    });

    let available_width = ui.available_width();
    let total_height = height.max(120.0) + TOP_MARGIN + BOTTOM_MARGIN;
    let (response, painter) =
        ui.allocate_painter(vec2(available_width, total_height), egui::Sense::click());
    let total_rect = response.rect;
    let plot_rect = Rect::from_min_max(
        pos2(total_rect.left() + SIDE_MARGIN, total_rect.top() + TOP_MARGIN),
        pos2(total_rect.right() - SIDE_MARGIN, total_rect.bottom() - BOTTOM_MARGIN),
    );

    session.resize(plot_rect.size());

    painter.rect_filled(total_rect, 0.0, theme.plot_bg());

    let origin = plot_rect.min.to_vec2();
    draw_paths(&painter, session, theme, origin);
    draw_axes(&painter, session, theme, plot_rect);
    draw_symbols(&painter, session, theme, origin, symbol_size);

    // --- Pointer interaction ---
    let radius = symbol_radius(symbol_size) + 1.0;
    let local = response.hover_pos().map(|p| p - origin);
    let glyph_under = local.and_then(|p| session.symbols().hit_test(p, radius));

    match (glyph_under, session.hover()) {
        (Some(index), Some(HoverTarget::Symbol(current))) if *current == index => {}
        (Some(index), _) => events.push(ChartEvent::HoverSymbol(index)),
        (None, Some(HoverTarget::Symbol(_))) => events.push(ChartEvent::HoverEnd),
        (None, _) => {}
    }

    if response.clicked() {
        if let Some(index) = glyph_under {
            if let Some(glyph) = session.symbols().glyph(index) {
                events.push(ChartEvent::SymbolClicked(glyph.model_id.clone()));
            }
        } else if let Some(p) = local {
            if let Some(id) = session.paths().hit_test(session.axes(), p, PATH_TOLERANCE) {
                events.push(ChartEvent::PathClicked(id.to_string()));
            }
        }
    }

    if let (Some(index), Some(mouse)) = (glyph_under, response.hover_pos()) {
        draw_tooltip(&painter, session, theme, index, mouse, total_rect);
    }

    events
}

fn draw_paths(painter: &egui::Painter, session: &ChartSession, theme: &Theme, origin: egui::Vec2) {
    let paths = session.paths();
    // Highlighted paths go last so they sit on top.
    for pass in [HighlightState::Regular, HighlightState::Highlighted] {
        for path in paths.paths() {
            let state = paths.state(&path.model_id);
            if state != pass {
                continue;
            }
            let stroke = theme.path_stroke(session.styles().style(&path.model_id).color32(), state);

            let mut run: Vec<Pos2> = Vec::new();
            for point in path.points.iter().chain(std::iter::once(&None)) {
                match point {
                    Some(p) => run.push(*p + origin),
                    None => {
                        if run.len() >= 2 {
                            painter.add(Shape::line(std::mem::take(&mut run), stroke));
                        }
                        run.clear();
                    }
                }
            }
        }
    }
}

fn draw_axes(painter: &egui::Painter, session: &ChartSession, theme: &Theme, plot_rect: Rect) {
    let axes = session.axes();
    let axis_color = theme.axis_color();
    let font = egui::FontId::proportional(10.0);
    let title_font = egui::FontId::proportional(12.0);

    for (variable, &x) in axes.variables.iter().zip(&axes.x) {
        let sx = plot_rect.left() + x;
        painter.line_segment(
            [pos2(sx, plot_rect.top()), pos2(sx, plot_rect.bottom())],
            Stroke::new(1.0, axis_color),
        );
        painter.text(
            pos2(sx, plot_rect.top() - 8.0),
            egui::Align2::CENTER_BOTTOM,
            variable,
            title_font.clone(),
            theme.neutral_text(),
        );

        let Some(scale) = session.scales().get(variable) else {
            continue;
        };
        for (value, y) in axis::axis_ticks(scale) {
            let sy = plot_rect.top() + y;
            painter.line_segment([pos2(sx - 4.0, sy), pos2(sx, sy)], Stroke::new(1.0, axis_color));
            painter.text(
                pos2(sx - 6.0, sy),
                egui::Align2::RIGHT_CENTER,
                axis::format_tick_value(value),
                font.clone(),
                axis_color,
            );
        }
    }
}

fn draw_symbols(
    painter: &egui::Painter,
    session: &ChartSession,
    theme: &Theme,
    origin: egui::Vec2,
    symbol_size: f32,
) {
    let symbols = session.symbols();
    let outline = Stroke::new(0.5, theme.plot_bg());
    for glyph in symbols.glyphs() {
        let state = symbols.state(&glyph.model_id);
        let fill = theme.symbol_fill(session.styles().style(&glyph.model_id).color32(), state);
        paint_symbol(painter, glyph.shape, glyph.center + origin, symbol_size, fill, outline);
    }
}

/// Half-extent of a symbol whose area is `size` square points.
fn symbol_radius(size: f32) -> f32 {
    size.max(1.0).sqrt() / 2.0
}

pub(crate) fn paint_symbol(
    painter: &egui::Painter,
    shape: SymbolShape,
    center: Pos2,
    size: f32,
    fill: Color32,
    outline: Stroke,
) {
    let r = symbol_radius(size);
    match shape {
        SymbolShape::Circle => {
            painter.circle(center, (size / std::f32::consts::PI).sqrt(), fill, outline);
        }
        SymbolShape::Square => {
            painter.rect(
                Rect::from_center_size(center, vec2(2.0 * r, 2.0 * r)),
                0.0,
                fill,
                outline,
                egui::StrokeKind::Middle,
            );
        }
        SymbolShape::Diamond => {
            let h = r * 1.3;
            let w = r * 0.8;
            painter.add(Shape::convex_polygon(
                vec![
                    center + vec2(0.0, -h),
                    center + vec2(w, 0.0),
                    center + vec2(0.0, h),
                    center + vec2(-w, 0.0),
                ],
                fill,
                outline,
            ));
        }
        SymbolShape::Triangle => {
            painter.add(Shape::convex_polygon(
                vec![
                    center + vec2(0.0, -r * 1.2),
                    center + vec2(r * 1.1, r * 0.8),
                    center + vec2(-r * 1.1, r * 0.8),
                ],
                fill,
                outline,
            ));
        }
        SymbolShape::Cross => {
            let arm = r * 0.4;
            painter.rect_filled(Rect::from_center_size(center, vec2(2.0 * r, 2.0 * arm)), 0.0, fill);
            painter.rect_filled(Rect::from_center_size(center, vec2(2.0 * arm, 2.0 * r)), 0.0, fill);
        }
        SymbolShape::Star => {
            let outer = r * 1.3;
            let inner = outer * 0.4;
            let point = |i: usize, radius: f32| {
                let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
                center + vec2(angle.cos(), angle.sin()) * radius
            };
            let core: Vec<Pos2> = (0..5).map(|i| point(2 * i + 1, inner)).collect();
            for i in 0..5 {
                painter.add(Shape::convex_polygon(
                    vec![point(2 * i + 1, inner), point(2 * i, outer), point((2 * i + 9) % 10, inner)],
                    fill,
                    Stroke::NONE,
                ));
            }
            painter.add(Shape::convex_polygon(core, fill, Stroke::NONE));
        }
        SymbolShape::Wye => {
            let stroke = Stroke::new(r * 0.6, fill);
            for i in 0..3 {
                let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * 2.0 * std::f32::consts::PI / 3.0;
                painter.line_segment([center, center + vec2(angle.cos(), angle.sin()) * r * 1.2], stroke);
            }
        }
    }
}

fn draw_tooltip(
    painter: &egui::Painter,
    session: &ChartSession,
    theme: &Theme,
    index: usize,
    mouse: Pos2,
    bounds: Rect,
) {
    let Some(glyph) = session.symbols().glyph(index) else {
        return;
    };
    let text = format!(
        "{}\n{}: {}",
        glyph.model_id,
        glyph.variable,
        axis::format_tick_value(glyph.value)
    );
    let galley = painter.layout_no_wrap(text, egui::FontId::proportional(11.0), theme.neutral_text());
    let size = galley.size() + vec2(12.0, 8.0);

    // Flip to the left of the pointer near the right edge.
    let mut min = mouse + vec2(14.0, -size.y - 6.0);
    if min.x + size.x > bounds.right() {
        min.x = mouse.x - size.x - 14.0;
    }
    min.y = min.y.max(bounds.top());
    let rect = Rect::from_min_size(min, size);

    painter.rect(
        rect,
        4.0,
        theme.plot_bg().gamma_multiply(0.95),
        Stroke::new(1.0, theme.axis_color()),
        egui::StrokeKind::Inside,
    );
    painter.galley(rect.min + vec2(6.0, 4.0), galley, theme.neutral_text());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_radius_grows_with_area() {
        assert_eq!(symbol_radius(64.0), 4.0);
        assert!(symbol_radius(0.0) > 0.0);
        assert!(symbol_radius(100.0) > symbol_radius(64.0));
    }
}
