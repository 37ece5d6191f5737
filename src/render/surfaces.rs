use std::collections::HashMap;

use egui::{pos2, Pos2};

use crate::data::dataset::Dataset;
use crate::render::hit_test::{distance_to_segment, GlyphTree};
use crate::state::palette::{StyleRegistry, SymbolShape};
use crate::state::scales::{PointScale, ScaleRegistry};

/// Binary highlight flag as seen by one visual surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightState {
    #[default]
    Regular,
    Highlighted,
}

impl HighlightState {
    pub fn from_selected(selected: bool) -> Self {
        if selected {
            HighlightState::Highlighted
        } else {
            HighlightState::Regular
        }
    }

    pub fn is_highlighted(self) -> bool {
        self == HighlightState::Highlighted
    }
}

/// Per-model highlight flags held by a surface. Written only by the
/// synchronizer.
#[derive(Debug, Clone, Default)]
pub struct HighlightStates {
    states: HashMap<String, HighlightState>,
}

impl HighlightStates {
    pub fn get(&self, model_id: &str) -> HighlightState {
        self.states.get(model_id).copied().unwrap_or_default()
    }

    pub(crate) fn set(&mut self, model_id: &str, state: HighlightState) {
        match self.states.get_mut(model_id) {
            Some(current) => *current = state,
            None => {
                self.states.insert(model_id.to_string(), state);
            }
        }
    }

    pub(crate) fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.states.retain(|id, _| keep(id));
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|(_, s)| s.is_highlighted())
            .map(|(id, _)| id.as_str())
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted().count()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.states.len()
    }
}

/// A view that shows one highlight flag per model.
pub trait HighlightSurface {
    fn name(&self) -> &'static str;
    fn states(&self) -> &HighlightStates;
    fn states_mut(&mut self) -> &mut HighlightStates;

    fn state(&self, model_id: &str) -> HighlightState {
        self.states().get(model_id)
    }
}

/// One model's polyline through every axis, in chart-local pixels.
/// Missing values leave a gap (`None`).
#[derive(Debug, Clone)]
pub struct CoordinatePath {
    pub model_id: String,
    pub points: Vec<Option<Pos2>>,
}

/// A model's value plotted on one axis.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub model_id: String,
    pub variable: String,
    pub value: f64,
    pub center: Pos2,
    pub shape: SymbolShape,
}

/// Axis positions shared by paths and glyphs.
#[derive(Debug, Clone, Default)]
pub struct AxisLayout {
    pub variables: Vec<String>,
    pub x: Vec<f32>,
}

impl AxisLayout {
    pub fn build(scales: &ScaleRegistry, width: f32) -> Self {
        let variables = scales.variables().to_vec();
        let x = PointScale::new(variables.len(), width).positions();
        Self { variables, x }
    }

    /// Index `i` such that `px` lies between axis `i` and axis `i + 1`.
    pub fn bracket(&self, px: f32) -> Option<usize> {
        self.x.windows(2).position(|w| px >= w[0] && px <= w[1])
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathLayer {
    states: HighlightStates,
    paths: Vec<CoordinatePath>,
}

impl PathLayer {
    pub fn layout(&mut self, dataset: &Dataset, scales: &ScaleRegistry, axes: &AxisLayout) {
        self.paths = dataset
            .rows()
            .iter()
            .map(|row| CoordinatePath {
                model_id: row.model_id.clone(),
                points: axes
                    .variables
                    .iter()
                    .zip(&axes.x)
                    .map(|(variable, &x)| {
                        let value = row.value(variable).filter(|v| v.is_finite())?;
                        let scale = scales.get(variable)?;
                        Some(pos2(x, scale.map(value)))
                    })
                    .collect(),
            })
            .collect();
    }

    pub fn paths(&self) -> &[CoordinatePath] {
        &self.paths
    }

    /// Model whose path passes closest to `pointer`, within `tolerance`
    /// pixels. Only the segment between the two bracketing axes is tested.
    pub fn hit_test(&self, axes: &AxisLayout, pointer: Pos2, tolerance: f32) -> Option<&str> {
        let i = axes.bracket(pointer.x)?;
        self.paths
            .iter()
            .filter_map(|path| {
                let a = (*path.points.get(i)?)?;
                let b = (*path.points.get(i + 1)?)?;
                let d = distance_to_segment(pointer, a, b);
                (d <= tolerance).then_some((d, path.model_id.as_str()))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }
}

impl HighlightSurface for PathLayer {
    fn name(&self) -> &'static str {
        "paths"
    }

    fn states(&self) -> &HighlightStates {
        &self.states
    }

    fn states_mut(&mut self) -> &mut HighlightStates {
        &mut self.states
    }
}

#[derive(Default)]
pub struct SymbolLayer {
    states: HighlightStates,
    glyphs: Vec<Glyph>,
    tree: Option<GlyphTree>,
}

impl SymbolLayer {
    pub fn layout(
        &mut self,
        dataset: &Dataset,
        scales: &ScaleRegistry,
        axes: &AxisLayout,
        styles: &StyleRegistry,
    ) {
        let mut glyphs = Vec::with_capacity(dataset.len() * axes.variables.len());
        for row in dataset.rows() {
            let shape = styles.style(&row.model_id).symbol;
            for (variable, &x) in axes.variables.iter().zip(&axes.x) {
                let Some(value) = row.value(variable).filter(|v| v.is_finite()) else {
                    continue;
                };
                let Some(scale) = scales.get(variable) else {
                    continue;
                };
                glyphs.push(Glyph {
                    model_id: row.model_id.clone(),
                    variable: variable.clone(),
                    value,
                    center: pos2(x, scale.map(value)),
                    shape,
                });
            }
        }
        let centers: Vec<(f32, f32)> = glyphs.iter().map(|g| (g.center.x, g.center.y)).collect();
        self.tree = Some(GlyphTree::build(&centers));
        self.glyphs = glyphs;
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn glyph(&self, index: usize) -> Option<&Glyph> {
        self.glyphs.get(index)
    }

    /// Index of the glyph under `pointer`, if any.
    pub fn hit_test(&self, pointer: Pos2, radius: f32) -> Option<usize> {
        self.tree.as_ref()?.nearest_within(pointer.x, pointer.y, radius)
    }
}

impl HighlightSurface for SymbolLayer {
    fn name(&self) -> &'static str {
        "symbols"
    }

    fn states(&self) -> &HighlightStates {
        &self.states
    }

    fn states_mut(&mut self) -> &mut HighlightStates {
        &mut self.states
    }
}

/// Rows of the data grid, in display order.
#[derive(Debug, Clone, Default)]
pub struct GridRows {
    states: HighlightStates,
    order: Vec<String>,
}

impl GridRows {
    pub fn layout(&mut self, dataset: &Dataset) {
        self.order = dataset
            .sorted_model_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }
}

impl HighlightSurface for GridRows {
    fn name(&self) -> &'static str {
        "rows"
    }

    fn states(&self) -> &HighlightStates {
        &self.states
    }

    fn states_mut(&mut self) -> &mut HighlightStates {
        &mut self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::{raw, sample};
    use crate::data::dataset::DEFAULT_IDENTIFIER;

    fn laid_out(ds: &Dataset) -> (AxisLayout, PathLayer, SymbolLayer) {
        let scales = ScaleRegistry::build(ds, ds.variables(), 100.0);
        let axes = AxisLayout::build(&scales, 300.0);
        let mut paths = PathLayer::default();
        paths.layout(ds, &scales, &axes);
        let mut symbols = SymbolLayer::default();
        symbols.layout(ds, &scales, &axes, &StyleRegistry::build(ds));
        (axes, paths, symbols)
    }

    #[test]
    fn paths_cross_every_axis() {
        let ds = sample();
        let (axes, paths, _) = laid_out(&ds);
        assert_eq!(axes.x, vec![100.0, 200.0]);
        let a = &paths.paths()[0];
        assert_eq!(a.model_id, "A");
        assert_eq!(a.points, vec![Some(pos2(100.0, 100.0)), Some(pos2(200.0, 100.0))]);
    }

    #[test]
    fn path_hit_test_picks_nearest_segment() {
        let ds = sample();
        let (axes, paths, _) = laid_out(&ds);
        // A runs along y=100, B along y=0.
        assert_eq!(paths.hit_test(&axes, pos2(150.0, 97.0), 4.0), Some("A"));
        assert_eq!(paths.hit_test(&axes, pos2(150.0, 2.0), 4.0), Some("B"));
        assert_eq!(paths.hit_test(&axes, pos2(150.0, 50.0), 4.0), None);
        assert_eq!(paths.hit_test(&axes, pos2(20.0, 100.0), 4.0), None);
    }

    #[test]
    fn missing_values_leave_gaps() {
        let ds = Dataset::load(
            vec![
                raw(&[("model_name", "A"), ("x", "1"), ("y", "")]),
                raw(&[("model_name", "B"), ("x", "2"), ("y", "3")]),
            ],
            DEFAULT_IDENTIFIER,
        )
        .unwrap();
        let (_, paths, symbols) = laid_out(&ds);
        assert_eq!(paths.paths()[0].points[1], None);
        assert_eq!(symbols.glyphs().len(), 3);
    }

    #[test]
    fn glyph_hit_test() {
        let ds = sample();
        let (_, _, symbols) = laid_out(&ds);
        let idx = symbols.hit_test(pos2(201.0, 1.0), 6.0).unwrap();
        let glyph = symbols.glyph(idx).unwrap();
        assert_eq!(glyph.model_id, "B");
        assert_eq!(glyph.variable, "y");
        assert_eq!(glyph.value, 4.0);
        assert_eq!(glyph.shape, SymbolShape::Cross);
    }

    #[test]
    fn grid_rows_sort_case_insensitively() {
        let ds = Dataset::load(
            vec![
                raw(&[("model_name", "b"), ("x", "1")]),
                raw(&[("model_name", "A"), ("x", "1")]),
            ],
            DEFAULT_IDENTIFIER,
        )
        .unwrap();
        let mut rows = GridRows::default();
        rows.layout(&ds);
        assert_eq!(rows.order(), ["A", "b"]);
    }
}
