mod dispatcher;

pub use dispatcher::{ChartEvent, HoverTarget};

use crate::data::dataset::Dataset;
use crate::render::surfaces::{AxisLayout, GridRows, PathLayer, SymbolLayer};
use crate::render::sync;
use crate::state::load_tracker::Generation;
use crate::state::palette::StyleRegistry;
use crate::state::scales::{ScaleMode, ScaleRegistry};
use crate::state::selection::Selection;

/// Where a dataset came from and how to title it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadMeta {
    pub source: String,
    pub title: String,
}

/// Everything derived from one loaded dataset: scales, styles, the
/// selection and the three highlight surfaces.
///
/// Created on the first successful load and replaced wholesale on reload.
/// The selection can only be changed through [`ChartSession::dispatch`].
pub struct ChartSession {
    dataset: Dataset,
    meta: LoadMeta,
    generation: Generation,
    scales: ScaleRegistry,
    styles: StyleRegistry,
    selection: Selection,
    hover: Option<HoverTarget>,
    size: egui::Vec2,
    axes: AxisLayout,
    paths: PathLayer,
    symbols: SymbolLayer,
    rows: GridRows,
}

impl ChartSession {
    pub fn new(dataset: Dataset, meta: LoadMeta, generation: Generation, size: egui::Vec2) -> Self {
        let scales = ScaleRegistry::build(&dataset, dataset.variables(), size.y);
        let styles = StyleRegistry::build(&dataset);
        let mut session = Self {
            dataset,
            meta,
            generation,
            scales,
            styles,
            selection: Selection::new(),
            hover: None,
            size,
            axes: AxisLayout::default(),
            paths: PathLayer::default(),
            symbols: SymbolLayer::default(),
            rows: GridRows::default(),
        };
        session.relayout();
        session
    }

    /// Swap in a newly loaded dataset. Selected ids that survive the reload
    /// stay selected; the scale mode goes back to data extents.
    pub fn replace_dataset(&mut self, dataset: Dataset, meta: LoadMeta, generation: Generation) {
        let purged = self.selection.retain_known(&dataset);
        if purged > 0 {
            tracing::debug!("Dropped {purged} selected models missing from the new dataset");
        }
        self.scales = ScaleRegistry::build(&dataset, dataset.variables(), self.size.y);
        self.styles = StyleRegistry::build(&dataset);
        self.dataset = dataset;
        self.meta = meta;
        self.generation = generation;
        self.hover = None;
        self.relayout();
    }

    /// Rebuild scales and geometry when the plot area changes size.
    pub fn resize(&mut self, size: egui::Vec2) {
        if (size - self.size).length() < 0.5 {
            return;
        }
        self.size = size;
        // A width-only change keeps the vertical scales.
        if size.y != self.scales.pixel_height() {
            self.scales = self.scales.rebuilt(&self.dataset, size.y);
        }
        self.relayout();
    }

    /// Apply one shared domain to every axis.
    pub fn set_custom_scale(&mut self, low: f64, high: f64) {
        self.scales = ScaleRegistry::build_custom((low, high), self.dataset.variables(), self.size.y);
        tracing::info!("Applied custom scale [{low}, {high}]");
        self.relayout();
    }

    /// Go back to per-variable data extents.
    pub fn reset_scale(&mut self) {
        if self.scales.mode() == ScaleMode::Data {
            return;
        }
        self.scales = ScaleRegistry::build(&self.dataset, self.dataset.variables(), self.size.y);
        tracing::info!("Restored data scales");
        self.relayout();
    }

    fn relayout(&mut self) {
        self.axes = AxisLayout::build(&self.scales, self.size.x);
        self.paths.layout(&self.dataset, &self.scales, &self.axes);
        self.symbols
            .layout(&self.dataset, &self.scales, &self.axes, &self.styles);
        self.rows.layout(&self.dataset);
        self.synchronize();
    }

    /// Reconcile all three surfaces with the selection.
    fn synchronize(&mut self) {
        sync::apply(
            &self.selection,
            &self.dataset,
            &mut [&mut self.paths, &mut self.rows, &mut self.symbols],
        );
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn meta(&self) -> &LoadMeta {
        &self.meta
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn scales(&self) -> &ScaleRegistry {
        &self.scales
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn hover(&self) -> Option<&HoverTarget> {
        self.hover.as_ref()
    }

    pub fn axes(&self) -> &AxisLayout {
        &self.axes
    }

    pub fn paths(&self) -> &PathLayer {
        &self.paths
    }

    pub fn symbols(&self) -> &SymbolLayer {
        &self.symbols
    }

    pub fn rows(&self) -> &GridRows {
        &self.rows
    }

    #[cfg(test)]
    pub fn surfaces(&self) -> [&dyn crate::render::surfaces::HighlightSurface; 3] {
        [&self.paths, &self.rows, &self.symbols]
    }
}
