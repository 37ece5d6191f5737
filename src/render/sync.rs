use crate::data::dataset::Dataset;
use crate::render::surfaces::{HighlightState, HighlightSurface};
use crate::state::selection::Selection;

/// Re-derive every surface's highlight flags from `selection`.
///
/// Each call is a full pass: entries for models missing from `dataset` are
/// dropped and every model in `dataset` is rewritten, so repeated calls are
/// idempotent and no surface can keep a flag the selection does not hold.
pub fn apply(selection: &Selection, dataset: &Dataset, surfaces: &mut [&mut dyn HighlightSurface]) {
    for surface in surfaces.iter_mut() {
        let states = surface.states_mut();
        states.retain(|id| dataset.contains(id));
        for model_id in dataset.model_ids() {
            states.set(model_id, HighlightState::from_selected(selection.contains(model_id)));
        }
        tracing::trace!(
            surface = surface.name(),
            highlighted = surface.states().highlighted_count(),
            "reconciled"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::{raw, sample};
    use crate::data::dataset::DEFAULT_IDENTIFIER;
    use crate::render::surfaces::{GridRows, PathLayer, SymbolLayer};
    use proptest::prelude::*;

    struct Surfaces {
        paths: PathLayer,
        rows: GridRows,
        symbols: SymbolLayer,
    }

    impl Surfaces {
        fn new() -> Self {
            Self {
                paths: PathLayer::default(),
                rows: GridRows::default(),
                symbols: SymbolLayer::default(),
            }
        }

        fn apply(&mut self, selection: &Selection, dataset: &Dataset) {
            apply(
                selection,
                dataset,
                &mut [&mut self.paths, &mut self.rows, &mut self.symbols],
            );
        }

        fn all(&self) -> [&dyn HighlightSurface; 3] {
            [&self.paths, &self.rows, &self.symbols]
        }
    }

    fn many_models(n: usize) -> Dataset {
        let rows = (0..n)
            .map(|i| {
                let id = format!("M{i}");
                let value = i.to_string();
                raw(&[("model_name", id.as_str()), ("v", value.as_str())])
            })
            .collect();
        Dataset::load(rows, DEFAULT_IDENTIFIER).unwrap()
    }

    #[test]
    fn clear_leaves_nothing_highlighted() {
        let ds = sample();
        let mut surfaces = Surfaces::new();
        let mut sel = Selection::new();
        sel.select_all(ds.model_ids());
        surfaces.apply(&sel, &ds);
        sel.clear();
        surfaces.apply(&sel, &ds);
        for s in surfaces.all() {
            assert_eq!(s.states().highlighted_count(), 0, "{}", s.name());
            assert_eq!(s.states().len(), 2);
        }
    }

    #[test]
    fn select_all_highlights_exactly_the_dataset() {
        let ds = sample();
        let mut surfaces = Surfaces::new();
        let mut sel = Selection::new();
        sel.select_all(ds.model_ids());
        surfaces.apply(&sel, &ds);
        for s in surfaces.all() {
            let mut lit: Vec<&str> = s.states().highlighted().collect();
            lit.sort();
            assert_eq!(lit, ["A", "B"]);
        }
    }

    #[test]
    fn stale_models_are_dropped_on_reload() {
        let mut surfaces = Surfaces::new();
        let mut sel = Selection::new();
        sel.toggle("A");
        surfaces.apply(&sel, &sample());

        let next = Dataset::load(vec![raw(&[("model_name", "C"), ("x", "1")])], DEFAULT_IDENTIFIER).unwrap();
        sel.retain_known(&next);
        surfaces.apply(&sel, &next);
        for s in surfaces.all() {
            assert_eq!(s.states().len(), 1);
            assert_eq!(s.state("A"), HighlightState::Regular);
            assert_eq!(s.state("C"), HighlightState::Regular);
        }
    }

    #[test]
    fn apply_is_idempotent() {
        let ds = sample();
        let mut surfaces = Surfaces::new();
        let mut sel = Selection::new();
        sel.toggle("B");
        surfaces.apply(&sel, &ds);
        surfaces.apply(&sel, &ds);
        for s in surfaces.all() {
            assert_eq!(s.states().highlighted().collect::<Vec<_>>(), ["B"]);
        }
    }

    proptest! {
        #[test]
        fn surfaces_never_drift_from_selection(
            toggles in proptest::collection::vec(0usize..8, 0..24),
        ) {
            let ds = many_models(8);
            let mut surfaces = Surfaces::new();
            let mut sel = Selection::new();
            for i in toggles {
                sel.toggle(&format!("M{i}"));
                surfaces.apply(&sel, &ds);
            }
            for id in ds.model_ids() {
                let expected = HighlightState::from_selected(sel.contains(id));
                for s in surfaces.all() {
                    prop_assert_eq!(s.state(id), expected);
                }
            }
        }
    }
}
