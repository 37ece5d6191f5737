use super::ChartSession;

/// Pointer input resolved to model ids. Handlers never carry row records.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    RowClicked(String),
    PathClicked(String),
    SymbolClicked(String),
    SelectAll,
    DeselectAll,
    HoverRow(String),
    /// Index into the symbol layer's glyphs.
    HoverSymbol(usize),
    HoverEnd,
}

/// Transient pointer feedback. Never part of the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverTarget {
    Row(String),
    Symbol(usize),
}

impl ChartSession {
    /// Apply one event. Returns `true` when the selection changed, in which
    /// case every surface has already been reconciled.
    pub fn dispatch(&mut self, event: ChartEvent) -> bool {
        match event {
            ChartEvent::RowClicked(id) | ChartEvent::PathClicked(id) | ChartEvent::SymbolClicked(id) => {
                if !self.dataset.contains(&id) {
                    tracing::warn!("Ignoring click on unknown model '{id}'");
                    return false;
                }
                self.selection.toggle(&id);
                tracing::debug!(model = %id, selected = self.selection.contains(&id), "toggled");
            }
            ChartEvent::SelectAll => {
                self.selection.select_all(self.dataset.model_ids());
                tracing::debug!("Selected all {} models", self.selection.len());
            }
            ChartEvent::DeselectAll => {
                self.selection.clear();
                tracing::debug!("Cleared selection");
            }
            ChartEvent::HoverRow(id) => {
                self.hover = self.dataset.contains(&id).then_some(HoverTarget::Row(id));
                return false;
            }
            ChartEvent::HoverSymbol(index) => {
                self.hover = self.symbols.glyph(index).map(|_| HoverTarget::Symbol(index));
                return false;
            }
            ChartEvent::HoverEnd => {
                self.hover = None;
                return false;
            }
        }
        self.synchronize();
        true
    }

    /// Whether the grid row for `model_id` is under the pointer.
    pub fn is_row_hovered(&self, model_id: &str) -> bool {
        matches!(&self.hover, Some(HoverTarget::Row(id)) if id == model_id)
    }
}
