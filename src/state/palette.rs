use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::dataset::Dataset;

/// Per-model colours, assigned in dataset order and cycled.
pub const MODEL_PALETTE: [[u8; 4]; 24] = [
    [4, 94, 15, 255],
    [38, 17, 254, 255],
    [156, 11, 85, 255],
    [16, 85, 120, 255],
    [20, 1, 115, 255],
    [116, 69, 10, 255],
    [57, 18, 29, 255],
    [10, 37, 13, 255],
    [160, 21, 7, 255],
    [103, 63, 128, 255],
    [113, 18, 198, 255],
    [143, 9, 144, 255],
    [134, 54, 55, 255],
    [88, 78, 68, 255],
    [22, 28, 67, 255],
    [36, 72, 174, 255],
    [79, 84, 5, 255],
    [16, 90, 75, 255],
    [114, 64, 91, 255],
    [32, 60, 205, 255],
    [62, 2, 60, 255],
    [6, 22, 94, 255],
    [21, 33, 40, 255],
    [162, 3, 50, 255],
];

pub fn color_for_index(index: usize) -> [u8; 4] {
    MODEL_PALETTE[index % MODEL_PALETTE.len()]
}

/// Glyph drawn at each of a model's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolShape {
    Circle,
    Cross,
    Diamond,
    Square,
    Star,
    Triangle,
    Wye,
}

impl SymbolShape {
    pub const ALL: [SymbolShape; 7] = [
        SymbolShape::Circle,
        SymbolShape::Cross,
        SymbolShape::Diamond,
        SymbolShape::Square,
        SymbolShape::Star,
        SymbolShape::Triangle,
        SymbolShape::Wye,
    ];

    pub fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelStyle {
    pub color: [u8; 4],
    pub symbol: SymbolShape,
}

impl ModelStyle {
    pub fn color32(&self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.color[0], self.color[1], self.color[2], self.color[3])
    }
}

/// Colour and glyph for every model of a dataset.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: HashMap<String, ModelStyle>,
}

impl StyleRegistry {
    pub fn build(dataset: &Dataset) -> Self {
        let styles = dataset
            .model_ids()
            .enumerate()
            .map(|(i, id)| {
                (
                    id.to_string(),
                    ModelStyle {
                        color: color_for_index(i),
                        symbol: SymbolShape::for_index(i),
                    },
                )
            })
            .collect();
        Self { styles }
    }

    /// Unknown ids fall back to the first palette entry.
    pub fn style(&self, model_id: &str) -> ModelStyle {
        self.styles.get(model_id).copied().unwrap_or(ModelStyle {
            color: MODEL_PALETTE[0],
            symbol: SymbolShape::Circle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::sample;

    #[test]
    fn styles_follow_dataset_order() {
        let ds = sample();
        let styles = StyleRegistry::build(&ds);
        assert_eq!(styles.style("A").color, MODEL_PALETTE[0]);
        assert_eq!(styles.style("B").color, MODEL_PALETTE[1]);
        assert_eq!(styles.style("B").symbol, SymbolShape::Cross);
    }

    #[test]
    fn palette_and_shapes_cycle() {
        assert_eq!(color_for_index(MODEL_PALETTE.len() + 2), MODEL_PALETTE[2]);
        assert_eq!(SymbolShape::for_index(7), SymbolShape::Circle);
    }
}
