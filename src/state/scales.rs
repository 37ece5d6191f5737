use std::collections::HashMap;

use crate::data::dataset::Dataset;

/// Maps a numeric domain linearly onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// A degenerate domain (`min == max`) maps every value to the middle of
    /// the range instead of dividing by zero.
    pub fn map(&self, value: f64) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        let t = (value - d0) / span;
        r0 + (t as f32) * (r1 - r0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.domain.0 == self.domain.1
    }
}

/// Spreads variables evenly across a width, with one step of outer padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointScale {
    count: usize,
    width: f32,
}

impl PointScale {
    const PADDING: f32 = 1.0;

    pub fn new(count: usize, width: f32) -> Self {
        Self { count, width }
    }

    pub fn step(&self) -> f32 {
        let slots = (self.count as f32 - 1.0 + 2.0 * Self::PADDING).max(1.0);
        self.width / slots
    }

    pub fn position(&self, index: usize) -> f32 {
        let step = self.step();
        let used = step * (self.count as f32 - 1.0).max(0.0);
        (self.width - used) / 2.0 + step * index as f32
    }

    pub fn positions(&self) -> Vec<f32> {
        (0..self.count).map(|i| self.position(i)).collect()
    }
}

/// How the per-variable domains are chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    /// Each variable uses its own data extent.
    Data,
    /// Every variable shares the same user-supplied domain.
    Custom { low: f64, high: f64 },
}

/// Every variable's vertical scale, built together from one snapshot.
///
/// There is no way to change a single variable's scale: callers build a new
/// registry and swap it in whole.
#[derive(Debug, Clone)]
pub struct ScaleRegistry {
    mode: ScaleMode,
    pixel_height: f32,
    variables: Vec<String>,
    scales: HashMap<String, LinearScale>,
}

impl ScaleRegistry {
    pub fn build(dataset: &Dataset, variables: &[String], pixel_height: f32) -> Self {
        let scales = variables
            .iter()
            .map(|v| {
                let domain = dataset.extent(v).unwrap_or((0.0, 0.0));
                let scale = LinearScale::new(domain, (pixel_height, 0.0));
                if scale.is_degenerate() {
                    tracing::debug!("Variable '{v}' has a single value; its axis collapses to the midpoint");
                }
                (v.clone(), scale)
            })
            .collect();
        Self {
            mode: ScaleMode::Data,
            pixel_height,
            variables: variables.to_vec(),
            scales,
        }
    }

    pub fn build_custom(domain: (f64, f64), variables: &[String], pixel_height: f32) -> Self {
        let (low, high) = if domain.0 <= domain.1 {
            domain
        } else {
            (domain.1, domain.0)
        };
        let scales = variables
            .iter()
            .map(|v| (v.clone(), LinearScale::new((low, high), (pixel_height, 0.0))))
            .collect();
        Self {
            mode: ScaleMode::Custom { low, high },
            pixel_height,
            variables: variables.to_vec(),
            scales,
        }
    }

    /// Rebuild for a new height (or dataset) keeping the current mode.
    pub fn rebuilt(&self, dataset: &Dataset, pixel_height: f32) -> Self {
        match self.mode {
            ScaleMode::Data => Self::build(dataset, dataset.variables(), pixel_height),
            ScaleMode::Custom { low, high } => {
                Self::build_custom((low, high), dataset.variables(), pixel_height)
            }
        }
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    pub fn pixel_height(&self) -> f32 {
        self.pixel_height
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn get(&self, variable: &str) -> Option<&LinearScale> {
        self.scales.get(variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::tests::{raw, sample};
    use crate::data::dataset::DEFAULT_IDENTIFIER;

    #[test]
    fn data_scales_span_each_extent() {
        let ds = sample();
        let reg = ScaleRegistry::build(&ds, ds.variables(), 100.0);
        assert_eq!(reg.variables().len(), 2);
        let x = reg.get("x").unwrap();
        assert_eq!(x.domain, (1.0, 3.0));
        assert_eq!(x.map(1.0), 100.0);
        assert_eq!(x.map(3.0), 0.0);
        assert_eq!(x.map(2.0), 50.0);
        assert_eq!(reg.mode(), ScaleMode::Data);
    }

    #[test]
    fn tied_domain_collapses_to_midpoint() {
        let ds = Dataset::load(
            vec![
                raw(&[("model_name", "A"), ("flat", "7")]),
                raw(&[("model_name", "B"), ("flat", "7")]),
            ],
            DEFAULT_IDENTIFIER,
        )
        .unwrap();
        let reg = ScaleRegistry::build(&ds, ds.variables(), 80.0);
        let flat = reg.get("flat").unwrap();
        assert!(flat.is_degenerate());
        assert_eq!(flat.map(7.0), 40.0);
        assert_eq!(flat.map(-3.0), 40.0);
    }

    #[test]
    fn custom_domain_applies_to_every_variable() {
        let ds = sample();
        let reg = ScaleRegistry::build_custom((10.0, -10.0), ds.variables(), 200.0);
        assert_eq!(reg.mode(), ScaleMode::Custom { low: -10.0, high: 10.0 });
        for v in ds.variables() {
            let s = reg.get(v).unwrap();
            assert_eq!(s.domain, (-10.0, 10.0));
            assert_eq!(s.map(0.0), 100.0);
        }
    }

    #[test]
    fn rebuild_keeps_mode() {
        let ds = sample();
        let custom = ScaleRegistry::build_custom((0.0, 5.0), ds.variables(), 100.0);
        let resized = custom.rebuilt(&ds, 50.0);
        assert_eq!(resized.mode(), custom.mode());
        assert_eq!(resized.pixel_height(), 50.0);
        assert_eq!(resized.get("y").unwrap().map(5.0), 0.0);

        let data = ScaleRegistry::build(&ds, ds.variables(), 100.0).rebuilt(&ds, 10.0);
        assert_eq!(data.get("x").unwrap().range, (10.0, 0.0));
    }

    #[test]
    fn point_scale_pads_one_step_each_side() {
        let two = PointScale::new(2, 300.0);
        assert_eq!(two.positions(), vec![100.0, 200.0]);

        let one = PointScale::new(1, 300.0);
        assert_eq!(one.positions(), vec![150.0]);

        let four = PointScale::new(4, 500.0);
        assert_eq!(four.step(), 100.0);
        assert_eq!(four.position(0), 100.0);
        assert_eq!(four.position(3), 400.0);
    }
}
