use kiddo::KdTree;
use kiddo::SquaredEuclidean;

/// 2D KD-tree over glyph centres for nearest-glyph pointer lookup.
pub struct GlyphTree {
    tree: KdTree<f64, 2>,
    len: usize,
}

impl GlyphTree {
    /// Build from glyph centres. The item stored for each point is its
    /// index in `points`. Non-finite points are left out.
    pub fn build(points: &[(f32, f32)]) -> Self {
        let mut tree: KdTree<f64, 2> = KdTree::new();
        let mut len = 0;
        for (i, &(x, y)) in points.iter().enumerate() {
            if x.is_finite() && y.is_finite() {
                tree.add(&[x as f64, y as f64], i as u64);
                len += 1;
            }
        }
        Self { tree, len }
    }

    /// Index of the nearest glyph within `max_distance`, if any.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let result = self.tree.nearest_one::<SquaredEuclidean>(&[x as f64, y as f64]);
        let dist = result.distance.sqrt();
        if dist <= max_distance as f64 {
            Some(result.item as usize)
        } else {
            None
        }
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn nearest_glyph_respects_radius() {
        let tree = GlyphTree::build(&[(0.0, 0.0), (10.0, 10.0), (f32::NAN, 1.0)]);
        assert_eq!(tree.nearest_within(9.0, 9.5, 3.0), Some(1));
        assert_eq!(tree.nearest_within(5.0, 5.0, 3.0), None);
    }

    #[test]
    fn empty_tree_finds_nothing() {
        let tree = GlyphTree::build(&[]);
        assert_eq!(tree.nearest_within(0.0, 0.0, 100.0), None);
    }

    #[test]
    fn segment_distance() {
        let a = pos2(0.0, 0.0);
        let b = pos2(10.0, 0.0);
        assert_eq!(distance_to_segment(pos2(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(pos2(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_segment(pos2(1.0, 1.0), a, a), 2f32.sqrt());
    }
}
