use crate::state::scales::LinearScale;

/// Roughly how many labelled ticks an axis should carry.
const TARGET_TICKS: f64 = 8.0;
/// Upper bound on ticks for one axis, whatever the step turns out to be.
const MAX_TICKS: f64 = 64.0;

/// Tick values for an axis domain, on a 1/2/5 step sequence.
/// A degenerate domain yields its single value.
pub fn compute_ticks(min: f64, max: f64) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let range = max - min;
    if range == 0.0 {
        return vec![min];
    }

    let raw_step = range / TARGET_TICKS;
    let order = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / order;
    let step = if normalized <= 1.0 {
        order
    } else if normalized <= 2.0 {
        2.0 * order
    } else if normalized <= 5.0 {
        5.0 * order
    } else {
        10.0 * order
    };

    // Spans near the subnormal range underflow the step to zero.
    if !(step.is_finite() && step > 0.0) {
        return vec![min];
    }
    let start = (min / step).ceil();
    let end = (max / step).floor();
    if !start.is_finite() || !end.is_finite() || end - start > MAX_TICKS {
        return vec![min];
    }
    (start as i64..=end as i64)
        .map(|i| i as f64 * step)
        .map(|v| if v.abs() < step * 1e-9 { 0.0 } else { v })
        .collect()
}

/// Ticks paired with their pixel offset along the axis.
pub fn axis_ticks(scale: &LinearScale) -> Vec<(f64, f32)> {
    compute_ticks(scale.domain.0, scale.domain.1)
        .into_iter()
        .map(|v| (v, scale.map(v)))
        .collect()
}

/// Format a numeric value for axis tick labels and tooltips.
pub fn format_tick_value(val: f64) -> String {
    if val.abs() >= 1e6 || (val != 0.0 && val.abs() < 1e-3) {
        format!("{val:.2e}")
    } else if val == 0.0 {
        "0".to_string()
    } else {
        let s = format!("{val:.6}");
        let s = s.trim_end_matches('0');
        let s = s.trim_end_matches('.');
        s.to_string()
    }
}
