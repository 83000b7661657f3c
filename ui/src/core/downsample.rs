//! Thinning long numeric series down to a display budget.
//!
//! Plain stride sampling: keep every `ceil(len / max_points)`-th value and
//! always keep the final value so a curve never looks cut short.

/// Display budget used for traces unless configured otherwise.
pub const DEFAULT_MAX_POINTS: usize = 500;

/// One kept value, labelled by its 1-based position in the original series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPoint {
    pub position: usize,
    pub value: f64,
}

/// Indices (0-based) kept when thinning a series of `len` values.
///
/// Returns at most `max_points + 1` indices; the extra slot is the forced
/// final index.
pub fn downsample_indices(len: usize, max_points: usize) -> Vec<usize> {
    if len == 0 || max_points == 0 {
        return Vec::new();
    }
    if len <= max_points {
        return (0..len).collect();
    }

    let stride = len.div_ceil(max_points);
    let mut indices: Vec<usize> = (0..len).step_by(stride).collect();
    if indices.last() != Some(&(len - 1)) {
        indices.push(len - 1);
    }
    indices
}

pub fn downsample(series: &[f64], max_points: usize) -> Vec<DisplayPoint> {
    downsample_indices(series.len(), max_points)
        .into_iter()
        .map(|index| DisplayPoint {
            position: index + 1,
            value: series[index],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_is_kept_whole() {
        let points = downsample(&[3.0, 1.0, 2.0], 500);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], DisplayPoint { position: 1, value: 3.0 });
        assert_eq!(points[2].position, 3);
    }

    #[test]
    fn empty_series_yields_nothing() {
        assert!(downsample(&[], 500).is_empty());
        assert!(downsample(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn final_point_is_appended_when_stride_misses_it() {
        // 10 values, budget 4 -> stride 3 -> 0, 3, 6, 9 (hits the end naturally)
        assert_eq!(downsample_indices(10, 4), vec![0, 3, 6, 9]);
        // 11 values, budget 4 -> stride 3 -> 0, 3, 6, 9 + forced 10
        assert_eq!(downsample_indices(11, 4), vec![0, 3, 6, 9, 10]);
    }

    #[test]
    fn labels_keep_original_positions() {
        let series: Vec<f64> = (0..1_000).map(|i| i as f64).collect();
        let points = downsample(&series, 100);
        assert_eq!(points[1].position, 11);
        assert_eq!(points[1].value, 10.0);
    }

    #[test]
    fn budget_and_last_value_hold_across_lengths() {
        for len in [1usize, 2, 499, 500, 501, 999, 1_000, 1_001, 4_321, 20_000] {
            let series: Vec<f64> = (0..len).map(|i| (i as f64).sin()).collect();
            let points = downsample(&series, 500);
            assert!(points.len() <= 501, "len {len} produced {} points", points.len());
            let last = points.last().expect("non-empty");
            assert_eq!(last.value, series[len - 1]);
            assert_eq!(last.position, len);
            assert_eq!(points[0].position, 1);
        }
    }
}
