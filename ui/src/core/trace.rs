//! Splitting a sampling trace into a warm-up prefix and a stationary suffix.
//!
//! Both halves span the full x-domain so they can be drawn as two series on
//! one timeline. They overlap at exactly one index (the cutoff), which keeps
//! the drawn line continuous across the handoff.

use super::downsample::downsample_indices;

/// Share of the trace treated as burn-in when nothing else is configured.
pub const DEFAULT_WARMUP_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentedTrace {
    pub warmup: Vec<Option<f64>>,
    pub stationary: Vec<Option<f64>>,
    pub cutoff: usize,
}

/// One display sample of a segmented trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub iteration: usize,
    pub warmup: Option<f64>,
    pub stationary: Option<f64>,
}

/// `floor(len * fraction)`, with the fraction clamped to `[0, 1]`.
pub fn warmup_cutoff(len: usize, warmup_fraction: f64) -> usize {
    let fraction = if warmup_fraction.is_finite() {
        warmup_fraction.clamp(0.0, 1.0)
    } else {
        DEFAULT_WARMUP_FRACTION
    };
    ((len as f64 * fraction).floor() as usize).min(len)
}

pub fn segment(trace: &[f64], warmup_fraction: f64) -> SegmentedTrace {
    let cutoff = warmup_cutoff(trace.len(), warmup_fraction);

    let warmup = trace
        .iter()
        .enumerate()
        .map(|(index, &value)| (index <= cutoff).then_some(value))
        .collect();
    let stationary = trace
        .iter()
        .enumerate()
        .map(|(index, &value)| (index >= cutoff).then_some(value))
        .collect();

    SegmentedTrace {
        warmup,
        stationary,
        cutoff,
    }
}

impl SegmentedTrace {
    pub fn len(&self) -> usize {
        self.warmup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warmup.is_empty()
    }

    /// Thin both series with the shared stride rule. The cutoff index is
    /// always kept so the two drawn series still meet.
    pub fn thin(&self, max_points: usize) -> Vec<TracePoint> {
        let mut indices = downsample_indices(self.len(), max_points);
        if self.cutoff < self.len() {
            if let Err(slot) = indices.binary_search(&self.cutoff) {
                indices.insert(slot, self.cutoff);
            }
        }

        indices
            .into_iter()
            .map(|iteration| TracePoint {
                iteration,
                warmup: self.warmup[iteration],
                stationary: self.stationary[iteration],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_overlap_only_at_cutoff() {
        let trace: Vec<f64> = (0..57).map(|i| i as f64 * 0.5).collect();
        for fraction in [0.0, 0.1, 0.25, 0.5, 0.9] {
            let seg = segment(&trace, fraction);
            assert_eq!(seg.warmup.len(), trace.len());
            assert_eq!(seg.stationary.len(), trace.len());
            assert_eq!(seg.cutoff, (trace.len() as f64 * fraction).floor() as usize);

            for index in 0..trace.len() {
                let both = seg.warmup[index].is_some() && seg.stationary[index].is_some();
                if index == seg.cutoff {
                    assert!(both);
                    assert_eq!(seg.warmup[index], seg.stationary[index]);
                } else {
                    assert!(
                        seg.warmup[index].is_some() ^ seg.stationary[index].is_some(),
                        "index {index} with fraction {fraction}"
                    );
                }
            }
        }
    }

    #[test]
    fn default_fraction_cuts_first_tenth() {
        let trace = vec![1.0; 2_000];
        let seg = segment(&trace, DEFAULT_WARMUP_FRACTION);
        assert_eq!(seg.cutoff, 200);
        assert_eq!(seg.warmup[200], Some(1.0));
        assert_eq!(seg.warmup[201], None);
        assert_eq!(seg.stationary[199], None);
    }

    #[test]
    fn empty_trace_segments_to_nothing() {
        let seg = segment(&[], 0.1);
        assert!(seg.is_empty());
        assert_eq!(seg.cutoff, 0);
        assert!(seg.thin(500).is_empty());
    }

    #[test]
    fn full_warmup_leaves_stationary_absent() {
        let seg = segment(&[1.0, 2.0, 3.0], 1.0);
        assert_eq!(seg.cutoff, 3);
        assert!(seg.warmup.iter().all(Option::is_some));
        assert!(seg.stationary.iter().all(Option::is_none));
    }

    #[test]
    fn odd_fractions_are_clamped() {
        assert_eq!(warmup_cutoff(100, -0.5), 0);
        assert_eq!(warmup_cutoff(100, 3.0), 100);
        assert_eq!(warmup_cutoff(100, f64::NAN), 10);
    }

    #[test]
    fn thinning_keeps_the_handoff_point() {
        let trace: Vec<f64> = (0..10_007).map(|i| i as f64).collect();
        let seg = segment(&trace, 0.1);
        let points = seg.thin(500);
        assert!(points.len() <= 502);

        let handoff = points
            .iter()
            .find(|p| p.iteration == seg.cutoff)
            .expect("cutoff kept");
        assert_eq!(handoff.warmup, handoff.stationary);
        assert_eq!(points.last().map(|p| p.iteration), Some(trace.len() - 1));
        assert!(points.windows(2).all(|w| w[0].iteration < w[1].iteration));
    }
}
