//! Terrain irregularity of an elevation profile.

use crate::formulae::least_squares_linear_fit;

/// Interdecile range of elevations over part of a profile.
///
/// `elevations` are sampled every `interval` metres; `span` is the part of the
/// profile (in metres from the first sample) to consider. The span is
/// resampled, detrended by a least-squares line, and the range between the
/// 10% and 90% quantiles of what is left is taken. Short spans are scaled up
/// as they would underestimate the irregularity of the wider terrain.
///
/// Spans covering fewer than two intervals have no measurable irregularity.
/// A span starting before the first sample starts at it instead.
///
/// See ITM section `<48>` (d1thx).
pub fn interdecile_range(elevations: &[f64], interval: f64, span: (f64, f64)) -> f64 {
    let np = elevations.len().saturating_sub(1);
    let mut xa = (span.0 / interval).max(0.0);
    let mut xb = span.1 / interval;

    if np == 0 || xb - xa < 2.0 {
        return 0.0;
    }

    let ka = ((0.1 * (xb - xa + 8.0)) as usize).clamp(4, 25);
    let n = 10 * ka - 5;
    let kb = n - ka + 1;
    let sn = (n - 1) as f64;

    let mut samples = Vec::with_capacity(n);
    xb = (xb - xa) / sn;
    let mut k = ((xa + 1.0) as usize).min(np);
    xa -= k as f64;

    for _ in 0..n {
        while xa > 0.0 && k < np {
            xa -= 1.0;
            k += 1;
        }

        samples.push(elevations[k] + (elevations[k] - elevations[k - 1]) * xa);
        xa += xb;
    }

    let (mut xa, xb) = least_squares_linear_fit(1.0, &samples, (0.0, sn));
    let step = (xb - xa) / sn;
    for s in samples.iter_mut() {
        *s -= xa;
        xa += step;
    }

    let range = nth_largest(&mut samples, ka - 1) - nth_largest(&mut samples, kb - 1);
    range / (1.0 - 0.8 * (-(span.1 - span.0) / 50.0e3).exp())
}

/// The `rank`-th largest value (0 is the maximum). Reorders `values`.
///
/// See ITM section `<52>` (qtile).
fn nth_largest(values: &mut [f64], rank: usize) -> f64 {
    let rank = rank.min(values.len() - 1);
    let (_, nth, _) = values.select_nth_unstable_by(rank, |a, b| b.total_cmp(a));
    *nth
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flat_terrain_is_smooth() {
        let flat = vec![100.0; 101];
        assert_eq!(interdecile_range(&flat, 50.0, (0.0, 5000.0)), 0.0);
    }

    #[test]
    fn slopes_are_detrended() {
        let ramp: Vec<f64> = (0..201).map(|i| 3.0 * i as f64).collect();
        assert_abs_diff_eq!(interdecile_range(&ramp, 30.0, (0.0, 6000.0)), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rough_terrain_measures() {
        let rough: Vec<f64> = (0..201)
            .map(|i| if i % 2 == 0 { 0.0 } else { 50.0 })
            .collect();
        let dh = interdecile_range(&rough, 100.0, (0.0, 20_000.0));
        assert!(dh > 0.0);
    }

    #[test]
    fn too_short_a_span() {
        let hills = vec![10.0, 80.0, 20.0, 60.0];
        assert_eq!(interdecile_range(&hills, 100.0, (0.0, 150.0)), 0.0);
    }

    #[test]
    fn span_starts_at_the_first_sample() {
        let rough: Vec<f64> = (0..101)
            .map(|i| if i % 3 == 0 { 5.0 } else { 40.0 })
            .collect();
        let before = interdecile_range(&rough, 10.0, (-50.0, 400.0));
        assert!(before.is_finite());
        assert!(before > 0.0);

        assert_eq!(interdecile_range(&rough, 10.0, (-500.0, 10.0)), 0.0);
    }

    #[test]
    fn nth_largest_ranks_descending() {
        let mut values = vec![3.0, 9.0, 1.0, 7.0];
        assert_eq!(nth_largest(&mut values, 0), 9.0);
        assert_eq!(nth_largest(&mut values, 2), 3.0);
        assert_eq!(nth_largest(&mut values, 10), 1.0);
    }
}
