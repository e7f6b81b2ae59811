//! Binary clustering of consecutive-point gap distances.
//!
//! The Hough accumulator occasionally aggregates two spatially separate runs
//! of collinear points into the same cell. Labeling each gap between
//! x-adjacent candidates as short or long with a two-means pass, then keeping
//! only the longest run of short gaps, isolates a single contiguous segment
//! without a tunable cluster-count parameter.

use log::debug;

/// Minimum spread between the smallest and largest gap before a split is
/// attempted at all; tighter collections are one cluster.
const MIN_CENTROID_SPREAD: f64 = 0.1;

const MAX_ITERS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapLabel {
    Short,
    Long,
}

/// Labels every gap as short or long via Lloyd's algorithm with two centroids.
///
/// Seeds are the minimum gap and the second-largest distinct gap (falling
/// back to the maximum when all large gaps coincide), which avoids seeding
/// both centroids on the same extreme value. Iteration stops when the
/// assignment is stable or one cluster runs empty; the last labeling is
/// returned in the degenerate case.
pub fn classify_gaps(dists: &[f64]) -> Vec<GapLabel> {
    if dists.is_empty() {
        return Vec::new();
    }
    let min = dists.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = dists.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < MIN_CENTROID_SPREAD {
        return vec![GapLabel::Short; dists.len()];
    }

    let second_max = dists
        .iter()
        .cloned()
        .filter(|&d| d < max)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut short_mid = min;
    let mut long_mid = if second_max.is_finite() && second_max > min {
        second_max
    } else {
        max
    };

    let mut labels = vec![GapLabel::Short; dists.len()];
    for iter in 0..MAX_ITERS {
        let mut next = Vec::with_capacity(dists.len());
        for &d in dists {
            let label = if (d - short_mid).abs() <= (d - long_mid).abs() {
                GapLabel::Short
            } else {
                GapLabel::Long
            };
            next.push(label);
        }

        let shorts: Vec<f64> = dists
            .iter()
            .zip(next.iter())
            .filter(|(_, &l)| l == GapLabel::Short)
            .map(|(&d, _)| d)
            .collect();
        let longs: Vec<f64> = dists
            .iter()
            .zip(next.iter())
            .filter(|(_, &l)| l == GapLabel::Long)
            .map(|(&d, _)| d)
            .collect();
        if shorts.is_empty() || longs.is_empty() {
            debug!("gap clustering: cluster emptied after {iter} iterations");
            return labels;
        }
        let stable = next == labels;
        labels = next;
        if stable {
            break;
        }
        short_mid = shorts.iter().sum::<f64>() / shorts.len() as f64;
        long_mid = longs.iter().sum::<f64>() / longs.len() as f64;
    }
    labels
}

/// Finds the longest maximal run of consecutive short gaps and returns the
/// inclusive range of *point* indices it spans (a run of k short gaps covers
/// k+1 points). Ties go to the first-occurring run. `None` when no gap is
/// short.
pub fn longest_short_run(labels: &[GapLabel]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for (i, &label) in labels.iter().enumerate() {
        match (label, run_start) {
            (GapLabel::Short, None) => run_start = Some(i),
            (GapLabel::Long, Some(start)) => {
                best = pick_longer(best, (start, i - 1));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        best = pick_longer(best, (start, labels.len() - 1));
    }
    best.map(|(first_gap, last_gap)| (first_gap, last_gap + 1))
}

fn pick_longer(best: Option<(usize, usize)>, candidate: (usize, usize)) -> Option<(usize, usize)> {
    match best {
        None => Some(candidate),
        Some((s, e)) => {
            if candidate.1 - candidate.0 > e - s {
                Some(candidate)
            } else {
                Some((s, e))
            }
        }
    }
}
