//! Iterative rule induction over a mutable point set.
//!
//! Each step detects the dominant line through the not-yet-explained points,
//! isolates the contiguous run of points that genuinely belongs to it,
//! refines the line by least squares, derives a Gaussian membership from the
//! run's x-extent, and marks the run as explained. When no further line can
//! be found, one joint least-squares system across all points and all
//! memberships assigns the final consequents.

use crate::cluster::{classify_gaps, longest_short_run};
use crate::diagnostics::{BuildReport, StepDiagnostics};
use crate::fit::linear_fit;
use crate::func::RealFunction;
use crate::hough::HoughAccumulator;
use crate::sugeno::{LinearConsequent, Membership, SugenoController};
use crate::types::{RecognizedLine, Sample};
use log::{debug, warn};
use serde::Serialize;
use std::time::Instant;

mod solve;

/// How induction weights Hough votes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteWeighting {
    /// Every active point votes with weight 1 (the canonical pipeline).
    Uniform,
    /// Active points vote with their absolute residual against the
    /// provisional controller, normalized to [0, 1], so poorly explained
    /// points dominate the next detection. Falls back to uniform voting
    /// until the first rule exists.
    NormalizedResidual,
}

/// Knobs for the induction loop.
#[derive(Clone, Debug)]
pub struct BuilderParams {
    /// Radius quantization of the accumulator, clamped to `[0.1, 1.0]`.
    pub radius_step: f64,
    /// Whether the contiguity filter prunes dominant-cell collections.
    pub filter_outliers: bool,
    /// Hard cap on induction steps for [`SugenoBuilder::build_all`].
    pub max_learning_steps: usize,
    /// Dead-end detections tolerated before the contiguity filter is
    /// switched off for the rest of the session.
    pub max_repeated_calls: usize,
    pub weighting: VoteWeighting,
}

impl Default for BuilderParams {
    fn default() -> Self {
        Self {
            radius_step: 0.1,
            filter_outliers: true,
            max_learning_steps: 100,
            max_repeated_calls: 10,
            weighting: VoteWeighting::Uniform,
        }
    }
}

/// Lifecycle of one identification session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Unprepared,
    Ready,
    Inducing,
    Converged,
}

/// Grows a [`SugenoController`] from sampled points of a scalar function.
///
/// Single-threaded and deterministic for a given input order; drive it from
/// one controlling task. See the crate docs for the overall scheme.
pub struct SugenoBuilder {
    params: BuilderParams,
    samples: Vec<Sample>,
    memberships: Vec<Membership>,
    hough: Option<HoughAccumulator>,
    cntl: SugenoController,
    state: BuildState,
    steps_done: usize,
    filter_enabled: bool,
    last_line: Option<RecognizedLine>,
    last_rule_points: Vec<usize>,
    step_log: Vec<StepDiagnostics>,
}

impl SugenoBuilder {
    /// A detected line needs strictly more points than this to become a rule.
    pub const MIN_POINTS_FOR_LINE_DEF: usize = 2;

    pub fn new(params: BuilderParams) -> Self {
        Self {
            params,
            samples: Vec::new(),
            memberships: Vec::new(),
            hough: None,
            cntl: SugenoController::new(),
            state: BuildState::Unprepared,
            steps_done: 0,
            filter_enabled: true,
            last_line: None,
            last_rule_points: Vec::new(),
            step_log: Vec::new(),
        }
    }

    /// Loads explicit `(x, y)` pairs, sorts them ascending by x and resets
    /// the whole session. Non-finite pairs are dropped. Panics when fewer
    /// than two finite points remain. The accumulator is dimensioned from
    /// the data extents.
    ///
    /// The relative order of equal-x samples is unspecified (the sort is
    /// unstable; x is the only key).
    pub fn set_data_from_points(&mut self, points: &[(f64, f64)]) {
        let mut samples: Vec<Sample> = points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|&(x, y)| Sample::new(x, y))
            .collect();
        assert!(
            samples.len() >= Self::MIN_POINTS_FOR_LINE_DEF,
            "need at least two finite input points"
        );
        samples.sort_unstable_by(|a, b| a.x.partial_cmp(&b.x).expect("finite x"));

        let arg_bound = samples.iter().map(|s| s.x.abs()).fold(0.0, f64::max);
        let value_bound = samples.iter().map(|s| s.y.abs()).fold(0.0, f64::max);
        debug!(
            "data load: {} samples, |x|<={arg_bound:.3}, |y|<={value_bound:.3}",
            samples.len()
        );

        self.hough = Some(HoughAccumulator::new(
            arg_bound,
            value_bound,
            self.params.radius_step,
        ));
        self.samples = samples;
        self.memberships.clear();
        self.cntl.clear();
        self.steps_done = 0;
        self.filter_enabled = self.params.filter_outliers;
        self.last_line = None;
        self.last_rule_points.clear();
        self.step_log.clear();
        self.state = BuildState::Ready;
    }

    /// Samples `f` over `[x_min, x_max)` at a fixed step and loads the
    /// result, silently dropping arguments where `f` reports an invalid
    /// value. Panics on a non-positive step or fewer than two samples.
    pub fn set_data_from_fn(
        &mut self,
        f: &mut dyn RealFunction,
        x_min: f64,
        x_max: f64,
        step: f64,
    ) {
        assert!(step > 0.0, "sampling step must be positive");
        let count = ((x_max - x_min) / step) as usize;
        assert!(count > 1, "sampling range must produce at least two points");

        let mut points = Vec::with_capacity(count);
        for i in 0..count {
            let x = x_min + i as f64 * step;
            let y = f.eval(x);
            if f.last_result_valid() {
                points.push((x, y));
            }
        }
        self.set_data_from_points(&points);
    }

    /// Advances one induction step. Returns true when a new membership
    /// function (and provisional rule) was added, false once the builder has
    /// converged. Dead-end detections are retried internally within a
    /// bounded budget.
    pub fn build_step(&mut self) -> bool {
        match self.state {
            BuildState::Unprepared => {
                warn!("build_step called before data was set");
                return false;
            }
            BuildState::Converged => return false,
            BuildState::Ready | BuildState::Inducing => {}
        }
        self.state = BuildState::Inducing;

        let t0 = Instant::now();
        let mut retries = 0usize;
        loop {
            let active: Vec<usize> = (0..self.samples.len())
                .filter(|&i| !self.samples[i].is_removed())
                .collect();
            if active.len() < Self::MIN_POINTS_FOR_LINE_DEF {
                debug!("induction: {} active points left, stopping", active.len());
                self.state = BuildState::Converged;
                return false;
            }

            let weights = self.vote_weights(&active);
            let hough = self.hough.as_mut().expect("accumulator exists once data is set");
            hough.clear();
            for (&idx, &w) in active.iter().zip(weights.iter()) {
                let s = &self.samples[idx];
                hough.vote(s.x, s.y, w);
            }

            let dominant = hough.dominant_cell();
            if dominant.weight <= 0.0 {
                debug!("induction: empty accumulator, stopping");
                self.state = BuildState::Converged;
                return false;
            }
            let hough_line = hough.dominant_line();

            // Ascending-x order is inherited from the sorted sample array.
            let mut candidate: Vec<usize> = active
                .iter()
                .copied()
                .filter(|&i| {
                    let s = &self.samples[i];
                    hough.is_on_dominant_line(s.x, s.y)
                })
                .collect();
            let candidate_total = candidate.len();

            let filter_applied = self.filter_enabled && candidate.len() >= 2;
            if filter_applied {
                candidate = self.filter_contiguous(&candidate);
            }

            let usable = hough_line.is_some()
                && candidate.len() > Self::MIN_POINTS_FOR_LINE_DEF
                && self.candidate_extent(&candidate).is_some();
            if !usable {
                if candidate.is_empty() {
                    self.state = BuildState::Converged;
                    return false;
                }
                // Remove the dead-end collection anyway so the next scan
                // cannot rediscover the same cell forever.
                for &i in &candidate {
                    self.samples[i].mark_removed();
                }
                retries += 1;
                debug!(
                    "induction: dead-end cell ({}°, bucket {}) with {} points, retry {}",
                    dominant.angle_deg,
                    dominant.radius_bucket,
                    candidate.len(),
                    retries
                );
                if retries > self.params.max_repeated_calls {
                    if self.filter_enabled {
                        debug!("induction: retry budget exhausted, disabling contiguity filter");
                        self.filter_enabled = false;
                        retries = 0;
                        continue;
                    }
                    self.state = BuildState::Converged;
                    return false;
                }
                continue;
            }

            let (min_x, max_x) = self
                .candidate_extent(&candidate)
                .expect("checked by usable");
            let xs: Vec<f64> = candidate.iter().map(|&i| self.samples[i].x).collect();
            let ys: Vec<f64> = candidate.iter().map(|&i| self.samples[i].y).collect();
            let refined = match linear_fit(&xs, &ys) {
                Some(line) => line,
                None => {
                    warn!("induction: degenerate refinement, keeping accumulator line");
                    hough_line.expect("checked by usable")
                }
            };

            let membership = Membership::gaussian_from_extent(min_x, max_x);
            self.memberships.push(membership);
            // Provisional consequent; the joint solve replaces it later.
            self.cntl.add_rule(
                membership,
                LinearConsequent {
                    slope: refined.slope,
                    intercept: refined.intercept,
                },
            );

            for &i in &candidate {
                self.samples[i].mark_removed();
            }
            self.steps_done += 1;
            self.last_line = Some(refined);
            let removed_after = self.removed_count();
            debug!(
                "induction: step {} line a={:.4} b={:.4} kept {}/{} points ({} removed total)",
                self.steps_done,
                refined.slope,
                refined.intercept,
                candidate.len(),
                candidate_total,
                removed_after
            );
            self.step_log.push(StepDiagnostics {
                step: self.steps_done,
                candidate_total,
                candidate_kept: candidate.len(),
                filter_applied,
                retries,
                line: refined,
                dominant_weight: dominant.weight,
                removed_after,
                elapsed_ms: t0.elapsed().as_secs_f64() * 1000.0,
            });
            self.last_rule_points = candidate;
            return true;
        }
    }

    /// Solves the joint consequent system over all original points and all
    /// accumulated memberships, then re-registers every rule with its
    /// globally optimal consequent. A builder with no memberships leaves the
    /// controller empty.
    pub fn build_controller(&mut self) {
        if self.memberships.is_empty() {
            self.cntl.clear();
            debug!("joint solve skipped: no membership functions were found");
            return;
        }
        match solve::solve_consequents(&self.samples, &self.memberships) {
            Some(consequents) => {
                self.cntl.clear();
                for (membership, consequent) in
                    self.memberships.iter().zip(consequents.into_iter())
                {
                    self.cntl.add_rule(*membership, consequent);
                }
                debug!(
                    "joint solve: {} rules finalized over {} samples",
                    self.cntl.rules_count(),
                    self.samples.len()
                );
            }
            None => {
                warn!("joint solve failed, provisional consequents stay in effect");
            }
        }
        self.state = BuildState::Converged;
    }

    /// Drives induction to completion (bounded by
    /// [`BuilderParams::max_learning_steps`]) and finalizes the controller.
    pub fn build_all(&mut self) {
        while self.steps_done < self.params.max_learning_steps && self.build_step() {}
        self.build_controller();
    }

    /// Total squared error of the controller against every original sample.
    pub fn sum_squared_error(&mut self) -> f64 {
        let cntl = &mut self.cntl;
        self.samples
            .iter()
            .map(|s| {
                let diff = s.y - cntl.evaluate(s.x);
                diff * diff
            })
            .sum()
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn active_points(&self) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .filter(|s| !s.is_removed())
            .map(|s| (s.x, s.y))
            .collect()
    }

    pub fn removed_points(&self) -> Vec<(f64, f64)> {
        self.samples
            .iter()
            .filter(|s| s.is_removed())
            .map(|s| (s.x, s.y))
            .collect()
    }

    /// Line behind the most recent rule, if any step succeeded yet.
    pub fn last_recognized_line(&self) -> Option<RecognizedLine> {
        self.last_line
    }

    /// Points that produced the most recent rule.
    pub fn last_rule_points(&self) -> Vec<(f64, f64)> {
        self.last_rule_points
            .iter()
            .map(|&i| (self.samples[i].x, self.samples[i].y))
            .collect()
    }

    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    pub fn controller(&self) -> &SugenoController {
        &self.cntl
    }

    pub fn controller_mut(&mut self) -> &mut SugenoController {
        &mut self.cntl
    }

    pub fn step_log(&self) -> &[StepDiagnostics] {
        &self.step_log
    }

    pub fn build_report(&mut self) -> BuildReport {
        BuildReport {
            steps: self.steps_done,
            rules: self.cntl.rules_count(),
            samples_total: self.samples.len(),
            samples_removed: self.removed_count(),
            sum_squared_error: self.sum_squared_error(),
            step_log: self.step_log.clone(),
        }
    }

    fn removed_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_removed()).count()
    }

    /// Per-point vote weights for the current round, in `active` order.
    fn vote_weights(&mut self, active: &[usize]) -> Vec<f64> {
        match self.params.weighting {
            VoteWeighting::Uniform => vec![1.0; active.len()],
            VoteWeighting::NormalizedResidual => {
                if self.cntl.rules_count() == 0 {
                    return vec![1.0; active.len()];
                }
                let cntl = &mut self.cntl;
                let errors: Vec<f64> = active
                    .iter()
                    .map(|&i| {
                        let s = &self.samples[i];
                        (s.y - cntl.evaluate(s.x)).abs()
                    })
                    .collect();
                let max = errors.iter().cloned().fold(0.0, f64::max);
                if max <= 0.0 {
                    vec![1.0; active.len()]
                } else {
                    errors.into_iter().map(|e| e / max).collect()
                }
            }
        }
    }

    /// Keeps only the longest contiguous run of the candidate collection, as
    /// judged by two-means clustering of the gaps between x-adjacent points.
    fn filter_contiguous(&self, candidate: &[usize]) -> Vec<usize> {
        let gaps: Vec<f64> = candidate
            .windows(2)
            .map(|w| {
                let a = &self.samples[w[0]];
                let b = &self.samples[w[1]];
                ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
            })
            .collect();
        let labels = classify_gaps(&gaps);
        match longest_short_run(&labels) {
            Some((first, last)) => candidate[first..=last].to_vec(),
            None => candidate.to_vec(),
        }
    }

    /// Non-degenerate x-extent of the candidate, or `None` when every point
    /// shares one x (no Gaussian can be built over it).
    fn candidate_extent(&self, candidate: &[usize]) -> Option<(f64, f64)> {
        let first = *candidate.first()?;
        let last = *candidate.last()?;
        let (min_x, max_x) = (self.samples[first].x, self.samples[last].x);
        if min_x < max_x {
            Some((min_x, max_x))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::func::Closure;

    fn two_segment_points() -> Vec<(f64, f64)> {
        // y = x on 0..=5, then y = -x + 12 on 7..=12.
        let mut pts = Vec::new();
        for i in 0..=5 {
            let x = i as f64;
            pts.push((x, x));
        }
        for i in 7..=12 {
            let x = i as f64;
            pts.push((x, -x + 12.0));
        }
        pts
    }

    #[test]
    fn induces_two_rules_for_two_segments() {
        let mut builder = SugenoBuilder::new(BuilderParams::default());
        builder.set_data_from_points(&two_segment_points());
        builder.build_all();

        assert_eq!(builder.steps_done(), 2);
        assert_eq!(builder.controller().rules_count(), 2);
        assert_eq!(builder.memberships().len(), 2);
        assert_eq!(builder.state(), BuildState::Converged);
        assert_eq!(builder.active_points().len(), 0);
    }

    #[test]
    fn rules_match_memberships_after_final_solve() {
        let mut builder = SugenoBuilder::new(BuilderParams::default());
        builder.set_data_from_points(&two_segment_points());
        while builder.build_step() {}
        builder.build_controller();
        assert_eq!(
            builder.controller().rules_count(),
            builder.memberships().len()
        );
    }

    #[test]
    fn removed_count_is_monotone() {
        let mut builder = SugenoBuilder::new(BuilderParams::default());
        builder.set_data_from_points(&two_segment_points());
        let total = builder.samples().len();
        let mut prev = 0usize;
        while builder.build_step() {
            let removed = builder.removed_points().len();
            assert!(removed >= prev);
            assert!(removed <= total);
            prev = removed;
        }
    }

    #[test]
    fn vertical_cloud_converges_without_rules() {
        // All points share x = 2: the dominant line is vertical and has no
        // slope form, so the builder gives up without producing a rule.
        let pts: Vec<(f64, f64)> = (0..5).map(|i| (2.0, i as f64)).collect();
        let mut builder = SugenoBuilder::new(BuilderParams::default());
        builder.set_data_from_points(&pts);
        assert!(!builder.build_step());
        assert_eq!(builder.state(), BuildState::Converged);
        assert_eq!(builder.controller().rules_count(), 0);
    }

    #[test]
    fn closure_sampling_drops_invalid_points() {
        let mut f = Closure::new(|x| x.sin() / x);
        let mut builder = SugenoBuilder::new(BuilderParams::default());
        builder.set_data_from_fn(&mut f, -10.0, 10.0, 0.1);
        // 200 raw arguments, one of them (x = 0) is invalid.
        assert_eq!(builder.samples().len(), 199);
        assert_eq!(builder.state(), BuildState::Ready);
    }

    #[test]
    fn build_step_before_data_is_a_noop() {
        let mut builder = SugenoBuilder::new(BuilderParams::default());
        assert!(!builder.build_step());
        assert_eq!(builder.state(), BuildState::Unprepared);
    }

    #[test]
    fn last_rule_points_follow_the_step() {
        let mut builder = SugenoBuilder::new(BuilderParams::default());
        builder.set_data_from_points(&two_segment_points());
        assert!(builder.build_step());
        let pts = builder.last_rule_points();
        assert!(pts.len() > SugenoBuilder::MIN_POINTS_FOR_LINE_DEF);
        let line = builder.last_recognized_line().expect("line");
        for (x, y) in pts {
            assert!((line.eval(x) - y).abs() < 0.5, "({x}, {y})");
        }
    }

    #[test]
    fn residual_weighting_still_converges() {
        let params = BuilderParams {
            weighting: VoteWeighting::NormalizedResidual,
            ..Default::default()
        };
        let mut builder = SugenoBuilder::new(params);
        builder.set_data_from_points(&two_segment_points());
        builder.build_all();
        assert!(builder.controller().rules_count() >= 1);
        assert_eq!(builder.state(), BuildState::Converged);
    }
}
