use crate::types::RecognizedLine;
use serde::Serialize;

/// What one induction step saw and decided.
#[derive(Clone, Debug, Serialize)]
pub struct StepDiagnostics {
    /// 1-based index of the induction step that produced a rule.
    pub step: usize,
    /// Points collected from the dominant accumulator cell.
    pub candidate_total: usize,
    /// Points surviving the contiguity filter.
    pub candidate_kept: usize,
    /// Whether the gap filter ran for this step.
    pub filter_applied: bool,
    /// Dead-end detections retried before this rule emerged.
    pub retries: usize,
    /// Refined line behind the new rule.
    pub line: RecognizedLine,
    /// Accumulated vote weight of the winning cell.
    pub dominant_weight: f64,
    /// Total removed samples after the step.
    pub removed_after: usize,
    pub elapsed_ms: f64,
}

/// Summary of a completed build.
#[derive(Clone, Debug, Serialize)]
pub struct BuildReport {
    pub steps: usize,
    pub rules: usize,
    pub samples_total: usize,
    pub samples_removed: usize,
    pub sum_squared_error: f64,
    pub step_log: Vec<StepDiagnostics>,
}
