use serde::Serialize;

/// One input observation of the function being identified.
///
/// The coordinates are immutable after data load; only the `removed` flag
/// changes, flipping to true exactly once when some rule explains the point.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    removed: bool,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            removed: false,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub(crate) fn mark_removed(&mut self) {
        self.removed = true;
    }
}

/// A line in slope/intercept form recovered from the accumulator or a
/// least-squares refinement.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct RecognizedLine {
    pub slope: f64,
    pub intercept: f64,
}

impl RecognizedLine {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}
