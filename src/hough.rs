//! Weighted Hough accumulator for dominant-line detection.
//!
//! Every point maps to a sinusoidal curve in (angle, radius) space; curves of
//! collinear points intersect in the cell holding their common line, so the
//! heaviest cell names the dominant line even in the presence of outliers.
//! Votes carry a weight so callers can emphasize poorly explained points.

use crate::types::RecognizedLine;
use log::debug;
use serde::Serialize;

const ANGLE_ROWS: usize = 360;
const MIN_RADIUS_STEP: f64 = 0.1;
const MAX_RADIUS_STEP: f64 = 1.0;

/// sin(α) magnitudes below this count as a vertical normal-form line, which
/// has no slope/intercept representation.
const VERTICAL_SIN_EPS: f64 = 1e-9;

/// The heaviest accumulator cell, in table coordinates.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DominantCell {
    pub angle_deg: usize,
    pub radius_bucket: usize,
    pub weight: f64,
}

/// Dense (angle, radius) vote table.
///
/// The table is allocated once from the expected coordinate bounds and reused
/// across detection rounds via [`HoughAccumulator::clear`]; the dominant-cell
/// scan is lazy and cached until the next vote or clear.
pub struct HoughAccumulator {
    cells: Vec<f64>,
    columns: usize,
    radius_step: f64,
    max_radius: f64,
    dominant: Option<DominantCell>,
}

impl HoughAccumulator {
    /// Allocates the table for points with `|x| <= arg_bound` and
    /// `|y| <= value_bound`. The radius step is clamped to `[0.1, 1.0]`.
    pub fn new(arg_bound: f64, value_bound: f64, radius_step: f64) -> Self {
        assert!(
            arg_bound >= 0.0 && value_bound >= 0.0,
            "accumulator bounds must be non-negative"
        );
        let step = radius_step.clamp(MIN_RADIUS_STEP, MAX_RADIUS_STEP);
        let max_radius = (arg_bound * arg_bound + value_bound * value_bound)
            .sqrt()
            .ceil();
        // One extra column for radius zero.
        let columns = (max_radius / step).round() as usize + 1;
        Self {
            cells: vec![0.0; ANGLE_ROWS * columns],
            columns,
            radius_step: step,
            max_radius,
            dominant: None,
        }
    }

    /// Re-dimensions the table for new bounds, dropping any cached result.
    pub fn init(&mut self, arg_bound: f64, value_bound: f64, radius_step: f64) {
        *self = Self::new(arg_bound, value_bound, radius_step);
    }

    /// Zeroes every cell without reallocating and drops the cached result.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0.0);
        self.dominant = None;
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn radius_step(&self) -> f64 {
        self.radius_step
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Casts one vote per angle row at the radius this point subtends there.
    /// Non-finite input is ignored; negative weights clamp to zero.
    pub fn vote(&mut self, x: f64, y: f64, weight: f64) {
        if !x.is_finite() || !y.is_finite() || !weight.is_finite() {
            return;
        }
        let w = weight.max(0.0);
        for angle_deg in 0..ANGLE_ROWS {
            if let Some(col) = self.radius_bucket(angle_deg, x, y) {
                self.cells[angle_deg * self.columns + col] += w;
            }
        }
        self.dominant = None;
    }

    fn radius_bucket(&self, angle_deg: usize, x: f64, y: f64) -> Option<usize> {
        let angle = (angle_deg as f64).to_radians();
        let radius = x * angle.cos() + y * angle.sin();
        if (0.0..=self.max_radius).contains(&radius) {
            Some((radius / self.radius_step).round() as usize)
        } else {
            None
        }
    }

    /// Returns the strictly heaviest cell, first in row-major order on ties.
    /// Scans lazily and caches until the table changes.
    pub fn dominant_cell(&mut self) -> DominantCell {
        if let Some(cell) = self.dominant {
            return cell;
        }
        let mut best_row = 0;
        let mut best_col = 0;
        for row in 0..ANGLE_ROWS {
            for col in 0..self.columns {
                if self.cells[row * self.columns + col]
                    > self.cells[best_row * self.columns + best_col]
                {
                    best_row = row;
                    best_col = col;
                }
            }
        }
        let cell = DominantCell {
            angle_deg: best_row,
            radius_bucket: best_col,
            weight: self.cells[best_row * self.columns + best_col],
        };
        self.dominant = Some(cell);
        cell
    }

    /// Normal-form angle of the dominant line, degrees.
    pub fn normal_angle_degrees(&mut self) -> f64 {
        self.dominant_cell().angle_deg as f64
    }

    /// Normal-form radius of the dominant line.
    pub fn normal_radius(&mut self) -> f64 {
        self.dominant_cell().radius_bucket as f64 * self.radius_step
    }

    /// Converts the dominant cell to slope/intercept form via
    /// `x·cos(α) + y·sin(α) = r  ⇒  y = −cot(α)·x + r/sin(α)`.
    ///
    /// `None` when the normal is horizontal (`sin(α) ≈ 0`), i.e. the
    /// recognized line is vertical and has no slope representation. Inputs
    /// sampled as a function of x only reach that case through degenerate
    /// clouds, and callers treat it as a dead-end detection.
    pub fn dominant_line(&mut self) -> Option<RecognizedLine> {
        let cell = self.dominant_cell();
        let angle = (cell.angle_deg as f64).to_radians();
        let sin = angle.sin();
        if sin.abs() < VERTICAL_SIN_EPS {
            debug!(
                "hough: dominant cell at {}° is a vertical line, no slope form",
                cell.angle_deg
            );
            return None;
        }
        let radius = cell.radius_bucket as f64 * self.radius_step;
        Some(RecognizedLine {
            slope: -angle.cos() / sin,
            intercept: radius / sin,
        })
    }

    /// Tests whether the point's vote pattern hits the dominant cell, i.e.
    /// whether the point lies in the winning bin. Membership is re-derived
    /// from the coordinates alone, keeping the accumulator decoupled from
    /// any owning point container.
    pub fn is_on_dominant_line(&mut self, x: f64, y: f64) -> bool {
        let cell = self.dominant_cell();
        match self.radius_bucket(cell.angle_deg, x, y) {
            Some(col) => col == cell.radius_bucket,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_matches_bounds() {
        let hough = HoughAccumulator::new(2.0, 5.0, 0.1);
        assert_eq!(hough.columns(), 61);
    }

    #[test]
    fn radius_step_is_clamped() {
        let hough = HoughAccumulator::new(1.0, 1.0, 0.0);
        assert_eq!(hough.radius_step(), MIN_RADIUS_STEP);
        let hough = HoughAccumulator::new(1.0, 1.0, 7.0);
        assert_eq!(hough.radius_step(), MAX_RADIUS_STEP);
    }

    #[test]
    fn recovers_noisy_negative_slope() {
        // Noisy samples of y = -x.
        let xs = [-2.0, -1.0, 0.0, 1.0, 1.5];
        let ys = [2.0, 1.0, 0.2, -1.0, -1.2];
        let mut hough = HoughAccumulator::new(5.0, 5.0, 0.1);
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            hough.vote(x, y, 1.0);
        }
        let line = hough.dominant_line().expect("line");
        assert!((line.slope + 1.0).abs() < 0.5, "slope={}", line.slope);
        assert!((line.intercept).abs() < 0.5, "intercept={}", line.intercept);
    }

    #[test]
    fn dominant_cell_membership() {
        let mut hough = HoughAccumulator::new(10.0, 10.0, 0.1);
        // Exact points of y = x + 1.
        for i in 0..5 {
            let x = i as f64;
            hough.vote(x, x + 1.0, 1.0);
        }
        for i in 0..5 {
            let x = i as f64;
            assert!(hough.is_on_dominant_line(x, x + 1.0), "x={x}");
        }
        assert!(!hough.is_on_dominant_line(2.0, 8.0));
    }

    #[test]
    fn clear_resets_votes_and_result() {
        let mut hough = HoughAccumulator::new(5.0, 5.0, 0.1);
        hough.vote(1.0, 1.0, 3.0);
        assert!(hough.dominant_cell().weight > 0.0);
        hough.clear();
        assert_eq!(hough.dominant_cell().weight, 0.0);
    }

    #[test]
    fn weighted_votes_shift_the_winner() {
        let mut hough = HoughAccumulator::new(10.0, 10.0, 0.1);
        // Three light points on y = x, two heavy points on y = 2.
        for i in 0..3 {
            let x = i as f64;
            hough.vote(x, x, 0.1);
        }
        for i in 0..3 {
            let x = i as f64;
            hough.vote(x, 2.0, 5.0);
        }
        let line = hough.dominant_line().expect("line");
        assert!(line.slope.abs() < 0.2, "slope={}", line.slope);
        assert!((line.intercept - 2.0).abs() < 0.2);
    }

    #[test]
    fn non_finite_votes_are_ignored() {
        let mut hough = HoughAccumulator::new(5.0, 5.0, 0.1);
        hough.vote(f64::NAN, 1.0, 1.0);
        hough.vote(1.0, f64::INFINITY, 1.0);
        assert_eq!(hough.dominant_cell().weight, 0.0);
    }
}
