//! Zero-order Sugeno controller: membership-weighted average of per-rule
//! linear consequents.

use crate::func::RealFunction;
use serde::Serialize;
use std::f64::consts::PI;

/// Membership function over the real line.
///
/// Stored as shape parameters rather than boxed closures so rules can be
/// re-evaluated during the joint consequent solve and serialized for
/// diagnostics.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    /// `exp(−π·(x−center)²/width²)`; positive everywhere, so any controller
    /// built from Gaussians is total.
    Gaussian { center: f64, width: f64 },
    /// `max(1 − |x−center|/width, 0)`; zero outside `[center−width,
    /// center+width]`, kept only as an alternate generator.
    Triangular { center: f64, width: f64 },
}

impl Membership {
    /// Gaussian membership covering the x-extent `[min, max]`, peaking at
    /// the midpoint with value 1. Panics on a degenerate extent.
    pub fn gaussian_from_extent(min: f64, max: f64) -> Self {
        assert!(min < max, "membership extent must not be degenerate");
        Membership::Gaussian {
            center: (min + max) / 2.0,
            width: (PI / 2.0).sqrt() * (max - min),
        }
    }

    /// Triangular membership covering the x-extent `[min, max]`. Panics on a
    /// degenerate extent.
    pub fn triangular_from_extent(min: f64, max: f64) -> Self {
        assert!(min < max, "membership extent must not be degenerate");
        Membership::Triangular {
            center: (min + max) / 2.0,
            width: max - min,
        }
    }

    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            Membership::Gaussian { center, width } => {
                let d = x - center;
                (-PI * d * d / (width * width)).exp()
            }
            Membership::Triangular { center, width } => {
                (1.0 - (x - center).abs() / width).max(0.0)
            }
        }
    }
}

/// Linear consequent `x ↦ slope·x + intercept`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LinearConsequent {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearConsequent {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// One fuzzy rule: applicability degree plus local linear model.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Rule {
    pub membership: Membership,
    pub consequent: LinearConsequent,
}

/// Takagi–Sugeno controller over an append-only rule list.
///
/// Rule order is irrelevant to the weighted average but preserved for
/// diagnostics. Not re-entrant: the validity flag belongs to the most recent
/// `evaluate` call.
#[derive(Clone, Debug, Default)]
pub struct SugenoController {
    rules: Vec<Rule>,
    last_valid: bool,
}

impl SugenoController {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            last_valid: true,
        }
    }

    pub fn add_rule(&mut self, membership: Membership, consequent: LinearConsequent) {
        self.rules.push(Rule {
            membership,
            consequent,
        });
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.last_valid = true;
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_count(&self) -> usize {
        self.rules.len()
    }

    /// Weighted-average output over rules with positive membership at `x`.
    /// With no active rule the result is 0 and flagged invalid; query
    /// [`SugenoController::is_last_result_valid`] immediately after the call.
    pub fn evaluate(&mut self, x: f64) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        let mut has_active = false;
        for rule in &self.rules {
            let m = rule.membership.eval(x);
            if m > 0.0 {
                has_active = true;
                numerator += m * rule.consequent.eval(x);
                denominator += m;
            }
        }
        if has_active {
            self.last_valid = true;
            numerator / denominator
        } else {
            self.last_valid = false;
            0.0
        }
    }

    pub fn is_last_result_valid(&self) -> bool {
        self.last_valid
    }
}

impl RealFunction for SugenoController {
    fn eval(&mut self, x: f64) -> f64 {
        self.evaluate(x)
    }

    fn last_result_valid(&self) -> bool {
        self.is_last_result_valid()
    }
}
