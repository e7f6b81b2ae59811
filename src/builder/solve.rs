//! Joint consequent solve across every sample and every membership.
//!
//! The Sugeno weighted-average output is linear in the per-rule consequent
//! coefficients once the membership weights are fixed, so a single
//! least-squares system assigns all consequents at once. Unlike fitting each
//! rule from its own candidate points, this accounts for membership overlap
//! across the whole domain.

use crate::sugeno::{LinearConsequent, Membership};
use crate::types::Sample;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

/// Singular values below this are treated as zero, which makes the solve
/// tolerant of rank-deficient design matrices.
const SVD_EPS: f64 = 1e-10;

/// Solves `A·X = B` in the least-squares sense, where row i encodes sample i
/// and columns `2j, 2j+1` hold the normalized membership weight of rule j
/// times `x` and times 1 respectively. Removed samples participate like any
/// other: the final consequents must explain the whole input set.
pub(crate) fn solve_consequents(
    samples: &[Sample],
    memberships: &[Membership],
) -> Option<Vec<LinearConsequent>> {
    if samples.is_empty() || memberships.is_empty() {
        return None;
    }
    let n = samples.len();
    let k = memberships.len();
    let mut a = DMatrix::<f64>::zeros(n, 2 * k);
    let mut b = DVector::<f64>::zeros(n);

    let mut degenerate_rows = 0usize;
    for (i, s) in samples.iter().enumerate() {
        b[i] = s.y;
        let m: Vec<f64> = memberships.iter().map(|mf| mf.eval(s.x)).collect();
        let total: f64 = m.iter().sum();
        if total <= 0.0 {
            // Every membership underflowed at this x; the row cannot
            // constrain any coefficient.
            degenerate_rows += 1;
            continue;
        }
        for (j, &mj) in m.iter().enumerate() {
            let w = mj / total;
            a[(i, 2 * j)] = w * s.x;
            a[(i, 2 * j + 1)] = w;
        }
    }
    if degenerate_rows > 0 {
        debug!("joint solve: {degenerate_rows} rows with zero total membership");
    }

    let svd = a.svd(true, true);
    match svd.solve(&b, SVD_EPS) {
        Ok(x) => Some(
            (0..k)
                .map(|j| LinearConsequent {
                    slope: x[2 * j],
                    intercept: x[2 * j + 1],
                })
                .collect(),
        ),
        Err(err) => {
            warn!("joint solve: SVD back-substitution failed: {err}");
            None
        }
    }
}
