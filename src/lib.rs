#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod builder;
pub mod diagnostics;
pub mod sugeno;
pub mod types;

// “Expert” modules – still public, but considered unstable internals.
// (You can tighten or feature-gate these later.)
pub mod cluster;
pub mod config;
pub mod fit;
pub mod func;
pub mod hough;

// --- High-level re-exports -------------------------------------------------

// Main entry points: builder + controller.
pub use crate::builder::{BuildState, BuilderParams, SugenoBuilder, VoteWeighting};
pub use crate::sugeno::SugenoController;
pub use crate::types::{RecognizedLine, Sample};

// High-level diagnostics produced while building.
pub use crate::diagnostics::{BuildReport, StepDiagnostics};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use fuzzy_ident::prelude::*;
///
/// let mut builder = SugenoBuilder::new(BuilderParams::default());
/// builder.set_data_from_points(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0), (3.0, 4.0)]);
/// builder.build_all();
/// println!("rules={}", builder.controller().rules_count());
/// ```
pub mod prelude {
    pub use crate::builder::{BuilderParams, SugenoBuilder};
    pub use crate::func::{Closure, RealFunction};
    pub use crate::sugeno::SugenoController;
}
