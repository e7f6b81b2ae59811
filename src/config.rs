//! JSON configuration for the demo binary.

use crate::builder::{BuilderParams, VoteWeighting};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Closed-form functions the demo can sample.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FunctionPreset {
    /// `sin(x)/x`; undefined at the origin, which exercises the invalid
    /// sample filtering.
    Sinc,
    Sin,
    Linear { slope: f64, intercept: f64 },
    Parabola,
}

impl FunctionPreset {
    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            FunctionPreset::Sinc => x.sin() / x,
            FunctionPreset::Sin => x.sin(),
            FunctionPreset::Linear { slope, intercept } => slope * x + intercept,
            FunctionPreset::Parabola => x * x,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SamplingConfig {
    pub function: FunctionPreset,
    pub x_min: f64,
    pub x_max: f64,
    pub step: f64,
    /// Amplitude of a deterministic zig-zag perturbation added to every
    /// sample, for exercising noise robustness. Zero disables it.
    #[serde(default)]
    pub noise_amplitude: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
}

fn default_radius_step() -> f64 {
    0.1
}

fn default_filter_outliers() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct DemoConfig {
    pub sampling: SamplingConfig,
    #[serde(default = "default_radius_step")]
    pub radius_step: f64,
    #[serde(default = "default_filter_outliers")]
    pub filter_outliers: bool,
    #[serde(default)]
    pub residual_weighting: bool,
    #[serde(default)]
    pub output: OutputConfig,
}

impl DemoConfig {
    pub fn builder_params(&self) -> BuilderParams {
        BuilderParams {
            radius_step: self.radius_step,
            filter_outliers: self.filter_outliers,
            weighting: if self.residual_weighting {
                VoteWeighting::NormalizedResidual
            } else {
                VoteWeighting::Uniform
            },
            ..Default::default()
        }
    }
}

pub fn load_config(path: &Path) -> Result<DemoConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: DemoConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}
