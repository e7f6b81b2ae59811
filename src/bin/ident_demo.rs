use fuzzy_ident::config::{self, DemoConfig};
use fuzzy_ident::{BuilderParams, SugenoBuilder};
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = config::load_config(Path::new(&config_path))?;

    let points = sample_points(&config);
    if points.len() < 2 {
        return Err("sampling produced fewer than two valid points".into());
    }

    let params: BuilderParams = config.builder_params();
    let mut builder = SugenoBuilder::new(params);
    builder.set_data_from_points(&points);

    let baseline = builder.sum_squared_error();
    builder.build_all();
    let report = builder.build_report();

    println!(
        "steps={} rules={} removed={}/{} sse={:.6} (baseline {:.6})",
        report.steps,
        report.rules,
        report.samples_removed,
        report.samples_total,
        report.sum_squared_error,
        baseline
    );

    if let Some(json_out) = &config.output.json_out {
        let serialized = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize report: {e}"))?;
        fs::write(json_out, serialized)
            .map_err(|e| format!("Failed to write {}: {e}", json_out.display()))?;
        println!("report written to {}", json_out.display());
    }
    Ok(())
}

fn sample_points(config: &DemoConfig) -> Vec<(f64, f64)> {
    let sampling = &config.sampling;
    let count = ((sampling.x_max - sampling.x_min) / sampling.step) as usize;
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let x = sampling.x_min + i as f64 * sampling.step;
        let y = sampling.function.eval(x) + zigzag(i) * sampling.noise_amplitude;
        if y.is_finite() {
            points.push((x, y));
        }
    }
    points
}

/// Deterministic noise stand-in: cycles through -1, -1/3, 1/3, 1.
fn zigzag(i: usize) -> f64 {
    ((i % 4) as f64) * (2.0 / 3.0) - 1.0
}

fn usage() -> String {
    "Usage: ident_demo <config.json>".to_string()
}
