use fuzzy_ident::func::Closure;
use fuzzy_ident::{BuilderParams, SugenoBuilder};

fn main() {
    // Demo stub: identifies sin(x)/x sampled over [-10, 10).
    let mut f = Closure::new(|x| x.sin() / x);

    let mut builder = SugenoBuilder::new(BuilderParams::default());
    builder.set_data_from_fn(&mut f, -10.0, 10.0, 0.1);
    let baseline = builder.sum_squared_error();
    builder.build_all();
    println!(
        "rules={} steps={} sse={:.6} (baseline {:.6})",
        builder.controller().rules_count(),
        builder.steps_done(),
        builder.sum_squared_error(),
        baseline
    );
}
