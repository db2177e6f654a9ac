use eqn_eval::{Evaluation, ResultPaths};

pub fn print_summary(evaluation: &Evaluation, paths: &ResultPaths) {
    let width = evaluation
        .scores
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);
    println!("Scores");
    for (name, value) in evaluation.scores.iter() {
        println!("  {name:<width$}  {value:>10.4}");
    }
    println!(
        "Visualized {} pairs ({} failed renders)",
        evaluation.selection.len(),
        evaluation.render_failures
    );
    println!("Reports: {}", paths.reports_dir.display());
}
