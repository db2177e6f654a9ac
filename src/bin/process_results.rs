use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use eqn_eval::{
    BleuSmoothing, EvalConfig, EvaluatorBuilder, RenderProgress, RendererConfig,
};

#[path = "process_results/console_summary.rs"]
mod console_summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SmoothingChoice {
    None,
    Floor,
}

impl SmoothingChoice {
    fn smoothing(self) -> BleuSmoothing {
        match self {
            Self::None => BleuSmoothing::None,
            Self::Floor => BleuSmoothing::Floor,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "process_results")]
#[command(about = "Score and visualize equation recognition predictions against gold LaTeX")]
struct Args {
    /// Predicted token sequences, one per line.
    #[arg(long, env = "EQN_EVAL_PRED", default_value = "/data/pred.txt")]
    pred: PathBuf,
    /// Gold token sequences, one per line.
    #[arg(long, env = "EQN_EVAL_GOLD", default_value = "/data/gold.txt")]
    gold: PathBuf,
    #[arg(long, env = "EQN_EVAL_OUTDIR", default_value = "/data/output")]
    outdir: PathBuf,
    /// Number of pairs to visualize; 0 visualizes all of them.
    #[arg(long, env = "EQN_EVAL_IMG_SAMPLE", default_value_t = 0)]
    img_sample: usize,
    #[arg(long, env = "EQN_EVAL_SEED", default_value_t = EvalConfig::DEFAULT_SEED)]
    seed: u64,
    #[arg(long, env = "EQN_EVAL_TEMPLATE", default_value = "misc/template.tex")]
    template: PathBuf,
    /// Directory for intermediate render files; a temporary directory when unset.
    #[arg(long, env = "EQN_EVAL_WORKDIR")]
    workdir: Option<PathBuf>,
    /// JSON file with renderer settings.
    #[arg(long, env = "EQN_EVAL_RENDER_CONFIG")]
    render_config: Option<PathBuf>,
    #[arg(
        long,
        env = "EQN_EVAL_BLEU_SMOOTHING",
        value_enum,
        default_value_t = SmoothingChoice::None
    )]
    bleu_smoothing: SmoothingChoice,
}

fn main() {
    if let Err(err) = run() {
        // Printed directly so the failure survives any RUST_LOG filter.
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let renderer = match args.render_config.as_ref() {
        Some(path) => RendererConfig::load(path).map_err(|e| e.to_string())?,
        None => RendererConfig::default(),
    };
    let config = EvalConfig {
        predictions_path: args.pred,
        gold_path: args.gold,
        outdir: args.outdir,
        template_path: args.template,
        workdir: args.workdir,
        img_sample: args.img_sample,
        seed: args.seed,
        bleu_smoothing: args.bleu_smoothing.smoothing(),
        renderer,
    };

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    let bar = progress.clone();
    let evaluator = EvaluatorBuilder::new(config)
        .with_progress(Box::new(move |event: RenderProgress<'_>| {
            if event.done == 1 {
                bar.set_length(event.total as u64);
                bar.set_position(0);
            }
            bar.set_message(format!("{} {}", event.prefix, event.index));
            bar.inc(1);
        }))
        .build()
        .map_err(|e| e.to_string())?;

    let result = evaluator.run();
    progress.finish_and_clear();
    let (evaluation, paths) = result.map_err(|e| e.to_string())?;

    console_summary::print_summary(&evaluation, &paths);
    Ok(())
}
