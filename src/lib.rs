pub mod config;
pub mod error;
pub mod imaging;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod segments;
pub mod template;
pub mod types;

pub use config::{EvalConfig, RendererConfig};
pub use error::EvalError;
pub use imaging::{
    overlap_diff, pixel_is_white, remove_background, resize, tinted_overlap, ChannelOrder,
    NativeRaster, RasterImage, Tint,
};
pub use pipeline::builder::EvaluatorBuilder;
pub use pipeline::images::ImageBatchBuilder;
pub use pipeline::runtime::{Evaluation, Evaluator};
pub use pipeline::sampler::Sampler;
pub use pipeline::traits::{EquationRenderer, MetricScorer, ProgressCallback, RenderProgress};
pub use report::{
    generate_overlapping, generate_side_by_side, mk_results_dirs, mk_score_report, save_results,
    Figure, ResultPaths,
};
pub use scoring::{corpus_bleu, score_pairs, BleuScore, BleuSmoothing};
pub use segments::{load_segments, save_text};
pub use template::{mk_template, LatexTemplate, EQUATION_MARKER};
pub use types::{EquationPair, IndexSelection, RenderOutcome, RenderedPair, ScoreReport};
