use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, info_span};

use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::imaging::{resize, PairSizes, RasterImage};
use crate::pipeline::images::ImageBatchBuilder;
use crate::pipeline::sampler::Sampler;
use crate::pipeline::traits::{EquationRenderer, MetricScorer, ProgressCallback};
use crate::report::{
    generate_overlapping, generate_side_by_side, mk_score_report, save_results, Figure,
    ResultBundle, ResultPaths,
};
use crate::segments::load_segments;
use crate::template::LatexTemplate;
use crate::types::{EquationPair, IndexSelection, RenderedPair, ScoreReport};

/// Results of one evaluation, ready to be written out.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub scores: ScoreReport,
    pub generated_at: DateTime<Utc>,
    pub report_text: String,
    /// Original indices of the visualized pairs, ascending.
    pub selection: IndexSelection,
    pub sizes: Vec<PairSizes>,
    pub render_failures: usize,
    pub side_by_side: Figure,
    pub overlap: Figure,
}

pub struct Evaluator {
    config: EvalConfig,
    template: LatexTemplate,
    renderer: Box<dyn EquationRenderer>,
    scorer: Box<dyn MetricScorer>,
    progress: Option<ProgressCallback>,
}

pub(crate) struct EvaluatorParts {
    pub config: EvalConfig,
    pub template: LatexTemplate,
    pub renderer: Box<dyn EquationRenderer>,
    pub scorer: Box<dyn MetricScorer>,
    pub progress: Option<ProgressCallback>,
}

impl Evaluator {
    pub(crate) fn from_parts(parts: EvaluatorParts) -> Self {
        Self {
            config: parts.config,
            template: parts.template,
            renderer: parts.renderer,
            scorer: parts.scorer,
            progress: parts.progress,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn template(&self) -> &LatexTemplate {
        &self.template
    }

    /// Score every pair, then render and compare the sampled subset.
    pub fn evaluate(&self, predicted: &[String], gold: &[String]) -> Result<Evaluation, EvalError> {
        let pairs = EquationPair::zip(predicted, gold)?;
        let span = info_span!("evaluate", pairs = pairs.len());
        let _guard = span.enter();

        let scores = self.scorer.score(&pairs)?;
        let generated_at = Utc::now();
        let report_text = mk_score_report(&scores, generated_at);

        let selection = if self.config.img_sample > 0 {
            Sampler::seeded(self.config.seed).select(pairs.len(), self.config.img_sample)
        } else {
            IndexSelection::all(pairs.len())
        };
        info!(
            selected = selection.len(),
            total = pairs.len(),
            seed = self.config.seed,
            "selected pairs to visualize"
        );

        let rendered = match &self.config.workdir {
            Some(workdir) => self.render_pairs(&pairs, &selection, workdir)?,
            None => {
                let scratch = tempfile::Builder::new()
                    .prefix("eqn_eval_")
                    .tempdir()
                    .map_err(|e| {
                        EvalError::io("creating temporary work directory", std::env::temp_dir(), e)
                    })?;
                self.render_pairs(&pairs, &selection, scratch.path())?
            }
        };
        let render_failures: usize = rendered.iter().map(|p| p.failure_count()).sum();

        let batch = resize(rendered, RasterImage::RGBA_CHANNELS)?;
        info!(
            canvas_width = batch.canvas_width,
            canvas_height = batch.canvas_height,
            render_failures,
            "normalized rendered images"
        );

        let side_by_side = generate_side_by_side(&batch.pairs)?;
        let overlap = generate_overlapping(&batch.pairs)?;

        Ok(Evaluation {
            scores,
            generated_at,
            report_text,
            selection,
            sizes: batch.sizes,
            render_failures,
            side_by_side,
            overlap,
        })
    }

    /// Load both input files, evaluate them and write all results to `outdir`.
    pub fn run(&self) -> Result<(Evaluation, ResultPaths), EvalError> {
        let predicted = load_segments(&self.config.predictions_path)?;
        let gold = load_segments(&self.config.gold_path)?;
        info!(
            predictions = %self.config.predictions_path.display(),
            gold = %self.config.gold_path.display(),
            lines = predicted.len(),
            "loaded segments"
        );
        let evaluation = self.evaluate(&predicted, &gold)?;
        let paths = self.save(&predicted, &gold, &evaluation)?;
        Ok((evaluation, paths))
    }

    pub fn save(
        &self,
        predicted: &[String],
        gold: &[String],
        evaluation: &Evaluation,
    ) -> Result<ResultPaths, EvalError> {
        save_results(
            &self.config.outdir,
            &ResultBundle {
                predicted,
                gold,
                scores: &evaluation.scores,
                report_text: &evaluation.report_text,
                generated_at: evaluation.generated_at,
                side_by_side: &evaluation.side_by_side,
                overlap: &evaluation.overlap,
            },
        )
    }

    fn render_pairs(
        &self,
        pairs: &[EquationPair],
        selection: &IndexSelection,
        workdir: &Path,
    ) -> Result<Vec<RenderedPair>, EvalError> {
        ImageBatchBuilder::new(self.renderer.as_ref(), &self.template, workdir)
            .keep_intermediate(self.config.renderer.keep_intermediate)
            .with_progress(self.progress.as_ref())
            .build_pairs(pairs, selection)
    }
}
