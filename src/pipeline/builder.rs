use crate::config::EvalConfig;
use crate::error::EvalError;
use crate::pipeline::defaults::{CorpusScorer, PdfLatexRenderer};
use crate::pipeline::runtime::{Evaluator, EvaluatorParts};
use crate::pipeline::traits::{EquationRenderer, MetricScorer, ProgressCallback};
use crate::template::{mk_template, LatexTemplate};

pub struct EvaluatorBuilder {
    config: EvalConfig,
    template: Option<LatexTemplate>,
    renderer: Option<Box<dyn EquationRenderer>>,
    scorer: Option<Box<dyn MetricScorer>>,
    progress: Option<ProgressCallback>,
}

impl EvaluatorBuilder {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            template: None,
            renderer: None,
            scorer: None,
            progress: None,
        }
    }

    /// Use this template instead of loading `config.template_path`.
    pub fn with_template(mut self, template: LatexTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn EquationRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_scorer(mut self, scorer: Box<dyn MetricScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn build(self) -> Result<Evaluator, EvalError> {
        let template = match self.template {
            Some(template) => template,
            None => mk_template(&self.config.template_path)?,
        };
        let renderer = self
            .renderer
            .unwrap_or_else(|| Box::new(PdfLatexRenderer::new(self.config.renderer.clone())));
        let scorer = self.scorer.unwrap_or_else(|| {
            Box::new(CorpusScorer {
                smoothing: self.config.bleu_smoothing,
            })
        });

        Ok(Evaluator::from_parts(EvaluatorParts {
            config: self.config,
            template,
            renderer,
            scorer,
            progress: self.progress,
        }))
    }
}
