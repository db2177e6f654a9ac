use std::path::Path;

use crate::error::EvalError;
use crate::imaging::NativeRaster;
use crate::template::LatexTemplate;
use crate::types::{EquationPair, ScoreReport};

pub trait EquationRenderer: Send + Sync {
    /// Render `latex` through `template`, using `tex_path` as the intermediate
    /// source file. Intermediates must be removed unless `keep_intermediate`.
    fn render(
        &self,
        latex: &str,
        template: &LatexTemplate,
        tex_path: &Path,
        keep_intermediate: bool,
    ) -> Result<NativeRaster, EvalError>;
}

pub trait MetricScorer: Send + Sync {
    fn score(&self, pairs: &[EquationPair]) -> Result<ScoreReport, EvalError>;
}

/// Emitted once per rendered equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress<'a> {
    pub prefix: &'a str,
    pub index: usize,
    pub done: usize,
    pub total: usize,
    pub failed: bool,
}

pub type ProgressCallback = Box<dyn Fn(RenderProgress<'_>) + Send + Sync>;
