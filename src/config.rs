use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::EvalError;
use crate::scoring::BleuSmoothing;

/// Settings for the default LaTeX renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub latex_command: String,
    pub rasterize_command: String,
    pub density: u32,
    pub keep_intermediate: bool,
}

impl RendererConfig {
    pub const DEFAULT_DENSITY: u32 = 200;

    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| EvalError::io("reading renderer config", path, e))?;
        let config: Self =
            serde_json::from_str(&data).map_err(|e| EvalError::json("parsing renderer config", e))?;
        if config.density == 0 {
            return Err(EvalError::invalid_input("renderer density must be positive"));
        }
        Ok(config)
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            latex_command: "pdflatex".to_string(),
            rasterize_command: "convert".to_string(),
            density: Self::DEFAULT_DENSITY,
            keep_intermediate: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub predictions_path: PathBuf,
    pub gold_path: PathBuf,
    pub outdir: PathBuf,
    pub template_path: PathBuf,
    /// Where intermediate `.tex` files go; a scoped temporary directory when `None`.
    pub workdir: Option<PathBuf>,
    /// Number of pairs to visualize; 0 keeps all of them.
    pub img_sample: usize,
    /// Only consulted when `img_sample > 0`.
    pub seed: u64,
    pub bleu_smoothing: BleuSmoothing,
    pub renderer: RendererConfig,
}

impl EvalConfig {
    pub const DEFAULT_SEED: u64 = 426;
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            predictions_path: PathBuf::from("/data/pred.txt"),
            gold_path: PathBuf::from("/data/gold.txt"),
            outdir: PathBuf::from("/data/output"),
            template_path: PathBuf::from("misc/template.tex"),
            workdir: None,
            img_sample: 0,
            seed: Self::DEFAULT_SEED,
            bleu_smoothing: BleuSmoothing::None,
            renderer: RendererConfig::default(),
        }
    }
}
