use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::config::RendererConfig;
use crate::error::EvalError;
use crate::imaging::NativeRaster;
use crate::pipeline::traits::{EquationRenderer, MetricScorer};
use crate::scoring::{score_pairs, BleuSmoothing};
use crate::template::LatexTemplate;
use crate::types::{EquationPair, ScoreReport};

const LATEX_SIDE_EXTENSIONS: [&str; 4] = ["aux", "log", "pdf", "png"];

/// Renders through an external LaTeX compiler, then rasterizes page one.
pub struct PdfLatexRenderer {
    config: RendererConfig,
}

impl PdfLatexRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }
}

impl EquationRenderer for PdfLatexRenderer {
    fn render(
        &self,
        latex: &str,
        template: &LatexTemplate,
        tex_path: &Path,
        keep_intermediate: bool,
    ) -> Result<NativeRaster, EvalError> {
        let out_dir = tex_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let pdf_path = tex_path.with_extension("pdf");
        let png_path = tex_path.with_extension("png");

        let _intermediates = IntermediateFiles::new(tex_path, keep_intermediate);

        std::fs::write(tex_path, template.instantiate(latex))
            .map_err(|e| EvalError::io("writing LaTeX source", tex_path, e))?;

        let output = Command::new(&self.config.latex_command)
            .arg("-interaction=nonstopmode")
            .arg("-halt-on-error")
            .arg("-output-directory")
            .arg(out_dir)
            .arg(tex_path)
            .output()
            .map_err(|e| {
                EvalError::render(format!("could not run {}: {e}", self.config.latex_command))
            })?;
        check_status(&self.config.latex_command, &output)?;
        if !pdf_path.exists() {
            return Err(EvalError::render(format!(
                "{} produced no PDF",
                self.config.latex_command
            )));
        }

        let mut first_page = pdf_path.clone().into_os_string();
        first_page.push("[0]");
        let output = Command::new(&self.config.rasterize_command)
            .arg("-density")
            .arg(self.config.density.to_string())
            .arg(&first_page)
            .args(["-background", "white", "-alpha", "remove", "-alpha", "off"])
            .arg(&png_path)
            .output()
            .map_err(|e| {
                EvalError::render(format!(
                    "could not run {}: {e}",
                    self.config.rasterize_command
                ))
            })?;
        check_status(&self.config.rasterize_command, &output)?;

        let image =
            image::open(&png_path).map_err(|e| EvalError::image("loading rasterized PNG", e))?;
        Ok(NativeRaster::from_dynamic(image))
    }
}

fn check_status(command: &str, output: &Output) -> Result<(), EvalError> {
    if output.status.success() {
        return Ok(());
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    // LaTeX reports errors on stdout with a leading '!'.
    let detail = stdout
        .lines()
        .find(|line| line.starts_with('!'))
        .or_else(|| stderr.lines().find(|line| !line.trim().is_empty()))
        .unwrap_or("no diagnostic output");
    Err(EvalError::render(format!(
        "{command} exited with {}: {detail}",
        output.status
    )))
}

/// Removes the `.tex` file and its LaTeX side outputs when dropped.
struct IntermediateFiles {
    paths: Vec<PathBuf>,
    keep: bool,
}

impl IntermediateFiles {
    fn new(tex_path: &Path, keep: bool) -> Self {
        let mut paths = vec![tex_path.to_path_buf()];
        paths.extend(
            LATEX_SIDE_EXTENSIONS
                .iter()
                .map(|ext| tex_path.with_extension(ext)),
        );
        Self { paths, keep }
    }
}

impl Drop for IntermediateFiles {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        for path in &self.paths {
            if path.exists() {
                if let Err(err) = std::fs::remove_file(path) {
                    tracing::debug!(path = %path.display(), %err, "could not remove intermediate file");
                }
            }
        }
    }
}

/// BLEU plus token-level match and edit-distance metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusScorer {
    pub smoothing: BleuSmoothing,
}

impl MetricScorer for CorpusScorer {
    fn score(&self, pairs: &[EquationPair]) -> Result<ScoreReport, EvalError> {
        score_pairs(pairs, self.smoothing)
    }
}
