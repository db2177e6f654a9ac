use std::path::Path;

use crate::error::EvalError;
use crate::imaging::RasterImage;
use crate::pipeline::traits::{EquationRenderer, ProgressCallback, RenderProgress};
use crate::template::LatexTemplate;
use crate::types::{EquationPair, IndexSelection, RenderOutcome, RenderedPair};

pub const PREDICTED_PREFIX: &str = "pred";
pub const GOLD_PREFIX: &str = "gold";

/// Drives an [`EquationRenderer`] over a batch, one equation at a time and in order.
pub struct ImageBatchBuilder<'a> {
    renderer: &'a dyn EquationRenderer,
    template: &'a LatexTemplate,
    workdir: &'a Path,
    keep_intermediate: bool,
    progress: Option<&'a ProgressCallback>,
}

impl<'a> ImageBatchBuilder<'a> {
    pub fn new(
        renderer: &'a dyn EquationRenderer,
        template: &'a LatexTemplate,
        workdir: &'a Path,
    ) -> Self {
        Self {
            renderer,
            template,
            workdir,
            keep_intermediate: false,
            progress: None,
        }
    }

    pub fn keep_intermediate(mut self, keep: bool) -> Self {
        self.keep_intermediate = keep;
        self
    }

    pub fn with_progress(mut self, progress: Option<&'a ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Render `(index, latex)` items. The output is index-aligned with the
    /// input; a failing equation yields [`RenderOutcome::Failed`] and the
    /// batch carries on. Only a missing work directory aborts.
    pub fn build(&self, equations: &[(usize, &str)], prefix: &str) -> Result<Vec<RenderOutcome>, EvalError> {
        std::fs::create_dir_all(self.workdir)
            .map_err(|e| EvalError::io("creating render work directory", self.workdir, e))?;

        let total = equations.len();
        let mut outcomes = Vec::with_capacity(total);
        for (done, &(index, latex)) in equations.iter().enumerate() {
            let outcome = self.render_one(index, latex, prefix);
            if let Some(progress) = self.progress {
                progress(RenderProgress {
                    prefix,
                    index,
                    done: done + 1,
                    total,
                    failed: outcome.is_failed(),
                });
            }
            outcomes.push(outcome);
        }

        let failures = outcomes.iter().filter(|o| o.is_failed()).count();
        tracing::info!(prefix, rendered = total - failures, failures, "rendered equations");
        Ok(outcomes)
    }

    /// Render both sides of every selected pair; predicted first, then gold.
    pub fn build_pairs(
        &self,
        pairs: &[EquationPair],
        selection: &IndexSelection,
    ) -> Result<Vec<RenderedPair>, EvalError> {
        let mut predicted = Vec::with_capacity(selection.len());
        let mut gold = Vec::with_capacity(selection.len());
        for index in selection.iter() {
            let pair = pairs.get(index).ok_or_else(|| {
                EvalError::invalid_input(format!(
                    "selected index {index} is out of range for {} pairs",
                    pairs.len()
                ))
            })?;
            predicted.push((pair.index, pair.predicted.as_str()));
            gold.push((pair.index, pair.gold.as_str()));
        }

        let predicted = self.build(&predicted, PREDICTED_PREFIX)?;
        let gold = self.build(&gold, GOLD_PREFIX)?;
        Ok(selection
            .iter()
            .zip(predicted.into_iter().zip(gold))
            .map(|(index, (predicted, gold))| RenderedPair {
                index,
                predicted,
                gold,
            })
            .collect())
    }

    fn render_one(&self, index: usize, latex: &str, prefix: &str) -> RenderOutcome {
        let tex_path = self.workdir.join(format!("{prefix}_{index}.tex"));
        let rendered = self
            .renderer
            .render(latex, self.template, &tex_path, self.keep_intermediate)
            .and_then(RasterImage::from_native);
        match rendered {
            Ok(image) => {
                tracing::debug!(
                    prefix,
                    index,
                    width = image.width(),
                    height = image.height(),
                    "rendered equation"
                );
                RenderOutcome::Rendered(image)
            }
            Err(err) => {
                tracing::warn!(prefix, index, error = %err, "equation failed to render");
                RenderOutcome::failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::imaging::{ChannelOrder, NativeRaster};

    /// Fails on anything containing "bad"; records the intermediate paths it saw.
    struct StubRenderer {
        seen: Mutex<Vec<String>>,
    }

    impl EquationRenderer for StubRenderer {
        fn render(
            &self,
            latex: &str,
            _template: &LatexTemplate,
            tex_path: &Path,
            _keep_intermediate: bool,
        ) -> Result<NativeRaster, EvalError> {
            let name = tex_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            self.seen.lock().unwrap().push(name);
            if latex.contains("bad") {
                return Err(EvalError::render("Undefined control sequence"));
            }
            Ok(NativeRaster {
                width: latex.len() as u32,
                height: 1,
                order: ChannelOrder::Bgr,
                data: vec![0; latex.len() * 3],
            })
        }
    }

    fn stub() -> StubRenderer {
        StubRenderer {
            seen: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn failures_are_recorded_per_slot() {
        let renderer = stub();
        let template = LatexTemplate::standalone();
        let dir = tempfile::tempdir().unwrap();
        let builder = ImageBatchBuilder::new(&renderer, &template, dir.path());
        let outcomes = builder
            .build(&[(0, "ab"), (1, "bad"), (2, "abcd")], PREDICTED_PREFIX)
            .unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].image().map(|i| i.width()), Some(2));
        assert!(outcomes[1].is_failed());
        assert_eq!(outcomes[2].image().map(|i| i.shape()), Some((4, 1, 4)));
    }

    #[test]
    fn intermediate_names_use_prefix_and_original_index() {
        let renderer = stub();
        let template = LatexTemplate::standalone();
        let dir = tempfile::tempdir().unwrap();
        let pairs = EquationPair::zip(
            &["a".to_string(), "b".to_string(), "c".to_string()],
            &["x".to_string(), "y".to_string(), "z".to_string()],
        )
        .unwrap();
        let selection = IndexSelection::from_unsorted(vec![2, 0]);
        let rendered = ImageBatchBuilder::new(&renderer, &template, dir.path())
            .build_pairs(&pairs, &selection)
            .unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1].index, 2);
        let seen = renderer.seen.lock().unwrap().clone();
        assert_eq!(seen, vec!["pred_0.tex", "pred_2.tex", "gold_0.tex", "gold_2.tex"]);
    }

    #[test]
    fn progress_reports_every_item() {
        let renderer = stub();
        let template = LatexTemplate::standalone();
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let (c, f) = (Arc::clone(&calls), Arc::clone(&failed));
        let callback: ProgressCallback = Box::new(move |p: RenderProgress<'_>| {
            c.fetch_add(1, Ordering::SeqCst);
            if p.failed {
                f.fetch_add(1, Ordering::SeqCst);
            }
        });
        ImageBatchBuilder::new(&renderer, &template, dir.path())
            .with_progress(Some(&callback))
            .build(&[(0, "bad"), (1, "ok")], GOLD_PREFIX)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(failed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let renderer = stub();
        let template = LatexTemplate::standalone();
        let dir = tempfile::tempdir().unwrap();
        let selection = IndexSelection::from_unsorted(vec![4]);
        let result =
            ImageBatchBuilder::new(&renderer, &template, dir.path()).build_pairs(&[], &selection);
        assert!(result.is_err());
    }
}
