use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use eqn_eval::report::CellContent;
use eqn_eval::{
    ChannelOrder, EquationRenderer, EvalConfig, EvalError, Evaluation, EvaluatorBuilder,
    LatexTemplate, NativeRaster, RasterImage, RenderProgress,
};

const BLOCK_WIDTH: u32 = 4;
const GLYPH_ROWS: u32 = 8;
const FAIL_TOKEN: &str = "\\fail";

/// Draws each whitespace token as a short horizontal bar. The bar's column
/// range is the token position and its row is the token's byte sum modulo
/// 8, so equal token sequences produce equal images.
#[derive(Default)]
struct BlockRenderer {
    tex_paths: Mutex<Vec<PathBuf>>,
}

impl EquationRenderer for BlockRenderer {
    fn render(
        &self,
        latex: &str,
        template: &LatexTemplate,
        tex_path: &Path,
        _keep_intermediate: bool,
    ) -> Result<NativeRaster, EvalError> {
        if let Ok(mut paths) = self.tex_paths.lock() {
            paths.push(tex_path.to_path_buf());
        }
        assert!(template.instantiate(latex).contains(latex));

        let tokens: Vec<&str> = latex.split_whitespace().collect();
        if tokens.contains(&FAIL_TOKEN) {
            return Err(EvalError::Render {
                message: "undefined control sequence".to_string(),
            });
        }
        let width = BLOCK_WIDTH * tokens.len().max(1) as u32;
        let mut data = vec![255u8; (width * GLYPH_ROWS * 3) as usize];
        for (i, token) in tokens.iter().enumerate() {
            let row = token.bytes().map(u32::from).sum::<u32>() % GLYPH_ROWS;
            for x in (i as u32 * BLOCK_WIDTH)..(i as u32 * BLOCK_WIDTH + BLOCK_WIDTH - 1) {
                let offset = ((row * width + x) * 3) as usize;
                data[offset..offset + 3].copy_from_slice(&[0, 0, 0]);
            }
        }
        Ok(NativeRaster {
            width,
            height: GLYPH_ROWS,
            order: ChannelOrder::Rgb,
            data,
        })
    }
}

struct SharedRenderer(Arc<BlockRenderer>);

impl EquationRenderer for SharedRenderer {
    fn render(
        &self,
        latex: &str,
        template: &LatexTemplate,
        tex_path: &Path,
        keep_intermediate: bool,
    ) -> Result<NativeRaster, EvalError> {
        self.0.render(latex, template, tex_path, keep_intermediate)
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn evaluate(config: EvalConfig, predicted: &[&str], gold: &[&str]) -> Result<Evaluation, EvalError> {
    EvaluatorBuilder::new(config)
        .with_template(LatexTemplate::standalone())
        .with_renderer(Box::new(BlockRenderer::default()))
        .build()?
        .evaluate(&lines(predicted), &lines(gold))
}

fn overlap_images(evaluation: &Evaluation) -> Vec<RasterImage> {
    let fig = &evaluation.overlap;
    (0..fig.rows())
        .flat_map(|r| (0..fig.columns()).map(move |c| (r, c)))
        .filter_map(|(r, c)| match fig.cell(r, c).map(|cell| &cell.content) {
            Some(CellContent::Image(img)) => Some(img.clone()),
            _ => None,
        })
        .collect()
}

fn is_black(px: &[u8]) -> bool {
    px == [0, 0, 0, 255]
}

#[test]
fn identical_inputs_score_perfectly_and_overlap_in_black() {
    let data = ["a + b", "x = y"];
    let evaluation = evaluate(EvalConfig::default(), &data, &data).unwrap();

    assert_eq!(evaluation.scores.get("bleu"), Some(100.0));
    assert_eq!(evaluation.scores.get("exact_match"), Some(100.0));
    assert_eq!(evaluation.side_by_side.rows(), 2);
    assert_eq!(evaluation.render_failures, 0);

    let images = overlap_images(&evaluation);
    assert_eq!(images.len(), 2);
    for img in &images {
        assert!(img.pixels().any(is_black));
        assert!(img.pixels().all(|px| is_black(px) || px[3] == 0));
    }
}

#[test]
fn disjoint_inputs_score_zero_and_never_overlap() {
    let evaluation = evaluate(EvalConfig::default(), &["a + b"], &["c * d"]).unwrap();

    assert_eq!(evaluation.scores.get("bleu"), Some(0.0));
    let images = overlap_images(&evaluation);
    assert_eq!(images.len(), 1);
    let img = &images[0];
    assert!(!img.pixels().any(is_black));
    assert!(img.pixels().any(|px| px == [0, 0, 255, 255]));
    assert!(img.pixels().any(|px| px == [255, 0, 0, 255]));
}

#[test]
fn unequal_line_counts_fail_fast() {
    let result = evaluate(EvalConfig::default(), &["a", "b"], &["a"]);
    assert!(matches!(
        result,
        Err(EvalError::LengthMismatch {
            predicted: 2,
            gold: 1
        })
    ));
}

#[test]
fn render_failure_is_isolated_to_its_pair() {
    let evaluation = evaluate(
        EvalConfig::default(),
        &["a \\fail", "x = y"],
        &["a b", "x = y"],
    )
    .unwrap();

    assert_eq!(evaluation.render_failures, 1);
    assert_eq!(
        evaluation.side_by_side.cell(0, 1).map(|c| &c.content),
        Some(&CellContent::Placeholder("render failed".to_string()))
    );
    assert!(matches!(
        evaluation.side_by_side.cell(0, 0).map(|c| &c.content),
        Some(CellContent::Image(_))
    ));
    let sizes = &evaluation.sizes[0];
    assert!(sizes.predicted.is_none());
    assert_eq!(sizes.gold, Some((2 * BLOCK_WIDTH, GLYPH_ROWS)));

    let images = overlap_images(&evaluation);
    assert_eq!(images.len(), 2);
    assert!(!images[0].pixels().any(is_black));
    assert!(images[0].pixels().any(|px| px == [0, 0, 255, 255]));
}

#[test]
fn sampling_is_reproducible_and_scores_use_every_pair() {
    let data: Vec<String> = (0..10).map(|i| format!("x _ {i}")).collect();
    let data: Vec<&str> = data.iter().map(String::as_str).collect();
    let config = EvalConfig {
        img_sample: 3,
        ..EvalConfig::default()
    };

    let first = evaluate(config.clone(), &data, &data).unwrap();
    let second = evaluate(config, &data, &data).unwrap();

    assert_eq!(first.selection, second.selection);
    assert_eq!(first.selection.len(), 3);
    assert!(first.selection.indices().windows(2).all(|w| w[0] < w[1]));
    assert_eq!(first.side_by_side.rows(), 3);
    assert_eq!(first.scores.get("num_examples"), Some(10.0));

    let labels: Vec<String> = first.selection.iter().map(|i| i.to_string()).collect();
    for (row, label) in labels.iter().enumerate() {
        assert_eq!(first.side_by_side.row_label(row), Some(label.as_str()));
    }
}

#[test]
fn oversized_sample_keeps_every_pair() {
    let config = EvalConfig {
        img_sample: 50,
        ..EvalConfig::default()
    };
    let evaluation = evaluate(config, &["a", "b"], &["a", "c"]).unwrap();
    assert_eq!(evaluation.selection.indices(), &[0, 1]);
}

#[test]
fn intermediate_files_are_named_by_prefix_and_original_index() {
    let workdir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(BlockRenderer::default());
    let data: Vec<String> = (0..6).map(|i| format!("y = {i}")).collect();
    let config = EvalConfig {
        workdir: Some(workdir.path().to_path_buf()),
        img_sample: 2,
        ..EvalConfig::default()
    };
    let evaluation = EvaluatorBuilder::new(config)
        .with_template(LatexTemplate::standalone())
        .with_renderer(Box::new(SharedRenderer(Arc::clone(&renderer))))
        .build()
        .unwrap()
        .evaluate(&data, &data)
        .unwrap();

    let paths = renderer.tex_paths.lock().unwrap().clone();
    let mut expected: Vec<PathBuf> = Vec::new();
    for prefix in ["pred", "gold"] {
        for index in evaluation.selection.iter() {
            expected.push(workdir.path().join(format!("{prefix}_{index}.tex")));
        }
    }
    assert_eq!(paths, expected);
}

#[test]
fn progress_reports_every_rendered_equation() {
    let events = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));
    let (seen, failed) = (Arc::clone(&events), Arc::clone(&failures));
    let evaluator = EvaluatorBuilder::new(EvalConfig::default())
        .with_template(LatexTemplate::standalone())
        .with_renderer(Box::new(BlockRenderer::default()))
        .with_progress(Box::new(move |event: RenderProgress<'_>| {
            assert!(event.done <= event.total);
            seen.fetch_add(1, Ordering::SeqCst);
            if event.failed {
                failed.fetch_add(1, Ordering::SeqCst);
            }
        }))
        .build()
        .unwrap();

    evaluator
        .evaluate(&lines(&["a", "\\fail", "c"]), &lines(&["a", "b", "c"]))
        .unwrap();
    assert_eq!(events.load(Ordering::SeqCst), 6);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[test]
fn run_writes_results_and_can_be_repeated() {
    let dir = tempfile::tempdir().unwrap();
    let pred_path = dir.path().join("pred.txt");
    let gold_path = dir.path().join("gold.txt");
    std::fs::write(&pred_path, "a + b\n  x = y  \n").unwrap();
    std::fs::write(&gold_path, "a + c\nx = y\n").unwrap();
    let outdir = dir.path().join("output");

    let config = EvalConfig {
        predictions_path: pred_path,
        gold_path,
        outdir: outdir.clone(),
        ..EvalConfig::default()
    };
    let evaluator = EvaluatorBuilder::new(config)
        .with_template(LatexTemplate::standalone())
        .with_renderer(Box::new(BlockRenderer::default()))
        .build()
        .unwrap();

    let (evaluation, paths) = evaluator.run().unwrap();
    let (_, again) = evaluator.run().unwrap();
    assert_eq!(paths, again);

    assert_eq!(
        std::fs::read_to_string(outdir.join("input/predictions.txt")).unwrap(),
        "a + b\nx = y\n"
    );
    assert_eq!(
        std::fs::read_to_string(outdir.join("input/gold.txt")).unwrap(),
        "a + c\nx = y\n"
    );
    let report = std::fs::read_to_string(outdir.join("reports/score_report.txt")).unwrap();
    assert!(report.starts_with("generated_at: "));
    assert!(report.contains("bleu: "));
    assert_eq!(evaluation.scores.get("exact_match"), Some(50.0));
    for name in ["side_by_side.pdf", "overlap_and_diff.pdf"] {
        let bytes = std::fs::read(outdir.join("reports").join(name)).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
    assert!(outdir.join("reports/score_report.json").is_file());
}
