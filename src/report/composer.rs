use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use super::figure::{CellContent, Figure};
use crate::error::EvalError;
use crate::imaging::{tinted_overlap, OverlapDiff, RasterImage};
use crate::types::{RenderOutcome, RenderedPair, ScoreReport};

pub const SIDE_BY_SIDE_TITLE: &str =
    "Side-by-Side comparison of gold (left) and predicted (right)";
pub const OVERLAP_TITLE: &str = "Overlap between gold and predicted.\n\
     Gold-only is shown in blue, predicted-only in red, and overlap in black.";

pub const OVERLAP_COLUMNS: usize = 3;
pub const OVERLAP_ROWS: usize = 5;
pub const OVERLAP_MAX_CELLS: usize = OVERLAP_COLUMNS * OVERLAP_ROWS;

pub const RENDER_FAILED: &str = "render failed";

const OPAQUE_WHITE: [u8; 4] = [255, 255, 255, 255];

/// Two columns, gold left and predicted right, one row per pair labelled by index.
pub fn generate_side_by_side(pairs: &[RenderedPair]) -> Result<Figure, EvalError> {
    let mut figure = Figure::grid(pairs.len(), 2).with_title(SIDE_BY_SIDE_TITLE);
    for (row, pair) in pairs.iter().enumerate() {
        figure.set_row_label(row, pair.index.to_string())?;
        figure.set_cell(row, 0, outcome_cell(&pair.gold), None)?;
        figure.set_cell(row, 1, outcome_cell(&pair.predicted), None)?;
    }
    Ok(figure)
}

/// Up to fifteen overlap images in a 3x5 grid, captioned by pair index.
pub fn generate_overlapping(pairs: &[RenderedPair]) -> Result<Figure, EvalError> {
    if pairs.len() > OVERLAP_MAX_CELLS {
        debug!(
            pairs = pairs.len(),
            shown = OVERLAP_MAX_CELLS,
            "truncating overlap figure"
        );
    }
    let mut figure = Figure::grid(OVERLAP_ROWS, OVERLAP_COLUMNS).with_title(OVERLAP_TITLE);
    for (slot, pair) in pairs.iter().take(OVERLAP_MAX_CELLS).enumerate() {
        let content = match pair_overlap(pair)? {
            Some(diff) => CellContent::Image(diff.image),
            None => CellContent::Placeholder(RENDER_FAILED.to_string()),
        };
        figure.set_cell(
            slot / OVERLAP_COLUMNS,
            slot % OVERLAP_COLUMNS,
            content,
            Some(pair.index.to_string()),
        )?;
    }
    Ok(figure)
}

/// Overlap for one pair. A failed side is replaced by a blank canvas of the
/// other side's shape; `None` when both sides failed.
pub fn pair_overlap(pair: &RenderedPair) -> Result<Option<OverlapDiff>, EvalError> {
    match (pair.gold.image(), pair.predicted.image()) {
        (Some(gold), Some(predicted)) => tinted_overlap(gold, predicted).map(Some),
        (Some(gold), None) => tinted_overlap(gold, &blank_like(gold)?).map(Some),
        (None, Some(predicted)) => tinted_overlap(&blank_like(predicted)?, predicted).map(Some),
        (None, None) => Ok(None),
    }
}

fn blank_like(image: &RasterImage) -> Result<RasterImage, EvalError> {
    let pixel = &OPAQUE_WHITE[..usize::from(image.channels()).min(OPAQUE_WHITE.len())];
    RasterImage::filled(image.width(), image.height(), pixel)
}

fn outcome_cell(outcome: &RenderOutcome) -> CellContent {
    match outcome {
        RenderOutcome::Rendered(image) => CellContent::Image(image.clone()),
        RenderOutcome::Failed { .. } => CellContent::Placeholder(RENDER_FAILED.to_string()),
    }
}

/// Human-readable score report: a timestamp line, then one `name: value` line per metric.
pub fn mk_score_report(scores: &ScoreReport, generated_at: DateTime<Utc>) -> String {
    let mut out = format!(
        "generated_at: {}\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    for (name, value) in scores.iter() {
        out.push_str(&format!("{name}: {value:.4}\n"));
    }
    out
}
