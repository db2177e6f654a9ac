use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use super::figure::Figure;
use crate::error::EvalError;
use crate::segments::save_text;
use crate::types::ScoreReport;

pub const INPUT_DIR: &str = "input";
pub const REPORTS_DIR: &str = "reports";
pub const PREDICTIONS_FILE: &str = "predictions.txt";
pub const GOLD_FILE: &str = "gold.txt";
pub const SCORE_REPORT_TXT: &str = "score_report.txt";
pub const SCORE_REPORT_JSON: &str = "score_report.json";
pub const SIDE_BY_SIDE_PDF: &str = "side_by_side.pdf";
pub const OVERLAP_PDF: &str = "overlap_and_diff.pdf";

/// Everything one evaluation run persists.
#[derive(Debug, Clone, Copy)]
pub struct ResultBundle<'a> {
    pub predicted: &'a [String],
    pub gold: &'a [String],
    pub scores: &'a ScoreReport,
    pub report_text: &'a str,
    pub generated_at: DateTime<Utc>,
    pub side_by_side: &'a Figure,
    pub overlap: &'a Figure,
}

/// Locations of the written artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPaths {
    pub input_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl ResultPaths {
    pub fn predictions(&self) -> PathBuf {
        self.input_dir.join(PREDICTIONS_FILE)
    }

    pub fn gold(&self) -> PathBuf {
        self.input_dir.join(GOLD_FILE)
    }

    pub fn score_report(&self) -> PathBuf {
        self.reports_dir.join(SCORE_REPORT_TXT)
    }

    pub fn score_report_json(&self) -> PathBuf {
        self.reports_dir.join(SCORE_REPORT_JSON)
    }

    pub fn side_by_side(&self) -> PathBuf {
        self.reports_dir.join(SIDE_BY_SIDE_PDF)
    }

    pub fn overlap(&self) -> PathBuf {
        self.reports_dir.join(OVERLAP_PDF)
    }
}

#[derive(Serialize)]
struct ScoreReportFile<'a> {
    generated_at: String,
    metrics: &'a ScoreReport,
}

/// Create `<outdir>/input` and `<outdir>/reports`. Existing directories are reused.
pub fn mk_results_dirs(outdir: &Path) -> Result<ResultPaths, EvalError> {
    let paths = ResultPaths {
        input_dir: outdir.join(INPUT_DIR),
        reports_dir: outdir.join(REPORTS_DIR),
    };
    for dir in [paths.input_dir.as_path(), paths.reports_dir.as_path()] {
        std::fs::create_dir_all(dir)
            .map_err(|e| EvalError::io("creating results directory", dir, e))?;
    }
    Ok(paths)
}

/// Write inputs, score reports and both figures under `outdir`, overwriting previous runs.
pub fn save_results(outdir: &Path, bundle: &ResultBundle<'_>) -> Result<ResultPaths, EvalError> {
    let paths = mk_results_dirs(outdir)?;

    save_text(&paths.predictions(), bundle.predicted)?;
    save_text(&paths.gold(), bundle.gold)?;

    let report_path = paths.score_report();
    std::fs::write(&report_path, bundle.report_text)
        .map_err(|e| EvalError::io("writing score report", &report_path, e))?;

    let json_path = paths.score_report_json();
    let json = serde_json::to_string_pretty(&ScoreReportFile {
        generated_at: bundle
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        metrics: bundle.scores,
    })
    .map_err(|e| EvalError::json("serializing score report", e))?;
    std::fs::write(&json_path, json)
        .map_err(|e| EvalError::io("writing score report", &json_path, e))?;

    bundle.side_by_side.save_pdf(&paths.side_by_side())?;
    bundle.overlap.save_pdf(&paths.overlap())?;

    info!(outdir = %outdir.display(), "saved evaluation results");
    Ok(paths)
}
