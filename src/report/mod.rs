//! Figures, score reports and the on-disk result layout.

pub mod composer;
pub mod figure;
mod pdf;
pub mod writer;

pub use composer::{
    generate_overlapping, generate_side_by_side, mk_score_report, pair_overlap, OVERLAP_TITLE,
    SIDE_BY_SIDE_TITLE,
};
pub use figure::{Cell, CellContent, Figure};
pub use writer::{mk_results_dirs, save_results, ResultBundle, ResultPaths};
