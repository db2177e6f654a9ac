pub mod bleu;
pub mod edit_distance;

pub use bleu::{corpus_bleu, BleuScore, BleuSmoothing};
pub use edit_distance::{normalized_edit_distance, token_edit_distance};

use crate::error::EvalError;
use crate::types::{EquationPair, ScoreReport};

pub const METRIC_BLEU: &str = "bleu";
pub const METRIC_EXACT_MATCH: &str = "exact_match";
pub const METRIC_TOKEN_EDIT_DISTANCE: &str = "token_edit_distance";
pub const METRIC_NORMALIZED_EDIT_DISTANCE: &str = "normalized_edit_distance";
pub const METRIC_NUM_EXAMPLES: &str = "num_examples";

/// Corpus metrics over every pair (never a sampled subset).
pub fn score_pairs(pairs: &[EquationPair], smoothing: BleuSmoothing) -> Result<ScoreReport, EvalError> {
    let predicted: Vec<&str> = pairs.iter().map(|p| p.predicted.as_str()).collect();
    let gold: Vec<&str> = pairs.iter().map(|p| p.gold.as_str()).collect();

    let bleu = corpus_bleu(&predicted, &[gold.as_slice()], smoothing)?;

    let mut exact = 0usize;
    let mut distance_sum = 0usize;
    let mut normalized_sum = 0.0f64;
    for pair in pairs {
        let p: Vec<&str> = pair.predicted.split_whitespace().collect();
        let g: Vec<&str> = pair.gold.split_whitespace().collect();
        if p == g {
            exact += 1;
        }
        distance_sum += token_edit_distance(&p, &g);
        normalized_sum += normalized_edit_distance(&p, &g);
    }

    let n = pairs.len();
    let mean = |sum: f64| if n == 0 { 0.0 } else { sum / n as f64 };

    let mut report = ScoreReport::default();
    report.insert(METRIC_BLEU, bleu.score);
    report.insert(METRIC_EXACT_MATCH, 100.0 * mean(exact as f64));
    report.insert(METRIC_TOKEN_EDIT_DISTANCE, mean(distance_sum as f64));
    report.insert(METRIC_NORMALIZED_EDIT_DISTANCE, mean(normalized_sum));
    report.insert(METRIC_NUM_EXAMPLES, n as f64);

    tracing::info!(
        bleu = format!("{:.2}", bleu.score),
        sys_len = bleu.sys_len,
        ref_len = bleu.ref_len,
        examples = n,
        "scored predictions"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(predicted: &[&str], gold: &[&str]) -> Vec<EquationPair> {
        let p: Vec<String> = predicted.iter().map(|s| s.to_string()).collect();
        let g: Vec<String> = gold.iter().map(|s| s.to_string()).collect();
        EquationPair::zip(&p, &g).unwrap()
    }

    #[test]
    fn identical_pairs_score_perfectly() {
        let data = ["a + b", "x = y"];
        let report = score_pairs(&pairs(&data, &data), BleuSmoothing::None).unwrap();
        assert_eq!(report.get(METRIC_BLEU), Some(100.0));
        assert_eq!(report.get(METRIC_EXACT_MATCH), Some(100.0));
        assert_eq!(report.get(METRIC_TOKEN_EDIT_DISTANCE), Some(0.0));
        assert_eq!(report.get(METRIC_NUM_EXAMPLES), Some(2.0));
    }

    #[test]
    fn disjoint_pair_scores_zero() {
        let report = score_pairs(&pairs(&["a + b"], &["c * d"]), BleuSmoothing::None).unwrap();
        assert_eq!(report.get(METRIC_BLEU), Some(0.0));
        assert_eq!(report.get(METRIC_EXACT_MATCH), Some(0.0));
        assert_eq!(report.get(METRIC_TOKEN_EDIT_DISTANCE), Some(3.0));
        assert_eq!(report.get(METRIC_NORMALIZED_EDIT_DISTANCE), Some(1.0));
    }

    #[test]
    fn whitespace_differences_still_match_exactly() {
        let report = score_pairs(&pairs(&["a  +   b"], &["a + b"]), BleuSmoothing::None).unwrap();
        assert_eq!(report.get(METRIC_EXACT_MATCH), Some(100.0));
    }

    #[test]
    fn empty_input_reports_zeros() {
        let report = score_pairs(&[], BleuSmoothing::None).unwrap();
        assert_eq!(report.get(METRIC_BLEU), Some(0.0));
        assert_eq!(report.get(METRIC_NUM_EXAMPLES), Some(0.0));
    }
}
