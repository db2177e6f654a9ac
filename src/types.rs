use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::EvalError;
use crate::imaging::RasterImage;

/// One predicted/gold pair, keyed by its line index in the input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationPair {
    pub index: usize,
    pub predicted: String,
    pub gold: String,
}

impl EquationPair {
    /// Zip the two segment lists; unequal lengths are rejected rather than truncated.
    pub fn zip(predicted: &[String], gold: &[String]) -> Result<Vec<Self>, EvalError> {
        if predicted.len() != gold.len() {
            return Err(EvalError::LengthMismatch {
                predicted: predicted.len(),
                gold: gold.len(),
            });
        }
        Ok(predicted
            .iter()
            .zip(gold)
            .enumerate()
            .map(|(index, (p, g))| Self {
                index,
                predicted: p.clone(),
                gold: g.clone(),
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Rendered(RasterImage),
    Failed { reason: String },
}

impl RenderOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn image(&self) -> Option<&RasterImage> {
        match self {
            Self::Rendered(image) => Some(image),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPair {
    pub index: usize,
    pub predicted: RenderOutcome,
    pub gold: RenderOutcome,
}

impl RenderedPair {
    pub fn failure_count(&self) -> usize {
        usize::from(self.predicted.is_failed()) + usize::from(self.gold.is_failed())
    }
}

/// Ascending, duplicate-free indices into the pair list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexSelection {
    indices: Vec<usize>,
}

impl IndexSelection {
    pub fn all(total: usize) -> Self {
        Self {
            indices: (0..total).collect(),
        }
    }

    pub(crate) fn from_unsorted(mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

/// Named corpus metrics. Keys are kept sorted so reports are stable.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ScoreReport {
    metrics: BTreeMap<String, f64>,
}

impl ScoreReport {
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn zip_keeps_original_indices() {
        let pairs = EquationPair::zip(&lines(&["a", "b"]), &lines(&["c", "d"])).unwrap();
        assert_eq!(pairs[1].index, 1);
        assert_eq!(pairs[1].predicted, "b");
        assert_eq!(pairs[1].gold, "d");
    }

    #[test]
    fn zip_rejects_length_mismatch() {
        let err = EquationPair::zip(&lines(&["a"]), &lines(&["c", "d"])).unwrap_err();
        assert!(matches!(
            err,
            EvalError::LengthMismatch {
                predicted: 1,
                gold: 2
            }
        ));
    }

    #[test]
    fn selection_from_unsorted_sorts_and_dedups() {
        let sel = IndexSelection::from_unsorted(vec![5, 1, 5, 3]);
        assert_eq!(sel.indices(), &[1, 3, 5]);
    }

    #[test]
    fn score_report_iterates_in_key_order() {
        let mut report = ScoreReport::default();
        report.insert("exact_match", 50.0);
        report.insert("bleu", 12.5);
        let keys: Vec<&str> = report.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["bleu", "exact_match"]);
        assert_eq!(report.get("bleu"), Some(12.5));
    }
}
