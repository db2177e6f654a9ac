use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;

pub const MAX_NGRAM_ORDER: usize = 4;
const FLOOR_SMOOTH_VALUE: f64 = 0.1;

/// How orders with zero matching n-grams are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BleuSmoothing {
    /// A zero precision makes the whole score 0.
    #[default]
    None,
    /// A zero precision is replaced by `0.1 / total` n-grams of that order.
    Floor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BleuScore {
    /// Corpus BLEU in [0, 100].
    pub score: f64,
    /// Modified n-gram precisions in [0, 100]; orders past `effective_order` are 0.
    pub precisions: [f64; MAX_NGRAM_ORDER],
    pub brevity_penalty: f64,
    pub effective_order: usize,
    pub sys_len: usize,
    pub ref_len: usize,
}

/// Corpus-level BLEU over whitespace tokens.
///
/// `reference_streams` holds one or more reference sets, each index-aligned
/// with `hypotheses`. N-gram counts are clipped by the largest count seen in
/// any reference, and the reference length used for the brevity penalty is
/// the one closest to the hypothesis length (shorter wins ties).
pub fn corpus_bleu<S: AsRef<str>>(
    hypotheses: &[S],
    reference_streams: &[&[S]],
    smoothing: BleuSmoothing,
) -> Result<BleuScore, EvalError> {
    if reference_streams.is_empty() {
        return Err(EvalError::invalid_input("BLEU needs at least one reference stream"));
    }
    for stream in reference_streams {
        if stream.len() != hypotheses.len() {
            return Err(EvalError::LengthMismatch {
                predicted: hypotheses.len(),
                gold: stream.len(),
            });
        }
    }

    let mut correct = [0usize; MAX_NGRAM_ORDER];
    let mut total = [0usize; MAX_NGRAM_ORDER];
    let mut sys_len = 0usize;
    let mut ref_len = 0usize;

    for (i, hypothesis) in hypotheses.iter().enumerate() {
        let hyp_tokens: Vec<&str> = hypothesis.as_ref().split_whitespace().collect();
        let ref_tokens: Vec<Vec<&str>> = reference_streams
            .iter()
            .map(|stream| stream[i].as_ref().split_whitespace().collect())
            .collect();

        sys_len += hyp_tokens.len();
        ref_len += closest_ref_len(hyp_tokens.len(), &ref_tokens);

        let mut max_ref_counts: HashMap<&[&str], usize> = HashMap::new();
        for tokens in &ref_tokens {
            for (ngram, count) in ngram_counts(tokens) {
                let entry = max_ref_counts.entry(ngram).or_insert(0);
                *entry = (*entry).max(count);
            }
        }

        for (ngram, count) in ngram_counts(&hyp_tokens) {
            let order = ngram.len() - 1;
            total[order] += count;
            if let Some(&ref_count) = max_ref_counts.get(ngram) {
                correct[order] += count.min(ref_count);
            }
        }
    }

    Ok(compute_bleu(&correct, &total, sys_len, ref_len, smoothing))
}

fn compute_bleu(
    correct: &[usize; MAX_NGRAM_ORDER],
    total: &[usize; MAX_NGRAM_ORDER],
    sys_len: usize,
    ref_len: usize,
    smoothing: BleuSmoothing,
) -> BleuScore {
    let mut precisions = [0.0f64; MAX_NGRAM_ORDER];
    let mut effective_order = 0usize;
    for n in 0..MAX_NGRAM_ORDER {
        if total[n] == 0 {
            break;
        }
        effective_order = n + 1;
        precisions[n] = if correct[n] == 0 {
            match smoothing {
                BleuSmoothing::None => 0.0,
                BleuSmoothing::Floor => FLOOR_SMOOTH_VALUE / total[n] as f64,
            }
        } else {
            correct[n] as f64 / total[n] as f64
        };
    }

    let brevity_penalty = if sys_len >= ref_len {
        1.0
    } else if sys_len == 0 {
        0.0
    } else {
        (1.0 - ref_len as f64 / sys_len as f64).exp()
    };

    let used = &precisions[..effective_order];
    let score = if effective_order == 0 || used.iter().any(|&p| p == 0.0) {
        0.0
    } else {
        let log_mean = used.iter().map(|p| p.ln()).sum::<f64>() / effective_order as f64;
        100.0 * brevity_penalty * log_mean.exp()
    };

    BleuScore {
        score,
        precisions: precisions.map(|p| 100.0 * p),
        brevity_penalty,
        effective_order,
        sys_len,
        ref_len,
    }
}

fn ngram_counts<'a, 'b>(tokens: &'b [&'a str]) -> HashMap<&'b [&'a str], usize> {
    let mut counts = HashMap::new();
    for n in 1..=MAX_NGRAM_ORDER.min(tokens.len()) {
        for window in tokens.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}

fn closest_ref_len(hyp_len: usize, references: &[Vec<&str>]) -> usize {
    references
        .iter()
        .map(Vec::len)
        .min_by_key(|&len| (len.abs_diff(hyp_len), len))
        .unwrap_or(0)
}
