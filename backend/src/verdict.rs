use crate::classifier::Prediction;

const TARGET_LABELS: [&str; 2] = ["hot dog", "hotdog"];

/// Outcome of scanning the remote predictions for the target label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub is_hot_dog: bool,
    pub confidence: f64,
}

/// Scans the prediction array (order is the remote's, not necessarily sorted)
/// for a label containing the target substring, case-insensitively.
/// Confidence is the matching entry's score, or 0 when nothing matches.
pub fn derive_verdict(predictions: &[Prediction]) -> Verdict {
    let matched = predictions.iter().find(|p| {
        let label = p.label.to_lowercase();
        TARGET_LABELS.iter().any(|target| label.contains(target))
    });

    Verdict {
        is_hot_dog: matched.is_some(),
        confidence: matched.map(|p| p.score).unwrap_or(0.0),
    }
}

/// First `n` predictions, in the order the remote service ranked them,
/// formatted as `"label: pp.p%"`.
pub fn top_predictions(predictions: &[Prediction], n: usize) -> Vec<String> {
    predictions
        .iter()
        .take(n)
        .map(|p| format!("{}: {:.1}%", p.label, p.score * 100.0))
        .collect()
}
