//! Classification metrics.
//!
//! Evaluation helpers only; they do not participate in backprop.

/// Index of the largest value; the first one wins on ties.
///
/// Returns `None` for an empty slice. NaN entries never win.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Whether a prediction counts as correct.
///
/// - `output_size == 1`: both sides thresholded at 0.5
/// - `output_size > 1`: argmax of prediction equals argmax of target
pub fn is_correct(pred: &[f64], target: &[f64]) -> bool {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );

    match pred {
        [p] => (*p >= 0.5) == (target[0] >= 0.5),
        _ => matches!((argmax(pred), argmax(target)), (Some(a), Some(b)) if a == b),
    }
}
