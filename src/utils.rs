use rand::Rng;

use crate::error::{BanditError, Result};

/// Index of the first maximal value, deterministic on ties.
pub fn argmax<T: PartialOrd>(values: &[T]) -> Option<usize> {
    let mut result: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        match result {
            Some(best) if v <= &values[best] => {}
            _ => result = Some(i),
        }
    }
    result
}

/// Picks uniformly at random among every position holding the maximum value.
///
/// NaN entries never win; `+inf` entries compare equal to each other and tie.
pub fn rand_argmax_index<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> Result<usize> {
    if values.is_empty() {
        return Err(BanditError::invalid_input("cannot take the argmax of no values"));
    }
    let max: f64 = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    let ties: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == max)
        .map(|(i, _)| i)
        .collect();
    match ties.len() {
        0 => Err(BanditError::invalid_input("every value is NaN")),
        1 => Ok(ties[0]),
        n => Ok(ties[rng.gen_range(0..n)]),
    }
}

/// Tie-breaking argmax over a sequence of values and its parallel sequence of actions.
///
/// Fails with [`BanditError::InvalidInput`] when the sequences differ in length
/// or are empty.
pub fn rand_argmax<'a, A, R: Rng + ?Sized>(
    values: &[f64],
    actions: &'a [A],
    rng: &mut R,
) -> Result<&'a A> {
    if values.len() != actions.len() {
        return Err(BanditError::invalid_input(format!(
            "values and actions differ in length ({} != {})",
            values.len(),
            actions.len()
        )));
    }
    let i = rand_argmax_index(values, rng)?;
    Ok(&actions[i])
}

/// Averages consecutive, non-overlapping windows of `vector`.
pub fn moving_average(window: usize, vector: &[f64]) -> Vec<f64> {
    if window == 0 {
        return vec![];
    }
    vector
        .chunks(window)
        .map(|slice| slice.iter().sum::<f64>() / slice.len() as f64)
        .collect()
}
