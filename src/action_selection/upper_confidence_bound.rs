use rand::RngCore;

use super::{ActionSelection, Selection};
use crate::error::{BanditError, Result};
use crate::utils::rand_argmax_index;

/// UCB1-style selection: value estimate plus an exploration bonus that
/// shrinks as an action is tried more often.
#[derive(Debug, Clone)]
pub struct UpperConfidenceBound {
    confidence_level: f64,
}

impl UpperConfidenceBound {
    pub fn new(confidence_level: f64) -> Result<Self> {
        if !confidence_level.is_finite() || confidence_level < 0.0 {
            return Err(BanditError::configuration(format!(
                "confidence level must be finite and >= 0, got {}",
                confidence_level
            )));
        }
        Ok(Self { confidence_level })
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Untried actions score `+inf`; the rest score
    /// `q + c * sqrt(ln(total) / count)`.
    pub fn ucb_scores(&self, q_values: &[f64], act_count: &[u64]) -> Result<Vec<f64>> {
        if q_values.len() != act_count.len() {
            return Err(BanditError::invalid_input(format!(
                "q_values and act_count differ in length ({} != {})",
                q_values.len(),
                act_count.len()
            )));
        }
        let total: f64 = act_count.iter().sum::<u64>() as f64;
        Ok(q_values
            .iter()
            .zip(act_count)
            .map(|(q, &n)| {
                if n == 0 {
                    f64::INFINITY
                } else {
                    q + self.confidence_level * (total.ln() / n as f64).sqrt()
                }
            })
            .collect())
    }

    pub fn ucb_argmax(
        &self,
        q_values: &[f64],
        act_count: &[u64],
        rng: &mut dyn RngCore,
    ) -> Result<usize> {
        let scores = self.ucb_scores(q_values, act_count)?;
        rand_argmax_index(&scores, rng)
    }
}

impl ActionSelection for UpperConfidenceBound {
    fn get_action(
        &self,
        q_values: &[f64],
        act_count: &[u64],
        rng: &mut dyn RngCore,
    ) -> Result<Selection> {
        Ok(Selection::exploit(self.ucb_argmax(q_values, act_count, rng)?))
    }
}
