use rand::{Rng, RngCore};

use super::{ActionSelection, Selection};
use crate::error::{BanditError, Result};
use crate::utils::rand_argmax_index;

/// Explores uniformly with probability `epsilon`, otherwise acts greedily.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f64,
    count_steps: bool,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(BanditError::configuration(format!(
                "epsilon must be in [0, 1], got {}",
                epsilon
            )));
        }
        Ok(Self {
            epsilon,
            count_steps: true,
        })
    }

    /// No step taken with this strategy touches the action counters,
    /// whether it explored or exploited; `act_count` stays at zero.
    pub fn with_uncounted_steps(mut self) -> Self {
        self.count_steps = false;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn counts_steps(&self) -> bool {
        self.count_steps
    }

    fn should_explore(&self, rng: &mut dyn RngCore) -> bool {
        self.epsilon != 0.0 && rng.gen::<f64>() < self.epsilon
    }
}

impl ActionSelection for EpsilonGreedy {
    fn get_action(
        &self,
        q_values: &[f64],
        _act_count: &[u64],
        rng: &mut dyn RngCore,
    ) -> Result<Selection> {
        if q_values.is_empty() {
            return Err(BanditError::invalid_input("no actions to choose from"));
        }
        if self.should_explore(rng) {
            Ok(Selection::explore(rng.gen_range(0..q_values.len())))
        } else {
            Ok(Selection::exploit(rand_argmax_index(q_values, rng)?))
        }
    }

    fn counts_selection(&self, _selection: &Selection) -> bool {
        self.count_steps
    }
}
