mod epsilon_greedy;
mod greedy;
mod upper_confidence_bound;

use enum_dispatch::enum_dispatch;
use rand::RngCore;

use crate::error::Result;

pub use epsilon_greedy::EpsilonGreedy;
pub use greedy::Greedy;
pub use upper_confidence_bound::UpperConfidenceBound;

/// Outcome of one action-selection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Position of the chosen action in the agent's action set.
    pub index: usize,
    /// Whether the choice was a random exploration move.
    pub explored: bool,
}

impl Selection {
    pub fn exploit(index: usize) -> Self {
        Self {
            index,
            explored: false,
        }
    }

    pub fn explore(index: usize) -> Self {
        Self {
            index,
            explored: true,
        }
    }
}

#[enum_dispatch]
pub trait ActionSelection {
    /// Chooses an action from the current estimates and selection counts.
    ///
    /// `q_values` and `act_count` are parallel, one entry per action.
    fn get_action(
        &self,
        q_values: &[f64],
        act_count: &[u64],
        rng: &mut dyn RngCore,
    ) -> Result<Selection>;

    /// Whether the agent should bump the action counter for this selection.
    fn counts_selection(&self, _selection: &Selection) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
#[enum_dispatch(ActionSelection)]
pub enum EnumActionSelection {
    Greedy(Greedy),
    EpsilonGreedy(EpsilonGreedy),
    UpperConfidenceBound(UpperConfidenceBound),
}
