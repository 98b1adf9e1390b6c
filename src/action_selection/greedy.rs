use rand::RngCore;

use super::{ActionSelection, Selection};
use crate::error::Result;
use crate::utils::rand_argmax_index;

/// Always exploits: tie-breaking argmax over the value estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Greedy {
    pub fn new() -> Self {
        Self
    }
}

impl ActionSelection for Greedy {
    fn get_action(
        &self,
        q_values: &[f64],
        _act_count: &[u64],
        rng: &mut dyn RngCore,
    ) -> Result<Selection> {
        Ok(Selection::exploit(rand_argmax_index(q_values, rng)?))
    }
}
