mod k_armed_bandits;

use rand::RngCore;

use crate::error::Result;

/// Anything an agent can query for a reward after choosing an action.
///
/// Sampling draws from the caller's random source so runs stay reproducible.
pub trait Environment<A> {
    fn get_reward(&self, action: &A, rng: &mut dyn RngCore) -> Result<f64>;
}

pub use k_armed_bandits::{ArmedBandit, KArmedBandits};
