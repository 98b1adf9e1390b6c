//! Multi-armed bandit agents: greedy, epsilon-greedy and upper-confidence-bound
//! action selection over incrementally updated value estimates.
//!
//! ```
//! use k_armed_bandits::agent::Agent;
//! use k_armed_bandits::env::KArmedBandits;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let env = KArmedBandits::new(10, &mut StdRng::seed_from_u64(0)).unwrap();
//! let mut agent = Agent::epsilon_greedy(&env, env.actions(), 0.1, StdRng::seed_from_u64(1)).unwrap();
//! for _ in 0..100 {
//!     agent.act().unwrap();
//! }
//! assert_eq!(agent.total_count(), 100);
//! ```

pub mod action_selection;
pub mod agent;
pub mod env;
mod error;
pub mod utils;

pub use agent::{Agent, StepSize};
pub use error::{BanditError, Result};
