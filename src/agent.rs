use std::fmt::Debug;
use std::hash::Hash;

use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::RngCore;
use tracing::{debug, trace};

use crate::action_selection::{
    ActionSelection, EnumActionSelection, EpsilonGreedy, Greedy, Selection, UpperConfidenceBound,
};
use crate::env::Environment;
use crate::error::{BanditError, Result};

/// Ordered, duplicate-free set of action identifiers.
pub type ActionSet<A> = IndexSet<A, FxBuildHasher>;

/// Learning rate applied by the incremental update `q += alpha * (reward - q)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepSize {
    Fixed(f64),
    /// `1 / n` where `n` is the action's selection count, or `1` while it is zero.
    SampleAverage,
}

impl Default for StepSize {
    fn default() -> Self {
        StepSize::Fixed(0.1)
    }
}

impl StepSize {
    pub fn alpha(&self, count: u64) -> f64 {
        match *self {
            StepSize::Fixed(alpha) => alpha,
            StepSize::SampleAverage if count == 0 => 1.0,
            StepSize::SampleAverage => 1.0 / count as f64,
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            StepSize::Fixed(alpha) if !alpha.is_finite() => Err(BanditError::configuration(
                format!("fixed step size must be finite, got {}", alpha),
            )),
            _ => Ok(()),
        }
    }
}

/// A bandit agent: value estimates and counters over a fixed action set,
/// driven by a pluggable action-selection strategy.
///
/// The environment is borrowed, never owned; it must outlive the agent.
pub struct Agent<'a, A, E: ?Sized, R = StdRng> {
    env: &'a E,
    actions: ActionSet<A>,
    initial_q_values: Vec<f64>,
    q_values: Vec<f64>,
    act_count: Vec<u64>,
    last_action: Option<A>,
    last_reward: Option<f64>,
    step_size: StepSize,
    action_selection: EnumActionSelection,
    rng: R,
}

impl<'a, A, E, R> Agent<'a, A, E, R>
where
    A: Clone + Eq + Hash + Debug,
    E: Environment<A> + ?Sized,
    R: RngCore,
{
    /// Builds an agent over `actions`.
    ///
    /// `q_values` defaults to all zeros; when given it must hold one value per
    /// action. Empty or duplicated action lists are rejected.
    pub fn new<I, S>(
        env: &'a E,
        actions: I,
        q_values: Option<Vec<f64>>,
        action_selection: S,
        rng: R,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        S: Into<EnumActionSelection>,
    {
        let actions: Vec<A> = actions.into_iter().collect();
        let n = actions.len();
        if n == 0 {
            return Err(BanditError::configuration("an agent needs at least one action"));
        }
        let mut set: ActionSet<A> = IndexSet::with_capacity_and_hasher(n, FxBuildHasher::default());
        set.extend(actions);
        if set.len() != n {
            return Err(BanditError::configuration(format!(
                "actions must be unique, got {} distinct out of {}",
                set.len(),
                n
            )));
        }
        let q_values = match q_values {
            Some(values) if values.len() != n => {
                return Err(BanditError::configuration(format!(
                    "got {} initial q-values for {} actions",
                    values.len(),
                    n
                )))
            }
            Some(values) => values,
            None => vec![0.0; n],
        };
        let action_selection: EnumActionSelection = action_selection.into();
        debug!(actions = n, ?action_selection, "built agent");
        Ok(Self {
            env,
            actions: set,
            initial_q_values: q_values.clone(),
            q_values,
            act_count: vec![0; n],
            last_action: None,
            last_reward: None,
            step_size: StepSize::default(),
            action_selection,
            rng,
        })
    }

    pub fn greedy<I>(env: &'a E, actions: I, rng: R) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
    {
        Self::new(env, actions, None, Greedy::new(), rng)
    }

    pub fn epsilon_greedy<I>(env: &'a E, actions: I, epsilon: f64, rng: R) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
    {
        Self::new(env, actions, None, EpsilonGreedy::new(epsilon)?, rng)
    }

    pub fn upper_confidence_bound<I>(env: &'a E, actions: I, c: f64, rng: R) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
    {
        Self::new(env, actions, None, UpperConfidenceBound::new(c)?, rng)
    }

    /// Replaces the step size `act` learns with (fixed 0.1 unless set).
    pub fn with_step_size(mut self, step_size: StepSize) -> Result<Self> {
        step_size.validate()?;
        self.step_size = step_size;
        Ok(self)
    }

    pub fn actions(&self) -> &ActionSet<A> {
        &self.actions
    }

    pub fn q_values(&self) -> &[f64] {
        &self.q_values
    }

    pub fn act_count(&self) -> &[u64] {
        &self.act_count
    }

    pub fn q_value(&self, action: &A) -> Option<f64> {
        self.actions.get_index_of(action).map(|i| self.q_values[i])
    }

    pub fn count(&self, action: &A) -> Option<u64> {
        self.actions.get_index_of(action).map(|i| self.act_count[i])
    }

    pub fn total_count(&self) -> u64 {
        self.act_count.iter().sum()
    }

    pub fn last_action(&self) -> Option<&A> {
        self.last_action.as_ref()
    }

    pub fn last_reward(&self) -> Option<f64> {
        self.last_reward
    }

    pub fn step_size(&self) -> StepSize {
        self.step_size
    }

    pub fn action_selection(&self) -> &EnumActionSelection {
        &self.action_selection
    }

    /// Incremental update of one estimate: `q += alpha * (reward - q)`.
    ///
    /// Never touches `act_count`; only [`Agent::act`] bumps the counters, so
    /// repeated calls with [`StepSize::SampleAverage`] on a zero count keep
    /// using `alpha = 1`.
    pub fn update_q(&mut self, action: &A, reward: f64, step_size: StepSize) -> Result<()> {
        step_size.validate()?;
        let i = self
            .actions
            .get_index_of(action)
            .ok_or_else(|| BanditError::invalid_input(format!("unknown action {:?}", action)))?;
        self.update_at(i, reward, step_size);
        Ok(())
    }

    fn update_at(&mut self, i: usize, reward: f64, step_size: StepSize) {
        let alpha = step_size.alpha(self.act_count[i]);
        self.q_values[i] += alpha * (reward - self.q_values[i]);
    }

    /// Runs the strategy once without acting on the result.
    pub fn select_action(&mut self) -> Result<Selection> {
        self.action_selection
            .get_action(&self.q_values, &self.act_count, &mut self.rng)
    }

    /// One step of the decision loop: select, fetch the reward, learn.
    ///
    /// The counter is bumped before the estimate moves, so a
    /// [`StepSize::SampleAverage`] agent keeps the exact running mean.
    pub fn act(&mut self) -> Result<f64> {
        let selection = self.select_action()?;
        let i = selection.index;
        let action = self.actions.get_index(i).cloned().ok_or_else(|| {
            BanditError::invalid_input(format!(
                "strategy chose position {} out of {} actions",
                i,
                self.actions.len()
            ))
        })?;
        let reward = self.env.get_reward(&action, &mut self.rng)?;

        if self.action_selection.counts_selection(&selection) {
            self.act_count[i] += 1;
        } else {
            debug!(?action, explored = selection.explored, "step left uncounted");
        }
        self.update_at(i, reward, self.step_size);

        trace!(?action, reward, explored = selection.explored, q = self.q_values[i], "act");
        self.last_action = Some(action);
        self.last_reward = Some(reward);
        Ok(reward)
    }

    /// Restores the initial estimates and forgets every step taken.
    pub fn reset(&mut self) {
        self.q_values.clone_from(&self.initial_q_values);
        self.act_count.iter_mut().for_each(|c| *c = 0);
        self.last_action = None;
        self.last_reward = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::KArmedBandits;
    use rand::SeedableRng;
    use std::cell::Cell;

    /// Pays a fixed reward per arm.
    struct Constant(Vec<f64>);

    impl Environment<usize> for Constant {
        fn get_reward(&self, action: &usize, _rng: &mut dyn RngCore) -> Result<f64> {
            Ok(self.0[*action])
        }
    }

    /// Pays rewards from a script, in order, whatever the action.
    struct Scripted {
        rewards: Vec<f64>,
        next: Cell<usize>,
    }

    impl Environment<usize> for Scripted {
        fn get_reward(&self, _action: &usize, _rng: &mut dyn RngCore) -> Result<f64> {
            let i = self.next.get();
            self.next.set(i + 1);
            Ok(self.rewards[i])
        }
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_update_q_sample_average_first_reward() {
        let env = Constant(vec![0.0]);
        let mut agent = Agent::greedy(&env, [0usize], rng(0)).unwrap();
        agent.update_q(&0, 5.0, StepSize::SampleAverage).unwrap();
        assert_eq!(agent.q_values(), &[5.0]);
    }

    #[test]
    fn test_sample_average_agent_tracks_mean() {
        let env = Scripted {
            rewards: vec![5.0, 7.0],
            next: Cell::new(0),
        };
        let mut agent = Agent::greedy(&env, [0usize], rng(0))
            .unwrap()
            .with_step_size(StepSize::SampleAverage)
            .unwrap();
        assert_eq!(agent.act().unwrap(), 5.0);
        assert_eq!(agent.q_values(), &[5.0]);
        assert_eq!(agent.act().unwrap(), 7.0);
        assert_eq!(agent.q_values(), &[6.0]);
        assert_eq!(agent.act_count(), &[2]);
    }

    #[test]
    fn test_act_uses_fixed_step_by_default() {
        let env = Constant(vec![1.0]);
        let mut agent = Agent::greedy(&env, [0usize], rng(0)).unwrap();
        assert_eq!(agent.step_size(), StepSize::Fixed(0.1));
        agent.act().unwrap();
        assert!((agent.q_values()[0] - 0.1).abs() < 1e-12);
        agent.act().unwrap();
        assert!((agent.q_values()[0] - 0.19).abs() < 1e-12);
    }

    #[test]
    fn test_update_q_unknown_action() {
        let env = Constant(vec![0.0, 0.0]);
        let mut agent = Agent::greedy(&env, [0usize, 1], rng(0)).unwrap();
        let err = agent.update_q(&7, 1.0, StepSize::Fixed(0.5)).unwrap_err();
        assert!(matches!(err, BanditError::InvalidInput { .. }));
    }

    #[test]
    fn test_configuration_errors() {
        let env = Constant(vec![0.0, 0.0]);
        let err = Agent::new(&env, [0usize, 1], Some(vec![0.0]), Greedy, rng(0))
            .err()
            .unwrap();
        assert!(matches!(err, BanditError::ConfigurationError { .. }));

        let err = Agent::greedy(&env, Vec::<usize>::new(), rng(0)).err().unwrap();
        assert!(matches!(err, BanditError::ConfigurationError { .. }));

        let err = Agent::greedy(&env, [1usize, 1], rng(0)).err().unwrap();
        assert!(matches!(err, BanditError::ConfigurationError { .. }));

        let err = Agent::epsilon_greedy(&env, [0usize, 1], 2.0, rng(0)).err().unwrap();
        assert!(matches!(err, BanditError::ConfigurationError { .. }));

        let err = Agent::upper_confidence_bound(&env, [0usize, 1], -0.5, rng(0))
            .err()
            .unwrap();
        assert!(matches!(err, BanditError::ConfigurationError { .. }));

        let err = Agent::greedy(&env, [0usize, 1], rng(0))
            .unwrap()
            .with_step_size(StepSize::Fixed(f64::NAN))
            .err()
            .unwrap();
        assert!(matches!(err, BanditError::ConfigurationError { .. }));
    }

    #[test]
    fn test_last_step_fields() {
        let env = Constant(vec![0.0, 2.0]);
        let mut agent =
            Agent::new(&env, [0usize, 1], Some(vec![0.0, 1.0]), Greedy, rng(0)).unwrap();
        assert_eq!(agent.last_action(), None);
        assert_eq!(agent.last_reward(), None);
        let reward = agent.act().unwrap();
        assert_eq!(reward, 2.0);
        assert_eq!(agent.last_action(), Some(&1));
        assert_eq!(agent.last_reward(), Some(2.0));
        assert_eq!(agent.count(&1), Some(1));
        assert_eq!(agent.q_value(&1), Some(1.1));
    }

    #[test]
    fn test_counts_sum_to_steps() {
        let env = KArmedBandits::new(10, &mut rng(3)).unwrap();
        let mut agents = vec![
            Agent::greedy(&env, env.actions(), rng(1)).unwrap(),
            Agent::epsilon_greedy(&env, env.actions(), 0.1, rng(2)).unwrap(),
            Agent::upper_confidence_bound(&env, env.actions(), 2.0, rng(3)).unwrap(),
        ];
        for agent in agents.iter_mut() {
            for _ in 0..500 {
                agent.act().unwrap();
            }
            assert_eq!(agent.total_count(), 500);
        }
    }

    #[test]
    fn test_uncounted_steps_leave_counts_at_zero() {
        let env = Constant(vec![0.0, 1.0, 0.5]);
        for epsilon in [0.0, 0.3, 1.0] {
            let policy = EpsilonGreedy::new(epsilon).unwrap().with_uncounted_steps();
            let mut agent = Agent::new(&env, [0usize, 1, 2], None, policy, rng(8)).unwrap();
            for _ in 0..100 {
                agent.act().unwrap();
            }
            assert_eq!(agent.act_count(), &[0, 0, 0], "epsilon {}", epsilon);
            assert!(agent.last_action().is_some());
        }
    }

    #[test]
    fn test_mixed_epsilon_counts_every_step() {
        let env = Constant(vec![0.0, 1.0, 0.5]);
        let mut agent = Agent::epsilon_greedy(&env, [0usize, 1, 2], 0.3, rng(8)).unwrap();
        let mut explored = 0;
        for _ in 0..100 {
            if agent.select_action().unwrap().explored {
                explored += 1;
            }
            agent.act().unwrap();
        }
        assert!(explored > 0);
        assert_eq!(agent.total_count(), 100);
    }

    #[test]
    fn test_update_q_leaves_counts_alone() {
        let env = Constant(vec![0.0]);
        let mut agent = Agent::greedy(&env, [0usize], rng(0)).unwrap();
        agent.update_q(&0, 5.0, StepSize::SampleAverage).unwrap();
        agent.update_q(&0, 7.0, StepSize::SampleAverage).unwrap();
        assert_eq!(agent.act_count(), &[0]);
        assert_eq!(agent.q_values(), &[7.0]);
    }

    #[test]
    fn test_reset() {
        let env = Constant(vec![1.0, 3.0]);
        let mut agent =
            Agent::new(&env, [0usize, 1], Some(vec![5.0, 0.0]), Greedy, rng(0)).unwrap();
        for _ in 0..10 {
            agent.act().unwrap();
        }
        agent.reset();
        assert_eq!(agent.q_values(), &[5.0, 0.0]);
        assert_eq!(agent.act_count(), &[0, 0]);
        assert_eq!(agent.last_action(), None);
        assert_eq!(agent.last_reward(), None);
    }
}
