use ndarray::Array1;
use ndarray_rand::rand_distr::{Distribution, Normal, StandardNormal};
use ndarray_rand::RandomExt;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::env::Environment;
use crate::error::{BanditError, Result};
use crate::utils::argmax;

/// A single stationary arm paying `N(mean, 1)` rewards.
#[derive(Debug, Clone)]
pub struct ArmedBandit {
    mean: f64,
    dist: Normal<f64>,
}

impl ArmedBandit {
    pub fn new(mean: f64) -> Result<Self> {
        let dist = Normal::new(mean, 1.0)
            .map_err(|e| BanditError::configuration(format!("arm with mean {}: {}", mean, e)))?;
        Ok(Self { mean, dist })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn reward<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }
}

/// The k-armed testbed: `k` arms whose means are drawn once from `N(0, 1)`.
#[derive(Debug, Clone)]
pub struct KArmedBandits {
    arms: Vec<ArmedBandit>,
    optimal: usize,
}

impl KArmedBandits {
    pub fn new<R: Rng>(k: usize, rng: &mut R) -> Result<Self> {
        if k == 0 {
            return Err(BanditError::configuration("a bandit needs at least one arm"));
        }
        let means: Array1<f64> = Array1::random_using(k, StandardNormal, rng);
        Self::from_means(&means.to_vec())
    }

    /// Builds a testbed with known arm means.
    pub fn from_means(means: &[f64]) -> Result<Self> {
        let arms = means
            .iter()
            .map(|m| ArmedBandit::new(*m))
            .collect::<Result<Vec<ArmedBandit>>>()?;
        let optimal = argmax(means)
            .ok_or_else(|| BanditError::configuration("a bandit needs at least one arm"))?;
        debug!(k = arms.len(), optimal, "built k-armed bandit");
        Ok(Self { arms, optimal })
    }

    pub fn arms(&self) -> &[ArmedBandit] {
        &self.arms
    }

    /// Index of the arm with the highest mean.
    pub fn optimal(&self) -> usize {
        self.optimal
    }

    pub fn k(&self) -> usize {
        self.arms.len()
    }

    /// Action identifiers `0..k`, one per arm.
    pub fn actions(&self) -> Vec<usize> {
        (0..self.arms.len()).collect()
    }
}

impl Environment<usize> for KArmedBandits {
    fn get_reward(&self, action: &usize, rng: &mut dyn RngCore) -> Result<f64> {
        let arm = self.arms.get(*action).ok_or_else(|| {
            BanditError::invalid_input(format!(
                "arm {} out of range for {} arms",
                action,
                self.arms.len()
            ))
        })?;
        Ok(arm.reward(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_optimal_is_deterministic_for_a_seed() {
        let first = KArmedBandits::new(5, &mut StdRng::seed_from_u64(42)).unwrap();
        for _ in 0..10 {
            let again = KArmedBandits::new(5, &mut StdRng::seed_from_u64(42)).unwrap();
            assert_eq!(again.optimal(), first.optimal());
        }
    }

    #[test]
    fn test_optimal_has_highest_mean() {
        let env = KArmedBandits::new(10, &mut StdRng::seed_from_u64(1)).unwrap();
        let best = env.arms()[env.optimal()].mean();
        assert!(env.arms().iter().all(|a| a.mean() <= best));
        assert_eq!(env.k(), 10);
        assert_eq!(env.actions(), (0..10).collect::<Vec<usize>>());
    }

    #[test]
    fn test_zero_arms_is_a_configuration_error() {
        let err = KArmedBandits::new(0, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, BanditError::ConfigurationError { .. }));
    }

    #[test]
    fn test_rewards_center_on_arm_mean() {
        let env = KArmedBandits::from_means(&[-1.0, 2.5]).unwrap();
        assert_eq!(env.optimal(), 1);
        let mut rng = StdRng::seed_from_u64(9);
        let n = 20_000;
        let mean: f64 = (0..n)
            .map(|_| env.get_reward(&1, &mut rng).unwrap())
            .sum::<f64>()
            / n as f64;
        assert!((mean - 2.5).abs() < 0.05, "sample mean {}", mean);
    }

    #[test]
    fn test_out_of_range_arm() {
        let env = KArmedBandits::from_means(&[0.0, 1.0]).unwrap();
        let err = env
            .get_reward(&2, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, BanditError::InvalidInput { .. }));
    }
}
