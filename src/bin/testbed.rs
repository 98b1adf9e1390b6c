use std::error::Error;

use kdam::{tqdm, BarExt};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use structopt::StructOpt;
use tracing::info;

use k_armed_bandits::action_selection::{
    EnumActionSelection, EpsilonGreedy, Greedy, UpperConfidenceBound,
};
use k_armed_bandits::env::KArmedBandits;
use k_armed_bandits::utils::moving_average;
use k_armed_bandits::{Agent, StepSize};

/// Run greedy, ε-greedy and UCB agents on the k-armed testbed and summarize how they learn
#[derive(StructOpt, Debug)]
#[structopt(name = "k-armed testbed")]
struct Cli {
    /// Number of arms of each bandit
    #[structopt(long = "arms", short = "k", default_value = "10")]
    arms: usize,

    /// Number of independent bandit problems to average over
    #[structopt(long = "runs", short = "r", default_value = "2000")]
    runs: usize,

    /// Number of steps each agent takes per run
    #[structopt(long = "steps", short = "s", default_value = "1000")]
    steps: usize,

    /// Exploration probability of the ε-greedy agent
    #[structopt(long = "epsilon", default_value = "0.1")]
    epsilon: f64,

    /// Exploration constant of the UCB agent
    #[structopt(long = "confidence", short = "c", default_value = "2.0")]
    confidence: f64,

    /// Initial value estimate for every action
    #[structopt(long = "initial_value", default_value = "0.0")]
    initial_value: f64,

    /// Learn with 1/n sample averages instead of the fixed 0.1 step size
    #[structopt(long = "sample_average")]
    sample_average: bool,

    /// Seed for every random source of the experiment
    #[structopt(long = "seed", default_value = "42")]
    seed: u64,

    /// Moving average window used on the reported reward curve
    #[structopt(long = "window", default_value = "100")]
    window: usize,
}

struct Record {
    name: String,
    strategy: EnumActionSelection,
    rewards: Array2<f64>,
    optimal: Array2<f64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "k_armed_bandits=info,testbed=info".into()),
        )
        .init();

    let cli: Cli = Cli::from_args();
    info!(?cli, "starting testbed");

    let step_size = if cli.sample_average {
        StepSize::SampleAverage
    } else {
        StepSize::default()
    };

    let strategies: Vec<(String, EnumActionSelection)> = vec![
        ("greedy".to_string(), Greedy::new().into()),
        (
            format!("ε-greedy ε={}", cli.epsilon),
            EpsilonGreedy::new(cli.epsilon)?.into(),
        ),
        (
            format!("UCB c={}", cli.confidence),
            UpperConfidenceBound::new(cli.confidence)?.into(),
        ),
    ];
    let mut records: Vec<Record> = strategies
        .into_iter()
        .map(|(name, strategy)| Record {
            name,
            strategy,
            rewards: Array2::zeros((cli.runs, cli.steps)),
            optimal: Array2::zeros((cli.runs, cli.steps)),
        })
        .collect();

    let mut pb = tqdm!(total = cli.runs);
    pb.set_description("runs");
    for run in 0..cli.runs {
        let mut seeder = StdRng::seed_from_u64(cli.seed.wrapping_add(run as u64));
        let env = KArmedBandits::new(cli.arms, &mut seeder)?;
        for record in records.iter_mut() {
            let mut agent = Agent::new(
                &env,
                env.actions(),
                Some(vec![cli.initial_value; cli.arms]),
                record.strategy.clone(),
                StdRng::seed_from_u64(seeder.next_u64()),
            )?
            .with_step_size(step_size)?;
            for step in 0..cli.steps {
                record.rewards[[run, step]] = agent.act()?;
                if agent.last_action() == Some(&env.optimal()) {
                    record.optimal[[run, step]] = 1.0;
                }
            }
        }
        pb.update(1);
    }
    eprintln!();

    for record in records.iter() {
        let mean_reward = record.rewards.mean_axis(Axis(0)).ok_or("no runs to average")?;
        let optimal_pct = record.optimal.mean_axis(Axis(0)).ok_or("no runs to average")? * 100.0;
        let curve: String = moving_average(cli.window, &mean_reward.to_vec())
            .iter()
            .map(|v| format!("{:.3}", v))
            .collect::<Vec<String>>()
            .join(" ");
        info!(
            strategy = %record.name,
            mean_reward = mean_reward.mean().unwrap_or(0.0),
            final_reward = mean_reward.iter().last().copied().unwrap_or(0.0),
            final_optimal_pct = optimal_pct.iter().last().copied().unwrap_or(0.0),
            "summary"
        );
        info!(
            strategy = %record.name,
            curve = %curve,
            "average reward per window"
        );
    }
    Ok(())
}
