//! Provides the outer rollout/train/evaluate loop.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use colored::Colorize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{
    Ensemble,
    Error,
    RewardRule,
    Sample,
    StateSpace,
    WeakClassifier,
};
use crate::evaluator::{PolicyGateEvaluator, PolicyResult};
use crate::policy::{
    Action,
    BoostedPolicy,
    CascadePolicy,
    Policy,
    PositionalPolicy,
};
use crate::rollout::{RolloutSampler, RolloutStrategy};
use crate::weak_learner::EnsembleTrainer;
use crate::constants::{MIN_ROLLOUT_ROWS, NUMERIC_TOLERANCE};

const HEADER: &str = "Stage,PolicyError,TrainError,TrainReward,\
                      TrainEval,TestError,TestReward,TestEval\n";
const WIDTH: usize = 8;
const PREC_WIDTH: usize = 5;


/// The outer learning loop.
///
/// Per stage: generate a rollout batch over the frozen ensemble,
/// train one policy stage on it, persist the policy,
/// evaluate it on the train and test samples in parallel,
/// and log the stage metrics to stdout and a CSV step file.
///
/// A resumed run reloads the persisted policy and continues
/// from the stage recorded in the checkpoint.
///
/// # Example
/// ```no_run
/// use mddag::prelude::*;
///
/// // A pre-trained ensemble, restored elsewhere.
/// let ensemble: Ensemble<Stump> = todo!();
/// let train: Sample = todo!();
/// let test: Sample = todo!();
///
/// let mddag = Mddag::init(&ensemble, &train)
///     .test_sample(&test)
///     .strategy(RolloutStrategy::Uniform)
///     .reward(RewardRule::ZeroOne)
///     .rollouts(2_000)
///     .beta(0.1)
///     .stages(20)
///     .out_dir("out");
///
/// let trainer = AdaBoostMH::new(StumpLearner::new());
/// let policy = mddag.run(&trainer).unwrap();
/// ```
pub struct Mddag<'a, H> {
    ensemble: &'a Ensemble<H>,
    train: &'a Sample,
    test: Option<&'a Sample>,

    n_stages: usize,
    rollouts: usize,
    first_stage_multiplier: usize,
    policy_budget: usize,

    strategy: RolloutStrategy,
    reward: RewardRule,
    beta: f64,
    epsilon: f64,
    state_space: StateSpace,
    n_actions: usize,

    decay: f64,
    positional: bool,
    baseline: bool,

    out_dir: PathBuf,
    resume: Option<PathBuf>,
    seed: Option<u64>,
    time_limit: Option<Duration>,
}


impl<'a, H> Mddag<'a, H> {
    /// Initialize the loop over a frozen ensemble and
    /// a training sample.
    pub fn init(ensemble: &'a Ensemble<H>, train: &'a Sample) -> Self {
        Self {
            ensemble,
            train,
            test: None,

            n_stages: 10,
            rollouts: 100,
            first_stage_multiplier: 1,
            policy_budget: 100,

            strategy: RolloutStrategy::Uniform,
            reward: RewardRule::ZeroOne,
            beta: 0.1,
            epsilon: 0.1,
            state_space: StateSpace::Margins { summary: true },
            n_actions: Action::COUNT,

            decay: 0.0,
            positional: false,
            baseline: false,

            out_dir: PathBuf::from("."),
            resume: None,
            seed: None,
            time_limit: None,
        }
    }


    /// Set a held-out sample evaluated per stage.
    pub fn test_sample(mut self, test: &'a Sample) -> Self {
        self.test = Some(test);
        self
    }


    /// Set the number of outer iterations.
    pub fn stages(mut self, n_stages: usize) -> Self {
        self.n_stages = n_stages;
        self
    }


    /// Set the number of rollout episodes per stage.
    pub fn rollouts(mut self, rollouts: usize) -> Self {
        self.rollouts = rollouts;
        self
    }


    /// Multiply the rollout count of stage `0`,
    /// so the first (cheap, policy-free) batch covers more points.
    pub fn first_stage_multiplier(mut self, multiplier: usize) -> Self {
        self.first_stage_multiplier = multiplier;
        self
    }


    /// Set the boosting iteration budget of one policy stage.
    pub fn policy_budget(mut self, budget: usize) -> Self {
        self.policy_budget = budget;
        self
    }


    /// Set the rollout strategy.
    pub fn strategy(mut self, strategy: RolloutStrategy) -> Self {
        self.strategy = strategy;
        self
    }


    /// Set the reward rule.
    pub fn reward(mut self, reward: RewardRule) -> Self {
        self.reward = reward;
        self
    }


    /// Set the per-evaluation cost.
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }


    /// Set the burn-in exploration rate.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }


    /// Set the state-vector shape.
    pub fn state_space(mut self, state_space: StateSpace) -> Self {
        self.state_space = state_space;
        self
    }


    /// Restrict the action set to the first `n_actions` actions.
    pub fn actions(mut self, n_actions: usize) -> Self {
        self.n_actions = n_actions;
        self
    }


    /// Set the stage-combination decay.
    /// `0.0` trains a single non-cascaded policy;
    /// a positive value grows a cascade,
    /// one stage per outer iteration.
    pub fn policy_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }


    /// Train one cascade per ensemble position
    /// instead of a single shared policy.
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }


    /// Pin an always-evaluate baseline stage under the cascade.
    pub fn evaluate_baseline(mut self) -> Self {
        self.baseline = true;
        self
    }


    /// Set the output directory for rollout files, checkpoints,
    /// per-example results, and the step log.
    pub fn out_dir<P: Into<PathBuf>>(mut self, out_dir: P) -> Self {
        self.out_dir = out_dir.into();
        self
    }


    /// Resume from a persisted policy checkpoint:
    /// the outer loop restarts at the stage recorded there.
    pub fn resume<P: Into<PathBuf>>(mut self, checkpoint: P) -> Self {
        self.resume = Some(checkpoint.into());
        self
    }


    /// Seed the rollout and tie-break random streams.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }


    /// Set a wall-clock budget, checked between stages.
    pub fn time_limit_as_secs(mut self, secs: u64) -> Self {
        self.time_limit = Some(Duration::from_secs(secs));
        self
    }


    /// Check the configuration.
    /// Violations are fatal before any work starts.
    fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(Error::Config(format!(
                "epsilon must be in [0, 1]. got {}", self.epsilon,
            )));
        }
        if self.beta < 0.0 {
            return Err(Error::Config(format!(
                "beta must be non-negative. got {}", self.beta,
            )));
        }
        if !(0.0..=1.0).contains(&self.decay) {
            return Err(Error::Config(format!(
                "policy decay must be in [0, 1]. got {}", self.decay,
            )));
        }
        if !(2..=Action::COUNT).contains(&self.n_actions) {
            return Err(Error::Config(format!(
                "the action set has 2 or 3 actions. got {}",
                self.n_actions,
            )));
        }
        if self.rollouts == 0 || self.n_stages == 0 {
            return Err(Error::Config(
                "rollout and stage counts must be positive".into()
            ));
        }
        if self.ensemble.is_empty() {
            return Err(Error::Config(
                "the gated ensemble is empty".into()
            ));
        }

        let multi_stage = self.positional
            || self.decay.abs() >= NUMERIC_TOLERANCE;
        if self.strategy == RolloutStrategy::Full && multi_stage {
            return Err(Error::Config(
                "full-enumeration rollouts are incompatible \
                 with a cascaded policy".into()
            ));
        }

        if let Some(checkpoint) = &self.resume {
            if !checkpoint.exists() && !self.positional {
                return Err(Error::Checkpoint(format!(
                    "resume checkpoint {} does not exist",
                    checkpoint.display(),
                )));
            }
        }
        Ok(())
    }
}


impl<H> Mddag<'_, H>
    where H: WeakClassifier + Clone
            + Serialize + DeserializeOwned
            + Send + Sync
            + 'static,
{
    /// The policy object matching the configuration:
    /// zero decay gives a single boosted policy,
    /// positive decay a cascade,
    /// and the positional flag one cascade per round.
    fn fresh_policy(&self) -> Box<dyn Policy<H>> {
        if self.positional {
            let policy = PositionalPolicy::new(
                self.decay, self.n_actions, self.ensemble.len(),
            );
            return Box::new(policy);
        }
        if self.decay.abs() < NUMERIC_TOLERANCE {
            return Box::new(BoostedPolicy::new(self.n_actions));
        }
        let policy = CascadePolicy::new(self.decay, self.n_actions);
        let policy = if self.baseline {
            policy.with_evaluate_baseline()
        } else {
            policy
        };
        Box::new(policy)
    }


    /// Run the outer loop and return the trained policy.
    pub fn run<T>(&self, trainer: &T) -> Result<Box<dyn Policy<H>>, Error>
        where T: EnsembleTrainer<Hypothesis = H>,
    {
        self.validate()?;
        fs::create_dir_all(&self.out_dir)?;

        let mut steps = BufWriter::new(
            File::create(self.out_dir.join("steps.csv"))?
        );
        steps.write_all(HEADER.as_bytes())?;

        // The un-gated reference errors of the frozen ensemble.
        let full_train_error = self.ensemble.multiclass_error(self.train);
        let full_test_error = self.test
            .map(|test| self.ensemble.multiclass_error(test));
        println!(
            "{} full ensemble error  [train: {full_train_error:.5}]  \
             [test: {}]",
            "[REF]".bold().cyan(),
            full_test_error
                .map(|e| format!("{e:.5}"))
                .unwrap_or_else(|| "-".into()),
        );

        let mut policy = self.fresh_policy();
        let start_stage = match &self.resume {
            Some(checkpoint) => policy.load(checkpoint)?,
            None => 0,
        };

        print_log_header();

        let started = Instant::now();
        let mut last_result: Option<PolicyResult> = None;

        for stage in start_stage..self.n_stages {
            if let Some(limit) = self.time_limit {
                if started.elapsed() > limit {
                    println!(
                        "{} wall-clock budget exhausted \
                         before stage {}",
                        "[TLE]".bold().bright_red(),
                        stage + 1,
                    );
                    break;
                }
            }

            let n_rollouts = if stage == 0 {
                self.rollouts * self.first_stage_multiplier
            } else {
                self.rollouts
            };

            let policy_error = if self.positional {
                self.positional_stage(
                    &mut policy,
                    trainer,
                    stage,
                    n_rollouts,
                    last_result.as_ref(),
                )?
            } else {
                match self.shared_stage(
                    &mut policy,
                    trainer,
                    stage,
                    n_rollouts,
                    last_result.as_ref(),
                )? {
                    Some(error) => error,
                    // Too few usable rows: skip this stage.
                    None => continue,
                }
            };

            let checkpoint = self.out_dir
                .join(format!("policy_{}.json", stage + 1));
            policy.save(&checkpoint)?;

            let train_result = self.evaluator(self.train)
                .evaluate_parallel(policy.as_ref());
            train_result.write(
                self.out_dir.join(format!("outtrain_{}.txt", stage + 1))
            )?;

            let test_result = match self.test {
                Some(test) => {
                    let result = self.evaluator(test)
                        .evaluate_parallel(policy.as_ref());
                    result.write(self.out_dir.join(
                        format!("outtest_{}.txt", stage + 1)
                    ))?;
                    Some(result)
                },
                None => None,
            };

            log_stage(
                &mut steps,
                stage,
                policy_error,
                &train_result,
                test_result.as_ref(),
            )?;

            last_result = Some(train_result);
        }
        steps.flush()?;

        Ok(policy)
    }


    /// One stage of a shared (non-positional) policy.
    /// Returns `None` when the batch is too small to train on.
    fn shared_stage<T>(
        &self,
        policy: &mut Box<dyn Policy<H>>,
        trainer: &T,
        stage: usize,
        n_rollouts: usize,
        last_result: Option<&PolicyResult>,
    ) -> Result<Option<f64>, Error>
        where T: EnsembleTrainer<Hypothesis = H>,
    {
        let batch = {
            let mut sampler = self.sampler(policy.as_ref(), n_rollouts);
            if let Some(result) = last_result {
                sampler = sampler.bias_toward(result);
            }
            sampler.run()?
        };
        batch.write(
            self.out_dir.join(format!("rollout_{}.txt", stage + 1))
        )?;

        if batch.len() <= MIN_ROLLOUT_ROWS {
            println!(
                "{} stage {} produced {} usable rollout rows; \
                 skipping",
                "[WARN]".bold().yellow(),
                stage + 1,
                batch.len(),
            );
            return Ok(None);
        }

        let rollout_sample = batch.to_sample();
        let error = policy.train_stage(
            &rollout_sample, trainer, self.policy_budget,
        )?;
        Ok(Some(error))
    }


    /// One stage of a positional policy:
    /// an independent batch and training pass per ensemble position.
    /// Returns the mean training error over the trained positions.
    fn positional_stage<T>(
        &self,
        policy: &mut Box<dyn Policy<H>>,
        trainer: &T,
        stage: usize,
        n_rollouts: usize,
        last_result: Option<&PolicyResult>,
    ) -> Result<f64, Error>
        where T: EnsembleTrainer<Hypothesis = H>,
    {
        let n_round = self.ensemble.len();
        let mut error_sum = 0.0;
        let mut n_trained = 0_usize;

        for round in 0..n_round {
            let batch = {
                let mut sampler = self
                    .sampler(policy.as_ref(), n_rollouts)
                    .at_round(round);
                if let Some(result) = last_result {
                    sampler = sampler.bias_toward(result);
                }
                sampler.run()?
            };
            batch.write(self.out_dir.join(
                format!("rollout_{}_{round}.txt", stage + 1)
            ))?;

            if batch.len() <= MIN_ROLLOUT_ROWS {
                println!(
                    "{} stage {} round {round} produced {} usable \
                     rollout rows; skipping",
                    "[WARN]".bold().yellow(),
                    stage + 1,
                    batch.len(),
                );
                continue;
            }

            let rollout_sample = batch.to_sample();
            error_sum += policy.train_stage_at(
                round, &rollout_sample, trainer, self.policy_budget,
            )?;
            n_trained += 1;
        }

        let error = if n_trained > 0 {
            error_sum / n_trained as f64
        } else {
            0.0
        };
        Ok(error)
    }


    fn sampler<'b>(
        &'b self,
        policy: &'b dyn Policy<H>,
        n_rollouts: usize,
    ) -> RolloutSampler<'b, H>
    {
        let mut sampler = RolloutSampler::new(
            self.ensemble, self.train, policy,
        )
            .strategy(self.strategy)
            .rollouts(n_rollouts)
            .epsilon(self.epsilon)
            .beta(self.beta)
            .reward(self.reward)
            .state_space(self.state_space)
            .actions(self.n_actions);
        if let Some(seed) = self.seed {
            sampler = sampler.seed(seed);
        }
        sampler
    }


    fn evaluator<'b>(&'b self, sample: &'b Sample)
        -> PolicyGateEvaluator<'b, H>
    {
        PolicyGateEvaluator::new(self.ensemble, sample)
            .reward(self.reward)
            .beta(self.beta)
            .state_space(self.state_space)
            .seed(self.seed.unwrap_or(0))
    }
}


fn print_log_header() {
    println!(
        "      {:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
        "".bold().red(),
        "POLICY".bold().blue(),
        "TRAIN".bold().green(),
        "TEST".bold().yellow(),
        "EVAL.".bold().cyan(),
    );
    println!(
        "      {:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}\n",
        "STAGE".bold().red(),
        "ERROR".bold().blue(),
        "ERROR".bold().green(),
        "ERROR".bold().yellow(),
        "COUNT".bold().cyan(),
    );
}


/// Append one stage record to the step file and mirror it to stdout.
fn log_stage(
    steps: &mut BufWriter<File>,
    stage: usize,
    policy_error: f64,
    train: &PolicyResult,
    test: Option<&PolicyResult>,
) -> Result<(), Error>
{
    let (test_error, test_reward, test_eval) = match test {
        Some(test) => (
            format!("{}", test.error_rate()),
            format!("{}", test.avg_reward()),
            format!("{}", test.avg_evaluations()),
        ),
        None => ("-".into(), "-".into(), "-".into()),
    };

    let line = format!(
        "{},{},{},{},{},{},{},{}\n",
        stage + 1,
        policy_error,
        train.error_rate(),
        train.avg_reward(),
        train.avg_evaluations(),
        test_error,
        test_reward,
        test_eval,
    );
    steps.write_all(line.as_bytes())?;

    println!(
        "{} {}\t{}\t{}\t{}\t{}",
        "[LOG]".bold().magenta(),
        format!("{:>WIDTH$}", stage + 1).red(),
        format!("{:>WIDTH$.PREC_WIDTH$}", policy_error).blue(),
        format!("{:>WIDTH$.PREC_WIDTH$}", train.error_rate()).green(),
        format!(
            "{:>WIDTH$}",
            test.map(|t| format!("{:.PREC_WIDTH$}", t.error_rate()))
                .unwrap_or_else(|| "-".into()),
        ).yellow(),
        format!(
            "{:>WIDTH$.3}",
            train.avg_evaluations(),
        ).cyan(),
    );
    Ok(())
}
