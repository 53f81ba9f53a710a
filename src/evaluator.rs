//! Applies a frozen policy end-to-end over a dataset and
//! aggregates classification error, average reward, and
//! the average number of evaluated hypotheses.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fixedbitset::FixedBitSet;
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::{
    Ensemble,
    Error,
    RewardRule,
    Sample,
    StateBuilder,
    StateSpace,
    WeakClassifier,
};
use crate::margin;
use crate::policy::{Action, Policy};


/// The cached outcome of evaluating one policy over one dataset:
/// per-example margins, correctness, evaluated rounds,
/// the error-based sampling weights used to bias later rollouts,
/// and the aggregated metrics.
/// Rebuilt on every evaluation pass.
#[derive(Debug, Clone)]
pub struct PolicyResult {
    margins: Vec<Vec<f64>>,
    correct: Vec<bool>,
    evaluated: Vec<FixedBitSet>,
    rewards: Vec<f64>,
    sampling_weights: Vec<f64>,
    error_rate: f64,
    avg_reward: f64,
    avg_evaluations: f64,
}


impl PolicyResult {
    /// The fraction of misclassified examples.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }


    /// The mean penalized reward per example.
    pub fn avg_reward(&self) -> f64 {
        self.avg_reward
    }


    /// The mean number of evaluated hypotheses per example.
    pub fn avg_evaluations(&self) -> f64 {
        self.avg_evaluations
    }


    /// The final margin vector of the `row`-th example.
    pub fn margins(&self, row: usize) -> &[f64] {
        &self.margins[row][..]
    }


    /// Whether the `row`-th example was classified correctly.
    pub fn is_correct(&self, row: usize) -> bool {
        self.correct[row]
    }


    /// The rounds whose hypothesis was evaluated
    /// on the `row`-th example.
    pub fn evaluated(&self, row: usize) -> &FixedBitSet {
        &self.evaluated[row]
    }


    /// The penalized reward of the `row`-th example.
    pub fn reward(&self, row: usize) -> f64 {
        self.rewards[row]
    }


    /// The per-example weights used by the biased rollout strategy:
    /// the exponentiated negative normalized margins,
    /// summed over classes,
    /// so misclassified examples are drawn more often.
    pub fn sampling_weights(&self) -> &[f64] {
        &self.sampling_weights[..]
    }


    /// Persist one diagnostic row per example:
    /// the correctness flag, the per-class margins, and
    /// the indices of the evaluated rounds.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        for i in 0..self.margins.len() {
            write!(out, "{}  ", u8::from(self.correct[i]))?;
            for m in &self.margins[i] {
                write!(out, "{m} ")?;
            }
            for t in self.evaluated[i].ones() {
                write!(out, "{t} ")?;
            }
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }
}


/// The per-example record of one evaluation walk.
struct Outcome {
    margins: Vec<f64>,
    correct: bool,
    evaluated: FixedBitSet,
    used: usize,
    reward: f64,
    sampling_weight: f64,
}


/// Walks a frozen policy over every example of a dataset,
/// sequentially or in parallel.
/// Both walks produce bit-identical results:
/// the per-example tie-break streams are derived from
/// the example index,
/// and the aggregation always reduces in index order.
pub struct PolicyGateEvaluator<'a, H> {
    ensemble: &'a Ensemble<H>,
    sample: &'a Sample,
    reward: RewardRule,
    beta: f64,
    state_space: StateSpace,
    seed: u64,
}


impl<'a, H> PolicyGateEvaluator<'a, H>
    where H: WeakClassifier + Sync,
{
    /// Initialize an evaluator over the given ensemble and sample.
    pub fn new(ensemble: &'a Ensemble<H>, sample: &'a Sample) -> Self {
        Self {
            ensemble,
            sample,
            reward: RewardRule::ZeroOne,
            beta: 0.1,
            state_space: StateSpace::Margins { summary: false },
            seed: 0,
        }
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


    /// Set the state-vector shape.
    pub fn state_space(mut self, state_space: StateSpace) -> Self {
        self.state_space = state_space;
        self
    }


    /// Seed the per-example tie-break streams.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Evaluate `policy` sequentially.
    pub fn evaluate(&self, policy: &dyn Policy<H>) -> PolicyResult {
        let n_sample = self.sample.shape().0;
        let builder = self.state_builder();

        let outcomes = (0..n_sample)
            .map(|i| self.walk(policy, i, &builder))
            .collect::<Vec<_>>();
        self.aggregate(outcomes)
    }


    /// Evaluate `policy` with one independent walk per example,
    /// executed in parallel over the example range.
    /// Equivalent to [`PolicyGateEvaluator::evaluate`]
    /// bit for bit.
    pub fn evaluate_parallel(&self, policy: &dyn Policy<H>)
        -> PolicyResult
    {
        let n_sample = self.sample.shape().0;
        let builder = self.state_builder();

        // Each walk writes its own slot; the reduction below
        // runs sequentially in index order.
        let outcomes = (0..n_sample)
            .into_par_iter()
            .map(|i| self.walk(policy, i, &builder))
            .collect::<Vec<_>>();
        self.aggregate(outcomes)
    }


    fn state_builder(&self) -> StateBuilder {
        StateBuilder::new(self.state_space, self.sample.n_class())
    }


    /// Walk rounds `0..T` of one example under the greedy policy.
    fn walk(
        &self,
        policy: &dyn Policy<H>,
        example: usize,
        builder: &StateBuilder,
    ) -> Outcome
    {
        let n_round = self.ensemble.len();
        let n_class = self.sample.n_class();
        let normalizer = self.ensemble.alpha_sum();
        let mut rng = StdRng::seed_from_u64(
            self.seed ^ example as u64
        );

        let mut margins = vec![0.0; n_class];
        let mut evaluated = FixedBitSet::with_capacity(n_round);
        let mut used = 0_usize;

        for t in 0..n_round {
            let state = builder.build(&margins, t, self.ensemble.get(t));
            let action = policy.greedy_action(&state, t, &mut rng);
            match action {
                Action::Evaluate => {
                    margin::accumulate(
                        &mut margins,
                        self.ensemble.get(t),
                        self.sample,
                        example,
                    );
                    evaluated.put(t);
                    used += 1;
                },
                Action::Skip => {},
                Action::Quit => break,
            }
        }

        let labels = self.sample.labels(example);
        let winner = margin::winner(&margins);
        // An example nothing was evaluated on counts as an error.
        let correct = used > 0 && labels[winner].y > 0;

        let reward = self.reward.penalized(
            &margins, labels, normalizer, used, self.beta,
        );

        let z = if normalizer > 0.0 { normalizer } else { 1.0 };
        let sampling_weight = labels.iter()
            .map(|label| {
                let m = margins[label.class];
                (-f64::from(label.y) * m / z).exp()
            })
            .sum::<f64>();

        Outcome {
            margins,
            correct,
            evaluated,
            used,
            reward,
            sampling_weight,
        }
    }


    /// Reduce the per-example outcomes, in index order.
    fn aggregate(&self, outcomes: Vec<Outcome>) -> PolicyResult {
        let n_sample = outcomes.len();

        let mut margins = Vec::with_capacity(n_sample);
        let mut correct = Vec::with_capacity(n_sample);
        let mut evaluated = Vec::with_capacity(n_sample);
        let mut rewards = Vec::with_capacity(n_sample);
        let mut sampling_weights = Vec::with_capacity(n_sample);

        let mut n_error = 0_usize;
        let mut sum_reward = 0.0;
        let mut sum_used = 0_usize;

        for outcome in outcomes {
            if !outcome.correct {
                n_error += 1;
            }
            sum_reward += outcome.reward;
            sum_used += outcome.used;

            margins.push(outcome.margins);
            correct.push(outcome.correct);
            evaluated.push(outcome.evaluated);
            rewards.push(outcome.reward);
            sampling_weights.push(outcome.sampling_weight);
        }

        let n = n_sample as f64;
        PolicyResult {
            margins,
            correct,
            evaluated,
            rewards,
            sampling_weights,
            error_rate: n_error as f64 / n,
            avg_reward: sum_reward / n,
            avg_evaluations: sum_used as f64 / n,
        }
    }
}
