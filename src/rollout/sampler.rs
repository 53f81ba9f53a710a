//! The rollout sampler: simulates partial evaluations of the
//! gated ensemble and emits `(state, per-action reward)` instances.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::WeightedAliasIndex;
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
use crate::evaluator::PolicyResult;
use crate::margin;
use crate::policy::{Action, Policy};
use crate::constants::NUMERIC_TOLERANCE;
use super::RolloutStrategy;
use super::dataset::{RolloutBatch, RolloutRow};


/// Mixes the batch seed with a sample index,
/// so every index owns an independent random stream.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;


/// The rollout sampler.
///
/// Every sampled index runs one independent episode:
/// an ε-greedy burn-in to the decision point under the current
/// policy, then one continuation rollout per candidate action,
/// each finished under the policy's exploration rule.
/// The per-action rewards are centered and degenerate
/// (all-tied) instances are discarded.
///
/// Episodes are generated in parallel over the index range;
/// the emitted batch is ordered by sample index,
/// not by completion order.
/// The policy and the ensemble are read-only during a batch.
pub struct RolloutSampler<'a, H> {
    ensemble: &'a Ensemble<H>,
    sample: &'a Sample,
    policy: &'a dyn Policy<H>,
    strategy: RolloutStrategy,
    n_rollouts: usize,
    epsilon: f64,
    beta: f64,
    reward: RewardRule,
    state_space: StateSpace,
    n_actions: usize,
    fixed_round: Option<usize>,
    result: Option<&'a PolicyResult>,
    seed: Option<u64>,
}


impl<'a, H> RolloutSampler<'a, H>
    where H: WeakClassifier + Sync,
{
    /// Initialize a sampler over the given ensemble, sample,
    /// and (read-only) policy.
    pub fn new(
        ensemble: &'a Ensemble<H>,
        sample: &'a Sample,
        policy: &'a dyn Policy<H>,
    ) -> Self
    {
        Self {
            ensemble,
            sample,
            policy,
            strategy: RolloutStrategy::Uniform,
            n_rollouts: 100,
            epsilon: 0.1,
            beta: 0.1,
            reward: RewardRule::ZeroOne,
            state_space: StateSpace::Margins { summary: false },
            n_actions: Action::COUNT,
            fixed_round: None,
            result: None,
            seed: None,
        }
    }


    /// Set the sampling strategy.
    pub fn strategy(mut self, strategy: RolloutStrategy) -> Self {
        self.strategy = strategy;
        self
    }


    /// Set the number of sampled episodes.
    pub fn rollouts(mut self, n_rollouts: usize) -> Self {
        self.n_rollouts = n_rollouts;
        self
    }


    /// Set the burn-in exploration rate.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }


    /// Set the per-evaluation cost.
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }


    /// Set the reward rule.
    pub fn reward(mut self, reward: RewardRule) -> Self {
        self.reward = reward;
        self
    }


    /// Set the state-vector shape.
    pub fn state_space(mut self, state_space: StateSpace) -> Self {
        self.state_space = state_space;
        self
    }


    /// Restrict the action set to the first `n_actions` actions.
    /// `2` disables the quit action.
    pub fn actions(mut self, n_actions: usize) -> Self {
        self.n_actions = n_actions;
        self
    }


    /// Pin every sampled decision point to the given round.
    /// Used to generate per-position batches for positional policies.
    pub fn at_round(mut self, round: usize) -> Self {
        self.fixed_round = Some(round);
        self
    }


    /// Bias the example choice of [`RolloutStrategy::Biased`]
    /// toward hard examples,
    /// proportionally to the sampling weights of `result`.
    /// Without a result the strategy falls back to the uniform choice.
    pub fn bias_toward(mut self, result: &'a PolicyResult) -> Self {
        self.result = Some(result);
        self
    }


    /// Seed the per-index random streams.
    /// Sampling is reproducible for a fixed seed,
    /// independent of the worker-thread count.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }


    /// Generate one batch.
    /// The batch is ordered by sample index;
    /// rows whose centered rewards are all zero are discarded.
    pub fn run(&self) -> Result<RolloutBatch, Error> {
        let n_round = self.ensemble.len();
        let n_sample = self.sample.shape().0;
        if n_round == 0 || n_sample == 0 {
            return Err(Error::Config(
                "rollout sampling needs a non-empty ensemble \
                 and a non-empty sample".into()
            ));
        }
        if let Some(round) = self.fixed_round {
            if round >= n_round {
                return Err(Error::Config(format!(
                    "fixed decision round {round} is out of \
                     the ensemble's {n_round} rounds"
                )));
            }
        }

        let builder = StateBuilder::new(
            self.state_space,
            self.sample.n_class(),
        );
        let metadata_len = self.ensemble.get(0)
            .metadata_features()
            .len();
        let state_len = builder.state_len(metadata_len);

        let base_seed = self.seed
            .unwrap_or_else(|| rand::thread_rng().gen());

        let mut batch = RolloutBatch::new(state_len, self.n_actions);
        match self.strategy {
            RolloutStrategy::MonteCarlo => {
                let per_episode = (0..self.n_rollouts)
                    .into_par_iter()
                    .map(|episode| {
                        let mut rng = index_rng(base_seed, episode);
                        let example = rng.gen_range(0..n_sample);
                        self.montecarlo_episode(
                            episode, example, &builder, &mut rng,
                        )
                    })
                    .collect::<Vec<_>>();
                for rows in per_episode {
                    for row in rows {
                        batch.push(row);
                    }
                }
            },
            RolloutStrategy::Uniform | RolloutStrategy::Biased => {
                let alias = self.example_weights()?;
                let maybe_rows = (0..self.n_rollouts)
                    .into_par_iter()
                    .map(|episode| {
                        let mut rng = index_rng(base_seed, episode);
                        let example = match &alias {
                            Some(alias) => alias.sample(&mut rng),
                            None => rng.gen_range(0..n_sample),
                        };
                        let round = self.fixed_round
                            .unwrap_or_else(|| rng.gen_range(0..n_round));
                        self.decision_episode(
                            episode, example, round, &builder, &mut rng,
                        )
                    })
                    .collect::<Vec<_>>();
                for row in maybe_rows.into_iter().flatten() {
                    batch.push(row);
                }
            },
            RolloutStrategy::Full => {
                let rounds = match self.fixed_round {
                    Some(_) => 1,
                    None => n_round,
                };
                let maybe_rows = (0..n_sample * rounds)
                    .into_par_iter()
                    .map(|index| {
                        let mut rng = index_rng(base_seed, index);
                        let example = index / rounds;
                        let round = self.fixed_round
                            .unwrap_or(index % rounds);
                        self.decision_episode(
                            index, example, round, &builder, &mut rng,
                        )
                    })
                    .collect::<Vec<_>>();
                for row in maybe_rows.into_iter().flatten() {
                    batch.push(row);
                }
            },
            RolloutStrategy::OneShot => {
                let maybe_rows = (0..n_sample)
                    .into_par_iter()
                    .map(|example| {
                        let mut rng = index_rng(base_seed, example);
                        let mut rounds = match self.fixed_round {
                            Some(round) => vec![round],
                            None => (0..n_round).collect::<Vec<_>>(),
                        };
                        rounds.shuffle(&mut rng);
                        rounds.into_iter()
                            .find_map(|round| self.decision_episode(
                                example, example, round,
                                &builder, &mut rng,
                            ))
                    })
                    .collect::<Vec<_>>();
                for row in maybe_rows.into_iter().flatten() {
                    batch.push(row);
                }
            },
        }
        Ok(batch)
    }


    /// The alias table over the per-example sampling weights,
    /// or `None` for the uniform choice.
    fn example_weights(&self)
        -> Result<Option<WeightedAliasIndex<f64>>, Error>
    {
        if self.strategy != RolloutStrategy::Biased {
            return Ok(None);
        }
        let Some(result) = self.result else {
            // No cached evaluation yet:
            // fall back to the uniform choice with weight one.
            return Ok(None);
        };

        let weights = result.sampling_weights().to_vec();
        let alias = WeightedAliasIndex::new(weights)
            .map_err(|e| Error::Config(
                format!("bad sampling weights: {e}")
            ))?;
        Ok(Some(alias))
    }


    /// Run one decision-point episode:
    /// burn-in to `decision`, then one continuation per action,
    /// emitting a single centered row unless it degenerates.
    fn decision_episode(
        &self,
        episode: usize,
        example: usize,
        decision: usize,
        builder: &StateBuilder,
        rng: &mut StdRng,
    ) -> Option<RolloutRow>
    {
        let n_round = self.ensemble.len();
        let n_class = self.sample.n_class();
        let normalizer = self.ensemble.alpha_sum();

        // Burn-in: two-action ε-greedy walk to the decision point.
        let mut margins = vec![0.0; n_class];
        let mut used = 0_usize;
        for t in 0..decision {
            let state = builder.build(&margins, t, self.ensemble.get(t));
            let action = self.burn_in_action(&state, t, rng);
            self.apply(action, t, example, &mut margins, &mut used);
        }

        let state = builder.build(
            &margins, decision, self.ensemble.get(decision),
        );

        // One continuation per candidate action,
        // each replayed from the burn-in margins.
        let mut rewards = vec![0.0; self.n_actions];
        for (candidate, reward) in rewards.iter_mut().enumerate() {
            let mut margins = margins.clone();
            let mut used = used;
            for t in decision..n_round {
                let action = if t == decision {
                    Action::from_index(candidate)
                } else {
                    let state = builder.build(
                        &margins, t, self.ensemble.get(t),
                    );
                    self.policy.exploration_action(&state, t, rng)
                };
                let keep_going = self.apply(
                    action, t, example, &mut margins, &mut used,
                );
                if !keep_going {
                    break;
                }
            }
            *reward = self.reward.penalized(
                &margins,
                self.sample.labels(example),
                normalizer,
                used,
                self.beta,
            );
        }

        if !crate::state::center_rewards(&mut rewards) {
            return None;
        }
        Some(RolloutRow {
            state, rewards, episode, example, round: decision,
        })
    }


    /// Run one end-to-end episode and emit a row per visited
    /// decision point, all carrying the episode reward
    /// on the chosen action.
    fn montecarlo_episode(
        &self,
        episode: usize,
        example: usize,
        builder: &StateBuilder,
        rng: &mut StdRng,
    ) -> Vec<RolloutRow>
    {
        let n_round = self.ensemble.len();
        let n_class = self.sample.n_class();
        let normalizer = self.ensemble.alpha_sum();

        let mut margins = vec![0.0; n_class];
        let mut used = 0_usize;
        let mut path = Vec::with_capacity(n_round);

        for t in 0..n_round {
            let state = builder.build(&margins, t, self.ensemble.get(t));
            let action = self.policy.exploration_action(&state, t, rng);
            path.push((state, action));
            let keep_going = self.apply(
                action, t, example, &mut margins, &mut used,
            );
            if !keep_going {
                break;
            }
        }

        let reward = self.reward.penalized(
            &margins,
            self.sample.labels(example),
            normalizer,
            used,
            self.beta,
        );

        path.into_iter()
            .enumerate()
            .map(|(round, (state, action))| {
                let mut rewards = vec![0.0; self.n_actions];
                rewards[action.index()] = reward;
                RolloutRow { state, rewards, episode, example, round }
            })
            .collect()
    }


    /// The ε-greedy two-action choice of the burn-in phase:
    /// with probability ε a uniform draw among evaluate/skip,
    /// otherwise the heavier of the two under the policy's
    /// aggregated exploration distribution
    /// (a numerical tie is drawn uniformly).
    fn burn_in_action(
        &self,
        state: &[f64],
        round: usize,
        rng: &mut StdRng,
    ) -> Action
    {
        if rng.gen::<f64>() < self.epsilon {
            return Action::from_index(rng.gen_range(0..2));
        }

        let dist = self.policy.exploration_distribution(state, round);
        let (evaluate, skip) = (
            dist[Action::Evaluate.index()],
            dist[Action::Skip.index()],
        );
        if (evaluate - skip).abs() < NUMERIC_TOLERANCE {
            Action::from_index(rng.gen_range(0..2))
        } else if evaluate > skip {
            Action::Evaluate
        } else {
            Action::Skip
        }
    }


    /// Apply one action at round `t`.
    /// Returns `false` when the episode terminates.
    fn apply(
        &self,
        action: Action,
        t: usize,
        example: usize,
        margins: &mut [f64],
        used: &mut usize,
    ) -> bool
    {
        match action {
            Action::Evaluate => {
                margin::accumulate(
                    margins, self.ensemble.get(t), self.sample, example,
                );
                *used += 1;
                true
            },
            Action::Skip => true,
            Action::Quit => false,
        }
    }
}


/// The independent random stream of one sample index.
fn index_rng(base_seed: u64, index: usize) -> StdRng {
    let seed = base_seed ^ (index as u64).wrapping_mul(SEED_MIX);
    StdRng::seed_from_u64(seed)
}
