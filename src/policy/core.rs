//! Provides the `Action` type and the `Policy` trait.

use std::path::Path;

use rand::RngCore;
use rand::Rng;

use crate::{Error, Sample};
use crate::weak_learner::EnsembleTrainer;
use crate::constants::NUMERIC_TOLERANCE;


/// One decision of the gating policy at one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Evaluate the next weak hypothesis and
    /// accumulate its weighted vote.
    Evaluate,
    /// Advance to the next round without evaluating.
    Skip,
    /// Terminate the evaluation of this example.
    Quit,
}


impl Action {
    /// The number of actions.
    pub const COUNT: usize = 3;


    /// The stable index of this action:
    /// evaluate is `0`, skip is `1`, quit is `2`.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Self::Evaluate => 0,
            Self::Skip => 1,
            Self::Quit => 2,
        }
    }


    /// The action of the given stable index.
    /// Panics for an index out of `0..3`.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Evaluate,
            1 => Self::Skip,
            2 => Self::Quit,
            _ => panic!("invalid action index {index}"),
        }
    }
}


/// A trait that defines the behavior of a gating policy
/// over the hypothesis type `H` of the rollout datasets
/// it is trained on.
///
/// A policy is read-only during a rollout batch and
/// during evaluation; training happens strictly between batches.
pub trait Policy<H>: Send + Sync {
    /// Returns the name of this policy.
    fn name(&self) -> &str;


    /// The number of actions this policy decides among.
    fn n_actions(&self) -> usize;


    /// The number of trained stages.
    /// `0` for an untrained policy,
    /// always `1` for a non-cascaded one.
    fn n_stages(&self) -> usize;


    /// Per-action weights of the most recently trained stage.
    fn distribution(&self, state: &[f64], round: usize) -> Vec<f64>;


    /// Per-action weights aggregated over all stages.
    /// Defaults to [`Policy::distribution`];
    /// the cascaded policy overrides this
    /// with its coefficient-weighted stage sum.
    fn exploration_distribution(&self, state: &[f64], round: usize)
        -> Vec<f64>
    {
        self.distribution(state, round)
    }


    /// The greedy action at `state`:
    /// the action of largest aggregated weight.
    /// When every weight is numerically equal,
    /// the action is drawn uniformly at random,
    /// so degenerate states carry no systematic bias
    /// toward the evaluate action.
    fn greedy_action(
        &self,
        state: &[f64],
        round: usize,
        rng: &mut dyn RngCore,
    ) -> Action
    {
        let forecast = self.exploration_distribution(state, round);
        choose_action(&forecast, rng)
    }


    /// The action followed during rollout continuation.
    /// Defaults to the greedy action.
    fn exploration_action(
        &self,
        state: &[f64],
        round: usize,
        rng: &mut dyn RngCore,
    ) -> Action
    {
        self.greedy_action(state, round, rng)
    }


    /// Train one stage of this policy on a rollout sample
    /// and return the training error.
    /// Baseline policies ignore training and return `0.0`.
    fn train_stage(
        &mut self,
        sample: &Sample,
        trainer: &dyn EnsembleTrainer<Hypothesis = H>,
        budget: usize,
    ) -> Result<f64, Error>;


    /// Train the per-position stage of a positional policy.
    /// Every other policy ignores `round`.
    fn train_stage_at(
        &mut self,
        round: usize,
        sample: &Sample,
        trainer: &dyn EnsembleTrainer<Hypothesis = H>,
        budget: usize,
    ) -> Result<f64, Error>
    {
        let _ = round;
        self.train_stage(sample, trainer, budget)
    }


    /// Returns `true` when this policy is trained per ensemble position.
    fn positional(&self) -> bool {
        false
    }


    /// Persist this policy to `path`.
    fn save(&self, path: &Path) -> Result<(), Error>;


    /// Restore this policy from `path` and
    /// return the number of stages found.
    fn load(&mut self, path: &Path) -> Result<usize, Error>;
}


/// The action of the largest forecast weight.
/// All weights numerically equal resolves to
/// a uniformly random action.
pub(crate) fn choose_action(
    forecast: &[f64],
    rng: &mut dyn RngCore,
) -> Action
{
    let first = forecast[0];
    let all_equal = forecast.iter()
        .all(|w| (w - first).abs() < NUMERIC_TOLERANCE);

    if all_equal {
        let index = rng.gen_range(0..forecast.len());
        return Action::from_index(index);
    }

    let mut best = 0;
    let mut max_weight = f64::MIN;
    for (index, &w) in forecast.iter().enumerate() {
        if w > max_weight {
            max_weight = w;
            best = index;
        }
    }
    Action::from_index(best)
}
