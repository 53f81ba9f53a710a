#![warn(missing_docs)]

//!
//! A crate that trains a sequential decision policy over a pre-trained
//! boosting ensemble.
//!
//! Given an ordered list of weak hypotheses with confidence weights,
//! the algorithms in this crate learn a *policy* that decides,
//! per example and per round,
//! whether to evaluate the next weak hypothesis, skip it,
//! or quit the evaluation early.
//! The policy trades classification accuracy
//! against the number of evaluated hypotheses.
//!
//! The training procedure is a rollout/train loop:
//!
//! - Simulate partial evaluations of the ensemble ("rollouts")
//!   and estimate the long-run reward of every action
//!   at sampled decision points.
//! - Train a classifier-based policy on the collected
//!   `(state, per-action reward)` instances,
//!   where the policy is itself a multi-class boosted classifier
//!   whose classes are the actions.
//! - Evaluate the policy on train/test data and repeat.

pub mod constants;
pub mod error;
pub mod sample;
pub mod hypothesis;
pub mod weak_learner;
pub mod margin;
pub mod reward;
pub mod state;
pub mod policy;
pub mod rollout;
pub mod evaluator;
pub mod mddag;

/// Exports the commonly used traits and structs.
pub mod prelude;


pub use error::Error;

pub use sample::{Sample, Label, Feature};

pub use hypothesis::{WeakClassifier, Ensemble};

pub use weak_learner::{WeakLearner, EnsembleTrainer, Stump, StumpLearner, AdaBoostMH};

pub use reward::RewardRule;
pub use state::{StateSpace, StateBuilder};

pub use policy::{
    Action,
    Policy,
    RandomPolicy,
    FullEvalPolicy,
    BoostedPolicy,
    CascadePolicy,
    PositionalPolicy,
};

pub use rollout::{RolloutStrategy, RolloutSampler, RolloutBatch, RolloutRow};

pub use evaluator::{PolicyGateEvaluator, PolicyResult};

pub use mddag::Mddag;
