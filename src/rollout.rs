//! The files in `rollout/` directory define the rollout sampler
//! that generates `(state, per-action reward)` training instances
//! by simulating partial evaluations of the gated ensemble.

/// The rollout dataset: rows, file format, sample conversion.
pub mod dataset;

/// The rollout sampler and its sampling strategies.
pub mod sampler;


use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::Error;

pub use dataset::{RolloutBatch, RolloutRow};
pub use sampler::RolloutSampler;


/// How the sampler picks its `(example, decision round)` points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutStrategy {
    /// One full pass per episode, end to end, under the policy:
    /// the episode reward is applied to every visited decision point.
    MonteCarlo,
    /// Example and decision round drawn uniformly at random;
    /// every candidate action is evaluated by a continuation rollout.
    Uniform,
    /// Like [`RolloutStrategy::Uniform`], but the example index is
    /// drawn with probability proportional to a per-example
    /// error-based weight, biasing the batch toward hard examples.
    Biased,
    /// Deterministically enumerate every `(example, round)` pair
    /// exactly once. For exhaustive small-scale validation;
    /// incompatible with cascaded policies.
    Full,
    /// Visit the examples in random order and try decision rounds
    /// in random order until one usable row per example is found.
    OneShot,
}


impl FromStr for RolloutStrategy {
    type Err = Error;


    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "montecarlo" => Ok(Self::MonteCarlo),
            "szatymaz" => Ok(Self::Uniform),
            "badszatymaz" => Ok(Self::Biased),
            "full" => Ok(Self::Full),
            "oneshot" => Ok(Self::OneShot),
            _ => Err(Error::Config(
                format!("unknown rollout strategy `{name}`")
            )),
        }
    }
}


impl RolloutStrategy {
    /// The name of this strategy.
    pub fn name(&self) -> &str {
        match self {
            Self::MonteCarlo => "MonteCarlo",
            Self::Uniform => "Uniform",
            Self::Biased => "Biased",
            Self::Full => "Full",
            Self::OneShot => "OneShot",
        }
    }
}
