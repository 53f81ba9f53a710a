//! Exports the standard traits and structs of this crate.
//!
pub use crate::sample::{
    Sample,
    Label,
    Feature,
};


pub use crate::hypothesis::{
    // Weak hypothesis trait
    WeakClassifier,

    // The ordered hypothesis list being gated
    Ensemble,
};


pub use crate::weak_learner::{
    // Weak learner / ensemble trainer traits
    WeakLearner,
    EnsembleTrainer,

    // Bundled multi-class stump learner
    Stump,
    StumpLearner,
    AdaBoostMH,
};


pub use crate::policy::{
    Action,
    Policy,

    // Baselines
    RandomPolicy,
    FullEvalPolicy,

    // Trained policies
    BoostedPolicy,
    CascadePolicy,
    PositionalPolicy,
};


pub use crate::rollout::{
    RolloutStrategy,
    RolloutSampler,
    RolloutBatch,
    RolloutRow,
};


pub use crate::reward::RewardRule;
pub use crate::state::{StateSpace, StateBuilder};

pub use crate::evaluator::{
    PolicyGateEvaluator,
    PolicyResult,
};

pub use crate::mddag::Mddag;

pub use crate::error::Error;
