//! The files in `weak_learner/` directory define
//! the `WeakLearner`/`EnsembleTrainer` traits and
//! the bundled multi-class decision stump learner.

/// Provides the `WeakLearner` and `EnsembleTrainer` traits.
pub mod core;

/// Defines the multi-class decision stump.
pub mod stump;

/// Defines the AdaBoost.MH ensemble trainer.
pub mod adaboost_mh;


pub use self::core::{WeakLearner, EnsembleTrainer};
pub use self::stump::{Stump, StumpLearner};
pub use self::adaboost_mh::AdaBoostMH;
