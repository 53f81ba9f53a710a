//! The files in `policy/` directory define the `Policy` trait
//! and its implementations.

/// Provides the `Action` type and the `Policy` trait.
pub mod core;

/// The uniformly random baseline policy.
pub mod random;

/// The always-evaluate baseline policy.
pub mod full_eval;

/// A single boosted-classifier policy.
pub mod boosted;

/// The cascaded (array-of-stages) policy.
pub mod cascade;

/// One cascade per ensemble position.
pub mod positional;


pub use self::core::{Action, Policy};
pub use self::random::RandomPolicy;
pub use self::full_eval::FullEvalPolicy;
pub use self::boosted::BoostedPolicy;
pub use self::cascade::CascadePolicy;
pub use self::positional::PositionalPolicy;
