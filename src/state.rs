//! Builds the fixed-size state vector a policy decides on,
//! and normalizes per-action reward estimates.

use serde::{Serialize, Deserialize};

use crate::WeakClassifier;
use crate::constants::NUMERIC_TOLERANCE;


/// The shape of the state vector fed to a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateSpace {
    /// Raw margins, one per class.
    /// With `summary`, the sum of absolute margins
    /// (the side output of [`normalized_scores`])
    /// is appended as one extra confidence feature.
    Margins {
        /// Append the summary confidence feature.
        summary: bool,
    },
    /// Normalized margins followed by the hypothesis'
    /// introspection values and the round index.
    /// Preserved for stump- and box-feature-backed ensembles
    /// whose policies condition on the upcoming hypothesis.
    Introspection,
}


/// Maps `(margin vector, round index, next hypothesis)` to a state vector.
/// Deterministic and side-effect-free;
/// a fresh state is built for every decision point.
#[derive(Debug, Clone, Copy)]
pub struct StateBuilder {
    space: StateSpace,
    n_class: usize,
}


impl StateBuilder {
    /// Construct a `StateBuilder` over `n_class` classes.
    pub fn new(space: StateSpace, n_class: usize) -> Self {
        Self { space, n_class }
    }


    /// The length of every state vector this builder produces.
    /// `metadata_len` is the length of the hypotheses'
    /// introspection vectors
    /// (all hypotheses of one ensemble expose the same length).
    pub fn state_len(&self, metadata_len: usize) -> usize {
        match self.space {
            StateSpace::Margins { summary } => {
                self.n_class + usize::from(summary)
            },
            StateSpace::Introspection => self.n_class + metadata_len + 1,
        }
    }


    /// Build the state vector at one decision point.
    /// `round` is the decision round and `h` the hypothesis
    /// the policy is about to gate.
    pub fn build<H>(&self, margins: &[f64], round: usize, h: &H)
        -> Vec<f64>
        where H: WeakClassifier,
    {
        match self.space {
            StateSpace::Margins { summary } => {
                let mut state = margins.to_vec();
                if summary {
                    let (_, sum) = normalized_scores(margins, round);
                    state.push(sum);
                }
                state
            },
            StateSpace::Introspection => {
                let (mut state, _) = normalized_scores(margins, round);
                state.extend(h.metadata_features());
                state.push(round as f64);
                state
            },
        }
    }
}


/// Normalize a score vector by its sum of absolute values and
/// return the pair `(normalized scores, pre-division sum)`.
///
/// - At round `0` the margins are all zero by definition,
///   so the result is all zeros with sum `0.0`
///   (no division takes place).
/// - Two-class score vectors pass through unchanged.
/// - A numerically zero sum also passes the scores through unchanged.
pub fn normalized_scores(scores: &[f64], round: usize) -> (Vec<f64>, f64) {
    if round == 0 {
        return (vec![0.0; scores.len()], 0.0);
    }

    let sum = scores.iter()
        .map(|s| s.abs())
        .sum::<f64>();

    if scores.len() <= 2 || sum < NUMERIC_TOLERANCE {
        return (scores.to_vec(), sum);
    }

    let normalized = scores.iter()
        .map(|s| s / sum)
        .collect::<Vec<_>>();
    (normalized, sum)
}


/// Center a vector of per-action reward estimates around zero
/// by subtracting `(max + min) / 2` from every entry,
/// so the best and the worst action become symmetric.
///
/// Returns `false` when every centered entry is numerically zero,
/// i.e. all actions were equivalent;
/// the caller must discard such an instance
/// instead of writing a degenerate all-tied training row.
pub fn center_rewards(rewards: &mut [f64]) -> bool {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for &r in rewards.iter() {
        if r < min { min = r; }
        if r > max { max = r; }
    }

    let center = (max + min) / 2.0;
    for r in rewards.iter_mut() {
        *r -= center;
    }

    rewards.iter()
        .any(|r| r.abs() > NUMERIC_TOLERANCE)
}
