//! Reward rules mapping a (partial) margin vector
//! and the example's true labels to a scalar reward.

use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::{Error, Label};
use crate::constants::NUMERIC_TOLERANCE;


/// The reward rule applied to the final margin vector of an episode.
/// The rule is fixed for an entire training run.
///
/// Every rule returns exactly `0.0` for an all-zero margin vector,
/// i.e. when no hypothesis contributed a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardRule {
    /// `1.0` when the weakest vote among the positive classes
    /// strictly beats the strongest vote among the negative classes,
    /// `0.0` otherwise.
    ZeroOne,
    /// The negated exponential loss
    /// `-sum_l exp(-y_l * m_l / z)`,
    /// where `z` is the alpha-sum normalizer.
    /// A binary problem uses the single-term shortcut on class `0`.
    ExpLoss,
    /// The negated exponential of the normalized multi-class margin gap,
    /// `-exp((maxNeg - minPos) / z)`.
    MultiExp,
}


impl FromStr for RewardRule {
    type Err = Error;


    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "zeroone" | "e01" => Ok(Self::ZeroOne),
            "exp" => Ok(Self::ExpLoss),
            "mcexp" => Ok(Self::MultiExp),
            _ => Err(Error::Config(
                format!("unknown reward rule `{name}`")
            )),
        }
    }
}


impl RewardRule {
    /// The name of this reward rule.
    pub fn name(&self) -> &str {
        match self {
            Self::ZeroOne => "ZeroOne",
            Self::ExpLoss => "ExpLoss",
            Self::MultiExp => "MultiExp",
        }
    }


    /// Evaluate the raw (un-penalized) reward of a margin vector.
    /// `normalizer` is the sum of the ensemble's confidence weights;
    /// a numerically zero normalizer is replaced by `1.0`.
    pub fn evaluate(
        &self,
        margins: &[f64],
        labels: &[Label],
        normalizer: f64,
    ) -> f64
    {
        // Nothing was evaluated, or every contribution canceled exactly.
        let all_zero = labels.iter()
            .all(|label| margins[label.class] == 0.0);
        if all_zero {
            return 0.0;
        }

        let z = if normalizer.abs() < NUMERIC_TOLERANCE {
            1.0
        } else {
            normalizer
        };

        match self {
            Self::ZeroOne => {
                let (max_neg, min_pos) = margin_gap(margins, labels);
                if min_pos <= max_neg { 0.0 } else { 1.0 }
            },
            Self::ExpLoss => {
                if margins.len() <= 2 {
                    let label = labels[0];
                    -(-f64::from(label.y) * margins[label.class] / z).exp()
                } else {
                    -labels.iter()
                        .map(|label| {
                            let m = margins[label.class];
                            (-f64::from(label.y) * m / z).exp()
                        })
                        .sum::<f64>()
                }
            },
            Self::MultiExp => {
                let (max_neg, min_pos) = margin_gap(margins, labels);
                -((max_neg - min_pos) / z).exp()
            },
        }
    }


    /// The reward of an episode:
    /// the raw reward minus the per-evaluation cost
    /// `used * beta`.
    #[inline]
    pub fn penalized(
        &self,
        margins: &[f64],
        labels: &[Label],
        normalizer: f64,
        used: usize,
        beta: f64,
    ) -> f64
    {
        self.evaluate(margins, labels, normalizer) - used as f64 * beta
    }
}


/// The vote of the winning negative class and
/// the vote of the losing positive class.
#[inline]
fn margin_gap(margins: &[f64], labels: &[Label]) -> (f64, f64) {
    let mut max_neg = f64::MIN;
    let mut min_pos = f64::MAX;
    for label in labels {
        let m = margins[label.class];
        if label.y < 0 && m > max_neg { max_neg = m; }
        if label.y > 0 && m < min_pos { min_pos = m; }
    }
    (max_neg, min_pos)
}
