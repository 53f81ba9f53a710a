//! Provides the multi-class decision stump.

use serde::{Serialize, Deserialize};

use crate::{Sample, WeakClassifier};
use super::core::WeakLearner;


/// A multi-class decision stump.
/// Given a point `x`, the stump computes
/// `sgn(x[column] - threshold)` and multiplies it
/// by a per-class vote sign,
/// so every class receives a vote in `{-1.0, +1.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    /// The index of the feature used in prediction.
    pub column: usize,
    /// The split threshold.
    pub threshold: f64,
    /// Per-class vote signs.
    pub votes: Vec<i8>,
    alpha: f64,
}


impl Stump {
    /// Produce a `Stump` with zero confidence weight.
    pub fn new(column: usize, threshold: f64, votes: Vec<i8>) -> Self {
        Self { column, threshold, votes, alpha: 0.0 }
    }


    /// The raw split decision on the `row`-th example, `+1.0` or `-1.0`.
    #[inline]
    fn side(&self, sample: &Sample, row: usize) -> f64 {
        if sample.value(row, self.column) >= self.threshold {
            1.0
        } else {
            -1.0
        }
    }
}


impl WeakClassifier for Stump {
    fn alpha(&self) -> f64 {
        self.alpha
    }


    fn classify(&self, sample: &Sample, row: usize, class: usize) -> f64 {
        self.side(sample, row) * f64::from(self.votes[class])
    }


    fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }


    fn metadata_features(&self) -> Vec<f64> {
        vec![self.threshold, self.column as f64]
    }
}


/// A weak learner that exhaustively searches
/// the best decision stump for a given distribution:
/// every feature column, every midpoint between consecutive
/// distinct values, with per-class vote signs chosen to
/// maximize the total weighted edge.
#[derive(Debug, Clone, Default)]
pub struct StumpLearner;


impl StumpLearner {
    /// Construct a new `StumpLearner`.
    pub fn new() -> Self {
        Self
    }


    /// The candidate thresholds of one feature column:
    /// one below the smallest value,
    /// then the midpoints between consecutive distinct values.
    fn candidates(sample: &Sample, column: usize) -> Vec<f64> {
        let n_sample = sample.shape().0;
        let mut values = (0..n_sample)
            .map(|i| sample.value(i, column))
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        values.dedup();

        let mut thresholds = Vec::with_capacity(values.len());
        if let Some(&first) = values.first() {
            thresholds.push(first - 1.0);
        }
        thresholds.extend(
            values.windows(2).map(|w| (w[0] + w[1]) / 2.0)
        );
        thresholds
    }


    /// The per-class edges of the split `x[column] >= threshold`.
    fn class_edges(
        sample: &Sample,
        dist: &[Vec<f64>],
        column: usize,
        threshold: f64,
    ) -> Vec<f64>
    {
        let n_sample = sample.shape().0;
        let n_class = sample.n_class();

        let mut edges = vec![0.0; n_class];
        for i in 0..n_sample {
            let side = if sample.value(i, column) >= threshold {
                1.0
            } else {
                -1.0
            };
            for (label, edge) in sample.labels(i).iter().zip(&mut edges) {
                *edge += dist[i][label.class] * f64::from(label.y) * side;
            }
        }
        edges
    }
}


impl WeakLearner for StumpLearner {
    type Hypothesis = Stump;


    fn name(&self) -> &str {
        "StumpLearner"
    }


    fn produce(&self, sample: &Sample, dist: &[Vec<f64>]) -> Stump {
        let n_feature = sample.shape().1;

        let mut best_edge = f64::MIN;
        let mut best = Stump::new(0, 0.0, vec![1; sample.n_class()]);

        for column in 0..n_feature {
            for threshold in Self::candidates(sample, column) {
                let edges = Self::class_edges(
                    sample, dist, column, threshold,
                );
                let total = edges.iter()
                    .map(|e| e.abs())
                    .sum::<f64>();

                if total > best_edge {
                    best_edge = total;
                    let votes = edges.iter()
                        .map(|e| if *e >= 0.0 { 1_i8 } else { -1_i8 })
                        .collect::<Vec<_>>();
                    best = Stump::new(column, threshold, votes);
                }
            }
        }
        best
    }
}
