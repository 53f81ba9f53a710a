//! Provides the AdaBoost.MH ensemble trainer.

use crate::{Ensemble, Error, Sample, WeakClassifier};
use crate::constants::EDGE_CLIP;
use super::core::{EnsembleTrainer, WeakLearner};


/// The AdaBoost.MH boosting loop:
/// maintains a distribution over (example, class) pairs,
/// asks the inner weak learner for a hypothesis per round,
/// and weights it by `ln((1 + edge) / (1 - edge)) / 2`.
///
/// Rollout datasets arrive pre-weighted
/// (the per-action reward magnitudes are the label weights),
/// so the initial distribution is proportional to the label weights
/// rather than uniform.
pub struct AdaBoostMH<W> {
    weak_learner: W,
}


impl<W> AdaBoostMH<W> {
    /// Initialize the trainer with its inner weak learner.
    pub fn new(weak_learner: W) -> Self {
        Self { weak_learner }
    }


    /// The initial distribution over (example, class) pairs,
    /// proportional to the label weights.
    /// Falls back to the uniform distribution
    /// when every weight is zero.
    fn initial_distribution(sample: &Sample) -> Vec<Vec<f64>> {
        let n_sample = sample.shape().0;
        let n_class = sample.n_class();

        let mut dist = (0..n_sample)
            .map(|i| {
                let mut row = vec![0.0; n_class];
                for label in sample.labels(i) {
                    row[label.class] = label.weight;
                }
                row
            })
            .collect::<Vec<_>>();

        let total = dist.iter()
            .flatten()
            .sum::<f64>();

        if total > 0.0 {
            dist.iter_mut()
                .flatten()
                .for_each(|d| { *d /= total; });
        } else {
            let uni = 1.0 / (n_sample * n_class) as f64;
            dist.iter_mut()
                .flatten()
                .for_each(|d| { *d = uni; });
        }
        dist
    }
}


impl<W, H> EnsembleTrainer for AdaBoostMH<W>
    where W: WeakLearner<Hypothesis = H>,
          H: WeakClassifier,
{
    type Hypothesis = H;


    fn name(&self) -> &str {
        "AdaBoostMH"
    }


    fn train(&self, sample: &Sample, budget: usize)
        -> Result<Ensemble<H>, Error>
    {
        let n_sample = sample.shape().0;
        if n_sample == 0 {
            return Err(Error::Config(
                "cannot train an ensemble on an empty sample".into()
            ));
        }

        let mut dist = Self::initial_distribution(sample);
        let mut ensemble = Ensemble::new();

        for _ in 0..budget {
            let h = self.weak_learner.produce(sample, &dist);

            // The weighted edge of the new hypothesis.
            let mut edge = 0.0;
            for i in 0..n_sample {
                for label in sample.labels(i) {
                    edge += dist[i][label.class]
                        * f64::from(label.y)
                        * h.classify(sample, i, label.class);
                }
            }

            // No better-than-chance hypothesis is left.
            if edge <= 0.0 {
                break;
            }

            let edge = edge.min(1.0 - EDGE_CLIP);
            let alpha = ((1.0 + edge) / (1.0 - edge)).ln() / 2.0;
            let h = h.with_alpha(alpha);

            // Re-weight and normalize the distribution.
            let mut normalizer = 0.0;
            for i in 0..n_sample {
                for label in sample.labels(i) {
                    let p = f64::from(label.y)
                        * h.classify(sample, i, label.class);
                    let d = &mut dist[i][label.class];
                    *d *= (-alpha * p).exp();
                    normalizer += *d;
                }
            }
            if normalizer > 0.0 {
                dist.iter_mut()
                    .flatten()
                    .for_each(|d| { *d /= normalizer; });
            }

            ensemble.push(h);
        }

        Ok(ensemble)
    }
}
