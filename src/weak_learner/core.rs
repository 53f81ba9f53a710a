//! Provides the `WeakLearner` and `EnsembleTrainer` traits.

use crate::{Ensemble, Error, Sample};


/// A trait that defines the behavior of a weak learner:
/// given a sample and a per-(example, class) weight matrix,
/// produce one hypothesis with a better-than-chance weighted edge.
pub trait WeakLearner {
    /// The hypothesis produced by this weak learner.
    type Hypothesis;


    /// Returns the name of this weak learner.
    fn name(&self) -> &str;


    /// Produce a hypothesis for the given distribution.
    /// `dist[i][l]` is the weight on the `(i, l)` example/class pair;
    /// the weights sum to one over all pairs.
    fn produce(&self, sample: &Sample, dist: &[Vec<f64>])
        -> Self::Hypothesis;
}


/// A trait that defines the behavior of an ensemble trainer:
/// given a weighted multi-class sample and an iteration budget,
/// return an ordered list of weak hypotheses with confidence weights.
///
/// Policy training consumes this trait as an object
/// (`&dyn EnsembleTrainer<Hypothesis = H>`),
/// so the policy hierarchy stays independent
/// of the concrete boosting algorithm behind it.
pub trait EnsembleTrainer {
    /// The hypothesis type of the trained ensemble.
    type Hypothesis;


    /// Returns the name of this trainer.
    fn name(&self) -> &str;


    /// Train an ensemble of at most `budget` hypotheses on `sample`.
    fn train(&self, sample: &Sample, budget: usize)
        -> Result<Ensemble<Self::Hypothesis>, Error>;
}
