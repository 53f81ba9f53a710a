use crate::Sample;


/// A trait that defines the behavior of one weak hypothesis
/// in a multi-class ensemble.
/// You only need to implement `alpha` and `classify`.
pub trait WeakClassifier {
    /// The confidence weight of this hypothesis, non-negative.
    fn alpha(&self) -> f64;


    /// Computes the vote of the `row`-th example of `sample`
    /// for the given class.
    /// This code assumes that `WeakClassifier::classify`
    /// returns a value in `[-1.0, 1.0]`.
    fn classify(&self, sample: &Sample, row: usize, class: usize) -> f64;


    /// Returns a copy of `self` with the confidence weight replaced.
    fn with_alpha(self, alpha: f64) -> Self
        where Self: Sized;


    /// Hypothesis-specific introspection values appended to the
    /// state vector by [`StateSpace::Introspection`].
    /// E.g., a decision stump exposes its threshold and feature column.
    /// Returns an empty vector if unsupported.
    ///
    /// [`StateSpace::Introspection`]: crate::StateSpace::Introspection
    fn metadata_features(&self) -> Vec<f64> {
        Vec::new()
    }
}
