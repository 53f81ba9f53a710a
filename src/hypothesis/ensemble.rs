use serde::{Serialize, Deserialize};

use crate::Sample;
use super::weak_classifier::WeakClassifier;


/// An ordered list of weak hypotheses with confidence weights.
/// This is the object being *gated*:
/// a policy walks the list in order and decides, per round,
/// whether the next hypothesis contributes its weighted vote.
/// You can read/write this struct by `Serde` trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ensemble<H> {
    hypotheses: Vec<H>,
}


impl<H> Default for Ensemble<H> {
    fn default() -> Self {
        Self::new()
    }
}


impl<H> Ensemble<H> {
    /// Construct an empty `Ensemble`.
    #[inline]
    pub fn new() -> Self {
        Self { hypotheses: Vec::new() }
    }


    /// Construct an `Ensemble` from an ordered hypothesis list.
    #[inline]
    pub fn from_hypotheses(hypotheses: Vec<H>) -> Self {
        Self { hypotheses }
    }


    /// Append a hypothesis to the current ensemble.
    #[inline]
    pub fn push(&mut self, hypothesis: H) {
        self.hypotheses.push(hypothesis);
    }


    /// Keep the first `len` hypotheses and drop the rest.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.hypotheses.truncate(len);
    }


    /// The number of hypotheses in this ensemble.
    #[inline]
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }


    /// Returns `true` if this ensemble has no hypothesis.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }


    /// Returns the `t`-th hypothesis.
    #[inline]
    pub fn get(&self, t: usize) -> &H {
        &self.hypotheses[t]
    }


    /// An iterator over the hypotheses, in evaluation order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, H> {
        self.hypotheses.iter()
    }
}


impl<H: WeakClassifier> Ensemble<H> {
    /// The sum of all confidence weights.
    /// Used as the margin normalizer of the reward rules.
    #[inline]
    pub fn alpha_sum(&self) -> f64 {
        self.hypotheses.iter()
            .map(|h| h.alpha())
            .sum::<f64>()
    }


    /// The per-class margin vector of the `row`-th example of `sample`
    /// after evaluating the whole ensemble.
    pub fn margins(&self, sample: &Sample, row: usize) -> Vec<f64> {
        let n_class = sample.n_class();
        let mut margins = vec![0.0; n_class];
        for h in &self.hypotheses {
            let alpha = h.alpha();
            for (class, margin) in margins.iter_mut().enumerate() {
                *margin += alpha * h.classify(sample, row, class);
            }
        }
        margins
    }


    /// The multi-class training error of the un-gated ensemble:
    /// an example counts as an error when the weakest vote
    /// among its positive classes does not beat the strongest vote
    /// among its negative classes.
    pub fn multiclass_error(&self, sample: &Sample) -> f64 {
        let n_sample = sample.shape().0;
        let n_error = (0..n_sample)
            .filter(|&i| {
                let margins = self.margins(sample, i);

                let mut max_neg = f64::MIN;
                let mut min_pos = f64::MAX;
                for label in sample.labels(i) {
                    let m = margins[label.class];
                    if label.y < 0 && m > max_neg { max_neg = m; }
                    if label.y > 0 && m < min_pos { min_pos = m; }
                }
                min_pos <= max_neg
            })
            .count();
        n_error as f64 / n_sample as f64
    }
}
