//! The always-evaluate baseline policy.

use std::path::Path;

use rand::RngCore;

use crate::{Error, Sample};
use crate::weak_learner::EnsembleTrainer;
use super::core::{Action, Policy};


/// A degenerate baseline that evaluates every hypothesis:
/// its gated classifier coincides with the full ensemble.
#[derive(Debug, Clone)]
pub struct FullEvalPolicy {
    n_actions: usize,
}


impl FullEvalPolicy {
    /// Construct a `FullEvalPolicy` over `n_actions` actions.
    pub fn new(n_actions: usize) -> Self {
        Self { n_actions }
    }


    /// The distribution putting all weight on the evaluate action.
    pub(super) fn evaluate_distribution(n_actions: usize) -> Vec<f64> {
        let mut dist = vec![0.0; n_actions];
        dist[Action::Evaluate.index()] = 1.0;
        dist
    }
}


impl<H> Policy<H> for FullEvalPolicy {
    fn name(&self) -> &str {
        "FullEval"
    }


    fn n_actions(&self) -> usize {
        self.n_actions
    }


    fn n_stages(&self) -> usize {
        1
    }


    fn distribution(&self, _state: &[f64], _round: usize) -> Vec<f64> {
        Self::evaluate_distribution(self.n_actions)
    }


    fn greedy_action(
        &self,
        _state: &[f64],
        _round: usize,
        _rng: &mut dyn RngCore,
    ) -> Action
    {
        Action::Evaluate
    }


    fn train_stage(
        &mut self,
        _sample: &Sample,
        _trainer: &dyn EnsembleTrainer<Hypothesis = H>,
        _budget: usize,
    ) -> Result<f64, Error>
    {
        Ok(0.0)
    }


    fn save(&self, _path: &Path) -> Result<(), Error> {
        // Nothing to persist.
        Ok(())
    }


    fn load(&mut self, _path: &Path) -> Result<usize, Error> {
        Ok(1)
    }
}
