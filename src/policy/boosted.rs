//! A policy backed by one multi-class boosted classifier
//! whose classes are the actions.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;

use crate::{Ensemble, Error, Sample, WeakClassifier};
use crate::margin;
use crate::weak_learner::EnsembleTrainer;
use crate::constants::NUMERIC_TOLERANCE;
use super::core::Policy;


/// A single-stage policy:
/// one boosted multi-class classifier over the state vector,
/// trained on a rollout sample by an external ensemble trainer.
/// The per-action weights are the classifier's margins
/// rescaled from `[-1, 1]` into `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedPolicy<H> {
    votes: Ensemble<H>,
    n_actions: usize,
}


impl<H> BoostedPolicy<H> {
    /// Construct an untrained `BoostedPolicy`
    /// over `n_actions` actions.
    pub fn new(n_actions: usize) -> Self {
        Self { votes: Ensemble::new(), n_actions }
    }


    /// The trained action classifier.
    pub fn votes(&self) -> &Ensemble<H> {
        &self.votes
    }
}


impl<H: WeakClassifier> BoostedPolicy<H> {
    /// The raw per-action forecast of a state:
    /// the weighted votes of the action classifier,
    /// queried through a one-row sample.
    fn forecast(&self, state: &[f64]) -> Vec<f64> {
        let data = Sample::singleton(state);
        let mut forecast = vec![0.0; self.n_actions];
        for h in self.votes.iter() {
            let alpha = h.alpha();
            for (action, f) in forecast.iter_mut().enumerate() {
                *f += alpha * h.classify(&data, 0, action);
            }
        }
        forecast
    }


    /// The training error of the current classifier on `sample`:
    /// the fraction of rows whose forecast winner
    /// carries a negative label.
    fn training_error(&self, sample: &Sample) -> f64 {
        let n_sample = sample.shape().0;
        let n_error = (0..n_sample)
            .filter(|&i| {
                let margins = self.votes.margins(sample, i);
                let winner = margin::winner(&margins);
                sample.labels(i)[winner].y < 0
            })
            .count();
        n_error as f64 / n_sample as f64
    }
}


impl<H> Policy<H> for BoostedPolicy<H>
    where H: WeakClassifier
            + Serialize + DeserializeOwned
            + Send + Sync,
{
    fn name(&self) -> &str {
        "Boosted"
    }


    fn n_actions(&self) -> usize {
        self.n_actions
    }


    fn n_stages(&self) -> usize {
        usize::from(!self.votes.is_empty())
    }


    fn distribution(&self, state: &[f64], _round: usize) -> Vec<f64> {
        let alpha_sum = self.votes.alpha_sum();
        if alpha_sum < NUMERIC_TOLERANCE {
            // Untrained. All-equal weights resolve to a random action.
            return vec![0.0; self.n_actions];
        }

        // Rescale each margin from [-1, 1] into [0, 1].
        self.forecast(state)
            .into_iter()
            .map(|f| (f / alpha_sum + 1.0) / 2.0)
            .collect()
    }


    fn train_stage(
        &mut self,
        sample: &Sample,
        trainer: &dyn EnsembleTrainer<Hypothesis = H>,
        budget: usize,
    ) -> Result<f64, Error>
    {
        self.n_actions = sample.n_class();
        self.votes = trainer.train(sample, budget)?;
        Ok(self.training_error(sample))
    }


    fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string(self)
            .map_err(|e| Error::Checkpoint(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }


    fn load(&mut self, path: &Path) -> Result<usize, Error> {
        let json = fs::read_to_string(path)?;
        *self = serde_json::from_str(&json)
            .map_err(|e| Error::Checkpoint(e.to_string()))?;
        Ok(Policy::<H>::n_stages(self))
    }
}
