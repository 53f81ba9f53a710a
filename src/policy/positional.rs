//! A policy with one cascade per ensemble position.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Error, Sample, WeakClassifier};
use crate::weak_learner::EnsembleTrainer;
use super::core::Policy;
use super::cascade::CascadePolicy;


/// A per-position policy:
/// every round of the gated ensemble owns its own cascade,
/// trained on rollout rows sampled at that round only.
/// Queries at round `t` are answered by the `t`-th cascade.
pub struct PositionalPolicy<H> {
    per_round: Vec<CascadePolicy<H>>,
}


impl<H> PositionalPolicy<H> {
    /// Construct an untrained `PositionalPolicy`
    /// with one cascade per round of a `n_rounds`-stage ensemble.
    pub fn new(decay: f64, n_actions: usize, n_rounds: usize) -> Self {
        let per_round = (0..n_rounds)
            .map(|_| CascadePolicy::new(decay, n_actions))
            .collect::<Vec<_>>();
        Self { per_round }
    }


    /// The number of rounds this policy covers.
    pub fn n_rounds(&self) -> usize {
        self.per_round.len()
    }


    /// The cascade that answers queries at `round`.
    /// Rounds past the last cascade fall back to the last one.
    fn cascade(&self, round: usize) -> &CascadePolicy<H> {
        let index = round.min(self.per_round.len() - 1);
        &self.per_round[index]
    }
}


impl<H> Policy<H> for PositionalPolicy<H>
    where H: WeakClassifier + Clone
            + Serialize + DeserializeOwned
            + Send + Sync,
{
    fn name(&self) -> &str {
        "Positional"
    }


    fn n_actions(&self) -> usize {
        self.per_round[0].n_actions()
    }


    fn n_stages(&self) -> usize {
        // Every per-round cascade grows by one stage per iteration.
        self.per_round.iter()
            .map(|cascade| cascade.n_stages())
            .max()
            .unwrap_or(0)
    }


    fn distribution(&self, state: &[f64], round: usize) -> Vec<f64> {
        self.cascade(round).distribution(state, round)
    }


    fn exploration_distribution(&self, state: &[f64], round: usize)
        -> Vec<f64>
    {
        self.cascade(round).exploration_distribution(state, round)
    }


    fn train_stage(
        &mut self,
        _sample: &Sample,
        _trainer: &dyn EnsembleTrainer<Hypothesis = H>,
        _budget: usize,
    ) -> Result<f64, Error>
    {
        Err(Error::Config(
            "a positional policy is trained per round; \
             use `train_stage_at`".into()
        ))
    }


    fn train_stage_at(
        &mut self,
        round: usize,
        sample: &Sample,
        trainer: &dyn EnsembleTrainer<Hypothesis = H>,
        budget: usize,
    ) -> Result<f64, Error>
    {
        self.per_round[round].train_stage(sample, trainer, budget)
    }


    fn positional(&self) -> bool {
        true
    }


    fn save(&self, path: &Path) -> Result<(), Error> {
        // One cascade checkpoint per round, suffixed by position.
        for (round, cascade) in self.per_round.iter().enumerate() {
            let file = position_path(path, round);
            cascade.save(&file)?;
        }
        Ok(())
    }


    fn load(&mut self, path: &Path) -> Result<usize, Error> {
        for (round, cascade) in self.per_round.iter_mut().enumerate() {
            let file = position_path(path, round);
            if !file.exists() {
                return Err(Error::Checkpoint(format!(
                    "missing per-position checkpoint {}",
                    file.display(),
                )));
            }
            cascade.load(&file)?;
        }
        Ok(Policy::<H>::n_stages(self))
    }
}


/// The checkpoint file of one position:
/// the base path with `_<round>` appended to its stem.
fn position_path(path: &Path, round: usize) -> std::path::PathBuf {
    let stem = path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("policy");
    let extension = path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("json");
    path.with_file_name(format!("{stem}_{round}.{extension}"))
}
