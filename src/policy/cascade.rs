//! The cascaded policy: an ordered, growing list of
//! single-stage policies combined with geometrically
//! decaying coefficients.

use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;

use crate::{Error, Sample, WeakClassifier};
use crate::weak_learner::EnsembleTrainer;
use crate::constants::COEFFICIENT_CUTOFF;
use super::core::Policy;
use super::boosted::BoostedPolicy;
use super::full_eval::FullEvalPolicy;


/// A cascade of single-stage policies.
/// One stage is appended per outer-loop iteration;
/// every append multiplies the coefficients of the
/// existing stages by the decay factor,
/// so the aggregated exploration distribution
/// favors the most recent stage exponentially.
///
/// The non-aggregated [`Policy::distribution`] uses
/// only the newest stage.
#[derive(Debug, Clone)]
pub struct CascadePolicy<H> {
    stages: Vec<BoostedPolicy<H>>,
    coefficients: Vec<f64>,
    decay: f64,
    baseline: bool,
    n_actions: usize,
}


/// One stage of a persisted cascade.
#[derive(Serialize, Deserialize)]
struct StageRecord<H> {
    index: usize,
    n_hypotheses: usize,
    coefficient: f64,
    stage: BoostedPolicy<H>,
}


/// The checkpoint format of a cascade.
#[derive(Serialize, Deserialize)]
struct CascadeCheckpoint<H> {
    decay: f64,
    baseline: bool,
    n_actions: usize,
    stages: Vec<StageRecord<H>>,
}


impl<H> CascadePolicy<H> {
    /// Construct an empty cascade over `n_actions` actions
    /// with the given decay factor in `(0, 1]`.
    pub fn new(decay: f64, n_actions: usize) -> Self {
        Self {
            stages: Vec::new(),
            coefficients: Vec::new(),
            decay,
            baseline: false,
            n_actions,
        }
    }


    /// Pin an always-evaluate stage of coefficient `1.0`
    /// under the cascade,
    /// so the aggregation always has a safe fallback action.
    pub fn with_evaluate_baseline(mut self) -> Self {
        self.baseline = true;
        self
    }


    /// The per-stage combination coefficients, oldest first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients[..]
    }
}


impl<H> Policy<H> for CascadePolicy<H>
    where H: WeakClassifier + Clone
            + Serialize + DeserializeOwned
            + Send + Sync,
{
    fn name(&self) -> &str {
        "Cascade"
    }


    fn n_actions(&self) -> usize {
        self.n_actions
    }


    fn n_stages(&self) -> usize {
        self.stages.len()
    }


    fn distribution(&self, state: &[f64], round: usize) -> Vec<f64> {
        match self.stages.last() {
            Some(stage) => stage.distribution(state, round),
            None if self.baseline => {
                FullEvalPolicy::evaluate_distribution(self.n_actions)
            },
            None => vec![0.0; self.n_actions],
        }
    }


    fn exploration_distribution(&self, state: &[f64], round: usize)
        -> Vec<f64>
    {
        let mut distribution = vec![0.0; self.n_actions];

        let newest_first = self.stages.iter()
            .zip(&self.coefficients)
            .rev();
        for (stage, &coefficient) in newest_first {
            // Coefficients decay geometrically,
            // so everything past the cutoff is negligible too.
            if coefficient < COEFFICIENT_CUTOFF {
                break;
            }
            let stage_dist = stage.distribution(state, round);
            distribution.iter_mut()
                .zip(stage_dist)
                .for_each(|(d, s)| { *d += coefficient * s; });
        }

        if self.baseline {
            let pinned = FullEvalPolicy::evaluate_distribution(
                self.n_actions
            );
            distribution.iter_mut()
                .zip(pinned)
                .for_each(|(d, s)| { *d += s; });
        }

        distribution
    }


    fn train_stage(
        &mut self,
        sample: &Sample,
        trainer: &dyn EnsembleTrainer<Hypothesis = H>,
        budget: usize,
    ) -> Result<f64, Error>
    {
        let mut stage = BoostedPolicy::new(self.n_actions);
        let error = stage.train_stage(sample, trainer, budget)?;

        self.coefficients.iter_mut()
            .for_each(|c| { *c *= self.decay; });
        self.stages.push(stage);
        self.coefficients.push(1.0);

        Ok(error)
    }


    fn save(&self, path: &Path) -> Result<(), Error> {
        let stages = self.stages.iter()
            .zip(&self.coefficients)
            .enumerate()
            .map(|(index, (stage, &coefficient))| StageRecord {
                index,
                n_hypotheses: stage.votes().len(),
                coefficient,
                stage: stage.clone(),
            })
            .collect::<Vec<_>>();

        let checkpoint = CascadeCheckpoint {
            decay: self.decay,
            baseline: self.baseline,
            n_actions: self.n_actions,
            stages,
        };

        let json = serde_json::to_string(&checkpoint)
            .map_err(|e| Error::Checkpoint(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }


    fn load(&mut self, path: &Path) -> Result<usize, Error> {
        let json = fs::read_to_string(path)?;
        let checkpoint: CascadeCheckpoint<H> =
            serde_json::from_str(&json)
                .map_err(|e| Error::Checkpoint(e.to_string()))?;

        self.decay = checkpoint.decay;
        self.baseline = checkpoint.baseline;
        self.n_actions = checkpoint.n_actions;
        self.stages.clear();
        self.coefficients.clear();
        for record in checkpoint.stages {
            self.stages.push(record.stage);
            self.coefficients.push(record.coefficient);
        }

        Ok(self.stages.len())
    }
}
