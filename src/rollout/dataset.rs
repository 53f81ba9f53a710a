//! The rollout dataset produced by the sampler and
//! consumed by the policy's ensemble trainer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{Error, Label, Sample};


/// One generated training instance:
/// the state at a decision point and
/// a reward estimate per action.
/// In most strategies every action carries its own
/// (zero-centered) estimate;
/// the Monte-Carlo strategy records the episode reward
/// on the chosen action and zero elsewhere.
#[derive(Debug, Clone)]
pub struct RolloutRow {
    /// The state vector at the decision point.
    pub state: Vec<f64>,
    /// The per-action reward estimates.
    pub rewards: Vec<f64>,
    /// The episode this row was generated in.
    pub episode: usize,
    /// The example the episode simulated.
    pub example: usize,
    /// The decision round of this row.
    pub round: usize,
}


/// An ordered batch of rollout rows,
/// writable as an ARFF-like file and
/// convertible into a weighted multi-class sample
/// whose classes are the actions.
#[derive(Debug, Clone)]
pub struct RolloutBatch {
    rows: Vec<RolloutRow>,
    state_len: usize,
    n_actions: usize,
}


impl RolloutBatch {
    /// Construct an empty batch for states of length `state_len`
    /// over `n_actions` actions.
    pub fn new(state_len: usize, n_actions: usize) -> Self {
        Self { rows: Vec::new(), state_len, n_actions }
    }


    /// Append a row to this batch.
    pub fn push(&mut self, row: RolloutRow) {
        debug_assert_eq!(row.state.len(), self.state_len);
        debug_assert_eq!(row.rewards.len(), self.n_actions);
        self.rows.push(row);
    }


    /// The number of usable rows in this batch.
    pub fn len(&self) -> usize {
        self.rows.len()
    }


    /// Returns `true` if this batch has no row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }


    /// The rows of this batch, ordered by sample index.
    pub fn rows(&self) -> &[RolloutRow] {
        &self.rows[..]
    }


    /// Write this batch to `path` in the ARFF-like rollout format:
    /// a numeric attribute per state entry,
    /// a nominal class attribute enumerating the actions, and
    /// one sparse `{ action reward ... }` data row per instance
    /// with its `episode example round` provenance in a trailer.
    ///
    /// An unopenable output file is fatal for the run.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "@RELATION mddagtrain")?;
        writeln!(out)?;
        for k in 0..self.state_len {
            writeln!(out, "@ATTRIBUTE f{k} NUMERIC")?;
        }
        let actions = (0..self.n_actions)
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out)?;
        writeln!(out, "@ATTRIBUTE class {{{actions}}}")?;
        writeln!(out)?;
        writeln!(out, "@DATA")?;

        for row in &self.rows {
            for x in &row.state {
                write!(out, "{x},")?;
            }
            write!(out, "{{ ")?;
            for (action, reward) in row.rewards.iter().enumerate() {
                write!(out, "{action} {reward} ")?;
            }
            writeln!(
                out,
                "}} # {} {} {}",
                row.episode, row.example, row.round,
            )?;
        }
        out.flush()?;
        Ok(())
    }


    /// Convert this batch into a weighted multi-class sample:
    /// one example per row, one class per action,
    /// label sign from the reward sign and
    /// label weight from the reward magnitude.
    pub fn to_sample(&self) -> Sample {
        let rows = self.rows.iter()
            .map(|row| row.state.clone())
            .collect::<Vec<_>>();

        let labels = self.rows.iter()
            .map(|row| {
                row.rewards.iter()
                    .enumerate()
                    .map(|(action, &reward)| {
                        let y = if reward > 0.0 { 1 } else { -1 };
                        Label::with_weight(action, y, reward.abs())
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        Sample::from_multilabel(&rows, labels)
    }
}
