use std::io;

use polars::prelude::*;

use super::feature_struct::Feature;
use super::label::{Label, one_vs_all};


/// Struct `Sample` holds a batch sample for multi-class classification.
/// Features are stored column-major;
/// every example carries a dense label vector
/// with one signed assignment per class.
/// A `Sample` is immutable after construction.
#[derive(Debug, Clone)]
pub struct Sample {
    pub(super) features: Vec<Feature>,
    pub(super) labels: Vec<Vec<Label>>,
    pub(super) n_sample: usize,
    pub(super) n_feature: usize,
    pub(super) n_class: usize,
}


impl Sample {
    /// Construct a single-label sample from row-major data.
    /// `targets[i]` is the positive class of the `i`-th example;
    /// all other classes get a negative assignment of unit weight.
    pub fn from_rows(rows: &[Vec<f64>], targets: &[usize], n_class: usize)
        -> Self
    {
        assert_eq!(rows.len(), targets.len());
        let n_sample = rows.len();
        let n_feature = rows.first().map(Vec::len).unwrap_or(0);

        let mut features = (0..n_feature)
            .map(|k| Feature::new(format!("f{k}")))
            .collect::<Vec<_>>();
        for row in rows {
            assert_eq!(row.len(), n_feature);
            for (feat, &x) in features.iter_mut().zip(row) {
                feat.append(x);
            }
        }

        let labels = targets.iter()
            .map(|&target| one_vs_all(target, n_class))
            .collect::<Vec<_>>();

        Self { features, labels, n_sample, n_feature, n_class, }
    }


    /// Construct a multi-label sample from row-major data
    /// and explicit per-example label vectors.
    /// Every label vector must assign all `n_class` classes in order.
    pub fn from_multilabel(rows: &[Vec<f64>], labels: Vec<Vec<Label>>)
        -> Self
    {
        assert_eq!(rows.len(), labels.len());
        let n_sample = rows.len();
        let n_feature = rows.first().map(Vec::len).unwrap_or(0);
        let n_class = labels.first().map(Vec::len).unwrap_or(0);

        for assignment in &labels {
            assert_eq!(assignment.len(), n_class);
        }

        let mut features = (0..n_feature)
            .map(|k| Feature::new(format!("f{k}")))
            .collect::<Vec<_>>();
        for row in rows {
            assert_eq!(row.len(), n_feature);
            for (feat, &x) in features.iter_mut().zip(row) {
                feat.append(x);
            }
        }

        Self { features, labels, n_sample, n_feature, n_class, }
    }


    /// Convert `polars::DataFrame` and `polars::Series` into `Sample`.
    /// The target series holds the positive class index of each example
    /// as a value of dtype `f64`.
    /// This method takes the ownership for the given pair
    /// `data` and `target`.
    pub fn from_dataframe(data: DataFrame, target: Series)
        -> io::Result<Self>
    {
        let (n_sample, n_feature) = data.shape();
        let target = target.f64()
            .expect("The target is not a dtype f64")
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .unwrap();

        let n_class = target.iter()
            .map(|y| *y as usize)
            .max()
            .map(|c| c + 1)
            .unwrap_or(0);

        let labels = target.iter()
            .map(|y| one_vs_all(*y as usize, n_class))
            .collect::<Vec<_>>();

        let features = data.get_columns()
            .iter()
            .map(Feature::from_series)
            .collect::<Vec<_>>();

        let sample = Self { features, labels, n_sample, n_feature, n_class, };
        Ok(sample)
    }


    /// Construct a one-row, label-free sample from a state vector.
    /// Classifier-backed policies feed their input state
    /// through this constructor.
    pub fn singleton(state: &[f64]) -> Self {
        let features = state.iter()
            .enumerate()
            .map(|(k, &x)| {
                let mut feat = Feature::new(format!("f{k}"));
                feat.append(x);
                feat
            })
            .collect::<Vec<_>>();

        Self {
            features,
            labels: vec![Vec::new()],
            n_sample: 1,
            n_feature: state.len(),
            n_class: 0,
        }
    }


    /// Returns the pair of the number of examples and
    /// the number of features.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_sample, self.n_feature)
    }


    /// Returns the number of classes.
    pub fn n_class(&self) -> usize {
        self.n_class
    }


    /// Returns the value of the `col`-th feature of the `row`-th example.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.features[col][row]
    }


    /// Returns the feature vector of the `row`-th example.
    pub fn instance(&self, row: usize) -> Vec<f64> {
        self.features.iter()
            .map(|feat| feat[row])
            .collect::<Vec<f64>>()
    }


    /// Returns the label vector of the `row`-th example.
    pub fn labels(&self, row: usize) -> &[Label] {
        &self.labels[row]
    }


    /// Returns a slice of type `Feature`.
    pub fn features(&self) -> &[Feature] {
        &self.features[..]
    }
}
