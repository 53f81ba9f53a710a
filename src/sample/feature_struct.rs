use polars::prelude::*;
use std::ops::Index;


/// Dense representation of a feature (one column of a sample).
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature name
    pub(super) name: String,
    /// Feature values.
    pub(super) values: Vec<f64>,
}


impl Feature {
    /// Construct an empty feature of the given name.
    pub fn new<T: ToString>(name: T) -> Self {
        let name = name.to_string();
        Self { name, values: Vec::new() }
    }


    /// Convert `polars::Series` into `Feature`.
    pub(super) fn from_series(series: &Series) -> Self {
        let name = series.name().to_string();
        let values = series.f64()
            .expect("The series is not a dtype f64")
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .unwrap();
        Self { name, values }
    }


    /// Append a value to this feature.
    pub(super) fn append(&mut self, value: f64) {
        self.values.push(value);
    }


    /// Get the feature name.
    pub fn name(&self) -> &str {
        &self.name
    }


    /// Returns the number of items in this feature.
    pub fn len(&self) -> usize {
        self.values.len()
    }


    /// Returns `true` if this feature has no item.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}


impl Index<usize> for Feature {
    type Output = f64;


    fn index(&self, row: usize) -> &Self::Output {
        &self.values[row]
    }
}
