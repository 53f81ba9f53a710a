use serde::{Serialize, Deserialize};


/// A per-class label assignment of one example.
/// Every example carries one `Label` per class;
/// the truly positive classes have `y == +1`,
/// all others have `y == -1`.
/// The weight is a non-negative importance used
/// to initialize the boosting distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// The class index this assignment refers to.
    pub class: usize,
    /// The sign of the assignment, `+1` or `-1`.
    pub y: i8,
    /// A non-negative importance weight.
    pub weight: f64,
}


impl Label {
    /// Construct a positive assignment of unit weight.
    #[inline]
    pub fn positive(class: usize) -> Self {
        Self { class, y: 1, weight: 1.0 }
    }


    /// Construct a negative assignment of unit weight.
    #[inline]
    pub fn negative(class: usize) -> Self {
        Self { class, y: -1, weight: 1.0 }
    }


    /// Construct an assignment with an explicit sign and weight.
    #[inline]
    pub fn with_weight(class: usize, y: i8, weight: f64) -> Self {
        Self { class, y, weight }
    }
}


/// Build the dense one-vs-all label vector of a single-label example.
#[inline]
pub(crate) fn one_vs_all(target: usize, n_class: usize) -> Vec<Label> {
    (0..n_class)
        .map(|class| {
            if class == target {
                Label::positive(class)
            } else {
                Label::negative(class)
            }
        })
        .collect()
}
