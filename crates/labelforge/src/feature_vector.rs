use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice::Iter;

use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::error::{LabelModelError, Result};

/// Fixed-length vector with one cell per dictionary entry.
///
/// Cell `i` holds the value associated with the `i`-th entry of the
/// [`Dictionary`](crate::dictionary::Dictionary) the vector was built for:
/// raw labeling function outputs (`FeatureVector<i32>`) or derived scores
/// (`FeatureVector<f64>`). The length never changes after construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector<T> {
    data: Vec<T>,
}

impl<T> FeatureVector<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.data.get(index).ok_or_else(|| {
            LabelModelError::Lookup(format!(
                "index {} out of range for vector of length {}",
                index,
                self.data.len()
            ))
        })
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.data.len();
        match self.data.get_mut(index) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(LabelModelError::Lookup(format!(
                "index {} out of range for vector of length {}",
                index, len
            ))),
        }
    }

    pub fn mapv<U, F>(&self, f: F) -> FeatureVector<U>
    where
        F: FnMut(&T) -> U,
    {
        FeatureVector::from_vec(self.data.iter().map(f).collect())
    }
}

impl<T> FeatureVector<T>
where
    T: Clone + Zero,
{
    pub fn new(len: usize) -> Self {
        FeatureVector::from_vec(vec![T::zero(); len])
    }
}

impl<T> FeatureVector<T>
where
    T: Clone,
{
    pub fn from_elem(len: usize, value: T) -> Self {
        FeatureVector::from_vec(vec![value; len])
    }
}

impl FeatureVector<f64> {
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Largest cell, ignoring NaN. `None` for an empty vector.
    pub fn max(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

impl<T> From<Vec<T>> for FeatureVector<T> {
    fn from(value: Vec<T>) -> Self {
        FeatureVector::from_vec(value)
    }
}

impl<T> FromIterator<T> for FeatureVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        FeatureVector::from_vec(iter.into_iter().collect())
    }
}

impl<T> Index<usize> for FeatureVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for FeatureVector<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T: fmt::Display> fmt::Display for FeatureVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, value) in self.data.iter().enumerate() {
            write!(f, "{}", value)?;
            if idx + 1 != self.data.len() {
                write!(f, ", ")?;
            }
        }
        write!(f, "]")
    }
}
