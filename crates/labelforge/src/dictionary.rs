//! Bidirectional name <-> id map used for labeling function and label names.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LabelModelError, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    ids: HashMap<String, usize>,
    names: HashMap<usize, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary whose ids are assigned `0..n` in iteration order.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut dict = Dictionary::new();
        for (id, name) in names.into_iter().enumerate() {
            dict.put(name, id)?;
        }
        Ok(dict)
    }

    /// Build from names that are distinct by construction, ids `0..n` in
    /// slice order.
    pub(crate) fn from_distinct(names: &[&str]) -> Self {
        let mut dict = Dictionary::new();
        for (id, &name) in names.iter().enumerate() {
            dict.ids.insert(name.to_string(), id);
            dict.names.insert(id, name.to_string());
        }
        dict
    }

    /// Insert a new `(name, id)` pair. Both must be unused.
    pub fn put(&mut self, name: impl Into<String>, id: usize) -> Result<()> {
        let name = name.into();
        if self.ids.contains_key(&name) {
            return Err(LabelModelError::State(format!(
                "name '{}' is already mapped to id {}",
                name, self.ids[&name]
            )));
        }
        if let Some(existing) = self.names.get(&id) {
            return Err(LabelModelError::State(format!(
                "id {} is already mapped to name '{}'",
                id, existing
            )));
        }
        self.ids.insert(name.clone(), id);
        self.names.insert(id, name);
        Ok(())
    }

    pub fn id(&self, name: &str) -> Result<usize> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| LabelModelError::Lookup(format!("unknown name '{}'", name)))
    }

    pub fn label(&self, id: usize) -> Result<&str> {
        self.names
            .get(&id)
            .map(String::as_str)
            .ok_or_else(|| LabelModelError::Lookup(format!("unknown id {}", id)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Names sorted by ascending id.
    pub fn names(&self) -> Vec<&str> {
        let mut ids: Vec<&usize> = self.names.keys().collect();
        ids.sort_unstable();
        ids.into_iter().map(|id| self.names[id].as_str()).collect()
    }

    /// Drop `name` and its id. Only meant for tests: models treat their
    /// dictionaries as immutable once built.
    pub fn remove(&mut self, name: &str) -> Option<usize> {
        let id = self.ids.remove(name)?;
        self.names.remove(&id);
        Some(id)
    }
}
