use std::collections::BTreeMap;

use nalgebra::DMatrix;

use super::{DatasetInfo, HierarchicalStore, group_path};
use crate::Metadata;
use crate::error::{StatesError, StatesResult};

#[derive(Debug, Clone, Default, PartialEq)]
struct Dataset {
    shape: Vec<usize>,
    /// Row-major values.
    values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Group {
    attrs: Metadata,
    datasets: BTreeMap<String, Dataset>,
}

/// In-memory [`HierarchicalStore`].
///
/// Groups are keyed by their normalized path; the root group (`""`) always
/// exists.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore {
    groups: BTreeMap<String, Group>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(String::new(), Group::default());
        Self { groups }
    }

    /// Insert a raw dataset of arbitrary shape, creating the group if needed.
    ///
    /// Useful for mimicking files written by other tools.
    pub fn insert_dataset(
        &mut self,
        path: &str,
        name: &str,
        shape: Vec<usize>,
        values: Vec<f64>,
    ) -> StatesResult<()> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(StatesError::SizeMismatch {
                name: name.to_string(),
                expected,
                actual: values.len(),
            });
        }
        self.ensure_group(path)?;
        self.group_mut(path)?
            .datasets
            .insert(name.to_string(), Dataset { shape, values });
        Ok(())
    }

    fn group(&self, path: &str) -> StatesResult<&Group> {
        let key = group_path(path);
        self.groups
            .get(&key)
            .ok_or_else(|| StatesError::Structural {
                path: format!("/{}", key),
            })
    }

    fn group_mut(&mut self, path: &str) -> StatesResult<&mut Group> {
        let key = group_path(path);
        let missing = StatesError::Structural {
            path: format!("/{}", key),
        };
        self.groups.get_mut(&key).ok_or(missing)
    }

    fn dataset(&self, path: &str, name: &str) -> StatesResult<&Dataset> {
        self.group(path)?
            .datasets
            .get(name)
            .ok_or_else(|| StatesError::Structural {
                path: format!("/{}/{}", group_path(path), name),
            })
    }
}

impl HierarchicalStore for MemoryStore {
    fn ensure_group(&mut self, path: &str) -> StatesResult<()> {
        let key = group_path(path);
        let mut prefix = String::new();
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            self.groups.entry(prefix.clone()).or_default();
        }
        Ok(())
    }

    fn has_group(&self, path: &str) -> bool {
        self.groups.contains_key(&group_path(path))
    }

    fn clear_group(&mut self, path: &str) -> StatesResult<()> {
        let group = self.group_mut(path)?;
        group.attrs.clear();
        group.datasets.clear();
        Ok(())
    }

    fn write_attributes(&mut self, path: &str, attrs: &Metadata) -> StatesResult<()> {
        let group = self.group_mut(path)?;
        for (key, value) in attrs {
            group.attrs.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn read_attributes(&self, path: &str) -> StatesResult<Metadata> {
        Ok(self.group(path)?.attrs.clone())
    }

    fn datasets(&self, path: &str) -> StatesResult<Vec<DatasetInfo>> {
        Ok(self
            .group(path)?
            .datasets
            .iter()
            .map(|(name, dataset)| DatasetInfo {
                name: name.clone(),
                shape: dataset.shape.clone(),
            })
            .collect())
    }

    fn write_vector(&mut self, path: &str, name: &str, data: &[f64]) -> StatesResult<()> {
        self.group_mut(path)?.datasets.insert(
            name.to_string(),
            Dataset {
                shape: vec![data.len()],
                values: data.to_vec(),
            },
        );
        Ok(())
    }

    fn write_matrix(&mut self, path: &str, name: &str, data: &DMatrix<f64>) -> StatesResult<()> {
        // nalgebra is column-major; datasets are row-major.
        let values = data.transpose().as_slice().to_vec();
        self.group_mut(path)?.datasets.insert(
            name.to_string(),
            Dataset {
                shape: vec![data.nrows(), data.ncols()],
                values,
            },
        );
        Ok(())
    }

    fn read_vector(&self, path: &str, name: &str) -> StatesResult<Vec<f64>> {
        let dataset = self.dataset(path, name)?;
        if dataset.shape.len() != 1 {
            return Err(StatesError::UnsupportedStateMode {
                what: format!("dataset '{}' is not one-dimensional", name),
            });
        }
        Ok(dataset.values.clone())
    }

    fn read_matrix(&self, path: &str, name: &str) -> StatesResult<DMatrix<f64>> {
        let dataset = self.dataset(path, name)?;
        match dataset.shape.as_slice() {
            [rows, cols] => Ok(DMatrix::from_row_slice(*rows, *cols, &dataset.values)),
            _ => Err(StatesError::UnsupportedStateMode {
                what: format!("dataset '{}' is not two-dimensional", name),
            }),
        }
    }
}
