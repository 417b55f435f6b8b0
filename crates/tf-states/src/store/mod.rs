//! Hierarchical attributed stores.
//!
//! A store is a tree of groups addressed by slash-separated paths. Each group
//! carries scalar attributes and named floating-point datasets of rank one or
//! two. [`MemoryStore`] keeps everything in memory; `Hdf5Store` (feature
//! `hdf5`) maps the same operations onto an HDF5 file.

mod memory;
#[cfg(feature = "hdf5")]
mod hdf5_file;

pub use memory::MemoryStore;
#[cfg(feature = "hdf5")]
pub use hdf5_file::Hdf5Store;

use nalgebra::DMatrix;

use crate::Metadata;
use crate::error::StatesResult;

/// Name and shape of a dataset inside a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInfo {
    pub name: String,
    pub shape: Vec<usize>,
}

impl DatasetInfo {
    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

pub trait HierarchicalStore {
    /// Create the group at `path`, including missing parents.
    fn ensure_group(&mut self, path: &str) -> StatesResult<()>;

    fn has_group(&self, path: &str) -> bool;

    /// Drop every attribute and dataset of an existing group. Child groups
    /// are kept.
    fn clear_group(&mut self, path: &str) -> StatesResult<()>;

    /// Add or replace attributes on an existing group.
    fn write_attributes(&mut self, path: &str, attrs: &Metadata) -> StatesResult<()>;

    fn read_attributes(&self, path: &str) -> StatesResult<Metadata>;

    /// Datasets directly inside the group, sorted by name.
    fn datasets(&self, path: &str) -> StatesResult<Vec<DatasetInfo>>;

    /// Write a rank-one dataset, replacing any dataset of the same name.
    fn write_vector(&mut self, path: &str, name: &str, data: &[f64]) -> StatesResult<()>;

    /// Write a rank-two dataset, replacing any dataset of the same name.
    fn write_matrix(&mut self, path: &str, name: &str, data: &DMatrix<f64>) -> StatesResult<()>;

    fn read_vector(&self, path: &str, name: &str) -> StatesResult<Vec<f64>>;

    fn read_matrix(&self, path: &str, name: &str) -> StatesResult<DMatrix<f64>>;
}

/// Normalize an entry id into a store path (`"/a//b/"` becomes `"a/b"`).
pub fn group_path(id: &str) -> String {
    id.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_paths_are_normalized() {
        assert_eq!(group_path("/a//b/"), "a/b");
        assert_eq!(group_path("solution"), "solution");
        assert_eq!(group_path("/"), "");
        assert_eq!(group_path(""), "");
    }
}
