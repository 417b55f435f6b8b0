//! Persisted formats and extension-based dispatch.

pub mod document;
pub mod header;
pub mod hierarchical;

use std::path::Path;

use serde_yaml::Mapping;

use crate::Metadata;
use crate::array::SolutionArray;
use crate::error::{StatesError, StatesResult};
use crate::store::HierarchicalStore;

/// File format selected from a path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.h5` / `.hdf`
    Hierarchical,
    /// `.yaml` / `.yml`
    Document,
}

impl FileFormat {
    /// Match the lowercase extension of `path`.
    pub fn from_path(path: &Path) -> StatesResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "h5" | "hdf" => Ok(FileFormat::Hierarchical),
            "yaml" | "yml" => Ok(FileFormat::Document),
            _ => Err(StatesError::UnsupportedFormat {
                what: format!(
                    "unknown file extension '{}' for {}",
                    extension,
                    path.display()
                ),
            }),
        }
    }
}

/// An opened persisted container, one variant per format.
pub enum Backend<'a> {
    Hierarchical(&'a mut dyn HierarchicalStore),
    Document(&'a mut Mapping),
}

impl Backend<'_> {
    /// Write the provenance header for entry `id`.
    ///
    /// For documents, an existing entry is cleared in place.
    pub fn write_header(&mut self, id: &str, desc: &str) -> StatesResult<()> {
        match self {
            Backend::Hierarchical(store) => hierarchical::write_header(&mut **store, id, desc),
            Backend::Document(root) => document::write_header(root, id, desc),
        }
    }

    pub fn write_entry(&mut self, array: &mut SolutionArray, id: &str) -> StatesResult<()> {
        match self {
            Backend::Hierarchical(store) => array.write_hierarchical_entry(&mut **store, id),
            Backend::Document(root) => array.write_document_entry(root, id),
        }
    }

    pub fn read_header(&self, id: &str) -> StatesResult<Metadata> {
        match self {
            Backend::Hierarchical(store) => hierarchical::read_header(&**store, id),
            Backend::Document(root) => document::read_header(root, id),
        }
    }

    pub fn restore(&self, array: &mut SolutionArray, id: &str) -> StatesResult<()> {
        match self {
            Backend::Hierarchical(store) => array.restore_hierarchical(&**store, id),
            Backend::Document(root) => array.restore_document_entry(root, id),
        }
    }
}
