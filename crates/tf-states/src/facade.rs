//! File-level save, restore and header access.
//!
//! The format is chosen from the file extension (see [`FileFormat`]).
//! Documents are read, modified in memory and written back whole; other
//! entries in the same file are kept. HDF files need the `hdf5` feature.

use std::path::Path;

use serde_yaml::Mapping;

use crate::Metadata;
use crate::array::SolutionArray;
use crate::error::StatesResult;
use crate::format::document::{load_document, save_document};
use crate::format::{Backend, FileFormat};
use crate::store::HierarchicalStore;

impl SolutionArray {
    /// Save all rows to entry `id` of the file at `path`.
    ///
    /// An existing entry with the same id is replaced; other entries are
    /// preserved.
    pub fn save(&mut self, path: impl AsRef<Path>, id: &str, desc: &str) -> StatesResult<()> {
        let path = path.as_ref();
        match FileFormat::from_path(path)? {
            FileFormat::Hierarchical => hdf::save(self, path, id, desc)?,
            FileFormat::Document => {
                let mut root = if path.exists() {
                    load_document(path)?
                } else {
                    Mapping::new()
                };
                self.write_document(&mut root, id, desc)?;
                save_document(path, &root)?;
            }
        }
        tracing::info!("saved {} rows to {} as '{}'", self.size, path.display(), id);
        Ok(())
    }

    /// Replace the contents of this array with entry `id` of the file at `path`.
    ///
    /// On error the array may be partially modified.
    pub fn restore(&mut self, path: impl AsRef<Path>, id: &str) -> StatesResult<()> {
        let path = path.as_ref();
        match FileFormat::from_path(path)? {
            FileFormat::Hierarchical => hdf::restore(self, path, id)?,
            FileFormat::Document => {
                let root = load_document(path)?;
                self.restore_document(&root, id)?;
            }
        }
        tracing::info!(
            "restored {} rows from {} entry '{}'",
            self.size,
            path.display(),
            id
        );
        Ok(())
    }

    /// Header and metadata of entry `id` without loading its data.
    pub fn read_header(path: impl AsRef<Path>, id: &str) -> StatesResult<Metadata> {
        let path = path.as_ref();
        match FileFormat::from_path(path)? {
            FileFormat::Hierarchical => hdf::read_header(path, id),
            FileFormat::Document => {
                let mut root = load_document(path)?;
                Backend::Document(&mut root).read_header(id)
            }
        }
    }

    /// Write header and entry `id` into an in-memory store.
    pub fn save_to_store(
        &mut self,
        store: &mut dyn HierarchicalStore,
        id: &str,
        desc: &str,
    ) -> StatesResult<()> {
        let mut backend = Backend::Hierarchical(store);
        backend.write_header(id, desc)?;
        backend.write_entry(self, id)
    }

    pub fn restore_from_store(&mut self, store: &dyn HierarchicalStore, id: &str) -> StatesResult<()> {
        self.restore_hierarchical(store, id)
    }

    /// Write header and entry `id` into a parsed document.
    pub fn write_document(&mut self, root: &mut Mapping, id: &str, desc: &str) -> StatesResult<()> {
        let mut backend = Backend::Document(root);
        backend.write_header(id, desc)?;
        backend.write_entry(self, id)
    }

    pub fn restore_document(&mut self, root: &Mapping, id: &str) -> StatesResult<()> {
        self.restore_document_entry(root, id)
    }
}

#[cfg(feature = "hdf5")]
mod hdf {
    use std::path::Path;

    use crate::Metadata;
    use crate::array::SolutionArray;
    use crate::error::StatesResult;
    use crate::format::Backend;
    use crate::store::Hdf5Store;

    pub(super) fn save(array: &mut SolutionArray, path: &Path, id: &str, desc: &str) -> StatesResult<()> {
        let mut store = Hdf5Store::open_or_create(path)?;
        array.save_to_store(&mut store, id, desc)
    }

    pub(super) fn restore(array: &mut SolutionArray, path: &Path, id: &str) -> StatesResult<()> {
        let mut store = Hdf5Store::open(path)?;
        Backend::Hierarchical(&mut store).restore(array, id)
    }

    pub(super) fn read_header(path: &Path, id: &str) -> StatesResult<Metadata> {
        let mut store = Hdf5Store::open(path)?;
        Backend::Hierarchical(&mut store).read_header(id)
    }
}

#[cfg(not(feature = "hdf5"))]
mod hdf {
    use std::path::Path;

    use crate::Metadata;
    use crate::array::SolutionArray;
    use crate::error::{StatesError, StatesResult};

    fn disabled(path: &Path) -> StatesError {
        StatesError::UnsupportedFormat {
            what: format!(
                "{}: HDF support requires the 'hdf5' feature of tf-states",
                path.display()
            ),
        }
    }

    pub(super) fn save(_array: &mut SolutionArray, path: &Path, _id: &str, _desc: &str) -> StatesResult<()> {
        Err(disabled(path))
    }

    pub(super) fn restore(_array: &mut SolutionArray, path: &Path, _id: &str) -> StatesResult<()> {
        Err(disabled(path))
    }

    pub(super) fn read_header(path: &Path, _id: &str) -> StatesResult<Metadata> {
        Err(disabled(path))
    }
}
