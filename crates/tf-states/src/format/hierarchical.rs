//! Hierarchical attributed store adapter.
//!
//! An entry is a group: metadata become group attributes, native state
//! variables become datasets named by their codes (`T`, `D`, ...), the
//! composition block becomes one `size x n_species` dataset, and each
//! auxiliary column becomes a dataset of its own.

use std::collections::BTreeSet;

use nalgebra::DMatrix;

use crate::Metadata;
use crate::array::SolutionArray;
use crate::component::RESERVED_COMPOSITION_NAMES;
use crate::error::{StatesError, StatesResult};
use crate::format::header::{HEADER_KEYS, Header};
use crate::resolver::{FieldData, FieldSet, resolve_state_mode};
use crate::store::{HierarchicalStore, group_path};

pub(crate) fn write_header(
    store: &mut dyn HierarchicalStore,
    id: &str,
    desc: &str,
) -> StatesResult<()> {
    let path = group_path(id);
    if path.is_empty() {
        return Err(StatesError::Structural { path: "/".into() });
    }
    store.ensure_group(&path)?;
    store.clear_group(&path)?;
    store.write_attributes(&path, &Header::new(desc).to_metadata())
}

pub(crate) fn read_header(store: &dyn HierarchicalStore, id: &str) -> StatesResult<Metadata> {
    let path = group_path(id);
    if !store.has_group(&path) {
        return Err(StatesError::Structural {
            path: format!("/{}", path),
        });
    }
    store.read_attributes(&path)
}

fn shape_error(name: &str, shape: &[usize]) -> StatesError {
    StatesError::UnsupportedStateMode {
        what: format!("dataset '{}' has unsupported shape {:?}", name, shape),
    }
}

impl SolutionArray {
    pub(crate) fn write_hierarchical_entry(
        &mut self,
        store: &mut dyn HierarchicalStore,
        id: &str,
    ) -> StatesResult<()> {
        let (native, n_species) = {
            let phase = self.phase.borrow();
            (phase.native_state(), phase.n_species())
        };
        if let Some(name) = self
            .extra
            .keys()
            .find(|name| native.contains_key(name.as_str()) || RESERVED_COMPOSITION_NAMES.contains(&name.as_str()))
        {
            return Err(StatesError::Configuration {
                what: format!("auxiliary column '{}' collides with a state dataset", name),
            });
        }
        let path = group_path(id);
        store.ensure_group(&path)?;

        let meta: Metadata = self
            .meta
            .iter()
            .filter(|(key, _)| !HEADER_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        store.write_attributes(&path, &meta)?;

        let stride = self.checked_stride()?;
        for (name, offset) in native {
            if RESERVED_COMPOSITION_NAMES.contains(&name) {
                let block = DMatrix::from_fn(self.size, n_species, |i, j| {
                    self.data[i * stride + offset + j]
                });
                store.write_matrix(&path, name, &block)?;
            } else {
                let column: Vec<f64> = (0..self.size)
                    .map(|i| self.data[i * stride + offset])
                    .collect();
                store.write_vector(&path, name, &column)?;
            }
        }
        for (name, column) in &self.extra {
            store.write_vector(&path, name, column)?;
        }
        tracing::debug!("wrote {} rows to group '/{}'", self.size, path);
        Ok(())
    }

    pub(crate) fn restore_hierarchical(
        &mut self,
        store: &dyn HierarchicalStore,
        id: &str,
    ) -> StatesResult<()> {
        let path = group_path(id);
        if !store.has_group(&path) {
            return Err(StatesError::Structural {
                path: format!("/{}", path),
            });
        }

        let datasets = store.datasets(&path)?;
        let size = match datasets.iter().min_by_key(|d| d.rank()) {
            Some(d) if d.rank() == 1 => d.shape[0],
            Some(d) => {
                return Err(StatesError::UnsupportedStateMode {
                    what: format!(
                        "unable to restore SolutionArray with {} dimensions",
                        d.rank()
                    ),
                });
            }
            None => 0,
        };
        self.reset(size)?;
        self.meta = store.read_attributes(&path)?;
        if size == 0 {
            return Ok(());
        }

        let names: BTreeSet<String> = datasets.iter().map(|d| d.name.clone()).collect();
        let (resolution, n_species) = {
            let phase = self.phase.borrow();
            let resolution = resolve_state_mode(&*phase, &names).ok_or_else(|| {
                StatesError::UnsupportedStateMode {
                    what: "data are not consistent with full state modes".to_string(),
                }
            })?;
            (resolution, phase.n_species())
        };

        let mut fields = FieldSet::new();
        for d in &datasets {
            let name = d.name.as_str();
            let is_composition = RESERVED_COMPOSITION_NAMES.contains(&name);
            let data = match d.shape.as_slice() {
                &[rows, cols] if is_composition && rows == size && cols == n_species => {
                    FieldData::Matrix(store.read_matrix(&path, name)?)
                }
                &[rows] if !is_composition && rows == size => {
                    FieldData::Vector(store.read_vector(&path, name)?)
                }
                shape => return Err(shape_error(name, shape)),
            };
            fields.insert(name, data);
        }
        self.restore_resolved(&resolution, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tf_fluids::{IdealGasMixture, Species, into_shared};

    fn array(size: usize) -> SolutionArray {
        let gas = IdealGasMixture::new(vec![Species::H2, Species::O2, Species::N2]).unwrap();
        SolutionArray::new(into_shared(gas), size, Metadata::new()).unwrap()
    }

    #[test]
    fn writes_one_dataset_per_native_variable() {
        let mut arr = array(2);
        arr.set_component("T", &[300.0, 400.0], false).unwrap();
        arr.set_component("grid", &[0.0, 1.0], true).unwrap();

        let mut store = MemoryStore::new();
        arr.write_hierarchical_entry(&mut store, "run").unwrap();

        let shapes: Vec<(String, Vec<usize>)> = store
            .datasets("run")
            .unwrap()
            .into_iter()
            .map(|d| (d.name, d.shape))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ("D".to_string(), vec![2]),
                ("T".to_string(), vec![2]),
                ("Y".to_string(), vec![2, 3]),
                ("grid".to_string(), vec![2]),
            ]
        );
        assert_eq!(store.read_vector("run", "T").unwrap(), vec![300.0, 400.0]);
    }

    #[test]
    fn columns_shadowing_state_datasets_are_refused() {
        let mut arr = array(2);
        arr.initialize(&["T"]).unwrap();
        let mut store = MemoryStore::new();
        assert!(matches!(
            arr.write_hierarchical_entry(&mut store, "run"),
            Err(StatesError::Configuration { .. })
        ));
        assert!(!store.has_group("run"));
    }

    #[test]
    fn header_lands_in_group_attributes() {
        let mut store = MemoryStore::new();
        write_header(&mut store, "/a/b", "demo").unwrap();
        let header = read_header(&store, "a/b").unwrap();
        assert_eq!(header["description"], serde_yaml::Value::from("demo"));
        assert!(matches!(
            read_header(&store, "a/c"),
            Err(StatesError::Structural { .. })
        ));
    }

    #[test]
    fn header_replaces_previous_group_contents() {
        let mut store = MemoryStore::new();
        store.ensure_group("a").unwrap();
        store.write_vector("a", "grid", &[0.0, 1.0]).unwrap();
        let mut old = Metadata::new();
        old.insert("stale".into(), 1.into());
        store.write_attributes("a", &old).unwrap();

        write_header(&mut store, "a", "fresh").unwrap();
        assert!(store.datasets("a").unwrap().is_empty());
        assert!(!read_header(&store, "a").unwrap().contains_key("stale"));
        assert!(matches!(
            write_header(&mut store, "/", "root"),
            Err(StatesError::Structural { path }) if path == "/"
        ));
    }

    #[test]
    fn high_rank_datasets_are_rejected() {
        let mut store = MemoryStore::new();
        store
            .insert_dataset("g", "T", vec![1, 2], vec![300.0, 400.0])
            .unwrap();
        let err = array(0).restore_hierarchical(&store, "g").unwrap_err();
        assert!(err.to_string().contains("2 dimensions"));
    }
}
