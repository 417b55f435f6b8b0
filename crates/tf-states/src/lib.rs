//! tf-states: packed arrays of thermodynamic states and their persistence.
//!
//! Provides:
//! - [`SolutionArray`]: `size` rows of a phase's native state vector in one
//!   buffer, plus auxiliary per-row columns and free-form metadata
//! - Named component access (`T`, `D`, species names, auxiliary names)
//! - A cursor that loads one row into the shared phase
//! - Save/restore to structured YAML documents and hierarchical stores
//!   (in memory, or HDF5 files with the `hdf5` feature), including data
//!   written in older layouts
//!
//! # Concurrency
//!
//! A [`SolutionArray`] and its phase share one mutable model through
//! [`SharedPhase`](tf_fluids::SharedPhase). Neither is `Send`; keep each
//! array and its phase on one thread. Document parses are cached per thread.
//!
//! # Example
//!
//! ```
//! use tf_fluids::{IdealGasMixture, Species, into_shared};
//! use tf_states::{Metadata, SolutionArray};
//!
//! let gas = IdealGasMixture::new(vec![Species::H2, Species::O2]).unwrap();
//! let mut states = SolutionArray::new(into_shared(gas), 3, Metadata::new()).unwrap();
//! states.initialize(&[]).unwrap();
//! states.set_component("T", &[300.0, 600.0, 900.0], false).unwrap();
//! states.set_component("grid", &[0.0, 0.5, 1.0], true).unwrap();
//!
//! let mut doc = serde_yaml::Mapping::new();
//! states.write_document(&mut doc, "flame", "demo").unwrap();
//!
//! let gas = IdealGasMixture::new(vec![Species::H2, Species::O2]).unwrap();
//! let mut restored = SolutionArray::new(into_shared(gas), 0, Metadata::new()).unwrap();
//! restored.restore_document(&doc, "flame").unwrap();
//! assert_eq!(restored.get_component("T").unwrap(), vec![300.0, 600.0, 900.0]);
//! ```

pub mod array;
pub mod component;
pub mod cursor;
pub mod error;
pub mod facade;
pub mod format;
mod legacy;
pub mod resolver;
pub mod store;

use std::collections::BTreeMap;

/// Free-form key/value metadata attached to an array or entry.
pub type Metadata = BTreeMap<String, serde_yaml::Value>;

pub use array::SolutionArray;
pub use component::{RESERVED_COLUMN_NAMES, RESERVED_COMPOSITION_NAMES};
pub use error::{StatesError, StatesResult};
pub use format::document::{clear_cached_document, load_document};
pub use format::header::{GENERATOR, Header};
pub use format::{Backend, FileFormat};
pub use resolver::{FieldData, FieldSet, StateModeResolution, resolve_state_mode};
pub use store::{DatasetInfo, HierarchicalStore, MemoryStore, group_path};
#[cfg(feature = "hdf5")]
pub use store::Hdf5Store;
