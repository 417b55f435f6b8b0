//! Packed state storage.
//!
//! A [`SolutionArray`] stores `size` rows of `stride` values each in one
//! contiguous buffer, where `stride` is the phase's native state size. Row `k`
//! holds the phase's native state vector for entry `k`, with the species block
//! in the trailing `n_species` slots. Auxiliary columns hold per-row scalars
//! with no equation-of-state meaning.

use std::collections::BTreeMap;

use tf_fluids::SharedPhase;

use crate::Metadata;
use crate::error::{StatesError, StatesResult};

/// Packed collection of thermodynamic states for one phase.
///
/// The phase is shared, not owned. Moving the cursor (see
/// [`set_index`](SolutionArray::set_index)) and restoring legacy data both
/// overwrite the phase's internal state, which every other holder of the
/// same [`SharedPhase`] observes.
pub struct SolutionArray {
    pub(crate) phase: SharedPhase,
    pub(crate) size: usize,
    pub(crate) stride: usize,
    pub(crate) data: Vec<f64>,
    pub(crate) extra: BTreeMap<String, Vec<f64>>,
    pub(crate) meta: Metadata,
    pub(crate) index: Option<usize>,
}

impl SolutionArray {
    /// Create an array of `size` entries for `phase`.
    ///
    /// The buffer is not allocated until [`initialize`](Self::initialize).
    pub fn new(phase: SharedPhase, size: usize, meta: Metadata) -> StatesResult<Self> {
        {
            let p = phase.borrow();
            let n_state = p.state_size();
            if n_state == 0 {
                return Err(StatesError::Configuration {
                    what: format!(
                        "unable to create SolutionArray from phase '{}' with an empty state",
                        p.name()
                    ),
                });
            }
            if p.n_species() > n_state {
                return Err(StatesError::Configuration {
                    what: format!(
                        "phase '{}' reports {} species but a state size of {}",
                        p.name(),
                        p.n_species(),
                        n_state
                    ),
                });
            }
        }

        Ok(Self {
            phase,
            size,
            stride: 0,
            data: Vec::new(),
            extra: BTreeMap::new(),
            meta,
            index: None,
        })
    }

    /// Allocate the zeroed state buffer and the named auxiliary columns.
    ///
    /// Previously held auxiliary columns are dropped and the cursor is unset.
    ///
    /// Fails if `size * state_size` overflows; the array is then left
    /// uninitialized.
    pub fn initialize(&mut self, extra: &[&str]) -> StatesResult<()> {
        let stride = self.phase.borrow().state_size();
        self.index = None;
        let Some(len) = self.size.checked_mul(stride) else {
            self.stride = 0;
            self.data = Vec::new();
            self.extra.clear();
            return Err(StatesError::Configuration {
                what: format!(
                    "{} rows of {} values exceed the addressable buffer size",
                    self.size, stride
                ),
            });
        };
        self.stride = stride;
        self.data = vec![0.0; len];
        self.extra = extra
            .iter()
            .map(|name| (name.to_string(), vec![0.0; self.size]))
            .collect();
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of values per row; zero before initialization.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn is_initialized(&self) -> bool {
        self.stride > 0
    }

    /// Shared handle to the phase.
    pub fn phase(&self) -> SharedPhase {
        self.phase.clone()
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }

    /// Row currently loaded into the phase, if any.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn auxiliary_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.extra.keys().map(String::as_str)
    }

    /// Raw buffer row `i`.
    pub fn row(&self, i: usize) -> StatesResult<&[f64]> {
        let stride = self.checked_stride()?;
        if i >= self.size {
            return Err(StatesError::IndexOutOfRange {
                index: i,
                size: self.size,
            });
        }
        Ok(&self.data[i * stride..(i + 1) * stride])
    }

    /// Resize and re-initialize without auxiliary columns (restore entry point).
    pub(crate) fn reset(&mut self, size: usize) -> StatesResult<()> {
        self.size = size;
        self.initialize(&[])
    }

    pub(crate) fn checked_stride(&self) -> StatesResult<usize> {
        if !self.is_initialized() {
            return Err(StatesError::Configuration {
                what: "SolutionArray is not initialized".to_string(),
            });
        }
        Ok(self.stride)
    }

    /// Insert or replace an auxiliary column; `values` must hold `size` entries.
    pub(crate) fn insert_auxiliary(&mut self, name: &str, values: Vec<f64>) -> StatesResult<()> {
        if values.len() != self.size {
            return Err(StatesError::SizeMismatch {
                name: name.to_string(),
                expected: self.size,
                actual: values.len(),
            });
        }
        self.extra.insert(name.to_string(), values);
        Ok(())
    }
}

impl std::fmt::Debug for SolutionArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolutionArray")
            .field("phase", &self.phase.borrow().name())
            .field("size", &self.size)
            .field("stride", &self.stride)
            .field("auxiliary", &self.extra.keys().collect::<Vec<_>>())
            .field("index", &self.index)
            .finish()
    }
}
