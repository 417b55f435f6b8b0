//! Full-state mode resolution and state reconstruction.
//!
//! Persisted data names its fields by single-letter state variable codes
//! (`T`, `D`, `P`, `X`, `Y`) plus arbitrary auxiliary names. Restoring picks
//! the first of the phase's full-state modes whose variables are all present:
//! - if every matched variable is native, the fields are copied straight into
//!   the buffer;
//! - otherwise each row is pushed through the phase's explicit setter and
//!   read back with `save_state`, one row at a time since the phase is shared.
//!
//! Fields not consumed by the mode become auxiliary columns.

use std::collections::{BTreeMap, BTreeSet};

use nalgebra::DMatrix;
use tf_core::units::{k, kgm3, pa};
use tf_fluids::{Phase, StateInput};

use crate::array::SolutionArray;
use crate::component::RESERVED_COMPOSITION_NAMES;
use crate::error::{StatesError, StatesResult};

/// Data of one persisted field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldData {
    /// One value per row.
    Vector(Vec<f64>),
    /// One row of `n_species` values per row (composition blocks).
    Matrix(DMatrix<f64>),
}

impl FieldData {
    pub fn rows(&self) -> usize {
        match self {
            FieldData::Vector(v) => v.len(),
            FieldData::Matrix(m) => m.nrows(),
        }
    }
}

/// Named fields loaded from one persisted entry.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: BTreeMap<String, FieldData>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: FieldData) {
        self.fields.insert(name.into(), data);
    }

    pub fn get(&self, name: &str) -> Option<&FieldData> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn scalar(&self, name: &str, row: usize) -> StatesResult<f64> {
        match self.fields.get(name) {
            Some(FieldData::Vector(v)) if row < v.len() => Ok(v[row]),
            Some(_) => Err(unsupported_shape(name)),
            None => Err(StatesError::IncompleteState {
                missing: vec![name.to_string()],
            }),
        }
    }

    fn composition(&self, name: &str, row: usize) -> StatesResult<Vec<f64>> {
        match self.fields.get(name) {
            Some(FieldData::Matrix(m)) if row < m.nrows() => Ok(m.row(row).iter().copied().collect()),
            Some(_) => Err(unsupported_shape(name)),
            None => Err(StatesError::IncompleteState {
                missing: vec![name.to_string()],
            }),
        }
    }
}

impl IntoIterator for FieldSet {
    type Item = (String, FieldData);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldData>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

fn unsupported_shape(name: &str) -> StatesError {
    StatesError::UnsupportedStateMode {
        what: format!("field '{}' has an unsupported shape", name),
    }
}

/// Outcome of matching available fields against a phase's full-state modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateModeResolution {
    /// Chosen full-state mode, e.g. `"TPX"`.
    pub mode: &'static str,
    /// All matched variables are native state variables of the phase.
    pub uses_native: bool,
    /// Field names consumed as state variables.
    pub matched: BTreeSet<String>,
}

/// Pick the first full-state mode of `phase` fully covered by `names`.
pub fn resolve_state_mode(
    phase: &dyn Phase,
    names: &BTreeSet<String>,
) -> Option<StateModeResolution> {
    let native = phase.native_state();
    phase.full_states().into_iter().find_map(|mode| {
        let mut matched = BTreeSet::new();
        let mut uses_native = true;
        for var in mode.chars() {
            let name = var.to_string();
            if !names.contains(&name) {
                return None;
            }
            uses_native &= native.contains_key(name.as_str());
            matched.insert(name);
        }
        Some(StateModeResolution {
            mode,
            uses_native,
            matched,
        })
    })
}

/// Build the explicit setter input for `mode` from row `row` of `fields`.
fn state_input(mode: &str, fields: &FieldSet, row: usize) -> StatesResult<StateInput> {
    let input = match mode {
        "TPX" => StateInput::TPX {
            t: k(fields.scalar("T", row)?),
            p: pa(fields.scalar("P", row)?),
            x: fields.composition("X", row)?,
        },
        "TPY" => StateInput::TPY {
            t: k(fields.scalar("T", row)?),
            p: pa(fields.scalar("P", row)?),
            y: fields.composition("Y", row)?,
        },
        "TDX" => StateInput::TDX {
            t: k(fields.scalar("T", row)?),
            rho: kgm3(fields.scalar("D", row)?),
            x: fields.composition("X", row)?,
        },
        "TDY" => StateInput::TDY {
            t: k(fields.scalar("T", row)?),
            rho: kgm3(fields.scalar("D", row)?),
            y: fields.composition("Y", row)?,
        },
        "DPX" => StateInput::DPX {
            rho: kgm3(fields.scalar("D", row)?),
            p: pa(fields.scalar("P", row)?),
            x: fields.composition("X", row)?,
        },
        "DPY" => StateInput::DPY {
            rho: kgm3(fields.scalar("D", row)?),
            p: pa(fields.scalar("P", row)?),
            y: fields.composition("Y", row)?,
        },
        other => {
            return Err(StatesError::UnsupportedStateMode {
                what: format!("import of '{}' data is not supported", other),
            });
        }
    };
    Ok(input)
}

impl SolutionArray {
    /// Copy a native field straight into its buffer offset for every row.
    pub(crate) fn write_native(&mut self, name: &str, field: &FieldData) -> StatesResult<()> {
        let stride = self.checked_stride()?;
        let (offset, n_species) = {
            let phase = self.phase.borrow();
            let offset = phase.native_state().get(name).copied().ok_or_else(|| {
                StatesError::UnknownComponent {
                    name: name.to_string(),
                }
            })?;
            (offset, phase.n_species())
        };

        let is_composition = RESERVED_COMPOSITION_NAMES.contains(&name);
        match field {
            FieldData::Vector(v) if !is_composition && v.len() == self.size => {
                for (i, value) in v.iter().enumerate() {
                    self.data[i * stride + offset] = *value;
                }
            }
            FieldData::Matrix(m)
                if is_composition && m.nrows() == self.size && m.ncols() == n_species =>
            {
                for i in 0..self.size {
                    for j in 0..n_species {
                        self.data[i * stride + offset + j] = m[(i, j)];
                    }
                }
            }
            _ => return Err(unsupported_shape(name)),
        }
        Ok(())
    }

    /// Fill the buffer from the fields consumed by `resolution`.
    pub(crate) fn apply_state(
        &mut self,
        resolution: &StateModeResolution,
        fields: &FieldSet,
    ) -> StatesResult<()> {
        if resolution.uses_native {
            for name in &resolution.matched {
                let field = fields
                    .get(name)
                    .ok_or_else(|| StatesError::IncompleteState {
                        missing: vec![name.clone()],
                    })?;
                self.write_native(name, field)?;
            }
            return Ok(());
        }

        let stride = self.checked_stride()?;
        tracing::debug!(
            "reconstructing {} rows from '{}' data",
            self.size,
            resolution.mode
        );
        for row in 0..self.size {
            let input = state_input(resolution.mode, fields, row)?;
            let mut phase = self.phase.borrow_mut();
            phase.set_state(input)?;
            phase.save_state(&mut self.data[row * stride..(row + 1) * stride])?;
        }
        Ok(())
    }

    /// Apply `resolution` and keep every unconsumed vector field as an auxiliary column.
    pub(crate) fn restore_resolved(
        &mut self,
        resolution: &StateModeResolution,
        fields: FieldSet,
    ) -> StatesResult<()> {
        tracing::debug!(
            "restoring '{}' data (native: {})",
            resolution.mode,
            resolution.uses_native
        );
        self.apply_state(resolution, &fields)?;
        self.keep_auxiliary(&resolution.matched, fields)
    }

    /// Store every vector field outside `matched` as an auxiliary column.
    pub(crate) fn keep_auxiliary(
        &mut self,
        matched: &BTreeSet<String>,
        fields: FieldSet,
    ) -> StatesResult<()> {
        for (name, field) in fields {
            if matched.contains(&name) {
                continue;
            }
            match field {
                FieldData::Vector(values) => self.insert_auxiliary(&name, values)?,
                FieldData::Matrix(_) => {
                    tracing::warn!("skipping unused composition field '{}'", name);
                }
            }
        }
        Ok(())
    }
}
