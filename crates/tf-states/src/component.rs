//! Named component access into the state buffer.
//!
//! A component name resolves to one of:
//! - an auxiliary column,
//! - a species, stored at `(stride - n_species) + species_index` in every row,
//! - a native state variable, stored at the phase's native offset.
//!
//! The reserved names `X` and `Y` denote whole composition vectors and are
//! never components.

use tf_fluids::Phase;

use crate::array::SolutionArray;
use crate::error::{StatesError, StatesResult};

/// Names reserved for whole composition vectors.
pub const RESERVED_COMPOSITION_NAMES: [&str; 2] = ["X", "Y"];

/// Keys that stored entries use for their own data; auxiliary columns may
/// not take these names.
pub const RESERVED_COLUMN_NAMES: [&str; 7] = [
    "points",
    "temperature",
    "density",
    "pressure",
    "mass-fractions",
    "mole-fractions",
    "coverages",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Auxiliary,
    Offset(usize),
}

fn buffer_offset(phase: &dyn Phase, stride: usize, name: &str) -> Option<usize> {
    if let Some(ix) = phase.species_index(name) {
        return Some(stride - phase.n_species() + ix);
    }
    if RESERVED_COMPOSITION_NAMES.contains(&name) {
        return None;
    }
    phase.native_state().get(name).copied()
}

impl SolutionArray {
    fn resolve(&self, name: &str) -> Option<Slot> {
        if self.extra.contains_key(name) {
            return Some(Slot::Auxiliary);
        }
        let phase = self.phase.borrow();
        let stride = phase.state_size();
        buffer_offset(&*phase, stride, name).map(Slot::Offset)
    }

    /// True for auxiliary columns, species names and native state variables.
    pub fn has_component(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Values of component `name` for every row.
    pub fn get_component(&self, name: &str) -> StatesResult<Vec<f64>> {
        match self.resolve(name) {
            None => Err(StatesError::UnknownComponent {
                name: name.to_string(),
            }),
            Some(Slot::Auxiliary) => Ok(self.extra[name].clone()),
            Some(Slot::Offset(ix)) => {
                let stride = self.checked_stride()?;
                Ok((0..self.size).map(|k| self.data[k * stride + ix]).collect())
            }
        }
    }

    /// Overwrite component `name` for every row.
    ///
    /// Unknown names create a new auxiliary column when `force` is set and
    /// fail otherwise; names in [`RESERVED_COLUMN_NAMES`] are refused. `data`
    /// must hold exactly `size()` values; nothing is modified if it does not.
    pub fn set_component(&mut self, name: &str, data: &[f64], force: bool) -> StatesResult<()> {
        if data.len() != self.size {
            return Err(StatesError::SizeMismatch {
                name: name.to_string(),
                expected: self.size,
                actual: data.len(),
            });
        }

        let slot = self.resolve(name);
        if slot.is_none() && force && RESERVED_COLUMN_NAMES.contains(&name) {
            return Err(StatesError::Configuration {
                what: format!("'{}' is reserved and cannot name an auxiliary column", name),
            });
        }
        match slot {
            None if force && !RESERVED_COMPOSITION_NAMES.contains(&name) => {
                tracing::debug!("creating auxiliary column '{}'", name);
                self.extra.insert(name.to_string(), data.to_vec());
                Ok(())
            }
            None => Err(StatesError::UnknownComponent {
                name: name.to_string(),
            }),
            Some(Slot::Auxiliary) => {
                if let Some(column) = self.extra.get_mut(name) {
                    column.copy_from_slice(data);
                }
                Ok(())
            }
            Some(Slot::Offset(ix)) => {
                let stride = self.checked_stride()?;
                for (k, value) in data.iter().enumerate() {
                    self.data[k * stride + ix] = *value;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Metadata;
    use tf_fluids::{IdealGasMixture, Species, into_shared};

    fn array(size: usize) -> SolutionArray {
        let gas = IdealGasMixture::new(vec![Species::H2, Species::O2]).unwrap();
        let mut arr = SolutionArray::new(into_shared(gas), size, Metadata::new()).unwrap();
        arr.initialize(&["grid"]).unwrap();
        arr
    }

    #[test]
    fn resolves_names() {
        let arr = array(3);
        assert!(arr.has_component("grid"));
        assert!(arr.has_component("H2"));
        assert!(arr.has_component("T"));
        assert!(arr.has_component("D"));
        assert!(!arr.has_component("P"));
        assert!(!arr.has_component("velocity"));
        for reserved in RESERVED_COMPOSITION_NAMES {
            assert!(!arr.has_component(reserved));
            assert!(arr.get_component(reserved).is_err());
        }
    }

    #[test]
    fn species_live_in_trailing_block() {
        let mut arr = array(2);
        arr.set_component("O2", &[0.9, 0.8], false).unwrap();
        arr.set_component("T", &[300.0, 400.0], false).unwrap();
        assert_eq!(arr.row(0).unwrap(), &[300.0, 0.0, 0.0, 0.9]);
        assert_eq!(arr.row(1).unwrap(), &[400.0, 0.0, 0.0, 0.8]);
        assert_eq!(arr.get_component("O2").unwrap(), vec![0.9, 0.8]);
    }

    #[test]
    fn auxiliary_writes_stay_in_column() {
        let mut arr = array(2);
        arr.set_component("grid", &[0.0, 0.5], false).unwrap();
        assert_eq!(arr.get_component("grid").unwrap(), vec![0.0, 0.5]);
        assert_eq!(arr.row(1).unwrap(), &[0.0; 4]);
    }

    #[test]
    fn unknown_components_need_force() {
        let mut arr = array(2);
        assert!(matches!(
            arr.set_component("velocity", &[1.0, 2.0], false),
            Err(StatesError::UnknownComponent { .. })
        ));
        arr.set_component("velocity", &[1.0, 2.0], true).unwrap();
        assert!(arr.has_component("velocity"));
        assert_eq!(arr.get_component("velocity").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn entry_keys_cannot_become_columns() {
        let mut arr = array(2);
        for name in RESERVED_COLUMN_NAMES {
            assert!(matches!(
                arr.set_component(name, &[1.0, 2.0], true),
                Err(StatesError::Configuration { .. })
            ));
            assert!(!arr.has_component(name));
        }
    }

    #[test]
    fn wrong_length_leaves_state_unmodified() {
        let mut arr = array(2);
        arr.set_component("T", &[300.0, 310.0], false).unwrap();
        for force in [false, true] {
            assert!(matches!(
                arr.set_component("T", &[1.0], force),
                Err(StatesError::SizeMismatch { .. })
            ));
            assert!(arr.set_component("velocity", &[1.0, 2.0, 3.0], force).is_err());
        }
        assert_eq!(arr.get_component("T").unwrap(), vec![300.0, 310.0]);
        assert!(!arr.has_component("velocity"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::Metadata;
    use proptest::prelude::*;
    use tf_fluids::{IdealGasMixture, Species, into_shared};

    proptest! {
        #[test]
        fn set_then_get_returns_data(
            name in prop::sample::select(vec!["T", "D", "H2", "O2", "N2", "grid", "other"]),
            data in prop::collection::vec(-1.0e6_f64..1.0e6, 3),
            force in any::<bool>(),
        ) {
            let gas = IdealGasMixture::new(vec![Species::H2, Species::O2, Species::N2]).unwrap();
            let mut arr = SolutionArray::new(into_shared(gas), 3, Metadata::new()).unwrap();
            arr.initialize(&["grid"]).unwrap();

            let known = arr.has_component(name);
            let result = arr.set_component(name, &data, force);
            prop_assert_eq!(result.is_ok(), known || force);
            if result.is_ok() {
                prop_assert!(arr.has_component(name));
                prop_assert_eq!(arr.get_component(name).unwrap(), data);
            } else {
                prop_assert!(arr.get_component(name).is_err());
            }
        }
    }
}
