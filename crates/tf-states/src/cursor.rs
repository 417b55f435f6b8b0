//! Cursor: keeps the shared phase in sync with one buffer row.

use std::collections::BTreeMap;

use crate::array::SolutionArray;
use crate::error::{StatesError, StatesResult};

impl SolutionArray {
    /// Load row `index` into the phase.
    ///
    /// `None` keeps the current row and fails if no row was loaded yet.
    /// Selecting the row that is already loaded does not touch the phase.
    pub fn set_index(&mut self, index: impl Into<Option<usize>>) -> StatesResult<()> {
        if self.size == 0 {
            return Err(StatesError::InvalidIndex {
                what: "unable to set index in empty SolutionArray",
            });
        }

        let index = match index.into() {
            None if self.index.is_none() => {
                return Err(StatesError::InvalidIndex {
                    what: "both current and requested indices are unset",
                });
            }
            None => return Ok(()),
            Some(i) if Some(i) == self.index => return Ok(()),
            Some(i) if i >= self.size => {
                return Err(StatesError::IndexOutOfRange {
                    index: i,
                    size: self.size,
                });
            }
            Some(i) => i,
        };

        let stride = self.checked_stride()?;
        self.phase
            .borrow_mut()
            .restore_state(&self.data[index * stride..(index + 1) * stride])?;
        self.index = Some(index);
        Ok(())
    }

    /// Native state of row `index` as reported back by the phase.
    pub fn get_state(&mut self, index: impl Into<Option<usize>>) -> StatesResult<Vec<f64>> {
        self.set_index(index)?;
        let phase = self.phase.borrow();
        let mut out = vec![0.0; phase.state_size()];
        phase.save_state(&mut out)?;
        Ok(out)
    }

    /// Auxiliary values of row `index`, keyed by column name.
    pub fn get_auxiliary(
        &mut self,
        index: impl Into<Option<usize>>,
    ) -> StatesResult<BTreeMap<String, f64>> {
        self.set_index(index)?;
        let row = self.index.ok_or(StatesError::InvalidIndex {
            what: "cursor is unset",
        })?;
        Ok(self
            .extra
            .iter()
            .map(|(name, column)| (name.clone(), column[row]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Metadata;
    use tf_fluids::{IdealGasMixture, Phase, Species, into_shared};

    fn array() -> SolutionArray {
        let gas = IdealGasMixture::new(vec![Species::H2, Species::O2]).unwrap();
        let mut arr = SolutionArray::new(into_shared(gas), 3, Metadata::new()).unwrap();
        arr.initialize(&["grid"]).unwrap();
        arr.set_component("T", &[300.0, 400.0, 500.0], false).unwrap();
        arr.set_component("D", &[1.0, 0.9, 0.8], false).unwrap();
        arr.set_component("O2", &[1.0, 1.0, 1.0], false).unwrap();
        arr.set_component("grid", &[0.0, 0.1, 0.2], false).unwrap();
        arr
    }

    #[test]
    fn set_index_loads_row_into_phase() {
        let mut arr = array();
        arr.set_index(1).unwrap();
        assert_eq!(arr.index(), Some(1));
        let phase = arr.phase();
        assert_eq!(phase.borrow().temperature().value, 400.0);
        assert_eq!(phase.borrow().density().value, 0.9);
    }

    #[test]
    fn unset_index_requires_prior_row() {
        let mut arr = array();
        assert!(matches!(
            arr.set_index(None),
            Err(StatesError::InvalidIndex { .. })
        ));
        arr.set_index(2).unwrap();
        arr.set_index(None).unwrap();
        assert_eq!(arr.index(), Some(2));
    }

    #[test]
    fn out_of_range_index_fails() {
        let mut arr = array();
        assert!(matches!(
            arr.set_index(3),
            Err(StatesError::IndexOutOfRange { index: 3, size: 3 })
        ));
        assert_eq!(arr.index(), None);
    }

    #[test]
    fn empty_array_has_no_cursor() {
        let gas = IdealGasMixture::new(vec![Species::N2]).unwrap();
        let mut arr = SolutionArray::new(into_shared(gas), 0, Metadata::new()).unwrap();
        arr.initialize(&[]).unwrap();
        assert!(arr.set_index(0).is_err());
        assert!(arr.get_state(None).is_err());
    }

    #[test]
    fn get_state_and_auxiliary() {
        let mut arr = array();
        assert_eq!(arr.get_state(2).unwrap(), vec![500.0, 0.8, 0.0, 1.0]);
        let aux = arr.get_auxiliary(None).unwrap();
        assert_eq!(aux.len(), 1);
        assert_eq!(aux["grid"], 0.2);
    }
}
