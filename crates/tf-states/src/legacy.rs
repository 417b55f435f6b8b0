//! Recovery rules for entries written by older producers.
//!
//! Each rule covers one known quirk and is kept separate from the main
//! restore path:
//! - [`points_without_temperature`]: entries claiming points but carrying no
//!   temperature hold no state data.
//! - [`SolutionArray::restore_single_point`]: one-point entries store scalar
//!   temperature and pressure plus a mass-fraction or coverage mapping.
//! - [`missing_density_pressure`] / [`SolutionArray::recover_missing_density`]:
//!   multi-point entries with temperature and mass fractions, a scalar
//!   pressure, and no density.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::{Mapping, Value};
use tf_core::units::constants::one_atm;
use tf_core::units::{Pressure, k, pa};
use tf_fluids::{Phase, StateInput, fractions_by_name};

use crate::array::SolutionArray;
use crate::error::{StatesError, StatesResult};
use crate::resolver::FieldSet;

/// Number of rows actually stored in an entry that reports `points` rows.
///
/// Some producers write `points: 1` for entries without any state data; an
/// entry with neither `T` nor `temperature` is treated as empty.
pub(crate) fn points_without_temperature(entry: &Mapping, points: usize) -> usize {
    if entry.contains_key("T") || entry.contains_key("temperature") {
        points
    } else {
        if points > 0 {
            tracing::debug!("entry reports {} points but no temperature; treating as empty", points);
        }
        0
    }
}

/// Pressure of a one-point entry, one atmosphere if the producer omitted it.
fn single_point_pressure(entry: &Mapping) -> Pressure {
    entry
        .get("pressure")
        .and_then(Value::as_f64)
        .map(pa)
        .unwrap_or_else(one_atm)
}

/// Scalar pressure to rebuild density from, if the missing-density rule applies.
///
/// Applies when the only native fields present are `T` and `Y`, the only
/// missing native field is `D`, and the entry carries a scalar `pressure`.
pub(crate) fn missing_density_pressure(
    phase: &dyn Phase,
    names: &BTreeSet<String>,
    entry: &Mapping,
) -> Option<f64> {
    let native = phase.native_state();
    let present: Vec<&str> = native
        .keys()
        .copied()
        .filter(|name| names.contains(*name))
        .collect();
    let missing: Vec<&str> = native
        .keys()
        .copied()
        .filter(|name| !names.contains(*name))
        .collect();

    if present == ["T", "Y"] && missing == ["D"] {
        entry.get("pressure").and_then(Value::as_f64)
    } else {
        None
    }
}

fn fraction_map(value: &Value) -> StatesResult<BTreeMap<String, f64>> {
    Ok(serde_yaml::from_value(value.clone())?)
}

impl SolutionArray {
    /// Restore the degenerate one-point encoding into row 0.
    pub(crate) fn restore_single_point(
        &mut self,
        entry: &Mapping,
        exclude: &mut BTreeSet<String>,
    ) -> StatesResult<()> {
        let t = entry
            .get("temperature")
            .and_then(Value::as_f64)
            .ok_or_else(|| StatesError::IncompleteState {
                missing: vec!["temperature".to_string()],
            })?;
        let p = single_point_pressure(entry);
        exclude.insert("temperature".to_string());
        exclude.insert("pressure".to_string());

        {
            let mut phase = self.phase.borrow_mut();
            if let Some(value) = entry.get("mass-fractions") {
                let y = fractions_by_name(&*phase, &fraction_map(value)?)?;
                phase.set_state(StateInput::TPY { t: k(t), p, y })?;
                exclude.insert("mass-fractions".to_string());
            } else if let Some(value) = entry.get("coverages") {
                phase.set_state(StateInput::TP { t: k(t), p })?;
                let coverages = fraction_map(value)?;
                exclude.insert("coverages".to_string());
                let surface =
                    phase
                        .as_surface_mut()
                        .ok_or_else(|| StatesError::UnsupportedStateMode {
                            what: "restoring coverages requires a surface phase".to_string(),
                        })?;
                surface.set_coverages_by_name(&coverages)?;
            } else {
                return Err(StatesError::NotImplemented {
                    what: "unknown YAML serialization format".to_string(),
                });
            }
        }

        let stride = self.checked_stride()?;
        let row = &mut self.data[..stride];
        let phase = self.phase.borrow();
        for (name, offset) in phase.native_state() {
            match name {
                "T" => row[offset] = phase.temperature().value,
                "D" => row[offset] = phase.density().value,
                "P" => row[offset] = phase.pressure().value,
                "Y" => {
                    let y = phase.mass_fractions();
                    row[offset..offset + y.len()].copy_from_slice(&y);
                }
                "X" => {
                    let x = phase.mole_fractions();
                    row[offset..offset + x.len()].copy_from_slice(&x);
                }
                other => {
                    return Err(StatesError::UnsupportedStateMode {
                        what: format!("unable to restore property '{}'", other),
                    });
                }
            }
        }
        drop(phase);

        // One-element sequences carry auxiliary columns; scalars stay metadata.
        for (key, value) in entry {
            let Some(key) = key.as_str() else {
                continue;
            };
            if exclude.contains(key) {
                continue;
            }
            if let Some([item]) = value.as_sequence().map(Vec::as_slice) {
                if let Some(v) = item.as_f64() {
                    self.insert_auxiliary(key, vec![v])?;
                    exclude.insert(key.to_string());
                }
            }
        }
        Ok(())
    }

    /// Write `T` and `Y` and rebuild `D` row by row at the given pressure.
    pub(crate) fn recover_missing_density(
        &mut self,
        fields: FieldSet,
        pressure: f64,
    ) -> StatesResult<()> {
        tracing::debug!(
            "rebuilding density for {} rows at {} Pa",
            self.size,
            pressure
        );
        for name in ["T", "Y"] {
            let field = fields
                .get(name)
                .ok_or_else(|| StatesError::IncompleteState {
                    missing: vec![name.to_string()],
                })?;
            self.write_native(name, field)?;
        }

        let stride = self.checked_stride()?;
        let (offset_t, offset_d, offset_y, n_species) = {
            let phase = self.phase.borrow();
            let native = phase.native_state();
            match (native.get("T"), native.get("D"), native.get("Y")) {
                (Some(&t), Some(&d), Some(&y)) => (t, d, y, phase.n_species()),
                _ => {
                    return Err(StatesError::IncompleteState {
                        missing: vec!["D".to_string()],
                    });
                }
            }
        };

        for i in 0..self.size {
            let row = &mut self.data[i * stride..(i + 1) * stride];
            let mut phase = self.phase.borrow_mut();
            phase.set_state(StateInput::TPY {
                t: k(row[offset_t]),
                p: pa(pressure),
                y: row[offset_y..offset_y + n_species].to_vec(),
            })?;
            row[offset_d] = phase.density().value;
        }

        let matched: BTreeSet<String> = ["T", "Y"].iter().map(|s| s.to_string()).collect();
        self.keep_auxiliary(&matched, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn temperature_keys_keep_points() {
        assert_eq!(points_without_temperature(&mapping("points: 3\nT: [1, 2, 3]"), 3), 3);
        assert_eq!(
            points_without_temperature(&mapping("points: 1\ntemperature: 300"), 1),
            1
        );
        assert_eq!(points_without_temperature(&mapping("points: 1\nfoo: 1"), 1), 0);
    }

    #[test]
    fn single_point_pressure_defaults_to_one_atm() {
        assert_eq!(single_point_pressure(&mapping("temperature: 300")), one_atm());
        assert_eq!(
            single_point_pressure(&mapping("temperature: 300\npressure: 2.0e5")).value,
            2.0e5
        );
    }

    #[test]
    fn missing_density_rule_is_narrow() {
        use tf_fluids::{IdealGasMixture, Species};
        let gas = IdealGasMixture::new(vec![Species::H2, Species::O2]).unwrap();
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
        let with_p = mapping("pressure: 101325.0");
        let without_p = mapping("foo: 1");

        assert_eq!(
            missing_density_pressure(&gas, &names(&["T", "Y", "grid"]), &with_p),
            Some(101325.0)
        );
        assert_eq!(
            missing_density_pressure(&gas, &names(&["T", "Y"]), &without_p),
            None
        );
        assert_eq!(
            missing_density_pressure(&gas, &names(&["T"]), &with_p),
            None
        );
        assert_eq!(
            missing_density_pressure(&gas, &names(&["D", "Y"]), &with_p),
            None
        );
    }
}
