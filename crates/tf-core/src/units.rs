// tf-core/src/units.rs

use uom::si::f64::{
    MassDensity as UomMassDensity, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

pub mod constants {
    use super::*;

    /// Standard atmosphere [Pa].
    pub const ONE_ATM_PA: f64 = 101_325.0;

    /// Universal gas constant [J/(kmol·K)].
    pub const GAS_CONSTANT: f64 = 8_314.462_618;

    #[inline]
    pub fn one_atm() -> Pressure {
        pa(ONE_ATM_PA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        assert_eq!(pa(101_325.0).value, 101_325.0);
        assert_eq!(k(300.0).value, 300.0);
        assert_eq!(kgm3(1.2).value, 1.2);
        assert_eq!(constants::one_atm().value, constants::ONE_ATM_PA);
    }
}
