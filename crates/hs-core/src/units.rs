// hs-core/src/units.rs
//
// The thermal models work in imperial units (°F, lb, BTU/s). Quantities that
// leave the core (telemetry, summaries) are typed with uom.

use uom::si::f64::{
    Energy as UomEnergy, Power as UomPower, TemperatureInterval as UomTemperatureInterval,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

pub type Energy = UomEnergy;
pub type Power = UomPower;
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

/// BTU per watt-hour, as used by the equipment efficiency curves.
pub const BTU_PER_WATT_HOUR: f64 = 3.413;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

#[inline]
pub fn deg_f(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_fahrenheit;
    Temperature::new::<degree_fahrenheit>(v)
}

#[inline]
pub fn watts(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn watt_hours(v: f64) -> Energy {
    use uom::si::energy::watt_hour;
    Energy::new::<watt_hour>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

/// Convert a heat rate in BTU/s into watts.
#[inline]
pub fn btu_per_s_to_watts(q: f64) -> f64 {
    q * SECONDS_PER_HOUR / BTU_PER_WATT_HOUR
}

/// Convert an hourly rate (e.g. BTU/hr) into a per-second rate.
#[inline]
pub fn per_hour_to_per_s(v: f64) -> f64 {
    v / SECONDS_PER_HOUR
}
