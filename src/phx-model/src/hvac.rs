// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Mechanical equipment definitions and the per-segment system collection.
//!
//! Devices are catalog entities: the collection owns one keyed registry and
//! the heating / cooling / hot-water / ventilation subsystems reference
//! devices by key, so one heat pump serving both heating and hot water is a
//! single entity with two usage sites.

use crate::catalog::Catalog;
use crate::common::{Error, ErrorCode, ErrorKind, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Ventilation,
    ElectricResistance,
    Boiler,
    HeatPump,
    WaterStorage,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Fuel {
    NaturalGas,
    Oil,
    Wood,
    Electricity,
}

/// A balanced ventilation unit with heat recovery.
#[derive(Clone, Debug, PartialEq)]
pub struct Ventilator {
    pub display_name: String,
    /// sensible heat recovery efficiency, fraction 0..=1
    pub sensible_recovery: f64,
    /// latent (moisture) recovery efficiency, fraction 0..=1
    pub latent_recovery: f64,
    /// Wh/m3
    pub electric_efficiency: f64,
    pub frost_protection: bool,
}

impl Default for Ventilator {
    fn default() -> Self {
        Ventilator {
            display_name: String::new(),
            sensible_recovery: 0.75,
            latent_recovery: 0.0,
            electric_efficiency: 0.45,
            frost_protection: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElectricResistance {
    pub display_name: String,
    /// fraction 0..=1
    pub efficiency: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boiler {
    pub display_name: String,
    pub fuel: Fuel,
    /// annual utilization efficiency, fraction 0..=1
    pub efficiency: f64,
    pub in_conditioned_space: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeatPump {
    pub display_name: String,
    /// annual coefficient of performance
    pub annual_cop: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaterStorage {
    pub display_name: String,
    /// L
    pub volume: f64,
    /// W/K
    pub standby_losses: f64,
    pub in_conditioned_space: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MechanicalDevice {
    Ventilation(Ventilator),
    ElectricResistance(ElectricResistance),
    Boiler(Boiler),
    HeatPump(HeatPump),
    WaterStorage(WaterStorage),
}

impl MechanicalDevice {
    pub fn display_name(&self) -> &str {
        match self {
            MechanicalDevice::Ventilation(d) => &d.display_name,
            MechanicalDevice::ElectricResistance(d) => &d.display_name,
            MechanicalDevice::Boiler(d) => &d.display_name,
            MechanicalDevice::HeatPump(d) => &d.display_name,
            MechanicalDevice::WaterStorage(d) => &d.display_name,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        match self {
            MechanicalDevice::Ventilation(_) => DeviceType::Ventilation,
            MechanicalDevice::ElectricResistance(_) => DeviceType::ElectricResistance,
            MechanicalDevice::Boiler(_) => DeviceType::Boiler,
            MechanicalDevice::HeatPump(_) => DeviceType::HeatPump,
            MechanicalDevice::WaterStorage(_) => DeviceType::WaterStorage,
        }
    }

    pub fn validate(&self, key: &str) -> Result<()> {
        let bad = |field: &str, value: f64| {
            Err(Error::new(
                ErrorKind::Model,
                ErrorCode::BadPhysicalValue,
                Some(format!("device '{key}': {field} = {value} out of range")),
            ))
        };
        match self {
            MechanicalDevice::Ventilation(d) => {
                if !(0.0..=1.0).contains(&d.sensible_recovery) {
                    return bad("sensible_recovery", d.sensible_recovery);
                }
                if !(0.0..=1.0).contains(&d.latent_recovery) {
                    return bad("latent_recovery", d.latent_recovery);
                }
                if d.electric_efficiency < 0.0 {
                    return bad("electric_efficiency", d.electric_efficiency);
                }
            }
            MechanicalDevice::ElectricResistance(d) => {
                if !(0.0..=1.0).contains(&d.efficiency) {
                    return bad("efficiency", d.efficiency);
                }
            }
            MechanicalDevice::Boiler(d) => {
                if !(0.0..=1.0).contains(&d.efficiency) {
                    return bad("efficiency", d.efficiency);
                }
            }
            MechanicalDevice::HeatPump(d) => {
                if !(d.annual_cop > 0.0) {
                    return bad("annual_cop", d.annual_cop);
                }
            }
            MechanicalDevice::WaterStorage(d) => {
                if d.volume < 0.0 {
                    return bad("volume", d.volume);
                }
                if d.standby_losses < 0.0 {
                    return bad("standby_losses", d.standby_losses);
                }
            }
        }
        Ok(())
    }
}

/// Fraction of the segment's load each subsystem covers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZoneCoverage {
    pub heating: f64,
    pub cooling: f64,
    pub ventilation: f64,
    pub hot_water: f64,
}

impl Default for ZoneCoverage {
    fn default() -> Self {
        ZoneCoverage {
            heating: 1.0,
            cooling: 1.0,
            ventilation: 1.0,
            hot_water: 1.0,
        }
    }
}

/// All the mechanical devices of one building segment plus the subsystem
/// rosters that reference them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MechanicalSystems {
    pub display_name: String,
    pub zone_coverage: ZoneCoverage,
    pub devices: Catalog<MechanicalDevice>,
    pub heating_device_keys: Vec<String>,
    pub cooling_device_keys: Vec<String>,
    pub ventilation_device_keys: Vec<String>,
    pub hot_water_device_keys: Vec<String>,
}

impl MechanicalSystems {
    /// Register a device and enrol it in the given subsystems. The same key
    /// twice reuses the first device (catalog semantics).
    pub fn add_device(
        &mut self,
        key: &str,
        device: MechanicalDevice,
        subsystems: &[Subsystem],
    ) -> Result<()> {
        device.validate(key)?;
        self.devices.insert(key, device);
        for subsystem in subsystems {
            let roster = match subsystem {
                Subsystem::Heating => &mut self.heating_device_keys,
                Subsystem::Cooling => &mut self.cooling_device_keys,
                Subsystem::Ventilation => &mut self.ventilation_device_keys,
                Subsystem::HotWater => &mut self.hot_water_device_keys,
            };
            if !roster.iter().any(|k| k == key) {
                roster.push(key.to_owned());
            }
            self.devices.mark_referenced(key)?;
        }
        Ok(())
    }

    pub fn device(&self, key: &str) -> Option<&MechanicalDevice> {
        self.devices.get(key)
    }

    /// Keys referenced by any subsystem that have no device entry. Used by
    /// `Project::validate`.
    pub fn dangling_device_keys(&self) -> Vec<&str> {
        self.heating_device_keys
            .iter()
            .chain(&self.cooling_device_keys)
            .chain(&self.ventilation_device_keys)
            .chain(&self.hot_water_device_keys)
            .filter(|k| !self.devices.contains_key(k))
            .map(|k| k.as_str())
            .collect()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Subsystem {
    Heating,
    Cooling,
    Ventilation,
    HotWater,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_device_two_subsystems_is_one_entity() {
        let mut systems = MechanicalSystems::default();
        let heat_pump = MechanicalDevice::HeatPump(HeatPump {
            display_name: "ASHP-1".to_owned(),
            annual_cop: 3.2,
        });
        systems
            .add_device(
                "ashp_1",
                heat_pump,
                &[Subsystem::Heating, Subsystem::HotWater],
            )
            .unwrap();

        assert_eq!(systems.devices.len(), 1);
        assert_eq!(systems.heating_device_keys, vec!["ashp_1"]);
        assert_eq!(systems.hot_water_device_keys, vec!["ashp_1"]);
        assert!(systems.dangling_device_keys().is_empty());
    }

    #[test]
    fn invalid_device_is_rejected() {
        let mut systems = MechanicalSystems::default();
        let bad = MechanicalDevice::Ventilation(Ventilator {
            sensible_recovery: 1.4,
            ..Default::default()
        });
        let err = systems
            .add_device("erv", bad, &[Subsystem::Ventilation])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadPhysicalValue);
        assert!(systems.devices.is_empty());
    }

    #[test]
    fn dangling_roster_keys_are_reported() {
        let mut systems = MechanicalSystems::default();
        systems.heating_device_keys.push("ghost".to_owned());
        assert_eq!(systems.dangling_device_keys(), vec!["ghost"]);
    }
}
