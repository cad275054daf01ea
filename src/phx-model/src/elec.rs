// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Electrical appliance and plug loads, owned per-zone.

use crate::common::{Error, ErrorCode, ErrorKind, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElectricDeviceType {
    Dishwasher,
    ClothesWasher,
    ClothesDryer,
    Refrigerator,
    Cooking,
    Lighting,
    /// miscellaneous electric loads
    Mel,
    Custom,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElectricDevice {
    pub display_name: String,
    pub device_type: ElectricDeviceType,
    pub quantity: u32,
    /// kWh/yr per unit
    pub energy_demand: f64,
    pub in_conditioned_space: bool,
}

impl ElectricDevice {
    pub fn validate(&self) -> Result<()> {
        if self.energy_demand < 0.0 {
            return Err(Error::new(
                ErrorKind::Model,
                ErrorCode::BadPhysicalValue,
                Some(format!(
                    "electric device '{}': energy_demand = {} is negative",
                    self.display_name, self.energy_demand
                )),
            ));
        }
        Ok(())
    }

    pub fn total_annual_demand(&self) -> f64 {
        self.energy_demand * self.quantity as f64
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElectricDeviceCollection {
    devices: Vec<ElectricDevice>,
}

impl ElectricDeviceCollection {
    pub fn add_device(&mut self, device: ElectricDevice) -> Result<()> {
        device.validate()?;
        self.devices.push(device);
        Ok(())
    }

    pub fn devices(&self) -> &[ElectricDevice] {
        &self.devices
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn total_annual_demand(&self) -> f64 {
        self.devices.iter().map(|d| d.total_annual_demand()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_totals() {
        let mut collection = ElectricDeviceCollection::default();
        collection
            .add_device(ElectricDevice {
                display_name: "fridge".to_owned(),
                device_type: ElectricDeviceType::Refrigerator,
                quantity: 2,
                energy_demand: 100.0,
                in_conditioned_space: true,
            })
            .unwrap();
        assert_eq!(collection.total_annual_demand(), 200.0);
    }

    #[test]
    fn negative_demand_rejected() {
        let mut collection = ElectricDeviceCollection::default();
        let err = collection
            .add_device(ElectricDevice {
                display_name: "bad".to_owned(),
                device_type: ElectricDeviceType::Mel,
                quantity: 1,
                energy_demand: -1.0,
                in_conditioned_space: true,
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadPhysicalValue);
        assert!(collection.is_empty());
    }
}
