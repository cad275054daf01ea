// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Site location, climate selection, and energy conversion factors for one
//! building segment.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClimateSelection {
    /// platform-supplied standard climate
    Standard,
    /// user-supplied monthly climate data (left to the platform here)
    UserDefined,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// m above sea level
    pub site_elevation: f64,
    /// hours offset from UTC
    pub hours_from_utc: f64,
}

impl Default for Location {
    fn default() -> Self {
        Location {
            latitude: 40.6,
            longitude: -73.8,
            site_elevation: 0.0,
            hours_from_utc: -4.0,
        }
    }
}

/// Site-energy to primary-energy / CO2 conversion for one fuel.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyFactor {
    pub fuel_name: String,
    /// kWh-PE/kWh-site or g-CO2/kWh-site
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    pub display_name: String,
    pub climate_selection: ClimateSelection,
    pub location: Location,
    /// deg C annual average
    pub average_ground_temperature: f64,
    pub pe_factors: Vec<EnergyFactor>,
    pub co2_factors: Vec<EnergyFactor>,
}

impl Default for Site {
    fn default() -> Self {
        Site {
            display_name: "New York".to_owned(),
            climate_selection: ClimateSelection::Standard,
            location: Location::default(),
            average_ground_temperature: 9.7,
            pe_factors: vec![
                EnergyFactor {
                    fuel_name: "ELECTRICITY_MIX".to_owned(),
                    value: 1.8,
                },
                EnergyFactor {
                    fuel_name: "NATURAL_GAS".to_owned(),
                    value: 1.1,
                },
            ],
            co2_factors: vec![
                EnergyFactor {
                    fuel_name: "ELECTRICITY_MIX".to_owned(),
                    value: 680.0,
                },
                EnergyFactor {
                    fuel_name: "NATURAL_GAS".to_owned(),
                    value: 250.0,
                },
            ],
        }
    }
}
