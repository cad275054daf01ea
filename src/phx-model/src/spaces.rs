// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Interior spaces (rooms) within a zone. A space carries its floor areas,
//! design ventilation airflows, and references its utilization patterns in
//! the Project catalogs by key.

#[derive(Clone, Debug, PartialEq)]
pub struct Space {
    pub display_name: String,
    pub quantity: u32,
    /// gross floor area, m2
    pub floor_area: f64,
    /// weighted (treated) floor area, m2
    pub weighted_floor_area: f64,
    /// m
    pub clear_height: f64,
    /// design fresh-air supply, m3/h
    pub ventilation_supply: f64,
    /// design exhaust, m3/h
    pub ventilation_exhaust: f64,
    /// key into the Project's ventilation-pattern catalog
    pub ventilation_pattern_key: Option<String>,
    /// key into the Project's occupancy-pattern catalog
    pub occupancy_pattern_key: Option<String>,
}

impl Default for Space {
    fn default() -> Self {
        Space {
            display_name: String::new(),
            quantity: 1,
            floor_area: 0.0,
            weighted_floor_area: 0.0,
            clear_height: 2.5,
            ventilation_supply: 0.0,
            ventilation_exhaust: 0.0,
            ventilation_pattern_key: None,
            occupancy_pattern_key: None,
        }
    }
}

impl Space {
    pub fn has_ventilation_airflow(&self) -> bool {
        self.ventilation_supply > 0.0 || self.ventilation_exhaust > 0.0
    }

    /// The larger of supply and exhaust, the value the ventilation sheets
    /// size the room against.
    pub fn peak_airflow(&self) -> f64 {
        self.ventilation_supply.max(self.ventilation_exhaust)
    }

    pub fn net_volume(&self) -> f64 {
        self.weighted_floor_area * self.clear_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airflow_accessors() {
        let space = Space {
            display_name: "kitchen".to_owned(),
            ventilation_supply: 30.0,
            ventilation_exhaust: 60.0,
            ..Default::default()
        };
        assert!(space.has_ventilation_airflow());
        assert_eq!(space.peak_airflow(), 60.0);

        let still = Space::default();
        assert!(!still.has_ventilation_airflow());
    }
}
