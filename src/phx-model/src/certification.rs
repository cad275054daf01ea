// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Passive-House certification parameters carried per building segment.

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Setpoints {
    /// deg C
    pub winter: f64,
    /// deg C
    pub summer: f64,
}

impl Default for Setpoints {
    fn default() -> Self {
        Setpoints {
            winter: 20.0,
            summer: 25.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuildingCategory {
    Residential,
    NonResidential,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuildingStatus {
    InPlanning,
    UnderConstruction,
    Completed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuildingType {
    NewConstruction,
    Retrofit,
    MixedUse,
}

/// Physical certification inputs shared by both programs.
#[derive(Clone, Debug, PartialEq)]
pub struct PhBuildingData {
    pub num_of_units: u32,
    pub num_of_floors: u32,
    /// m3/hr-m2 envelope at 50 Pa
    pub airtightness_q50: f64,
    /// air changes per hour at 50 Pa
    pub airtightness_n50: f64,
    pub wind_coefficient_e: f64,
    pub wind_coefficient_f: f64,
    pub setpoints: Setpoints,
    pub foundation_count: u32,
}

impl Default for PhBuildingData {
    fn default() -> Self {
        PhBuildingData {
            num_of_units: 1,
            num_of_floors: 1,
            airtightness_q50: 1.0,
            airtightness_n50: 1.0,
            wind_coefficient_e: 0.07,
            wind_coefficient_f: 15.0,
            setpoints: Setpoints::default(),
            foundation_count: 0,
        }
    }
}

/// Phius program criteria (annual demand / peak load targets).
#[derive(Clone, Debug, PartialEq)]
pub struct PhiusCertification {
    pub building_category: BuildingCategory,
    pub building_status: BuildingStatus,
    pub building_type: BuildingType,
    /// kWh/m2-yr
    pub annual_heating_demand: f64,
    /// kWh/m2-yr
    pub annual_cooling_demand: f64,
    /// W/m2
    pub peak_heating_load: f64,
    /// W/m2
    pub peak_cooling_load: f64,
}

impl Default for PhiusCertification {
    fn default() -> Self {
        PhiusCertification {
            building_category: BuildingCategory::Residential,
            building_status: BuildingStatus::InPlanning,
            building_type: BuildingType::NewConstruction,
            annual_heating_demand: 15.0,
            annual_cooling_demand: 15.0,
            peak_heating_load: 10.0,
            peak_cooling_load: 10.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PhiCertificationClass {
    Classic,
    Plus,
    Premium,
}

/// PHI (classic Passive House) program settings.
#[derive(Clone, Debug, PartialEq)]
pub struct PhiCertification {
    /// PHPP major version the settings map onto
    pub version: u32,
    pub certification_class: PhiCertificationClass,
    pub building_category: BuildingCategory,
}

impl Default for PhiCertification {
    fn default() -> Self {
        PhiCertification {
            version: 9,
            certification_class: PhiCertificationClass::Classic,
            building_category: BuildingCategory::Residential,
        }
    }
}
