// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The fixed layout of one supported PHPP release: worksheet names and the
//! rows/columns each exporter section owns. Cell addresses are a hard
//! external contract tied to that release; a workbook reporting any other
//! version must be rejected before the first write.

use phx_model::units::Unit;

/// Where the workbook reports its version, and the string it must report.
pub struct VersionShape {
    pub sheet: &'static str,
    pub cell: &'static str,
    pub expected: &'static str,
}

pub struct VerificationShape {
    pub name: &'static str,
    pub building_name: &'static str,
    pub street: &'static str,
    pub locality: &'static str,
    pub post_code: &'static str,
    pub customer_name: &'static str,
    pub owner_name: &'static str,
    pub designer_name: &'static str,
    pub year_constructed: &'static str,
    pub number_units: &'static str,
    pub number_floors: &'static str,
    pub airtightness_n50: &'static str,
    pub setpoint_winter: &'static str,
    pub setpoint_summer: &'static str,
}

pub struct ClimateShape {
    pub name: &'static str,
    pub site_name: &'static str,
    pub latitude: &'static str,
    pub longitude: &'static str,
    pub elevation: &'static str,
    pub ground_temperature: &'static str,
}

/// The U-values sheet is a stack of fixed-height constructor blocks, one
/// assembly per block.
pub struct UValuesShape {
    pub name: &'static str,
    pub first_block_row: u32,
    pub block_height: u32,
    pub block_count: u32,
    pub name_col: &'static str,
    pub layer_name_col: &'static str,
    pub conductivity_col: &'static str,
    pub thickness_col: &'static str,
    pub first_layer_offset: u32,
    pub max_layers: u32,
    pub conductivity_unit: Unit,
}

pub struct ComponentsShape {
    pub name: &'static str,
    pub glazing_first_row: u32,
    pub glazing_row_count: u32,
    pub glazing_name_col: &'static str,
    pub glazing_g_value_col: &'static str,
    pub glazing_u_value_col: &'static str,
    pub frame_first_row: u32,
    pub frame_row_count: u32,
    pub frame_name_col: &'static str,
    pub frame_u_value_col: &'static str,
    pub frame_width_col: &'static str,
    pub frame_psi_glazing_col: &'static str,
    pub frame_psi_install_col: &'static str,
    pub u_value_unit: Unit,
}

pub struct AreasShape {
    pub name: &'static str,
    pub surface_first_row: u32,
    pub surface_row_count: u32,
    pub surface_name_col: &'static str,
    pub surface_group_col: &'static str,
    pub surface_area_col: &'static str,
    pub surface_assembly_col: &'static str,
    pub bridge_first_row: u32,
    pub bridge_row_count: u32,
    pub bridge_name_col: &'static str,
    pub bridge_length_col: &'static str,
    pub bridge_psi_col: &'static str,
    pub area_unit: Unit,
}

pub struct VentilationShape {
    pub name: &'static str,
    pub space_first_row: u32,
    pub space_row_count: u32,
    pub space_name_col: &'static str,
    pub space_quantity_col: &'static str,
    pub space_area_col: &'static str,
    pub space_height_col: &'static str,
    pub space_supply_col: &'static str,
    pub space_exhaust_col: &'static str,
    pub unit_first_row: u32,
    pub unit_row_count: u32,
    pub unit_name_col: &'static str,
    pub unit_heat_recovery_col: &'static str,
    pub unit_moisture_recovery_col: &'static str,
    pub unit_electric_efficiency_col: &'static str,
    pub airflow_unit: Unit,
}

pub struct DhwShape {
    pub name: &'static str,
    pub tank_volume: &'static str,
    pub tank_standby_losses: &'static str,
    pub volume_unit: Unit,
}

/// Each appliance kind has one fixed row on the Electricity sheet.
pub struct ElectricityShape {
    pub name: &'static str,
    pub quantity_col: &'static str,
    pub demand_col: &'static str,
    pub dishwasher_row: u32,
    pub clothes_washer_row: u32,
    pub clothes_dryer_row: u32,
    pub refrigerator_row: u32,
    pub cooking_row: u32,
    pub lighting_row: u32,
    pub mel_row: u32,
}

pub struct Shape {
    pub version: VersionShape,
    pub verification: VerificationShape,
    pub climate: ClimateShape,
    pub u_values: UValuesShape,
    pub components: ComponentsShape,
    pub areas: AreasShape,
    pub ventilation: VentilationShape,
    pub dhw: DhwShape,
    pub electricity: ElectricityShape,
}

/// PHPP 9.6, English, SI units.
pub const V9_EN: Shape = Shape {
    version: VersionShape {
        sheet: "Data",
        cell: "B2",
        expected: "9.6a EN",
    },
    verification: VerificationShape {
        name: "Verification",
        building_name: "K5",
        street: "K6",
        locality: "K7",
        post_code: "K8",
        customer_name: "F18",
        owner_name: "K13",
        designer_name: "F23",
        year_constructed: "K25",
        number_units: "K16",
        number_floors: "K17",
        airtightness_n50: "N27",
        setpoint_winter: "K29",
        setpoint_summer: "K30",
    },
    climate: ClimateShape {
        name: "Climate",
        site_name: "F5",
        latitude: "F7",
        longitude: "F8",
        elevation: "F9",
        ground_temperature: "F10",
    },
    u_values: UValuesShape {
        name: "U-Values",
        first_block_row: 8,
        block_height: 21,
        block_count: 30,
        name_col: "M",
        layer_name_col: "L",
        conductivity_col: "M",
        thickness_col: "S",
        first_layer_offset: 3,
        max_layers: 8,
        conductivity_unit: Unit::WPerMK,
    },
    components: ComponentsShape {
        name: "Components",
        glazing_first_row: 9,
        glazing_row_count: 25,
        glazing_name_col: "ID",
        glazing_g_value_col: "IE",
        glazing_u_value_col: "IF",
        frame_first_row: 39,
        frame_row_count: 25,
        frame_name_col: "ID",
        frame_u_value_col: "IE",
        frame_width_col: "IF",
        frame_psi_glazing_col: "IG",
        frame_psi_install_col: "IH",
        u_value_unit: Unit::WPerM2K,
    },
    areas: AreasShape {
        name: "Areas",
        surface_first_row: 41,
        surface_row_count: 100,
        surface_name_col: "L",
        surface_group_col: "M",
        surface_area_col: "V",
        surface_assembly_col: "AC",
        bridge_first_row: 147,
        bridge_row_count: 30,
        bridge_name_col: "L",
        bridge_length_col: "V",
        bridge_psi_col: "AC",
        area_unit: Unit::M2,
    },
    ventilation: VentilationShape {
        name: "Addnl vent",
        space_first_row: 56,
        space_row_count: 30,
        space_name_col: "E",
        space_quantity_col: "F",
        space_area_col: "G",
        space_height_col: "H",
        space_supply_col: "J",
        space_exhaust_col: "K",
        unit_first_row: 97,
        unit_row_count: 10,
        unit_name_col: "E",
        unit_heat_recovery_col: "J",
        unit_moisture_recovery_col: "K",
        unit_electric_efficiency_col: "L",
        airflow_unit: Unit::M3PerHour,
    },
    dhw: DhwShape {
        name: "DHW+Distribution",
        tank_volume: "J86",
        tank_standby_losses: "J87",
        volume_unit: Unit::Liter,
    },
    electricity: ElectricityShape {
        name: "Electricity",
        quantity_col: "J",
        demand_col: "M",
        dishwasher_row: 14,
        clothes_washer_row: 16,
        clothes_dryer_row: 18,
        refrigerator_row: 20,
        cooking_row: 22,
        lighting_row: 24,
        mel_row: 26,
    },
};
