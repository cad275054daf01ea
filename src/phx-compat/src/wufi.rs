// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! WUFI XML export + re-import.
//!
//! Export walks a validated `Project` top-down and writes a fresh document
//! with the platform element vocabulary. Element order is the platform
//! contract and is encoded explicitly here: catalogs in declaration order,
//! variants/components/zones in id order. Every `IdentNr` comes from
//! emission order, so the same Project always produces byte-identical
//! output.
//!
//! Re-import deserializes the same vocabulary with serde and rebuilds a
//! validated Project from it.

use std::io::{BufRead, Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Deserialize;

use phx_model::building::{Building, SpecificHeatCapacity, Zone, ZoneType};
use phx_model::common::{Error, ErrorCode, ErrorKind, ExportWarning, Result};
use phx_model::components::{
    ComponentAperture, ComponentOpaque, ExposureExterior, ExposureInterior, FaceType,
    ThermalBridge, ThermalBridgeType,
};
use phx_model::constructions::{Assembly, Layer, LayerOrder, Material, WindowType};
use phx_model::elec::{ElectricDevice, ElectricDeviceType};
use phx_model::geometry::{Polygon, Vertex};
use phx_model::hvac::{
    Boiler, ElectricResistance, Fuel, HeatPump, MechanicalDevice, MechanicalSystems, Subsystem,
    Ventilator, WaterStorage,
};
use phx_model::import_err;
use phx_model::project::{Agent, BuildingSegment, Project, ProjectData};
use phx_model::schedules::{OccupancyPattern, OperatingPeriod, VentilationPattern};
use phx_model::spaces::Space;

trait ToXml<W: Write> {
    fn write_xml(&self, writer: &mut Writer<W>) -> Result<()>;
}

type XmlWriter = Cursor<Vec<u8>>;

const DATA_VERSION: i32 = 48;
const UNIT_SYSTEM: i32 = 1;
const PROGRAM_VERSION: &str = "3.2.0.1";
const SCOPE: i32 = 3;
const VISUALIZED_GEOMETRY: i32 = 2;

fn xml_error(err: std::io::Error) -> Error {
    Error::new(
        ErrorKind::Export,
        ErrorCode::XmlDeserialization,
        Some(err.to_string()),
    )
}

fn write_tag_start(writer: &mut Writer<XmlWriter>, tag_name: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag_name)))
        .map_err(xml_error)
}

fn write_tag_end(writer: &mut Writer<XmlWriter>, tag_name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(tag_name)))
        .map_err(xml_error)
}

fn write_tag(writer: &mut Writer<XmlWriter>, tag_name: &str, content: &str) -> Result<()> {
    write_tag_start(writer, tag_name)?;
    writer
        .write_event(Event::Text(BytesText::new(content)))
        .map_err(xml_error)?;
    write_tag_end(writer, tag_name)
}

fn write_tag_f64(writer: &mut Writer<XmlWriter>, tag_name: &str, value: f64) -> Result<()> {
    write_tag(writer, tag_name, &value.to_string())
}

fn write_tag_i64(writer: &mut Writer<XmlWriter>, tag_name: &str, value: i64) -> Result<()> {
    write_tag(writer, tag_name, &value.to_string())
}

fn write_tag_bool(writer: &mut Writer<XmlWriter>, tag_name: &str, value: bool) -> Result<()> {
    write_tag(writer, tag_name, if value { "true" } else { "false" })
}

fn write_ident_list(writer: &mut Writer<XmlWriter>, tag_name: &str, ids: &[i64]) -> Result<()> {
    write_tag_start(writer, tag_name)?;
    for id in ids {
        write_tag_i64(writer, "IdentNr", *id)?;
    }
    write_tag_end(writer, tag_name)
}

// ---------------------------------------------------------------------------
// Platform integer codes. Explicit tables in both directions; an unknown
// code on read is a loud error.

fn opacity_code(component: &ComponentOpaque) -> i64 {
    match component.face_type {
        FaceType::AirBoundary => 3,
        _ => 1,
    }
}

fn zone_kind_code(zone_type: ZoneType) -> i64 {
    match zone_type {
        ZoneType::Simulated => 1,
        ZoneType::Attached => 2,
    }
}

fn zone_kind_from_code(code: i64, node: &str) -> Result<ZoneType> {
    match code {
        1 => Ok(ZoneType::Simulated),
        2 => Ok(ZoneType::Attached),
        other => import_err!(
            UnknownTag,
            format!("zone '{node}': unknown KindZone code {other}")
        ),
    }
}

fn exposure_exterior_code(exposure: ExposureExterior) -> i64 {
    match exposure {
        ExposureExterior::Exterior => -1,
        ExposureExterior::Ground => -2,
        ExposureExterior::Surface => -3,
    }
}

fn exposure_exterior_from_code(code: i64, node: &str) -> Result<ExposureExterior> {
    match code {
        -1 => Ok(ExposureExterior::Exterior),
        -2 => Ok(ExposureExterior::Ground),
        -3 => Ok(ExposureExterior::Surface),
        other => import_err!(
            UnknownTag,
            format!("component '{node}': unknown OuterAttachment code {other}")
        ),
    }
}

fn heat_capacity_code(capacity: SpecificHeatCapacity) -> i64 {
    match capacity {
        SpecificHeatCapacity::Lightweight => 1,
        SpecificHeatCapacity::Mixed => 2,
        SpecificHeatCapacity::Massive => 3,
    }
}

fn heat_capacity_from_code(code: i64, node: &str) -> Result<SpecificHeatCapacity> {
    match code {
        1 => Ok(SpecificHeatCapacity::Lightweight),
        2 => Ok(SpecificHeatCapacity::Mixed),
        3 => Ok(SpecificHeatCapacity::Massive),
        other => import_err!(
            UnknownTag,
            format!("zone '{node}': unknown SpecificHeatCapacity_Selection code {other}")
        ),
    }
}

fn device_system_code(device: &MechanicalDevice) -> i64 {
    match device {
        MechanicalDevice::Ventilation(_) => 1,
        MechanicalDevice::ElectricResistance(_) => 2,
        MechanicalDevice::Boiler(_) => 3,
        MechanicalDevice::HeatPump(_) => 5,
        MechanicalDevice::WaterStorage(_) => 8,
    }
}

fn fuel_code(fuel: Fuel) -> i64 {
    match fuel {
        Fuel::NaturalGas => 1,
        Fuel::Oil => 2,
        Fuel::Wood => 3,
        Fuel::Electricity => 4,
    }
}

fn fuel_from_code(code: i64, node: &str) -> Result<Fuel> {
    match code {
        1 => Ok(Fuel::NaturalGas),
        2 => Ok(Fuel::Oil),
        3 => Ok(Fuel::Wood),
        4 => Ok(Fuel::Electricity),
        other => import_err!(
            UnknownTag,
            format!("device '{node}': unknown Fuel code {other}")
        ),
    }
}

fn elec_device_code(device_type: ElectricDeviceType) -> i64 {
    match device_type {
        ElectricDeviceType::Dishwasher => 1,
        ElectricDeviceType::ClothesWasher => 2,
        ElectricDeviceType::ClothesDryer => 3,
        ElectricDeviceType::Refrigerator => 4,
        ElectricDeviceType::Cooking => 5,
        ElectricDeviceType::Lighting => 6,
        ElectricDeviceType::Mel => 7,
        ElectricDeviceType::Custom => 8,
    }
}

fn elec_device_from_code(code: i64, node: &str) -> Result<ElectricDeviceType> {
    match code {
        1 => Ok(ElectricDeviceType::Dishwasher),
        2 => Ok(ElectricDeviceType::ClothesWasher),
        3 => Ok(ElectricDeviceType::ClothesDryer),
        4 => Ok(ElectricDeviceType::Refrigerator),
        5 => Ok(ElectricDeviceType::Cooking),
        6 => Ok(ElectricDeviceType::Lighting),
        7 => Ok(ElectricDeviceType::Mel),
        8 => Ok(ElectricDeviceType::Custom),
        other => import_err!(
            UnknownTag,
            format!("device '{node}': unknown electric device code {other}")
        ),
    }
}

fn bridge_type_code(bridge_type: ThermalBridgeType) -> i64 {
    match bridge_type {
        ThermalBridgeType::AmbientAir => -15,
        ThermalBridgeType::Perimeter => -16,
        ThermalBridgeType::Underground => -17,
    }
}

fn bridge_type_from_code(code: i64, node: &str) -> Result<ThermalBridgeType> {
    match code {
        -15 => Ok(ThermalBridgeType::AmbientAir),
        -16 => Ok(ThermalBridgeType::Perimeter),
        -17 => Ok(ThermalBridgeType::Underground),
        other => import_err!(
            UnknownTag,
            format!("thermal bridge '{node}': unknown Type code {other}")
        ),
    }
}

// ---------------------------------------------------------------------------
// Document structs. One struct per platform element; the same shapes drive
// both the manual writer and the serde reader.

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename = "WUFIplusProject")]
pub struct WufiPlusProject {
    #[serde(rename = "DataVersion", default)]
    pub data_version: i32,
    #[serde(rename = "UnitSystem", default)]
    pub unit_system: i32,
    #[serde(rename = "ProgramVersion", default)]
    pub program_version: String,
    #[serde(rename = "ProjectData", default)]
    pub project_data: ProjectDataXml,
    #[serde(rename = "UtilisationPatternsVentilation", default)]
    pub vent_patterns: VentPatternsXml,
    #[serde(rename = "UtilizationPatternsPH", default)]
    pub occupancy_patterns: OccupancyPatternsXml,
    #[serde(rename = "Variants", default)]
    pub variants: VariantsXml,
    #[serde(rename = "Assemblies", default)]
    pub assemblies: AssembliesXml,
    #[serde(rename = "WindowTypes", default)]
    pub window_types: WindowTypesXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProjectDataXml {
    #[serde(rename = "Year_Construction", default)]
    pub year_construction: u32,
    #[serde(rename = "OwnerIsClient", default)]
    pub owner_is_client: bool,
    #[serde(rename = "Date_Project", default)]
    pub project_date: String,
    #[serde(rename = "Customer_Name", default)]
    pub customer_name: String,
    #[serde(rename = "Customer_Street", default)]
    pub customer_street: String,
    #[serde(rename = "Customer_Locality", default)]
    pub customer_locality: String,
    #[serde(rename = "Customer_PostalCode", default)]
    pub customer_postal_code: String,
    #[serde(rename = "Customer_Tel", default)]
    pub customer_tel: String,
    #[serde(rename = "Customer_Email", default)]
    pub customer_email: String,
    #[serde(rename = "Building_Name", default)]
    pub building_name: String,
    #[serde(rename = "Building_Street", default)]
    pub building_street: String,
    #[serde(rename = "Building_Locality", default)]
    pub building_locality: String,
    #[serde(rename = "Building_PostalCode", default)]
    pub building_postal_code: String,
    #[serde(rename = "Owner_Name", default)]
    pub owner_name: String,
    #[serde(rename = "Responsible_Name", default)]
    pub responsible_name: String,
    #[serde(rename = "Responsible_Tel", default)]
    pub responsible_tel: String,
    #[serde(rename = "Responsible_Email", default)]
    pub responsible_email: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VentPatternsXml {
    #[serde(rename = "UtilizationPatternVent", default)]
    pub patterns: Vec<VentPatternXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VentPatternXml {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "OperatingDays", default)]
    pub operating_days: f64,
    #[serde(rename = "OperatingWeeks", default)]
    pub operating_weeks: f64,
    #[serde(rename = "Maximum_DOS", default)]
    pub maximum_dos: f64,
    #[serde(rename = "Maximum_PDF", default)]
    pub maximum_pdf: f64,
    #[serde(rename = "Standard_DOS", default)]
    pub standard_dos: f64,
    #[serde(rename = "Standard_PDF", default)]
    pub standard_pdf: f64,
    #[serde(rename = "Basic_DOS", default)]
    pub basic_dos: f64,
    #[serde(rename = "Basic_PDF", default)]
    pub basic_pdf: f64,
    #[serde(rename = "Minimum_DOS", default)]
    pub minimum_dos: f64,
    #[serde(rename = "Minimum_PDF", default)]
    pub minimum_pdf: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OccupancyPatternsXml {
    #[serde(rename = "UtilizationPattern", default)]
    pub patterns: Vec<OccupancyPatternXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OccupancyPatternXml {
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "BeginUtilization", default)]
    pub begin_utilization: f64,
    #[serde(rename = "EndUtilization", default)]
    pub end_utilization: f64,
    #[serde(rename = "AnnualUtilizationDays", default)]
    pub annual_utilization_days: f64,
    #[serde(rename = "RelativeAbsenteeism", default)]
    pub relative_absenteeism: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VariantsXml {
    #[serde(rename = "Variant", default)]
    pub variants: Vec<VariantXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VariantXml {
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Remarks", default)]
    pub remarks: String,
    #[serde(rename = "Graphics_3D", default)]
    pub graphics: Graphics3DXml,
    #[serde(rename = "Building", default)]
    pub building: BuildingXml,
    #[serde(rename = "ClimateLocation", default)]
    pub climate_location: ClimateLocationXml,
    #[serde(rename = "PassivehouseData", default)]
    pub passivehouse_data: PassivehouseDataXml,
    #[serde(rename = "HVAC", default)]
    pub hvac: HvacXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Graphics3DXml {
    #[serde(rename = "Vertices", default)]
    pub vertices: VerticesXml,
    #[serde(rename = "Polygons", default)]
    pub polygons: PolygonsXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerticesXml {
    #[serde(rename = "Vertix", default)]
    pub vertices: Vec<VertixXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VertixXml {
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "X", default)]
    pub x: f64,
    #[serde(rename = "Y", default)]
    pub y: f64,
    #[serde(rename = "Z", default)]
    pub z: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PolygonsXml {
    #[serde(rename = "Polygon", default)]
    pub polygons: Vec<PolygonXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PolygonXml {
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "NormalVectorX", default)]
    pub normal_x: f64,
    #[serde(rename = "NormalVectorY", default)]
    pub normal_y: f64,
    #[serde(rename = "NormalVectorZ", default)]
    pub normal_z: f64,
    #[serde(rename = "IdentNrPoints", default)]
    pub point_ids: IdentListXml,
    #[serde(rename = "IdentNrPolygonsInside", default)]
    pub polygons_inside: IdentListXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IdentListXml {
    #[serde(rename = "IdentNr", default)]
    pub ids: Vec<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BuildingXml {
    #[serde(rename = "Components", default)]
    pub components: ComponentsXml,
    #[serde(rename = "Zones", default)]
    pub zones: ZonesXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ComponentsXml {
    #[serde(rename = "Component", default)]
    pub components: Vec<ComponentXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ComponentXml {
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub opacity: i64,
    #[serde(rename = "InnerAttachment", default)]
    pub inner_attachment: i64,
    #[serde(rename = "OuterAttachment", default)]
    pub outer_attachment: i64,
    #[serde(rename = "IdentNrAssembly", default)]
    pub ident_nr_assembly: i64,
    #[serde(rename = "IdentNrWindowType", default)]
    pub ident_nr_window_type: i64,
    #[serde(rename = "IdentNrPolygons", default)]
    pub polygon_ids: IdentListXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ZonesXml {
    #[serde(rename = "Zone", default)]
    pub zones: Vec<ZoneXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ZoneXml {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "KindZone", default)]
    pub kind_zone: i64,
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "RoomsVentilation", default)]
    pub rooms: RoomsXml,
    #[serde(rename = "LoadsPersonsPH", default)]
    pub load_persons: LoadPersonsXml,
    #[serde(rename = "GrossVolume", default)]
    pub gross_volume: f64,
    #[serde(rename = "NetVolume", default)]
    pub net_volume: f64,
    #[serde(rename = "FloorArea", default)]
    pub floor_area: f64,
    #[serde(rename = "ClearanceHeight", default)]
    pub clearance_height: f64,
    #[serde(rename = "SpecificHeatCapacity_Selection", default)]
    pub specific_heat_capacity: i64,
    #[serde(rename = "OccupantQuantityUserDef", default)]
    pub occupant_quantity: f64,
    #[serde(rename = "NumberBedrooms", default)]
    pub number_bedrooms: u32,
    #[serde(rename = "HomeDevice", default)]
    pub home_devices: HomeDevicesXml,
    #[serde(rename = "ThermalBridges", default)]
    pub thermal_bridges: ThermalBridgesXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoomsXml {
    #[serde(rename = "Room", default)]
    pub rooms: Vec<RoomXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoomXml {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "IdentNrUtilizationPatternVent", default)]
    pub ident_nr_vent_pattern: i64,
    #[serde(rename = "Quantity", default)]
    pub quantity: u32,
    #[serde(rename = "AreaRoom", default)]
    pub area: f64,
    #[serde(rename = "FloorAreaGross", default)]
    pub floor_area_gross: f64,
    #[serde(rename = "ClearRoomHeight", default)]
    pub clear_height: f64,
    #[serde(rename = "DesignVolumeFlowRateSupply", default)]
    pub flow_supply: f64,
    #[serde(rename = "DesignVolumeFlowRateExhaust", default)]
    pub flow_exhaust: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoadPersonsXml {
    #[serde(rename = "LoadPerson", default)]
    pub loads: Vec<LoadPersonXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoadPersonXml {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "IdentNrUtilizationPattern", default)]
    pub ident_nr_pattern: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HomeDevicesXml {
    #[serde(rename = "Device", default)]
    pub devices: Vec<HomeDeviceXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HomeDeviceXml {
    #[serde(rename = "Comment", default)]
    pub comment: String,
    #[serde(rename = "Type", default)]
    pub device_type: i64,
    #[serde(rename = "Quantity", default)]
    pub quantity: u32,
    #[serde(rename = "InConditionedSpace", default)]
    pub in_conditioned_space: bool,
    #[serde(rename = "EnergyDemandNorm", default)]
    pub energy_demand: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ThermalBridgesXml {
    #[serde(rename = "ThermalBridge", default)]
    pub bridges: Vec<ThermalBridgeXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ThermalBridgeXml {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub bridge_type: i64,
    #[serde(rename = "Length", default)]
    pub length: f64,
    #[serde(rename = "PsiValue", default)]
    pub psi_value: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClimateLocationXml {
    #[serde(rename = "Selection", default)]
    pub selection: i64,
    #[serde(rename = "Latitude_DB", default)]
    pub latitude: f64,
    #[serde(rename = "Longitude_DB", default)]
    pub longitude: f64,
    #[serde(rename = "HeightNN_DB", default)]
    pub site_elevation: f64,
    #[serde(rename = "dUTC_DB", default)]
    pub hours_from_utc: f64,
    #[serde(rename = "AverageGroundTemperature", default)]
    pub average_ground_temperature: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PassivehouseDataXml {
    #[serde(rename = "AnnualHeatingDemand", default)]
    pub annual_heating_demand: f64,
    #[serde(rename = "AnnualCoolingDemand", default)]
    pub annual_cooling_demand: f64,
    #[serde(rename = "PeakHeatingLoad", default)]
    pub peak_heating_load: f64,
    #[serde(rename = "PeakCoolingLoad", default)]
    pub peak_cooling_load: f64,
    #[serde(rename = "PH_Buildings", default)]
    pub ph_buildings: PhBuildingsXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PhBuildingsXml {
    #[serde(rename = "PH_Building", default)]
    pub buildings: Vec<PhBuildingXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PhBuildingXml {
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "NumberUnits", default)]
    pub number_units: u32,
    #[serde(rename = "CountStories", default)]
    pub count_stories: u32,
    #[serde(rename = "EnvelopeAirtightnessCoefficient", default)]
    pub airtightness_q50: f64,
    #[serde(rename = "IndoorTemperature", default)]
    pub indoor_temperature: f64,
    #[serde(rename = "OverheatingTemperatureThreshold", default)]
    pub overheating_threshold: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HvacXml {
    #[serde(rename = "Devices", default)]
    pub devices: DevicesXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DevicesXml {
    #[serde(rename = "Device", default)]
    pub devices: Vec<DeviceXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DeviceXml {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "SystemType", default)]
    pub system_type: i64,
    #[serde(rename = "UsedFor_Heating", default)]
    pub used_for_heating: bool,
    #[serde(rename = "UsedFor_DHW", default)]
    pub used_for_dhw: bool,
    #[serde(rename = "UsedFor_Cooling", default)]
    pub used_for_cooling: bool,
    #[serde(rename = "UsedFor_Ventilation", default)]
    pub used_for_ventilation: bool,
    #[serde(rename = "HeatRecovery", default)]
    pub heat_recovery: Option<f64>,
    #[serde(rename = "MoistureRecovery", default)]
    pub moisture_recovery: Option<f64>,
    #[serde(rename = "ElectricEfficiency", default)]
    pub electric_efficiency: Option<f64>,
    #[serde(rename = "Efficiency", default)]
    pub efficiency: Option<f64>,
    #[serde(rename = "Fuel", default)]
    pub fuel: Option<i64>,
    #[serde(rename = "AnnualCOP", default)]
    pub annual_cop: Option<f64>,
    #[serde(rename = "SolutionsVolume", default)]
    pub volume: Option<f64>,
    #[serde(rename = "StandbyLosses", default)]
    pub standby_losses: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AssembliesXml {
    #[serde(rename = "Assembly", default)]
    pub assemblies: Vec<AssemblyXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AssemblyXml {
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Order_Layers", default)]
    pub order_layers: i64,
    #[serde(rename = "Grid_Kind", default)]
    pub grid_kind: i64,
    #[serde(rename = "Layers", default)]
    pub layers: LayersXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LayersXml {
    #[serde(rename = "Layer", default)]
    pub layers: Vec<LayerXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LayerXml {
    #[serde(rename = "Thickness", default)]
    pub thickness: f64,
    #[serde(rename = "Material", default)]
    pub material: MaterialXml,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MaterialXml {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "ThermalConductivity", default)]
    pub conductivity: f64,
    #[serde(rename = "BulkDensity", default)]
    pub density: f64,
    #[serde(rename = "Porosity", default)]
    pub porosity: f64,
    #[serde(rename = "HeatCapacity", default)]
    pub heat_capacity: f64,
    #[serde(rename = "WaterVaporResistance", default)]
    pub water_vapor_resistance: f64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WindowTypesXml {
    #[serde(rename = "WindowType", default)]
    pub window_types: Vec<WindowTypeXml>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WindowTypeXml {
    #[serde(rename = "IdentNr", default)]
    pub ident_nr: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "U_Value_Glazing", default)]
    pub u_value_glazing: f64,
    #[serde(rename = "g_Value", default)]
    pub g_value: f64,
    #[serde(rename = "U_Value_Frame", default)]
    pub u_value_frame: f64,
    #[serde(rename = "Frame_Width_Left", default)]
    pub frame_width: f64,
    #[serde(rename = "Frame_Psi_Left", default)]
    pub frame_psi_install: f64,
    #[serde(rename = "Glazing_Psi_Left", default)]
    pub glazing_psi: f64,
}

// ---------------------------------------------------------------------------
// Export: Project -> document tree. Ids are handed out in emission order.

struct DocumentBuilder<'a> {
    project: &'a Project,
    warnings: Vec<ExportWarning>,
}

impl<'a> DocumentBuilder<'a> {
    fn new(project: &'a Project) -> Self {
        DocumentBuilder {
            project,
            warnings: Vec::new(),
        }
    }

    fn build(mut self) -> (WufiPlusProject, Vec<ExportWarning>) {
        let project = self.project;
        let doc = WufiPlusProject {
            data_version: DATA_VERSION,
            unit_system: UNIT_SYSTEM,
            program_version: PROGRAM_VERSION.to_owned(),
            project_data: self.project_data(),
            vent_patterns: self.vent_patterns(),
            occupancy_patterns: self.occupancy_patterns(),
            variants: VariantsXml {
                variants: project
                    .segments()
                    .iter()
                    .enumerate()
                    .map(|(i, segment)| self.variant(segment, i as i64 + 1))
                    .collect(),
            },
            assemblies: self.assemblies(),
            window_types: self.window_types(),
        };
        (doc, self.warnings)
    }

    fn project_data(&self) -> ProjectDataXml {
        let data = &self.project.project_data;
        ProjectDataXml {
            year_construction: data.year_constructed,
            owner_is_client: data.owner_is_client,
            project_date: data.project_date.clone(),
            customer_name: data.customer.name.clone(),
            customer_street: data.customer.street.clone(),
            customer_locality: data.customer.city.clone(),
            customer_postal_code: data.customer.post_code.clone(),
            customer_tel: data.customer.telephone.clone(),
            customer_email: data.customer.email.clone(),
            building_name: data.building.name.clone(),
            building_street: data.building.street.clone(),
            building_locality: data.building.city.clone(),
            building_postal_code: data.building.post_code.clone(),
            owner_name: data.owner.name.clone(),
            responsible_name: data.designer.name.clone(),
            responsible_tel: data.designer.telephone.clone(),
            responsible_email: data.designer.email.clone(),
        }
    }

    fn vent_patterns(&self) -> VentPatternsXml {
        VentPatternsXml {
            patterns: self
                .project
                .ventilation_patterns
                .iter()
                .enumerate()
                .map(|(i, (_, pattern))| VentPatternXml {
                    name: pattern.display_name.clone(),
                    ident_nr: i as i64 + 1,
                    operating_days: pattern.operating_days,
                    operating_weeks: pattern.operating_weeks,
                    maximum_dos: pattern.high.operating_hours,
                    maximum_pdf: pattern.high.operation_speed,
                    standard_dos: pattern.standard.operating_hours,
                    standard_pdf: pattern.standard.operation_speed,
                    basic_dos: pattern.basic.operating_hours,
                    basic_pdf: pattern.basic.operation_speed,
                    minimum_dos: pattern.minimum.operating_hours,
                    minimum_pdf: pattern.minimum.operation_speed,
                })
                .collect(),
        }
    }

    fn occupancy_patterns(&self) -> OccupancyPatternsXml {
        OccupancyPatternsXml {
            patterns: self
                .project
                .occupancy_patterns
                .iter()
                .enumerate()
                .map(|(i, (_, pattern))| OccupancyPatternXml {
                    ident_nr: i as i64 + 1,
                    name: pattern.display_name.clone(),
                    begin_utilization: pattern.start_hour,
                    end_utilization: pattern.end_hour,
                    annual_utilization_days: pattern.annual_utilization_days,
                    relative_absenteeism: pattern.relative_utilization_factor,
                })
                .collect(),
        }
    }

    fn assemblies(&self) -> AssembliesXml {
        AssembliesXml {
            assemblies: self
                .project
                .assembly_types
                .iter()
                .enumerate()
                .map(|(i, (_, assembly))| AssemblyXml {
                    ident_nr: i as i64 + 1,
                    name: assembly.display_name.clone(),
                    order_layers: match assembly.layer_order {
                        LayerOrder::OutsideToInside => 2,
                        LayerOrder::InsideToOutside => 1,
                    },
                    grid_kind: 2,
                    layers: LayersXml {
                        layers: assembly
                            .layers
                            .iter()
                            .map(|layer| LayerXml {
                                thickness: layer.thickness,
                                material: self.material(&layer.material_key),
                            })
                            .collect(),
                    },
                })
                .collect(),
        }
    }

    fn material(&self, key: &str) -> MaterialXml {
        // validate() has already confirmed every layer key resolves
        let material = self.project.materials.get(key).cloned().unwrap_or_default();
        MaterialXml {
            name: key.to_owned(),
            conductivity: material.conductivity,
            density: material.density,
            porosity: material.porosity,
            heat_capacity: material.heat_capacity,
            water_vapor_resistance: material.water_vapor_resistance,
        }
    }

    fn window_types(&self) -> WindowTypesXml {
        WindowTypesXml {
            window_types: self
                .project
                .window_types
                .iter()
                .enumerate()
                .map(|(i, (_, wt))| WindowTypeXml {
                    ident_nr: i as i64 + 1,
                    name: wt.display_name.clone(),
                    u_value_glazing: wt.u_value_glass,
                    g_value: wt.glass_g_value,
                    u_value_frame: wt.u_value_frame,
                    frame_width: wt.frame_width,
                    frame_psi_install: wt.psi_install,
                    glazing_psi: wt.psi_glazing,
                })
                .collect(),
        }
    }

    fn variant(&mut self, segment: &BuildingSegment, ident_nr: i64) -> VariantXml {
        let mut geometry = GeometryNumbering::default();
        let building = self.building(segment, &mut geometry);
        if segment.building.zones().is_empty() {
            self.warnings.push(ExportWarning::new(
                &segment.name,
                "Zones",
                "segment has no zones; writing an empty zones section".to_owned(),
            ));
        }
        VariantXml {
            ident_nr,
            name: segment.name.clone(),
            remarks: segment.remarks.clone(),
            graphics: Graphics3DXml {
                vertices: VerticesXml {
                    vertices: geometry.vertices,
                },
                polygons: PolygonsXml {
                    polygons: geometry.polygons,
                },
            },
            building,
            climate_location: ClimateLocationXml {
                selection: match segment.site.climate_selection {
                    phx_model::site::ClimateSelection::Standard => 1,
                    phx_model::site::ClimateSelection::UserDefined => 6,
                },
                latitude: segment.site.location.latitude,
                longitude: segment.site.location.longitude,
                site_elevation: segment.site.location.site_elevation,
                hours_from_utc: segment.site.location.hours_from_utc,
                average_ground_temperature: segment.site.average_ground_temperature,
            },
            passivehouse_data: PassivehouseDataXml {
                annual_heating_demand: segment.phius_cert.annual_heating_demand,
                annual_cooling_demand: segment.phius_cert.annual_cooling_demand,
                peak_heating_load: segment.phius_cert.peak_heating_load,
                peak_cooling_load: segment.phius_cert.peak_cooling_load,
                ph_buildings: PhBuildingsXml {
                    buildings: vec![PhBuildingXml {
                        ident_nr: 1,
                        number_units: segment.ph_building.num_of_units,
                        count_stories: segment.ph_building.num_of_floors,
                        airtightness_q50: segment.ph_building.airtightness_q50,
                        indoor_temperature: segment.ph_building.setpoints.winter,
                        overheating_threshold: segment.ph_building.setpoints.summer,
                    }],
                },
            },
            hvac: self.hvac(&segment.mech_systems),
        }
    }

    fn building(&mut self, segment: &BuildingSegment, geometry: &mut GeometryNumbering) -> BuildingXml {
        let mut components = Vec::new();
        let mut next_component_id: i64 = 0;

        for component in segment.building.components() {
            next_component_id += 1;
            let host_id = next_component_id;

            let aperture_polygon_ids: Vec<Vec<i64>> = component
                .apertures()
                .iter()
                .map(|aperture| {
                    aperture
                        .polygons
                        .iter()
                        .map(|polygon| geometry.register(polygon, &[]))
                        .collect()
                })
                .collect();
            let children: Vec<i64> = aperture_polygon_ids.iter().flatten().copied().collect();

            let polygon_ids: Vec<i64> = component
                .polygons
                .iter()
                .enumerate()
                .map(|(i, polygon)| {
                    // apertures punch through the first host polygon
                    let inside = if i == 0 { children.as_slice() } else { &[] };
                    geometry.register(polygon, inside)
                })
                .collect();

            components.push(ComponentXml {
                ident_nr: host_id,
                name: component.display_name.clone(),
                opacity: opacity_code(component),
                inner_attachment: match component.exposure_interior {
                    ExposureInterior::Zone(idx) => idx as i64 + 1,
                    ExposureInterior::None => 0,
                },
                outer_attachment: exposure_exterior_code(component.exposure_exterior),
                ident_nr_assembly: component
                    .assembly_key
                    .as_deref()
                    .and_then(|key| self.project.assembly_types.position(key))
                    .map(|pos| pos as i64 + 1)
                    .unwrap_or(-1),
                ident_nr_window_type: -1,
                polygon_ids: IdentListXml { ids: polygon_ids },
            });

            for (aperture, polygon_ids) in component.apertures().iter().zip(aperture_polygon_ids) {
                next_component_id += 1;
                components.push(ComponentXml {
                    ident_nr: next_component_id,
                    name: aperture.display_name.clone(),
                    opacity: 2,
                    inner_attachment: match component.exposure_interior {
                        ExposureInterior::Zone(idx) => idx as i64 + 1,
                        ExposureInterior::None => 0,
                    },
                    outer_attachment: exposure_exterior_code(component.exposure_exterior),
                    ident_nr_assembly: -1,
                    ident_nr_window_type: self
                        .project
                        .window_types
                        .position(&aperture.window_type_key)
                        .map(|pos| pos as i64 + 1)
                        .unwrap_or(-1),
                    polygon_ids: IdentListXml { ids: polygon_ids },
                });
            }
        }

        BuildingXml {
            components: ComponentsXml { components },
            zones: ZonesXml {
                zones: segment
                    .building
                    .zones()
                    .iter()
                    .enumerate()
                    .map(|(i, zone)| self.zone(zone, i as i64 + 1))
                    .collect(),
            },
        }
    }

    fn zone(&mut self, zone: &Zone, ident_nr: i64) -> ZoneXml {
        ZoneXml {
            name: zone.display_name.clone(),
            kind_zone: zone_kind_code(zone.zone_type),
            ident_nr,
            rooms: RoomsXml {
                rooms: zone
                    .spaces
                    .iter()
                    .map(|space| {
                        let pattern_id = match space.ventilation_pattern_key.as_deref() {
                            Some(key) => self
                                .project
                                .ventilation_patterns
                                .position(key)
                                .map(|pos| pos as i64 + 1)
                                .unwrap_or(-1),
                            None => {
                                self.warnings.push(ExportWarning::new(
                                    &space.display_name,
                                    "IdentNrUtilizationPatternVent",
                                    "space has no ventilation pattern".to_owned(),
                                ));
                                -1
                            }
                        };
                        RoomXml {
                            name: space.display_name.clone(),
                            ident_nr_vent_pattern: pattern_id,
                            quantity: space.quantity,
                            area: space.weighted_floor_area,
                            floor_area_gross: space.floor_area,
                            clear_height: space.clear_height,
                            flow_supply: space.ventilation_supply,
                            flow_exhaust: space.ventilation_exhaust,
                        }
                    })
                    .collect(),
            },
            load_persons: LoadPersonsXml {
                loads: zone
                    .spaces
                    .iter()
                    .map(|space| LoadPersonXml {
                        name: space.display_name.clone(),
                        ident_nr_pattern: space
                            .occupancy_pattern_key
                            .as_deref()
                            .and_then(|key| self.project.occupancy_patterns.position(key))
                            .map(|pos| pos as i64 + 1)
                            .unwrap_or(-1),
                    })
                    .collect(),
            },
            gross_volume: zone.volume_gross,
            net_volume: zone.volume_net,
            floor_area: zone.weighted_net_floor_area,
            clearance_height: zone.clearance_height,
            specific_heat_capacity: heat_capacity_code(zone.specific_heat_capacity),
            occupant_quantity: zone.res_occupant_quantity,
            number_bedrooms: zone.res_number_bedrooms,
            home_devices: HomeDevicesXml {
                devices: zone
                    .elec_equipment
                    .devices()
                    .iter()
                    .map(|device| HomeDeviceXml {
                        comment: device.display_name.clone(),
                        device_type: elec_device_code(device.device_type),
                        quantity: device.quantity,
                        in_conditioned_space: device.in_conditioned_space,
                        energy_demand: device.energy_demand,
                    })
                    .collect(),
            },
            thermal_bridges: ThermalBridgesXml {
                bridges: zone
                    .thermal_bridges
                    .iter()
                    .map(|bridge| ThermalBridgeXml {
                        name: bridge.display_name.clone(),
                        bridge_type: bridge_type_code(bridge.bridge_type),
                        length: bridge.length,
                        psi_value: bridge.psi_value,
                    })
                    .collect(),
            },
        }
    }

    fn hvac(&self, systems: &MechanicalSystems) -> HvacXml {
        HvacXml {
            devices: DevicesXml {
                devices: systems
                    .devices
                    .iter()
                    .enumerate()
                    .map(|(i, (key, device))| {
                        let roster =
                            |keys: &[String]| keys.iter().any(|k| k.as_str() == key);
                        let mut xml = DeviceXml {
                            name: device.display_name().to_owned(),
                            ident_nr: i as i64 + 1,
                            system_type: device_system_code(device),
                            used_for_heating: roster(&systems.heating_device_keys),
                            used_for_dhw: roster(&systems.hot_water_device_keys),
                            used_for_cooling: roster(&systems.cooling_device_keys),
                            used_for_ventilation: roster(&systems.ventilation_device_keys),
                            ..Default::default()
                        };
                        match device {
                            MechanicalDevice::Ventilation(v) => {
                                xml.heat_recovery = Some(v.sensible_recovery);
                                xml.moisture_recovery = Some(v.latent_recovery);
                                xml.electric_efficiency = Some(v.electric_efficiency);
                            }
                            MechanicalDevice::ElectricResistance(e) => {
                                xml.efficiency = Some(e.efficiency);
                            }
                            MechanicalDevice::Boiler(b) => {
                                xml.efficiency = Some(b.efficiency);
                                xml.fuel = Some(fuel_code(b.fuel));
                            }
                            MechanicalDevice::HeatPump(hp) => {
                                xml.annual_cop = Some(hp.annual_cop);
                            }
                            MechanicalDevice::WaterStorage(tank) => {
                                xml.volume = Some(tank.volume);
                                xml.standby_losses = Some(tank.standby_losses);
                            }
                        }
                        xml
                    })
                    .collect(),
            },
        }
    }
}

/// Hands out vertex and polygon IdentNrs per variant, welding vertices
/// that coincide within tolerance so shared edges reference shared points.
#[derive(Default)]
struct GeometryNumbering {
    vertices: Vec<VertixXml>,
    polygons: Vec<PolygonXml>,
}

impl GeometryNumbering {
    fn vertex_id(&mut self, vertex: &Vertex) -> i64 {
        let existing = self.vertices.iter().find(|v| {
            Vertex::new(v.x, v.y, v.z).is_equivalent(vertex)
        });
        if let Some(v) = existing {
            return v.ident_nr;
        }
        let id = self.vertices.len() as i64 + 1;
        self.vertices.push(VertixXml {
            ident_nr: id,
            x: vertex.x,
            y: vertex.y,
            z: vertex.z,
        });
        id
    }

    fn register(&mut self, polygon: &Polygon, inside: &[i64]) -> i64 {
        let point_ids: Vec<i64> = polygon.vertices().iter().map(|v| self.vertex_id(v)).collect();
        let id = self.polygons.len() as i64 + 1;
        let normal = polygon.normal();
        self.polygons.push(PolygonXml {
            ident_nr: id,
            normal_x: normal.x,
            normal_y: normal.y,
            normal_z: normal.z,
            point_ids: IdentListXml { ids: point_ids },
            polygons_inside: IdentListXml {
                ids: inside.to_vec(),
            },
        });
        id
    }
}

// ---------------------------------------------------------------------------
// Writer

impl ToXml<XmlWriter> for WufiPlusProject {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "WUFIplusProject")?;
        write_tag_i64(writer, "DataVersion", self.data_version as i64)?;
        write_tag_i64(writer, "UnitSystem", self.unit_system as i64)?;
        write_tag(writer, "ProgramVersion", &self.program_version)?;
        write_tag_i64(writer, "Scope", SCOPE as i64)?;
        write_tag_i64(writer, "DimensionsVisualizedGeometry", VISUALIZED_GEOMETRY as i64)?;
        self.project_data.write_xml(writer)?;

        write_tag_start(writer, "UtilisationPatternsVentilation")?;
        for pattern in &self.vent_patterns.patterns {
            pattern.write_xml(writer)?;
        }
        write_tag_end(writer, "UtilisationPatternsVentilation")?;

        write_tag_start(writer, "UtilizationPatternsPH")?;
        for pattern in &self.occupancy_patterns.patterns {
            pattern.write_xml(writer)?;
        }
        write_tag_end(writer, "UtilizationPatternsPH")?;

        write_tag_start(writer, "Variants")?;
        for variant in &self.variants.variants {
            variant.write_xml(writer)?;
        }
        write_tag_end(writer, "Variants")?;

        write_tag_start(writer, "Assemblies")?;
        for assembly in &self.assemblies.assemblies {
            assembly.write_xml(writer)?;
        }
        write_tag_end(writer, "Assemblies")?;

        write_tag_start(writer, "WindowTypes")?;
        for window_type in &self.window_types.window_types {
            window_type.write_xml(writer)?;
        }
        write_tag_end(writer, "WindowTypes")?;

        write_tag_end(writer, "WUFIplusProject")
    }
}

impl ToXml<XmlWriter> for ProjectDataXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "ProjectData")?;
        write_tag_i64(writer, "Year_Construction", self.year_construction as i64)?;
        write_tag_bool(writer, "OwnerIsClient", self.owner_is_client)?;
        write_tag(writer, "Date_Project", &self.project_date)?;
        write_tag(writer, "Customer_Name", &self.customer_name)?;
        write_tag(writer, "Customer_Street", &self.customer_street)?;
        write_tag(writer, "Customer_Locality", &self.customer_locality)?;
        write_tag(writer, "Customer_PostalCode", &self.customer_postal_code)?;
        write_tag(writer, "Customer_Tel", &self.customer_tel)?;
        write_tag(writer, "Customer_Email", &self.customer_email)?;
        write_tag(writer, "Building_Name", &self.building_name)?;
        write_tag(writer, "Building_Street", &self.building_street)?;
        write_tag(writer, "Building_Locality", &self.building_locality)?;
        write_tag(writer, "Building_PostalCode", &self.building_postal_code)?;
        write_tag(writer, "Owner_Name", &self.owner_name)?;
        write_tag(writer, "Responsible_Name", &self.responsible_name)?;
        write_tag(writer, "Responsible_Tel", &self.responsible_tel)?;
        write_tag(writer, "Responsible_Email", &self.responsible_email)?;
        write_tag_end(writer, "ProjectData")
    }
}

impl ToXml<XmlWriter> for VentPatternXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "UtilizationPatternVent")?;
        write_tag(writer, "Name", &self.name)?;
        write_tag_i64(writer, "IdentNr", self.ident_nr)?;
        write_tag_f64(writer, "OperatingDays", self.operating_days)?;
        write_tag_f64(writer, "OperatingWeeks", self.operating_weeks)?;
        write_tag_f64(writer, "Maximum_DOS", self.maximum_dos)?;
        write_tag_f64(writer, "Maximum_PDF", self.maximum_pdf)?;
        write_tag_f64(writer, "Standard_DOS", self.standard_dos)?;
        write_tag_f64(writer, "Standard_PDF", self.standard_pdf)?;
        write_tag_f64(writer, "Basic_DOS", self.basic_dos)?;
        write_tag_f64(writer, "Basic_PDF", self.basic_pdf)?;
        write_tag_f64(writer, "Minimum_DOS", self.minimum_dos)?;
        write_tag_f64(writer, "Minimum_PDF", self.minimum_pdf)?;
        write_tag_end(writer, "UtilizationPatternVent")
    }
}

impl ToXml<XmlWriter> for OccupancyPatternXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "UtilizationPattern")?;
        write_tag_i64(writer, "IdentNr", self.ident_nr)?;
        write_tag(writer, "Name", &self.name)?;
        write_tag_f64(writer, "BeginUtilization", self.begin_utilization)?;
        write_tag_f64(writer, "EndUtilization", self.end_utilization)?;
        write_tag_f64(writer, "AnnualUtilizationDays", self.annual_utilization_days)?;
        write_tag_f64(writer, "RelativeAbsenteeism", self.relative_absenteeism)?;
        write_tag_end(writer, "UtilizationPattern")
    }
}

impl ToXml<XmlWriter> for VariantXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "Variant")?;
        write_tag_i64(writer, "IdentNr", self.ident_nr)?;
        write_tag(writer, "Name", &self.name)?;
        write_tag(writer, "Remarks", &self.remarks)?;
        self.graphics.write_xml(writer)?;
        self.building.write_xml(writer)?;
        self.climate_location.write_xml(writer)?;
        self.passivehouse_data.write_xml(writer)?;
        self.hvac.write_xml(writer)?;
        write_tag_end(writer, "Variant")
    }
}

impl ToXml<XmlWriter> for Graphics3DXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "Graphics_3D")?;
        write_tag_start(writer, "Vertices")?;
        for vertex in &self.vertices.vertices {
            write_tag_start(writer, "Vertix")?;
            write_tag_i64(writer, "IdentNr", vertex.ident_nr)?;
            write_tag_f64(writer, "X", vertex.x)?;
            write_tag_f64(writer, "Y", vertex.y)?;
            write_tag_f64(writer, "Z", vertex.z)?;
            write_tag_end(writer, "Vertix")?;
        }
        write_tag_end(writer, "Vertices")?;
        write_tag_start(writer, "Polygons")?;
        for polygon in &self.polygons.polygons {
            write_tag_start(writer, "Polygon")?;
            write_tag_i64(writer, "IdentNr", polygon.ident_nr)?;
            write_tag_f64(writer, "NormalVectorX", polygon.normal_x)?;
            write_tag_f64(writer, "NormalVectorY", polygon.normal_y)?;
            write_tag_f64(writer, "NormalVectorZ", polygon.normal_z)?;
            write_ident_list(writer, "IdentNrPoints", &polygon.point_ids.ids)?;
            write_ident_list(writer, "IdentNrPolygonsInside", &polygon.polygons_inside.ids)?;
            write_tag_end(writer, "Polygon")?;
        }
        write_tag_end(writer, "Polygons")?;
        write_tag_end(writer, "Graphics_3D")
    }
}

impl ToXml<XmlWriter> for BuildingXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "Building")?;
        write_tag_start(writer, "Components")?;
        for component in &self.components.components {
            component.write_xml(writer)?;
        }
        write_tag_end(writer, "Components")?;
        write_tag_start(writer, "Zones")?;
        for zone in &self.zones.zones {
            zone.write_xml(writer)?;
        }
        write_tag_end(writer, "Zones")?;
        write_tag_end(writer, "Building")
    }
}

impl ToXml<XmlWriter> for ComponentXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "Component")?;
        write_tag_i64(writer, "IdentNr", self.ident_nr)?;
        write_tag(writer, "Name", &self.name)?;
        write_tag_bool(writer, "Visual", true)?;
        write_tag_i64(writer, "Type", self.opacity)?;
        write_tag_i64(writer, "InnerAttachment", self.inner_attachment)?;
        write_tag_i64(writer, "OuterAttachment", self.outer_attachment)?;
        write_tag_i64(writer, "IdentNrAssembly", self.ident_nr_assembly)?;
        write_tag_i64(writer, "IdentNrWindowType", self.ident_nr_window_type)?;
        write_ident_list(writer, "IdentNrPolygons", &self.polygon_ids.ids)?;
        write_tag_end(writer, "Component")
    }
}

impl ToXml<XmlWriter> for ZoneXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "Zone")?;
        write_tag(writer, "Name", &self.name)?;
        write_tag_i64(writer, "KindZone", self.kind_zone)?;
        write_tag_i64(writer, "IdentNr", self.ident_nr)?;
        write_tag_start(writer, "RoomsVentilation")?;
        for room in &self.rooms.rooms {
            write_tag_start(writer, "Room")?;
            write_tag(writer, "Name", &room.name)?;
            write_tag_i64(writer, "IdentNrUtilizationPatternVent", room.ident_nr_vent_pattern)?;
            write_tag_i64(writer, "Quantity", room.quantity as i64)?;
            write_tag_f64(writer, "AreaRoom", room.area)?;
            write_tag_f64(writer, "FloorAreaGross", room.floor_area_gross)?;
            write_tag_f64(writer, "ClearRoomHeight", room.clear_height)?;
            write_tag_f64(writer, "DesignVolumeFlowRateSupply", room.flow_supply)?;
            write_tag_f64(writer, "DesignVolumeFlowRateExhaust", room.flow_exhaust)?;
            write_tag_end(writer, "Room")?;
        }
        write_tag_end(writer, "RoomsVentilation")?;
        write_tag_start(writer, "LoadsPersonsPH")?;
        for load in &self.load_persons.loads {
            write_tag_start(writer, "LoadPerson")?;
            write_tag(writer, "Name", &load.name)?;
            write_tag_i64(writer, "IdentNrUtilizationPattern", load.ident_nr_pattern)?;
            write_tag_end(writer, "LoadPerson")?;
        }
        write_tag_end(writer, "LoadsPersonsPH")?;
        write_tag_i64(writer, "GrossVolume_Selection", 6)?;
        write_tag_f64(writer, "GrossVolume", self.gross_volume)?;
        write_tag_i64(writer, "NetVolume_Selection", 6)?;
        write_tag_f64(writer, "NetVolume", self.net_volume)?;
        write_tag_i64(writer, "FloorArea_Selection", 6)?;
        write_tag_f64(writer, "FloorArea", self.floor_area)?;
        write_tag_i64(writer, "ClearanceHeight_Selection", 1)?;
        write_tag_f64(writer, "ClearanceHeight", self.clearance_height)?;
        write_tag_i64(writer, "SpecificHeatCapacity_Selection", self.specific_heat_capacity)?;
        write_tag_f64(writer, "OccupantQuantityUserDef", self.occupant_quantity)?;
        write_tag_i64(writer, "NumberBedrooms", self.number_bedrooms as i64)?;
        write_tag_start(writer, "HomeDevice")?;
        for device in &self.home_devices.devices {
            write_tag_start(writer, "Device")?;
            write_tag(writer, "Comment", &device.comment)?;
            write_tag_i64(writer, "Type", device.device_type)?;
            write_tag_i64(writer, "Quantity", device.quantity as i64)?;
            write_tag_bool(writer, "InConditionedSpace", device.in_conditioned_space)?;
            write_tag_f64(writer, "EnergyDemandNorm", device.energy_demand)?;
            write_tag_end(writer, "Device")?;
        }
        write_tag_end(writer, "HomeDevice")?;
        write_tag_start(writer, "ThermalBridges")?;
        for bridge in &self.thermal_bridges.bridges {
            write_tag_start(writer, "ThermalBridge")?;
            write_tag(writer, "Name", &bridge.name)?;
            write_tag_i64(writer, "Type", bridge.bridge_type)?;
            write_tag_f64(writer, "Length", bridge.length)?;
            write_tag_f64(writer, "PsiValue", bridge.psi_value)?;
            write_tag_end(writer, "ThermalBridge")?;
        }
        write_tag_end(writer, "ThermalBridges")?;
        write_tag_end(writer, "Zone")
    }
}

impl ToXml<XmlWriter> for ClimateLocationXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "ClimateLocation")?;
        write_tag_i64(writer, "Selection", self.selection)?;
        write_tag_f64(writer, "Latitude_DB", self.latitude)?;
        write_tag_f64(writer, "Longitude_DB", self.longitude)?;
        write_tag_f64(writer, "HeightNN_DB", self.site_elevation)?;
        write_tag_f64(writer, "dUTC_DB", self.hours_from_utc)?;
        write_tag_f64(writer, "AverageGroundTemperature", self.average_ground_temperature)?;
        write_tag_end(writer, "ClimateLocation")
    }
}

impl ToXml<XmlWriter> for PassivehouseDataXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "PassivehouseData")?;
        write_tag_f64(writer, "AnnualHeatingDemand", self.annual_heating_demand)?;
        write_tag_f64(writer, "AnnualCoolingDemand", self.annual_cooling_demand)?;
        write_tag_f64(writer, "PeakHeatingLoad", self.peak_heating_load)?;
        write_tag_f64(writer, "PeakCoolingLoad", self.peak_cooling_load)?;
        write_tag_start(writer, "PH_Buildings")?;
        for building in &self.ph_buildings.buildings {
            write_tag_start(writer, "PH_Building")?;
            write_tag_i64(writer, "IdentNr", building.ident_nr)?;
            write_tag_i64(writer, "NumberUnits", building.number_units as i64)?;
            write_tag_i64(writer, "CountStories", building.count_stories as i64)?;
            write_tag_f64(writer, "EnvelopeAirtightnessCoefficient", building.airtightness_q50)?;
            write_tag_f64(writer, "IndoorTemperature", building.indoor_temperature)?;
            write_tag_f64(writer, "OverheatingTemperatureThreshold", building.overheating_threshold)?;
            write_tag_end(writer, "PH_Building")?;
        }
        write_tag_end(writer, "PH_Buildings")?;
        write_tag_end(writer, "PassivehouseData")
    }
}

impl ToXml<XmlWriter> for HvacXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "HVAC")?;
        write_tag_start(writer, "Devices")?;
        for device in &self.devices.devices {
            write_tag_start(writer, "Device")?;
            write_tag(writer, "Name", &device.name)?;
            write_tag_i64(writer, "IdentNr", device.ident_nr)?;
            write_tag_i64(writer, "SystemType", device.system_type)?;
            write_tag_bool(writer, "UsedFor_Heating", device.used_for_heating)?;
            write_tag_bool(writer, "UsedFor_DHW", device.used_for_dhw)?;
            write_tag_bool(writer, "UsedFor_Cooling", device.used_for_cooling)?;
            write_tag_bool(writer, "UsedFor_Ventilation", device.used_for_ventilation)?;
            if let Some(v) = device.heat_recovery {
                write_tag_f64(writer, "HeatRecovery", v)?;
            }
            if let Some(v) = device.moisture_recovery {
                write_tag_f64(writer, "MoistureRecovery", v)?;
            }
            if let Some(v) = device.electric_efficiency {
                write_tag_f64(writer, "ElectricEfficiency", v)?;
            }
            if let Some(v) = device.efficiency {
                write_tag_f64(writer, "Efficiency", v)?;
            }
            if let Some(v) = device.fuel {
                write_tag_i64(writer, "Fuel", v)?;
            }
            if let Some(v) = device.annual_cop {
                write_tag_f64(writer, "AnnualCOP", v)?;
            }
            if let Some(v) = device.volume {
                write_tag_f64(writer, "SolutionsVolume", v)?;
            }
            if let Some(v) = device.standby_losses {
                write_tag_f64(writer, "StandbyLosses", v)?;
            }
            write_tag_end(writer, "Device")?;
        }
        write_tag_end(writer, "Devices")?;
        write_tag_end(writer, "HVAC")
    }
}

impl ToXml<XmlWriter> for AssemblyXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "Assembly")?;
        write_tag_i64(writer, "IdentNr", self.ident_nr)?;
        write_tag(writer, "Name", &self.name)?;
        write_tag_i64(writer, "Order_Layers", self.order_layers)?;
        write_tag_i64(writer, "Grid_Kind", self.grid_kind)?;
        write_tag_start(writer, "Layers")?;
        for layer in &self.layers.layers {
            write_tag_start(writer, "Layer")?;
            write_tag_f64(writer, "Thickness", layer.thickness)?;
            write_tag_start(writer, "Material")?;
            write_tag(writer, "Name", &layer.material.name)?;
            write_tag_f64(writer, "ThermalConductivity", layer.material.conductivity)?;
            write_tag_f64(writer, "BulkDensity", layer.material.density)?;
            write_tag_f64(writer, "Porosity", layer.material.porosity)?;
            write_tag_f64(writer, "HeatCapacity", layer.material.heat_capacity)?;
            write_tag_f64(writer, "WaterVaporResistance", layer.material.water_vapor_resistance)?;
            write_tag_end(writer, "Material")?;
            write_tag_end(writer, "Layer")?;
        }
        write_tag_end(writer, "Layers")?;
        write_tag_end(writer, "Assembly")
    }
}

impl ToXml<XmlWriter> for WindowTypeXml {
    fn write_xml(&self, writer: &mut Writer<XmlWriter>) -> Result<()> {
        write_tag_start(writer, "WindowType")?;
        write_tag_i64(writer, "IdentNr", self.ident_nr)?;
        write_tag(writer, "Name", &self.name)?;
        write_tag_f64(writer, "U_Value_Glazing", self.u_value_glazing)?;
        write_tag_f64(writer, "g_Value", self.g_value)?;
        write_tag_f64(writer, "U_Value_Frame", self.u_value_frame)?;
        write_tag_f64(writer, "Frame_Width_Left", self.frame_width)?;
        write_tag_f64(writer, "Frame_Psi_Left", self.frame_psi_install)?;
        write_tag_f64(writer, "Glazing_Psi_Left", self.glazing_psi)?;
        write_tag_end(writer, "WindowType")
    }
}

/// Render a validated Project to the platform XML vocabulary. Returns the
/// document plus any non-fatal warnings noticed along the way.
pub fn project_to_wufi_xml(project: &Project) -> Result<(String, Vec<ExportWarning>)> {
    let (document, warnings) = DocumentBuilder::new(project).build();

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;
    document.write_xml(&mut writer)?;

    let bytes = writer.into_inner().into_inner();
    let text = String::from_utf8(bytes).map_err(|_| {
        Error::new(
            ErrorKind::Export,
            ErrorCode::XmlDeserialization,
            Some("problem converting to UTF-8".to_owned()),
        )
    })?;
    Ok((text, warnings))
}

// ---------------------------------------------------------------------------
// Re-import

/// Parse + map a WUFI XML document from a reader.
pub fn project_from_reader(reader: &mut dyn BufRead) -> Result<Project> {
    let document: WufiPlusProject = match quick_xml::de::from_reader(reader) {
        Ok(document) => document,
        Err(err) => {
            return import_err!(XmlDeserialization, err.to_string());
        }
    };
    convert_document_to_project(document)
}

pub fn convert_document_to_project(document: WufiPlusProject) -> Result<Project> {
    let mut project = Project::new(if document.project_data.building_name.is_empty() {
        "unnamed_project"
    } else {
        &document.project_data.building_name
    });
    project.project_data = project_data_from_xml(&document.project_data);

    // catalogs first so references resolve while walking variants
    let mut assembly_keys = Vec::with_capacity(document.assemblies.assemblies.len());
    for assembly in &document.assemblies.assemblies {
        let mut layers = Vec::with_capacity(assembly.layers.layers.len());
        for layer in &assembly.layers.layers {
            project.add_material(
                &layer.material.name,
                Material {
                    display_name: layer.material.name.clone(),
                    conductivity: layer.material.conductivity,
                    density: layer.material.density,
                    porosity: layer.material.porosity,
                    heat_capacity: layer.material.heat_capacity,
                    water_vapor_resistance: layer.material.water_vapor_resistance,
                },
            )?;
            layers.push(Layer::new(layer.thickness, &layer.material.name));
        }
        project.add_assembly_type(
            &assembly.name,
            Assembly {
                display_name: assembly.name.clone(),
                layer_order: if assembly.order_layers == 1 {
                    LayerOrder::InsideToOutside
                } else {
                    LayerOrder::OutsideToInside
                },
                layers,
            },
        )?;
        assembly_keys.push(assembly.name.clone());
    }

    let mut window_keys = Vec::with_capacity(document.window_types.window_types.len());
    for wt in &document.window_types.window_types {
        project.add_window_type(
            &wt.name,
            WindowType {
                display_name: wt.name.clone(),
                u_value_glass: wt.u_value_glazing,
                u_value_frame: wt.u_value_frame,
                frame_width: wt.frame_width,
                glass_g_value: wt.g_value,
                psi_glazing: wt.glazing_psi,
                psi_install: wt.frame_psi_install,
            },
        )?;
        window_keys.push(wt.name.clone());
    }

    let mut vent_keys = Vec::with_capacity(document.vent_patterns.patterns.len());
    for pattern in &document.vent_patterns.patterns {
        project.add_ventilation_pattern(
            &pattern.name,
            VentilationPattern {
                display_name: pattern.name.clone(),
                operating_days: pattern.operating_days,
                operating_weeks: pattern.operating_weeks,
                high: OperatingPeriod::new(pattern.maximum_dos, pattern.maximum_pdf),
                standard: OperatingPeriod::new(pattern.standard_dos, pattern.standard_pdf),
                basic: OperatingPeriod::new(pattern.basic_dos, pattern.basic_pdf),
                minimum: OperatingPeriod::new(pattern.minimum_dos, pattern.minimum_pdf),
            },
        )?;
        vent_keys.push(pattern.name.clone());
    }

    let mut occupancy_keys = Vec::with_capacity(document.occupancy_patterns.patterns.len());
    for pattern in &document.occupancy_patterns.patterns {
        project.add_occupancy_pattern(
            &pattern.name,
            OccupancyPattern {
                display_name: pattern.name.clone(),
                start_hour: pattern.begin_utilization,
                end_hour: pattern.end_utilization,
                annual_utilization_days: pattern.annual_utilization_days,
                relative_utilization_factor: pattern.relative_absenteeism,
            },
        )?;
        occupancy_keys.push(pattern.name.clone());
    }

    let keys = CatalogKeys {
        assemblies: assembly_keys,
        windows: window_keys,
        vent_patterns: vent_keys,
        occupancy_patterns: occupancy_keys,
    };

    for variant in &document.variants.variants {
        let segment = segment_from_xml(&mut project, variant, &keys)?;
        project.add_segment(segment);
    }

    project.validate()?;
    Ok(project)
}

/// Catalog keys in document order, for resolving 1-based IdentNr references.
struct CatalogKeys {
    assemblies: Vec<String>,
    windows: Vec<String>,
    vent_patterns: Vec<String>,
    occupancy_patterns: Vec<String>,
}

impl CatalogKeys {
    fn resolve<'a>(list: &'a [String], ident_nr: i64, kind: &str, node: &str) -> Result<&'a str> {
        if ident_nr < 1 || ident_nr as usize > list.len() {
            return import_err!(
                UnresolvedReference,
                format!("'{node}': {kind} IdentNr {ident_nr} not in document")
            );
        }
        Ok(&list[ident_nr as usize - 1])
    }
}

fn project_data_from_xml(data: &ProjectDataXml) -> ProjectData {
    ProjectData {
        customer: Agent {
            name: data.customer_name.clone(),
            street: data.customer_street.clone(),
            city: data.customer_locality.clone(),
            post_code: data.customer_postal_code.clone(),
            telephone: data.customer_tel.clone(),
            email: data.customer_email.clone(),
        },
        building: Agent {
            name: data.building_name.clone(),
            street: data.building_street.clone(),
            city: data.building_locality.clone(),
            post_code: data.building_postal_code.clone(),
            ..Default::default()
        },
        owner: Agent {
            name: data.owner_name.clone(),
            ..Default::default()
        },
        designer: Agent {
            name: data.responsible_name.clone(),
            telephone: data.responsible_tel.clone(),
            email: data.responsible_email.clone(),
            ..Default::default()
        },
        project_date: data.project_date.clone(),
        owner_is_client: data.owner_is_client,
        year_constructed: data.year_construction,
    }
}

fn segment_from_xml(
    project: &mut Project,
    variant: &VariantXml,
    keys: &CatalogKeys,
) -> Result<BuildingSegment> {
    let mut segment = BuildingSegment {
        name: variant.name.clone(),
        remarks: variant.remarks.clone(),
        ..Default::default()
    };

    segment.site.climate_selection = match variant.climate_location.selection {
        6 => phx_model::site::ClimateSelection::UserDefined,
        _ => phx_model::site::ClimateSelection::Standard,
    };
    segment.site.location.latitude = variant.climate_location.latitude;
    segment.site.location.longitude = variant.climate_location.longitude;
    segment.site.location.site_elevation = variant.climate_location.site_elevation;
    segment.site.location.hours_from_utc = variant.climate_location.hours_from_utc;
    segment.site.average_ground_temperature = variant.climate_location.average_ground_temperature;

    segment.phius_cert.annual_heating_demand = variant.passivehouse_data.annual_heating_demand;
    segment.phius_cert.annual_cooling_demand = variant.passivehouse_data.annual_cooling_demand;
    segment.phius_cert.peak_heating_load = variant.passivehouse_data.peak_heating_load;
    segment.phius_cert.peak_cooling_load = variant.passivehouse_data.peak_cooling_load;
    if let Some(ph) = variant.passivehouse_data.ph_buildings.buildings.first() {
        segment.ph_building.num_of_units = ph.number_units;
        segment.ph_building.num_of_floors = ph.count_stories;
        segment.ph_building.airtightness_q50 = ph.airtightness_q50;
        segment.ph_building.setpoints.winter = ph.indoor_temperature;
        segment.ph_building.setpoints.summer = ph.overheating_threshold;
    }

    segment.building = building_from_xml(project, variant, keys)?;
    segment.mech_systems = hvac_from_xml(&variant.hvac)?;
    Ok(segment)
}

fn building_from_xml(
    project: &mut Project,
    variant: &VariantXml,
    keys: &CatalogKeys,
) -> Result<Building> {
    let graphics = &variant.graphics;
    let polygon =
        |ident_nr: i64, node: &str| -> Result<Polygon> { rebuild_polygon(graphics, ident_nr, node) };

    let mut building = Building::default();

    // zones before components, so InnerAttachment indices resolve
    for zone_xml in &variant.building.zones.zones {
        building.add_zone(zone_from_xml(project, zone_xml, keys)?);
    }

    // transparent components are apertures; they re-attach to the opaque
    // component whose polygon lists theirs as inside
    let mut apertures: Vec<(&ComponentXml, bool)> = variant
        .building
        .components
        .components
        .iter()
        .filter(|c| c.opacity == 2)
        .map(|c| (c, false))
        .collect();

    for component_xml in &variant.building.components.components {
        if component_xml.opacity == 2 {
            continue;
        }
        let face_type = match component_xml.opacity {
            3 => FaceType::AirBoundary,
            1 => {
                // face type is not carried explicitly; infer from the slope
                // of the first polygon, the platform convention
                let first_id = component_xml.polygon_ids.ids.first().copied().unwrap_or(-1);
                let poly = polygon(first_id, &component_xml.name)?;
                let angle = poly.angle_from_horizontal();
                if angle < 70.0 {
                    FaceType::RoofCeiling
                } else if angle > 110.0 {
                    FaceType::Floor
                } else {
                    FaceType::Wall
                }
            }
            other => {
                return import_err!(
                    UnknownTag,
                    format!("component '{}': unknown Type code {other}", component_xml.name)
                );
            }
        };
        let exposure_interior = match component_xml.inner_attachment {
            0 => ExposureInterior::None,
            idx => {
                let idx = idx as usize - 1;
                if idx >= building.zones().len() {
                    return import_err!(
                        UnresolvedReference,
                        format!(
                            "component '{}': InnerAttachment zone {} not in variant",
                            component_xml.name,
                            idx + 1
                        )
                    );
                }
                ExposureInterior::Zone(idx)
            }
        };
        let assembly_key = match component_xml.ident_nr_assembly {
            -1 => None,
            id => Some(CatalogKeys::resolve(
                &keys.assemblies,
                id,
                "assembly",
                &component_xml.name,
            )?),
        };
        if let Some(key) = assembly_key {
            project.assembly_types.mark_referenced(key)?;
        }

        let mut component = ComponentOpaque::new(
            &component_xml.name,
            face_type,
            exposure_exterior_from_code(component_xml.outer_attachment, &component_xml.name)?,
            exposure_interior,
            assembly_key,
        );

        let mut inside_ids: Vec<i64> = Vec::new();
        for id in &component_xml.polygon_ids.ids {
            component.add_polygon(polygon(*id, &component_xml.name)?);
            if let Some(poly_xml) = graphics.polygons.polygons.iter().find(|p| p.ident_nr == *id) {
                inside_ids.extend(&poly_xml.polygons_inside.ids);
            }
        }

        for (aperture_xml, claimed) in apertures.iter_mut() {
            let owned = aperture_xml
                .polygon_ids
                .ids
                .iter()
                .any(|id| inside_ids.contains(id));
            if !owned {
                continue;
            }
            let window_key = CatalogKeys::resolve(
                &keys.windows,
                aperture_xml.ident_nr_window_type,
                "window type",
                &aperture_xml.name,
            )?;
            project.window_types.mark_referenced(window_key)?;
            let polygons = aperture_xml
                .polygon_ids
                .ids
                .iter()
                .map(|id| polygon(*id, &aperture_xml.name))
                .collect::<Result<Vec<_>>>()?;
            component.add_aperture(ComponentAperture::new(
                &aperture_xml.name,
                window_key,
                polygons,
            )?);
            *claimed = true;
        }

        building.add_component(component)?;
    }

    if let Some((orphan, _)) = apertures.iter().find(|(_, claimed)| !claimed) {
        return Err(Error::new(
            ErrorKind::Import,
            ErrorCode::OrphanAperture,
            Some(format!(
                "transparent component '{}' is not inside any opaque component",
                orphan.name
            )),
        ));
    }

    Ok(building)
}

fn rebuild_polygon(graphics: &Graphics3DXml, ident_nr: i64, node: &str) -> Result<Polygon> {
    let polygon_xml = graphics
        .polygons
        .polygons
        .iter()
        .find(|p| p.ident_nr == ident_nr);
    let polygon_xml = match polygon_xml {
        Some(p) => p,
        None => {
            return import_err!(
                UnresolvedReference,
                format!("'{node}': polygon IdentNr {ident_nr} not in Graphics_3D")
            );
        }
    };
    let mut vertices = Vec::with_capacity(polygon_xml.point_ids.ids.len());
    for point_id in &polygon_xml.point_ids.ids {
        let vertex = graphics
            .vertices
            .vertices
            .iter()
            .find(|v| v.ident_nr == *point_id);
        match vertex {
            Some(v) => vertices.push(Vertex::new(v.x, v.y, v.z)),
            None => {
                return import_err!(
                    UnresolvedReference,
                    format!("'{node}': vertex IdentNr {point_id} not in Graphics_3D")
                );
            }
        }
    }
    Polygon::new(vertices).map_err(|err| {
        Error::new(
            ErrorKind::Import,
            ErrorCode::MalformedNode,
            Some(format!(
                "'{node}': {}",
                err.get_details().unwrap_or_default()
            )),
        )
    })
}

fn zone_from_xml(project: &mut Project, zone_xml: &ZoneXml, keys: &CatalogKeys) -> Result<Zone> {
    let mut zone = Zone {
        display_name: zone_xml.name.clone(),
        zone_type: zone_kind_from_code(zone_xml.kind_zone, &zone_xml.name)?,
        volume_gross: zone_xml.gross_volume,
        volume_net: zone_xml.net_volume,
        weighted_net_floor_area: zone_xml.floor_area,
        clearance_height: zone_xml.clearance_height,
        specific_heat_capacity: heat_capacity_from_code(
            zone_xml.specific_heat_capacity,
            &zone_xml.name,
        )?,
        res_occupant_quantity: zone_xml.occupant_quantity,
        res_number_bedrooms: zone_xml.number_bedrooms,
        ..Default::default()
    };

    for (i, room) in zone_xml.rooms.rooms.iter().enumerate() {
        let vent_key = match room.ident_nr_vent_pattern {
            -1 => None,
            id => {
                let key =
                    CatalogKeys::resolve(&keys.vent_patterns, id, "ventilation pattern", &room.name)?;
                project.ventilation_patterns.mark_referenced(key)?;
                Some(key.to_owned())
            }
        };
        // LoadPerson entries line up with the rooms list by position
        let occupancy_key = match zone_xml
            .load_persons
            .loads
            .get(i)
            .map(|load| load.ident_nr_pattern)
            .unwrap_or(-1)
        {
            -1 => None,
            id => {
                let key =
                    CatalogKeys::resolve(&keys.occupancy_patterns, id, "occupancy pattern", &room.name)?;
                project.occupancy_patterns.mark_referenced(key)?;
                Some(key.to_owned())
            }
        };
        zone.add_space(Space {
            display_name: room.name.clone(),
            quantity: room.quantity,
            floor_area: room.floor_area_gross,
            weighted_floor_area: room.area,
            clear_height: room.clear_height,
            ventilation_supply: room.flow_supply,
            ventilation_exhaust: room.flow_exhaust,
            ventilation_pattern_key: vent_key,
            occupancy_pattern_key: occupancy_key,
        });
    }

    for device in &zone_xml.home_devices.devices {
        zone.elec_equipment.add_device(ElectricDevice {
            display_name: device.comment.clone(),
            device_type: elec_device_from_code(device.device_type, &device.comment)?,
            quantity: device.quantity,
            energy_demand: device.energy_demand,
            in_conditioned_space: device.in_conditioned_space,
        })?;
    }

    for bridge in &zone_xml.thermal_bridges.bridges {
        zone.add_thermal_bridge(ThermalBridge {
            display_name: bridge.name.clone(),
            bridge_type: bridge_type_from_code(bridge.bridge_type, &bridge.name)?,
            psi_value: bridge.psi_value,
            length: bridge.length,
        });
    }

    Ok(zone)
}

fn hvac_from_xml(hvac: &HvacXml) -> Result<MechanicalSystems> {
    let mut systems = MechanicalSystems::default();
    for device_xml in &hvac.devices.devices {
        let device = match device_xml.system_type {
            1 => MechanicalDevice::Ventilation(Ventilator {
                display_name: device_xml.name.clone(),
                sensible_recovery: device_xml.heat_recovery.unwrap_or(0.0),
                latent_recovery: device_xml.moisture_recovery.unwrap_or(0.0),
                electric_efficiency: device_xml.electric_efficiency.unwrap_or(0.45),
                frost_protection: true,
            }),
            2 => MechanicalDevice::ElectricResistance(ElectricResistance {
                display_name: device_xml.name.clone(),
                efficiency: device_xml.efficiency.unwrap_or(1.0),
            }),
            3 => MechanicalDevice::Boiler(Boiler {
                display_name: device_xml.name.clone(),
                fuel: fuel_from_code(device_xml.fuel.unwrap_or(1), &device_xml.name)?,
                efficiency: device_xml.efficiency.unwrap_or(0.9),
                in_conditioned_space: true,
            }),
            5 => MechanicalDevice::HeatPump(HeatPump {
                display_name: device_xml.name.clone(),
                annual_cop: device_xml.annual_cop.unwrap_or(2.5),
            }),
            8 => MechanicalDevice::WaterStorage(WaterStorage {
                display_name: device_xml.name.clone(),
                volume: device_xml.volume.unwrap_or(0.0),
                standby_losses: device_xml.standby_losses.unwrap_or(0.0),
                in_conditioned_space: true,
            }),
            other => {
                return import_err!(
                    UnknownTag,
                    format!(
                        "device '{}': unknown SystemType code {other}",
                        device_xml.name
                    )
                );
            }
        };
        let mut subsystems = Vec::new();
        if device_xml.used_for_heating {
            subsystems.push(Subsystem::Heating);
        }
        if device_xml.used_for_cooling {
            subsystems.push(Subsystem::Cooling);
        }
        if device_xml.used_for_ventilation {
            subsystems.push(Subsystem::Ventilation);
        }
        if device_xml.used_for_dhw {
            subsystems.push(Subsystem::HotWater);
        }
        systems.add_device(&device_xml.name, device, &subsystems)?;
    }
    Ok(systems)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z0: f64) -> Polygon {
        Polygon::new(vec![
            Vertex::new(0.0, 0.0, z0),
            Vertex::new(1.0, 0.0, z0),
            Vertex::new(1.0, 0.0, z0 + 1.0),
            Vertex::new(0.0, 0.0, z0 + 1.0),
        ])
        .unwrap()
    }

    fn small_project() -> Project {
        let mut project = Project::new("Roundtrip House");
        project
            .add_material(
                "plaster",
                Material {
                    display_name: "plaster".to_owned(),
                    conductivity: 0.5,
                    density: 1200.0,
                    heat_capacity: 1000.0,
                    ..Default::default()
                },
            )
            .unwrap();
        project
            .add_assembly_type(
                "wall_asm",
                Assembly {
                    display_name: "wall_asm".to_owned(),
                    layers: vec![Layer::new(0.02, "plaster")],
                    ..Default::default()
                },
            )
            .unwrap();
        project
            .add_window_type(
                "win_a",
                WindowType {
                    display_name: "win_a".to_owned(),
                    ..Default::default()
                },
            )
            .unwrap();

        let mut segment = BuildingSegment::default();
        segment.name = "North Wing".to_owned();
        segment.building.add_zone(Zone {
            display_name: "zone_1".to_owned(),
            volume_gross: 100.0,
            volume_net: 90.0,
            ..Default::default()
        });

        let mut wall = ComponentOpaque::new(
            "south wall",
            FaceType::Wall,
            ExposureExterior::Exterior,
            ExposureInterior::Zone(0),
            Some("wall_asm"),
        );
        wall.add_polygon(square(0.0));
        wall.add_aperture(
            ComponentAperture::new(
                "south window",
                "win_a",
                vec![Polygon::new(vec![
                    Vertex::new(0.2, 0.0, 0.2),
                    Vertex::new(0.8, 0.0, 0.2),
                    Vertex::new(0.8, 0.0, 0.8),
                    Vertex::new(0.2, 0.0, 0.8),
                ])
                .unwrap()],
            )
            .unwrap(),
        );
        segment.building.add_component(wall).unwrap();
        project.assembly_types.mark_referenced("wall_asm").unwrap();
        project.window_types.mark_referenced("win_a").unwrap();
        project.add_segment(segment);
        project
    }

    #[test]
    fn export_is_deterministic() {
        let project = small_project();
        let (first, _) = project_to_wufi_xml(&project).unwrap();
        let (second, _) = project_to_wufi_xml(&project).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn roundtrip_preserves_catalogs_and_tree() {
        let project = small_project();
        let (xml, warnings) = project_to_wufi_xml(&project).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");

        let mut reader = std::io::BufReader::new(xml.as_bytes());
        let reimported = project_from_reader(&mut reader).unwrap();

        assert_eq!(reimported.materials.len(), 1);
        assert_eq!(reimported.assembly_types.len(), 1);
        assert_eq!(reimported.window_types.len(), 1);
        assert_eq!(reimported.segments().len(), 1);

        let segment = &reimported.segments()[0];
        assert_eq!(segment.name, "North Wing");
        assert_eq!(segment.building.zones().len(), 1);
        assert_eq!(segment.building.components().len(), 1);
        let wall = &segment.building.components()[0];
        assert_eq!(wall.face_type, FaceType::Wall);
        assert_eq!(wall.apertures().len(), 1);
        assert_eq!(wall.apertures()[0].window_type_key, "win_a");
    }

    #[test]
    fn zero_zone_segment_exports_with_warning() {
        let mut project = Project::new("empty");
        let mut segment = BuildingSegment::default();
        segment.name = "shell only".to_owned();
        project.add_segment(segment);

        let (xml, warnings) = project_to_wufi_xml(&project).unwrap();
        assert!(xml.contains("<Zones>"));
        assert!(warnings.iter().any(|w| w.location == "shell only"));
    }

    #[test]
    fn orphan_transparent_component_is_rejected() {
        let project = small_project();
        let (xml, _) = project_to_wufi_xml(&project).unwrap();
        // rename the inside-reference lists so the window no longer has a host
        let broken = xml
            .replace("<IdentNrPolygonsInside>", "<Unused>")
            .replace("</IdentNrPolygonsInside>", "</Unused>");
        assert_ne!(xml, broken);
        let mut reader = std::io::BufReader::new(broken.as_bytes());
        let err = project_from_reader(&mut reader).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrphanAperture);
    }

    #[test]
    fn shared_assembly_is_emitted_once_and_referenced_twice() {
        let mut project = small_project();
        {
            let segment = &mut project.segments_mut()[0];
            let mut second = ComponentOpaque::new(
                "north wall",
                FaceType::Wall,
                ExposureExterior::Exterior,
                ExposureInterior::Zone(0),
                Some("wall_asm"),
            );
            second.add_polygon(square(2.0));
            segment.building.add_component(second).unwrap();
        }

        let (xml, _) = project_to_wufi_xml(&project).unwrap();
        assert_eq!(xml.matches("<Assembly>").count(), 1);
        assert_eq!(xml.matches("<IdentNrAssembly>1</IdentNrAssembly>").count(), 2);
    }

    #[test]
    fn unknown_outer_attachment_code_is_loud() {
        let project = small_project();
        let (xml, _) = project_to_wufi_xml(&project).unwrap();
        let broken = xml.replace(
            "<OuterAttachment>-1</OuterAttachment>",
            "<OuterAttachment>-9</OuterAttachment>",
        );
        let mut reader = std::io::BufReader::new(broken.as_bytes());
        let err = project_from_reader(&mut reader).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTag);
    }

    #[test]
    fn attached_zone_kind_survives_the_roundtrip() {
        let mut project = small_project();
        project.segments_mut()[0].building.add_zone(Zone {
            display_name: "attic".to_owned(),
            zone_type: ZoneType::Attached,
            ..Default::default()
        });

        let (xml, _) = project_to_wufi_xml(&project).unwrap();
        assert!(xml.contains("<KindZone>2</KindZone>"));

        let mut reader = std::io::BufReader::new(xml.as_bytes());
        let reimported = project_from_reader(&mut reader).unwrap();
        let zones = reimported.segments()[0].building.zones();
        assert_eq!(zones[0].zone_type, ZoneType::Simulated);
        assert_eq!(zones[1].zone_type, ZoneType::Attached);
    }

    #[test]
    fn unknown_kind_zone_code_aborts_reimport() {
        let project = small_project();
        let (xml, _) = project_to_wufi_xml(&project).unwrap();
        let broken = xml.replace("<KindZone>1</KindZone>", "<KindZone>9</KindZone>");
        let mut reader = std::io::BufReader::new(broken.as_bytes());
        let err = project_from_reader(&mut reader).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTag);
        assert!(err.get_details().unwrap().contains("KindZone"));
    }

    #[test]
    fn unknown_component_type_code_aborts_reimport() {
        let project = small_project();
        let (xml, _) = project_to_wufi_xml(&project).unwrap();
        let broken = xml.replace("<Type>1</Type>", "<Type>5</Type>");
        let mut reader = std::io::BufReader::new(broken.as_bytes());
        let err = project_from_reader(&mut reader).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTag);
        assert!(err.get_details().unwrap().contains("Type code 5"));
    }
}
