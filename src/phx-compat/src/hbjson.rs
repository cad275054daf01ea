// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! HBJSON import: serde structs mirroring the subset of the foreign schema
//! we consume, plus the mapping pass that populates a `Project`.
//!
//! The document is a tree keyed by object-type tags, every object carrying
//! a stable identifier used for cross-referencing. The importer walks it in
//! native order, resolves children bottom-up (polygons before apertures
//! before faces before zones), deduplicates catalog entities by identifier,
//! and is all-or-nothing: any unresolvable reference aborts with a mapping
//! error naming the offending node and the missing key.

use serde::Deserialize;

use phx_model::building::{Building, Zone};
use phx_model::common::{Error, ErrorCode, ErrorKind, Result};
use phx_model::components::{
    ComponentAperture, ComponentOpaque, ExposureExterior, ExposureInterior, FaceType,
};
use phx_model::constructions::{Assembly, Layer, Material, WindowType};
use phx_model::elec::{ElectricDevice, ElectricDeviceCollection, ElectricDeviceType};
use phx_model::geometry::{Polygon, Vertex};
use phx_model::hvac::{
    Boiler, ElectricResistance, Fuel, HeatPump, MechanicalDevice, Subsystem, Ventilator,
    WaterStorage,
};
use phx_model::import_err;
use phx_model::project::{BuildingSegment, Project};
use phx_model::schedules::{OccupancyPattern, OperatingPeriod, VentilationPattern};
use phx_model::spaces::Space;

// ---------------------------------------------------------------------------
// Foreign document structs. Field names follow the upstream schema; only the
// subset the translator consumes is modelled.

fn default_one() -> f64 {
    1.0
}

fn default_quantity() -> u32 {
    1
}

#[derive(Clone, Debug, Deserialize)]
pub struct Model {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// length unit of all geometry in the document
    #[serde(default = "Model::default_units")]
    pub units: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub orphaned_shades: Vec<Shade>,
    pub properties: ModelProperties,
}

impl Model {
    fn default_units() -> String {
        "Meters".to_owned()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModelProperties {
    pub energy: ModelEnergyProperties,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ModelEnergyProperties {
    #[serde(default)]
    pub materials: Vec<MaterialAbridged>,
    #[serde(default)]
    pub constructions: Vec<ConstructionAbridged>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialAbridged {
    EnergyMaterial {
        identifier: String,
        #[serde(default)]
        display_name: Option<String>,
        /// m
        thickness: f64,
        /// W/mK
        conductivity: f64,
        /// kg/m3
        density: f64,
        /// J/kgK
        specific_heat: f64,
    },
    EnergyMaterialNoMass {
        identifier: String,
        #[serde(default)]
        display_name: Option<String>,
        /// m2K/W
        r_value: f64,
    },
}

impl MaterialAbridged {
    pub fn identifier(&self) -> &str {
        match self {
            MaterialAbridged::EnergyMaterial { identifier, .. } => identifier,
            MaterialAbridged::EnergyMaterialNoMass { identifier, .. } => identifier,
        }
    }

    /// Thickness of a layer of this material, m. No-mass materials carry
    /// no thickness of their own; the upstream convention is a nominal
    /// 100mm layer.
    pub fn thickness(&self) -> f64 {
        match self {
            MaterialAbridged::EnergyMaterial { thickness, .. } => *thickness,
            MaterialAbridged::EnergyMaterialNoMass { .. } => NO_MASS_THICKNESS,
        }
    }
}

const NO_MASS_THICKNESS: f64 = 0.1;

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ConstructionAbridged {
    OpaqueConstructionAbridged {
        identifier: String,
        #[serde(default)]
        display_name: Option<String>,
        /// material identifiers, outside-in
        materials: Vec<String>,
    },
    WindowConstructionAbridged {
        identifier: String,
        #[serde(default)]
        display_name: Option<String>,
        frame: WindowFrameData,
        glazing: WindowGlazingData,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct WindowFrameData {
    /// m
    pub width: f64,
    /// W/m2K
    pub u_factor: f64,
    /// W/mK
    #[serde(default)]
    pub psi_glazing: f64,
    /// W/mK
    #[serde(default)]
    pub psi_install: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WindowGlazingData {
    /// W/m2K
    pub u_factor: f64,
    /// fraction 0..=1
    pub shgc: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Room {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub faces: Vec<Face>,
    pub properties: RoomProperties,
}

impl Room {
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoomProperties {
    #[serde(default)]
    pub ph: RoomPhProperties,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RoomPhProperties {
    /// rooms sharing one segment identifier merge into one building segment
    #[serde(default)]
    pub ph_bldg_segment: Option<BldgSegmentRef>,
    #[serde(default)]
    pub spaces: Vec<PhSpace>,
    #[serde(default)]
    pub vent_sched: Option<VentSched>,
    #[serde(default)]
    pub occupancy_sched: Option<OccupancySched>,
    #[serde(default)]
    pub appliances: Vec<PhAppliance>,
    #[serde(default)]
    pub mech_devices: Vec<PhMechDevice>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BldgSegmentRef {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PhSpace {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// m2
    pub floor_area: f64,
    /// m2
    pub weighted_floor_area: f64,
    /// m
    #[serde(default = "PhSpace::default_clear_height")]
    pub avg_clear_height: f64,
    /// m3/h
    #[serde(default)]
    pub v_sup: f64,
    /// m3/h
    #[serde(default)]
    pub v_eta: f64,
}

impl PhSpace {
    fn default_clear_height() -> f64 {
        2.5
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct VentSched {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "VentSched::default_days")]
    pub operating_days_wk: f64,
    #[serde(default = "VentSched::default_weeks")]
    pub operating_wks_yr: f64,
    pub high: SchedPeriod,
    #[serde(default)]
    pub standard: SchedPeriod,
    #[serde(default)]
    pub basic: SchedPeriod,
    #[serde(default)]
    pub minimum: SchedPeriod,
}

impl VentSched {
    fn default_days() -> f64 {
        7.0
    }
    fn default_weeks() -> f64 {
        52.0
    }
}

#[derive(Copy, Clone, Debug, Default, Deserialize)]
pub struct SchedPeriod {
    /// hours/day
    #[serde(default)]
    pub period_operating_hours: f64,
    /// fraction of design airflow
    #[serde(default)]
    pub period_operation_speed: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OccupancySched {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub start_hour: f64,
    pub end_hour: f64,
    #[serde(default = "OccupancySched::default_days")]
    pub annual_utilization_days: f64,
    #[serde(default = "default_one")]
    pub relative_utilization_factor: f64,
}

impl OccupancySched {
    fn default_days() -> f64 {
        365.0
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PhAppliance {
    pub name: String,
    pub appliance_type: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// kWh/yr per unit
    pub annual_kwh: f64,
    #[serde(default)]
    pub in_conditioned_space: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "device_type")]
pub enum PhMechDevice {
    Ventilator {
        identifier: String,
        name: String,
        sensible_recovery: f64,
        #[serde(default)]
        latent_recovery: f64,
        electric_efficiency: f64,
    },
    HeatPump {
        identifier: String,
        name: String,
        annual_cop: f64,
        #[serde(default)]
        serves_hot_water: bool,
    },
    Boiler {
        identifier: String,
        name: String,
        fuel: String,
        efficiency: f64,
        #[serde(default)]
        serves_hot_water: bool,
    },
    ElectricResistance {
        identifier: String,
        name: String,
        #[serde(default = "default_one")]
        efficiency: f64,
    },
    WaterTank {
        identifier: String,
        name: String,
        /// L
        volume: f64,
        /// W/K
        standby_losses: f64,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct Face {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub face_type: String,
    pub boundary_condition: BoundaryCondition,
    pub geometry: Face3D,
    #[serde(default)]
    pub apertures: Vec<Aperture>,
    pub properties: FaceProperties,
}

impl Face {
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BoundaryCondition {
    #[serde(rename = "type")]
    pub bc_type: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Face3D {
    /// ordered vertex loop, [x, y, z]
    pub boundary: Vec<[f64; 3]>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FaceProperties {
    #[serde(default)]
    pub energy: FaceEnergyProperties,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FaceEnergyProperties {
    /// construction identifier; resolved against the document's catalog
    #[serde(default)]
    pub construction: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Aperture {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub geometry: Face3D,
    pub properties: FaceProperties,
}

impl Aperture {
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Shade {
    pub identifier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub geometry: Face3D,
}

// ---------------------------------------------------------------------------
// Fixed tag lookup tables. Foreign type tags resolve through explicit
// matches; an unknown tag is a loud mapping error, never a silent skip.

pub fn face_type_from_tag(tag: &str, node: &str) -> Result<FaceType> {
    match tag {
        "Wall" => Ok(FaceType::Wall),
        "RoofCeiling" => Ok(FaceType::RoofCeiling),
        "Floor" => Ok(FaceType::Floor),
        "AirBoundary" => Ok(FaceType::AirBoundary),
        other => import_err!(
            UnknownTag,
            format!("face '{node}': unknown face_type tag '{other}'")
        ),
    }
}

pub fn exposure_from_boundary_tag(tag: &str, node: &str) -> Result<ExposureExterior> {
    match tag {
        "Outdoors" => Ok(ExposureExterior::Exterior),
        "Ground" => Ok(ExposureExterior::Ground),
        "Surface" | "Adiabatic" => Ok(ExposureExterior::Surface),
        other => import_err!(
            UnknownTag,
            format!("face '{node}': unknown boundary_condition tag '{other}'")
        ),
    }
}

fn appliance_type_from_tag(tag: &str, node: &str) -> Result<ElectricDeviceType> {
    match tag {
        "Dishwasher" => Ok(ElectricDeviceType::Dishwasher),
        "ClothesWasher" => Ok(ElectricDeviceType::ClothesWasher),
        "ClothesDryer" => Ok(ElectricDeviceType::ClothesDryer),
        "Refrigerator" => Ok(ElectricDeviceType::Refrigerator),
        "Cooking" => Ok(ElectricDeviceType::Cooking),
        "Lighting" => Ok(ElectricDeviceType::Lighting),
        "MEL" => Ok(ElectricDeviceType::Mel),
        "Custom" => Ok(ElectricDeviceType::Custom),
        other => import_err!(
            UnknownTag,
            format!("appliance '{node}': unknown appliance_type tag '{other}'")
        ),
    }
}

fn fuel_from_tag(tag: &str, node: &str) -> Result<Fuel> {
    match tag {
        "NaturalGas" => Ok(Fuel::NaturalGas),
        "Oil" => Ok(Fuel::Oil),
        "Wood" => Ok(Fuel::Wood),
        "Electricity" => Ok(Fuel::Electricity),
        other => import_err!(
            UnknownTag,
            format!("device '{node}': unknown fuel tag '{other}'")
        ),
    }
}

fn unit_scale(units: &str) -> Result<f64> {
    match units {
        "Meters" => Ok(1.0),
        "Millimeters" => Ok(0.001),
        "Centimeters" => Ok(0.01),
        "Feet" => Ok(0.3048),
        "Inches" => Ok(0.0254),
        other => import_err!(UnknownTag, format!("unknown model units tag '{other}'")),
    }
}

// ---------------------------------------------------------------------------
// Import pass

/// Parse + map an HBJSON document from a reader.
pub fn project_from_reader(reader: &mut dyn std::io::BufRead) -> Result<Project> {
    let model: Model = match serde_json::from_reader(reader) {
        Ok(model) => model,
        Err(err) => {
            return import_err!(JsonDeserialization, err.to_string());
        }
    };
    convert_model_to_project(&model)
}

/// Map an already-deserialized HBJSON model into a validated Project.
/// All-or-nothing: the first mapping error aborts and no partial tree is
/// ever returned.
pub fn convert_model_to_project(model: &Model) -> Result<Project> {
    let scale = unit_scale(&model.units)?;

    let mut project = Project::new(
        model
            .display_name
            .as_deref()
            .unwrap_or(model.identifier.as_str()),
    );

    build_catalogs(&mut project, model)?;

    for (segment_id, rooms) in rooms_by_segment(model) {
        let segment = build_segment(&mut project, &segment_id, &rooms, scale)?;
        project.add_segment(segment);
    }

    if let Some(segment) = project.segments_mut().first_mut() {
        let mut shades = Vec::new();
        for shade in &model.orphaned_shades {
            let mut component = ComponentOpaque::new(
                shade.display_name.as_deref().unwrap_or(&shade.identifier),
                FaceType::Wall,
                ExposureExterior::Exterior,
                ExposureInterior::None,
                None,
            );
            component.add_polygon(polygon_from_face3d(&shade.geometry, scale, &shade.identifier)?);
            shades.push(component);
        }
        for component in shades {
            segment.building.add_component(component)?;
        }
    } else if !model.orphaned_shades.is_empty() {
        log::warn!(
            "document has {} orphaned shades but no rooms; shades dropped",
            model.orphaned_shades.len()
        );
    }

    project.validate()?;
    Ok(project)
}

fn build_catalogs(project: &mut Project, model: &Model) -> Result<()> {
    for material in &model.properties.energy.materials {
        let phx_material = match material {
            MaterialAbridged::EnergyMaterial {
                identifier,
                display_name,
                conductivity,
                density,
                specific_heat,
                ..
            } => Material {
                display_name: display_name.clone().unwrap_or_else(|| identifier.clone()),
                conductivity: *conductivity,
                density: *density,
                heat_capacity: *specific_heat,
                ..Default::default()
            },
            MaterialAbridged::EnergyMaterialNoMass {
                identifier,
                display_name,
                r_value,
            } => {
                if !(*r_value > 0.0) {
                    return import_err!(
                        MalformedNode,
                        format!("material '{identifier}': r_value {r_value} must be positive")
                    );
                }
                Material {
                    display_name: display_name.clone().unwrap_or_else(|| identifier.clone()),
                    // no-mass layers carry only a resistance; back out an
                    // equivalent conductivity at the nominal thickness
                    conductivity: NO_MASS_THICKNESS / r_value,
                    density: 46.0,
                    heat_capacity: 100.0,
                    ..Default::default()
                }
            }
        };
        project.add_material(material.identifier(), phx_material)?;
    }

    for construction in &model.properties.energy.constructions {
        match construction {
            ConstructionAbridged::OpaqueConstructionAbridged {
                identifier,
                display_name,
                materials,
            } => {
                let mut layers = Vec::with_capacity(materials.len());
                for material_key in materials {
                    let thickness = model
                        .properties
                        .energy
                        .materials
                        .iter()
                        .find(|m| m.identifier() == material_key)
                        .map(|m| m.thickness());
                    match thickness {
                        Some(thickness) => layers.push(Layer::new(thickness, material_key)),
                        None => {
                            return import_err!(
                                UnresolvedReference,
                                format!(
                                    "construction '{identifier}': material '{material_key}' not in document"
                                )
                            );
                        }
                    }
                }
                project.add_assembly_type(
                    identifier,
                    Assembly {
                        display_name: display_name.clone().unwrap_or_else(|| identifier.clone()),
                        layers,
                        ..Default::default()
                    },
                )?;
            }
            ConstructionAbridged::WindowConstructionAbridged {
                identifier,
                display_name,
                frame,
                glazing,
            } => {
                project.add_window_type(
                    identifier,
                    WindowType {
                        display_name: display_name.clone().unwrap_or_else(|| identifier.clone()),
                        u_value_glass: glazing.u_factor,
                        u_value_frame: frame.u_factor,
                        frame_width: frame.width,
                        glass_g_value: glazing.shgc,
                        psi_glazing: frame.psi_glazing,
                        psi_install: frame.psi_install,
                    },
                )?;
            }
        }
    }

    Ok(())
}

/// Group rooms by their building-segment identifier, preserving
/// first-appearance order. Rooms without a segment fall into one default
/// group.
fn rooms_by_segment(model: &Model) -> Vec<(String, Vec<&Room>)> {
    let mut groups: Vec<(String, Vec<&Room>)> = Vec::new();
    for room in &model.rooms {
        let segment_id = room
            .properties
            .ph
            .ph_bldg_segment
            .as_ref()
            .map(|s| s.identifier.clone())
            .unwrap_or_else(|| "unnamed_segment".to_owned());
        match groups.iter_mut().find(|(id, _)| *id == segment_id) {
            Some((_, rooms)) => rooms.push(room),
            None => groups.push((segment_id, vec![room])),
        }
    }
    groups
}

fn build_segment(
    project: &mut Project,
    segment_id: &str,
    rooms: &[&Room],
    scale: f64,
) -> Result<BuildingSegment> {
    let mut segment = BuildingSegment {
        name: rooms
            .first()
            .and_then(|r| r.properties.ph.ph_bldg_segment.as_ref())
            .and_then(|s| s.display_name.clone())
            .unwrap_or_else(|| segment_id.to_owned()),
        ..Default::default()
    };

    let mut building = Building::default();

    // zones first: faces attach to zones by index and children must exist
    // before a parent references them
    for room in rooms {
        building.add_zone(build_zone(project, room)?);
    }

    for (zone_idx, room) in rooms.iter().enumerate() {
        for face in &room.faces {
            let component = build_opaque_component(project, face, zone_idx, scale)?;
            building.add_component(component)?;
        }
    }

    for room in rooms {
        for device in &room.properties.ph.mech_devices {
            add_mech_device(&mut segment.mech_systems, device)?;
        }
    }

    segment.building = building;
    Ok(segment)
}

fn build_zone(project: &mut Project, room: &Room) -> Result<Zone> {
    let ph = &room.properties.ph;

    let vent_key = match &ph.vent_sched {
        Some(sched) => {
            if !project.ventilation_patterns.contains_key(&sched.identifier) {
                project.add_ventilation_pattern(
                    &sched.identifier,
                    VentilationPattern {
                        display_name: sched
                            .display_name
                            .clone()
                            .unwrap_or_else(|| sched.identifier.clone()),
                        operating_days: sched.operating_days_wk,
                        operating_weeks: sched.operating_wks_yr,
                        high: period(&sched.high),
                        standard: period(&sched.standard),
                        basic: period(&sched.basic),
                        minimum: period(&sched.minimum),
                    },
                )?;
            }
            project
                .ventilation_patterns
                .mark_referenced(&sched.identifier)?;
            Some(sched.identifier.clone())
        }
        None => None,
    };

    let occ_key = match &ph.occupancy_sched {
        Some(sched) => {
            if !project.occupancy_patterns.contains_key(&sched.identifier) {
                project.add_occupancy_pattern(
                    &sched.identifier,
                    OccupancyPattern {
                        display_name: sched
                            .display_name
                            .clone()
                            .unwrap_or_else(|| sched.identifier.clone()),
                        start_hour: sched.start_hour,
                        end_hour: sched.end_hour,
                        annual_utilization_days: sched.annual_utilization_days,
                        relative_utilization_factor: sched.relative_utilization_factor,
                    },
                )?;
            }
            project
                .occupancy_patterns
                .mark_referenced(&sched.identifier)?;
            Some(sched.identifier.clone())
        }
        None => None,
    };

    let mut zone = Zone {
        display_name: room.name().to_owned(),
        ..Default::default()
    };

    for space in &ph.spaces {
        zone.add_space(Space {
            display_name: space.name.clone(),
            quantity: space.quantity,
            floor_area: space.floor_area,
            weighted_floor_area: space.weighted_floor_area,
            clear_height: space.avg_clear_height,
            ventilation_supply: space.v_sup,
            ventilation_exhaust: space.v_eta,
            ventilation_pattern_key: vent_key.clone(),
            occupancy_pattern_key: occ_key.clone(),
        });
    }

    zone.weighted_net_floor_area = zone
        .spaces
        .iter()
        .map(|s| s.weighted_floor_area * s.quantity as f64)
        .sum();
    zone.volume_net = zone.spaces.iter().map(|s| s.net_volume()).sum();
    zone.volume_gross = zone.volume_net;

    let mut elec = ElectricDeviceCollection::default();
    for appliance in &ph.appliances {
        elec.add_device(ElectricDevice {
            display_name: appliance.name.clone(),
            device_type: appliance_type_from_tag(&appliance.appliance_type, &appliance.name)?,
            quantity: appliance.quantity,
            energy_demand: appliance.annual_kwh,
            in_conditioned_space: appliance.in_conditioned_space.unwrap_or(true),
        })?;
    }
    zone.elec_equipment = elec;

    Ok(zone)
}

fn period(p: &SchedPeriod) -> OperatingPeriod {
    OperatingPeriod::new(p.period_operating_hours, p.period_operation_speed)
}

fn build_opaque_component(
    project: &mut Project,
    face: &Face,
    zone_idx: usize,
    scale: f64,
) -> Result<ComponentOpaque> {
    let face_type = face_type_from_tag(&face.face_type, face.name())?;
    let exposure = exposure_from_boundary_tag(&face.boundary_condition.bc_type, face.name())?;

    let assembly_key = match face.properties.energy.construction.as_deref() {
        Some(key) => {
            if !project.assembly_types.contains_key(key) {
                return import_err!(
                    UnresolvedReference,
                    format!("face '{}': assembly '{key}' not in document", face.name())
                );
            }
            project.assembly_types.mark_referenced(key)?;
            key
        }
        None => {
            return import_err!(
                MissingRequiredField,
                format!("face '{}' has no construction assigned", face.name())
            );
        }
    };

    let mut component = ComponentOpaque::new(
        face.name(),
        face_type,
        exposure,
        ExposureInterior::Zone(zone_idx),
        Some(assembly_key),
    );
    component.add_polygon(polygon_from_face3d(&face.geometry, scale, face.name())?);

    // apertures resolve before attaching to the host (bottom-up)
    for aperture in &face.apertures {
        let window_key = match aperture.properties.energy.construction.as_deref() {
            Some(key) => {
                if !project.window_types.contains_key(key) {
                    return import_err!(
                        UnresolvedReference,
                        format!(
                            "aperture '{}': window type '{key}' not in document",
                            aperture.name()
                        )
                    );
                }
                project.window_types.mark_referenced(key)?;
                key
            }
            None => {
                return import_err!(
                    MissingRequiredField,
                    format!("aperture '{}' has no construction assigned", aperture.name())
                );
            }
        };
        let polygon = polygon_from_face3d(&aperture.geometry, scale, aperture.name())?;
        component.add_aperture(ComponentAperture::new(
            aperture.name(),
            window_key,
            vec![polygon],
        )?);
    }

    Ok(component)
}

fn polygon_from_face3d(geometry: &Face3D, scale: f64, node: &str) -> Result<Polygon> {
    let vertices: Vec<Vertex> = geometry
        .boundary
        .iter()
        .map(|[x, y, z]| Vertex::new(x * scale, y * scale, z * scale))
        .collect();
    Polygon::new(vertices).map_err(|err| {
        Error::new(
            ErrorKind::Import,
            ErrorCode::MalformedNode,
            Some(format!(
                "face '{node}': {}",
                err.get_details().unwrap_or_default()
            )),
        )
    })
}

fn add_mech_device(
    systems: &mut phx_model::hvac::MechanicalSystems,
    device: &PhMechDevice,
) -> Result<()> {
    match device {
        PhMechDevice::Ventilator {
            identifier,
            name,
            sensible_recovery,
            latent_recovery,
            electric_efficiency,
        } => systems.add_device(
            identifier,
            MechanicalDevice::Ventilation(Ventilator {
                display_name: name.clone(),
                sensible_recovery: *sensible_recovery,
                latent_recovery: *latent_recovery,
                electric_efficiency: *electric_efficiency,
                frost_protection: true,
            }),
            &[Subsystem::Ventilation],
        ),
        PhMechDevice::HeatPump {
            identifier,
            name,
            annual_cop,
            serves_hot_water,
        } => {
            let subsystems: &[Subsystem] = if *serves_hot_water {
                &[Subsystem::Heating, Subsystem::HotWater]
            } else {
                &[Subsystem::Heating]
            };
            systems.add_device(
                identifier,
                MechanicalDevice::HeatPump(HeatPump {
                    display_name: name.clone(),
                    annual_cop: *annual_cop,
                }),
                subsystems,
            )
        }
        PhMechDevice::Boiler {
            identifier,
            name,
            fuel,
            efficiency,
            serves_hot_water,
        } => {
            let subsystems: &[Subsystem] = if *serves_hot_water {
                &[Subsystem::Heating, Subsystem::HotWater]
            } else {
                &[Subsystem::Heating]
            };
            systems.add_device(
                identifier,
                MechanicalDevice::Boiler(Boiler {
                    display_name: name.clone(),
                    fuel: fuel_from_tag(fuel, name)?,
                    efficiency: *efficiency,
                    in_conditioned_space: true,
                }),
                subsystems,
            )
        }
        PhMechDevice::ElectricResistance {
            identifier,
            name,
            efficiency,
        } => systems.add_device(
            identifier,
            MechanicalDevice::ElectricResistance(ElectricResistance {
                display_name: name.clone(),
                efficiency: *efficiency,
            }),
            &[Subsystem::Heating],
        ),
        PhMechDevice::WaterTank {
            identifier,
            name,
            volume,
            standby_losses,
        } => systems.add_device(
            identifier,
            MechanicalDevice::WaterStorage(WaterStorage {
                display_name: name.clone(),
                volume: *volume,
                standby_losses: *standby_losses,
                in_conditioned_space: true,
            }),
            &[Subsystem::HotWater],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    pub(crate) const TWO_ROOM_MODEL: &str = r#"{
        "identifier": "model_1",
        "display_name": "Test House",
        "units": "Meters",
        "properties": {
            "energy": {
                "materials": [
                    {"type": "EnergyMaterial", "identifier": "concrete",
                     "thickness": 0.2, "conductivity": 1.8, "density": 2400.0,
                     "specific_heat": 880.0},
                    {"type": "EnergyMaterialNoMass", "identifier": "batt_r13",
                     "r_value": 2.29}
                ],
                "constructions": [
                    {"type": "OpaqueConstructionAbridged", "identifier": "ext_wall",
                     "materials": ["concrete", "batt_r13"]},
                    {"type": "WindowConstructionAbridged", "identifier": "double_low_e",
                     "frame": {"width": 0.1, "u_factor": 1.2},
                     "glazing": {"u_factor": 0.9, "shgc": 0.4}}
                ]
            }
        },
        "rooms": [
            {
                "identifier": "room_1",
                "display_name": "Living",
                "properties": {"ph": {
                    "ph_bldg_segment": {"identifier": "seg_a", "display_name": "Segment A"},
                    "spaces": [{"name": "living", "floor_area": 20.0,
                                "weighted_floor_area": 18.0, "v_sup": 30.0}],
                    "vent_sched": {"identifier": "vent_default",
                                   "high": {"period_operating_hours": 24.0,
                                            "period_operation_speed": 1.0}}
                }},
                "faces": [
                    {
                        "identifier": "face_1",
                        "face_type": "Wall",
                        "boundary_condition": {"type": "Outdoors"},
                        "geometry": {"boundary": [[0,0,0],[4,0,0],[4,0,2.5],[0,0,2.5]]},
                        "properties": {"energy": {"construction": "ext_wall"}},
                        "apertures": [
                            {
                                "identifier": "window_1",
                                "geometry": {"boundary": [[1,0,0.8],[2,0,0.8],[2,0,1.8],[1,0,1.8]]},
                                "properties": {"energy": {"construction": "double_low_e"}}
                            }
                        ]
                    }
                ]
            },
            {
                "identifier": "room_2",
                "display_name": "Bedroom",
                "properties": {"ph": {
                    "ph_bldg_segment": {"identifier": "seg_a"}
                }},
                "faces": [
                    {
                        "identifier": "face_2",
                        "face_type": "Wall",
                        "boundary_condition": {"type": "Outdoors"},
                        "geometry": {"boundary": [[4,0,0],[8,0,0],[8,0,2.5],[4,0,2.5]]},
                        "properties": {"energy": {"construction": "ext_wall"}}
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn imports_two_room_model() {
        let mut reader = BufReader::new(TWO_ROOM_MODEL.as_bytes());
        let project = project_from_reader(&mut reader).unwrap();

        assert_eq!(project.name, "Test House");
        assert_eq!(project.materials.len(), 2);
        assert_eq!(project.assembly_types.len(), 1);
        assert_eq!(project.window_types.len(), 1);
        assert_eq!(project.segments().len(), 1);

        let segment = &project.segments()[0];
        assert_eq!(segment.name, "Segment A");
        assert_eq!(segment.building.zones().len(), 2);
        assert_eq!(segment.building.components().len(), 2);
        assert_eq!(segment.building.components()[0].apertures().len(), 1);

        // both faces share one assembly entity
        assert_eq!(project.referenced_assembly_keys(segment), vec!["ext_wall"]);
    }

    #[test]
    fn dangling_assembly_key_aborts_with_key_name() {
        let doc = TWO_ROOM_MODEL.replace(
            "\"construction\": \"ext_wall\"",
            "\"construction\": \"no_such_assembly\"",
        );
        let mut reader = BufReader::new(doc.as_bytes());
        let err = project_from_reader(&mut reader).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Import);
        assert_eq!(err.code, ErrorCode::UnresolvedReference);
        assert!(err.get_details().unwrap().contains("no_such_assembly"));
    }

    #[test]
    fn unknown_face_type_tag_is_loud() {
        let doc = TWO_ROOM_MODEL.replace("\"face_type\": \"Wall\"", "\"face_type\": \"Hallway\"");
        let mut reader = BufReader::new(doc.as_bytes());
        let err = project_from_reader(&mut reader).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownTag);
        assert!(err.get_details().unwrap().contains("Hallway"));
    }

    #[test]
    fn feet_geometry_is_scaled_to_meters() {
        let doc = TWO_ROOM_MODEL.replace("\"units\": \"Meters\"", "\"units\": \"Feet\"");
        let mut reader = BufReader::new(doc.as_bytes());
        let project = project_from_reader(&mut reader).unwrap();
        let wall = &project.segments()[0].building.components()[0];
        let expected = 4.0 * 2.5 * 0.3048 * 0.3048;
        assert!((wall.gross_area() - expected).abs() < 1e-9);
    }

    #[test]
    fn malformed_geometry_names_the_face() {
        let doc = TWO_ROOM_MODEL.replace(
            "\"boundary\": [[4,0,0],[8,0,0],[8,0,2.5],[4,0,2.5]]",
            "\"boundary\": [[4,0,0],[8,0,0]]",
        );
        let mut reader = BufReader::new(doc.as_bytes());
        let err = project_from_reader(&mut reader).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedNode);
        assert!(err.get_details().unwrap().contains("face_2"));
    }

    #[test]
    fn no_mass_material_backs_out_conductivity() {
        let mut reader = BufReader::new(TWO_ROOM_MODEL.as_bytes());
        let project = project_from_reader(&mut reader).unwrap();
        let batt = project.materials.get("batt_r13").unwrap();
        assert!((batt.conductivity - 0.1 / 2.29).abs() < 1e-12);
    }
}
