// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! PHPP spreadsheet export.
//!
//! The exporter renders a Project into an ordered list of cell writes and
//! replays them into a `Workbook`. Each section first blanks the full range
//! it owns and then writes its values, so an export is always a destructive
//! rewrite of those ranges regardless of what the workbook held before.
//!
//! Exactly one workbook layout is supported (`shape::V9_EN`); the version
//! cell is checked before anything is written.

pub mod shape;
pub mod xl;

use phx_model::common::{ExportWarning, Result};
use phx_model::components::{ComponentOpaque, ExposureExterior};
use phx_model::elec::ElectricDeviceType;
use phx_model::hvac::MechanicalDevice;
use phx_model::project::Project;
use phx_model::resource_err;
use phx_model::units::Unit;

use self::shape::Shape;
use self::xl::{Session, Workbook, XlItem};

/// Write `project` into `workbook`. Fatal on a missing or mismatched
/// version cell, before any cell is touched. Returns the non-fatal
/// warnings gathered during the traversal.
pub fn project_to_phpp<W: Workbook + ?Sized>(
    project: &Project,
    workbook: &mut W,
) -> Result<Vec<ExportWarning>> {
    let shape = &shape::V9_EN;
    let mut session = Session::attach(workbook)?;

    let reported = session.read_cell(shape.version.sheet, shape.version.cell)?;
    match reported {
        None => {
            return resource_err!(
                DocumentUnavailable,
                format!(
                    "workbook has no version cell at {}!{}",
                    shape.version.sheet, shape.version.cell
                )
            );
        }
        Some(version) if version.trim() != shape.version.expected => {
            return resource_err!(
                WrongDocumentVersion,
                format!(
                    "workbook reports version '{}', supported layout is '{}'",
                    version.trim(),
                    shape.version.expected
                )
            );
        }
        Some(_) => {}
    }

    let (items, warnings) = build_write_list(project, shape);
    for item in &items {
        session.write_item(item)?;
    }
    Ok(warnings)
}

/// The full ordered write list for `project`, with warnings for every
/// model feature the layout has no slot for. Pure; exposed so callers and
/// tests can diff write lists without a workbook.
pub fn build_write_list(project: &Project, shape: &Shape) -> (Vec<XlItem>, Vec<ExportWarning>) {
    let mut out = Emitter {
        items: Vec::new(),
        warnings: Vec::new(),
    };
    out.verification(project, shape);
    out.climate(project, shape);
    out.u_values(project, shape);
    out.components(project, shape);
    out.areas(project, shape);
    out.ventilation(project, shape);
    out.dhw(project, shape);
    out.electricity(project, shape);
    (out.items, out.warnings)
}

struct Emitter {
    items: Vec<XlItem>,
    warnings: Vec<ExportWarning>,
}

fn a1(col: &str, row: u32) -> String {
    format!("{col}{row}")
}

/// Areas-sheet group number for an opaque surface.
fn surface_group(component: &ComponentOpaque) -> u32 {
    if component.is_roof() {
        10
    } else if component.is_floor() {
        11
    } else if component.exposure_exterior == ExposureExterior::Ground {
        9
    } else {
        8
    }
}

impl Emitter {
    fn warn(&mut self, location: &str, field: &str, details: String) {
        self.warnings.push(ExportWarning::new(location, field, details));
    }

    fn verification(&mut self, project: &Project, shape: &Shape) {
        let s = &shape.verification;
        let data = &project.project_data;
        self.items.push(XlItem::text(
            s.name,
            s.building_name.to_owned(),
            data.building.name.clone(),
        ));
        self.items.push(XlItem::text(
            s.name,
            s.street.to_owned(),
            data.building.street.clone(),
        ));
        self.items.push(XlItem::text(
            s.name,
            s.locality.to_owned(),
            data.building.city.clone(),
        ));
        self.items.push(XlItem::text(
            s.name,
            s.post_code.to_owned(),
            data.building.post_code.clone(),
        ));
        self.items.push(XlItem::text(
            s.name,
            s.customer_name.to_owned(),
            data.customer.name.clone(),
        ));
        self.items.push(XlItem::text(
            s.name,
            s.owner_name.to_owned(),
            data.owner.name.clone(),
        ));
        self.items.push(XlItem::text(
            s.name,
            s.designer_name.to_owned(),
            data.designer.name.clone(),
        ));
        self.items.push(XlItem::number(
            s.name,
            s.year_constructed.to_owned(),
            data.year_constructed as f64,
        ));

        // the workbook holds one building; only the first segment has a slot
        let Some(segment) = project.segments().first() else {
            return;
        };
        for extra in project.segments().iter().skip(1) {
            self.warn(
                s.name,
                "segment",
                format!("segment '{}' has no slot in a single-building workbook", extra.name),
            );
        }
        let ph = &segment.ph_building;
        self.items.push(XlItem::number(
            s.name,
            s.number_units.to_owned(),
            ph.num_of_units as f64,
        ));
        self.items.push(XlItem::number(
            s.name,
            s.number_floors.to_owned(),
            ph.num_of_floors as f64,
        ));
        self.items.push(XlItem::number(
            s.name,
            s.airtightness_n50.to_owned(),
            ph.airtightness_n50,
        ));
        self.items.push(
            XlItem::number(s.name, s.setpoint_winter.to_owned(), ph.setpoints.winter)
                .with_units(Unit::DegC, Unit::DegC),
        );
        self.items.push(
            XlItem::number(s.name, s.setpoint_summer.to_owned(), ph.setpoints.summer)
                .with_units(Unit::DegC, Unit::DegC),
        );
    }

    fn climate(&mut self, project: &Project, shape: &Shape) {
        let s = &shape.climate;
        let Some(segment) = project.segments().first() else {
            return;
        };
        let site = &segment.site;
        self.items.push(XlItem::text(
            s.name,
            s.site_name.to_owned(),
            site.display_name.clone(),
        ));
        self.items
            .push(XlItem::number(s.name, s.latitude.to_owned(), site.location.latitude));
        self.items
            .push(XlItem::number(s.name, s.longitude.to_owned(), site.location.longitude));
        self.items.push(XlItem::number(
            s.name,
            s.elevation.to_owned(),
            site.location.site_elevation,
        ));
        self.items.push(XlItem::number(
            s.name,
            s.ground_temperature.to_owned(),
            site.average_ground_temperature,
        ));
    }

    fn u_values(&mut self, project: &Project, shape: &Shape) {
        let s = &shape.u_values;
        // blank every constructor block we own
        for block in 0..s.block_count {
            let base = s.first_block_row + block * s.block_height;
            self.items.push(XlItem::blank(s.name, a1(s.name_col, base)));
            for layer in 0..s.max_layers {
                let row = base + s.first_layer_offset + layer;
                self.items.push(XlItem::blank(s.name, a1(s.layer_name_col, row)));
                self.items.push(XlItem::blank(s.name, a1(s.conductivity_col, row)));
                self.items.push(XlItem::blank(s.name, a1(s.thickness_col, row)));
            }
        }

        for (i, (key, assembly)) in project.assembly_types.iter().enumerate() {
            if i as u32 >= s.block_count {
                self.warn(
                    s.name,
                    "assembly",
                    format!("assembly '{key}' exceeds the {} constructor blocks", s.block_count),
                );
                continue;
            }
            let base = s.first_block_row + i as u32 * s.block_height;
            self.items.push(XlItem::text(
                s.name,
                a1(s.name_col, base),
                assembly.display_name.clone(),
            ));
            for (j, layer) in assembly.layers.iter().enumerate() {
                if j as u32 >= s.max_layers {
                    self.warn(
                        s.name,
                        "layer",
                        format!(
                            "assembly '{key}' layer '{}' exceeds the {} layer rows",
                            layer.material_key, s.max_layers
                        ),
                    );
                    continue;
                }
                let row = base + s.first_layer_offset + j as u32;
                self.items.push(XlItem::text(
                    s.name,
                    a1(s.layer_name_col, row),
                    layer.material_key.clone(),
                ));
                let conductivity = project
                    .materials
                    .get(&layer.material_key)
                    .map(|m| m.conductivity)
                    .unwrap_or_default();
                self.items.push(
                    XlItem::number(s.name, a1(s.conductivity_col, row), conductivity)
                        .with_units(Unit::WPerMK, s.conductivity_unit),
                );
                // the thickness column takes millimeters
                self.items.push(XlItem::number(
                    s.name,
                    a1(s.thickness_col, row),
                    layer.thickness * 1000.0,
                ));
            }
        }
    }

    fn components(&mut self, project: &Project, shape: &Shape) {
        let s = &shape.components;
        for i in 0..s.glazing_row_count {
            let row = s.glazing_first_row + i;
            self.items.push(XlItem::blank(s.name, a1(s.glazing_name_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.glazing_g_value_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.glazing_u_value_col, row)));
        }
        for i in 0..s.frame_row_count {
            let row = s.frame_first_row + i;
            self.items.push(XlItem::blank(s.name, a1(s.frame_name_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.frame_u_value_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.frame_width_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.frame_psi_glazing_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.frame_psi_install_col, row)));
        }

        for (i, (key, wt)) in project.window_types.iter().enumerate() {
            if i as u32 >= s.glazing_row_count.min(s.frame_row_count) {
                self.warn(
                    s.name,
                    "window type",
                    format!("window type '{key}' exceeds the component rows"),
                );
                continue;
            }
            let g_row = s.glazing_first_row + i as u32;
            self.items.push(XlItem::text(
                s.name,
                a1(s.glazing_name_col, g_row),
                wt.display_name.clone(),
            ));
            self.items
                .push(XlItem::number(s.name, a1(s.glazing_g_value_col, g_row), wt.glass_g_value));
            self.items.push(
                XlItem::number(s.name, a1(s.glazing_u_value_col, g_row), wt.u_value_glass)
                    .with_units(Unit::WPerM2K, s.u_value_unit),
            );

            let f_row = s.frame_first_row + i as u32;
            self.items.push(XlItem::text(
                s.name,
                a1(s.frame_name_col, f_row),
                wt.display_name.clone(),
            ));
            self.items.push(
                XlItem::number(s.name, a1(s.frame_u_value_col, f_row), wt.u_value_frame)
                    .with_units(Unit::WPerM2K, s.u_value_unit),
            );
            self.items
                .push(XlItem::number(s.name, a1(s.frame_width_col, f_row), wt.frame_width));
            self.items
                .push(XlItem::number(s.name, a1(s.frame_psi_glazing_col, f_row), wt.psi_glazing));
            self.items
                .push(XlItem::number(s.name, a1(s.frame_psi_install_col, f_row), wt.psi_install));
        }
    }

    fn areas(&mut self, project: &Project, shape: &Shape) {
        let s = &shape.areas;
        for i in 0..s.surface_row_count {
            let row = s.surface_first_row + i;
            self.items.push(XlItem::blank(s.name, a1(s.surface_name_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.surface_group_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.surface_area_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.surface_assembly_col, row)));
        }
        for i in 0..s.bridge_row_count {
            let row = s.bridge_first_row + i;
            self.items.push(XlItem::blank(s.name, a1(s.bridge_name_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.bridge_length_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.bridge_psi_col, row)));
        }

        let Some(segment) = project.segments().first() else {
            return;
        };

        let mut row_index: u32 = 0;
        for component in segment.building.components() {
            if component.is_shade() {
                self.warn(
                    s.name,
                    "surface",
                    format!("shading surface '{}' has no Areas slot", component.display_name),
                );
                continue;
            }
            for aperture in component.apertures() {
                self.warn(
                    s.name,
                    "aperture",
                    format!(
                        "window surface '{}' is sized by its host; no Areas row written",
                        aperture.display_name
                    ),
                );
            }
            if row_index >= s.surface_row_count {
                self.warn(
                    s.name,
                    "surface",
                    format!("surface '{}' exceeds the area rows", component.display_name),
                );
                continue;
            }
            let row = s.surface_first_row + row_index;
            row_index += 1;
            self.items.push(XlItem::text(
                s.name,
                a1(s.surface_name_col, row),
                component.display_name.clone(),
            ));
            self.items.push(XlItem::number(
                s.name,
                a1(s.surface_group_col, row),
                surface_group(component) as f64,
            ));
            self.items.push(
                XlItem::number(s.name, a1(s.surface_area_col, row), component.net_area())
                    .with_units(Unit::M2, s.area_unit),
            );
            if let Some(key) = component.assembly_key.as_deref() {
                if let Some(pos) = project.assembly_types.position(key) {
                    self.items.push(XlItem::number(
                        s.name,
                        a1(s.surface_assembly_col, row),
                        pos as f64 + 1.0,
                    ));
                }
            }
        }

        let mut bridge_index: u32 = 0;
        for zone in segment.building.zones() {
            for bridge in &zone.thermal_bridges {
                if bridge_index >= s.bridge_row_count {
                    self.warn(
                        s.name,
                        "thermal bridge",
                        format!("thermal bridge '{}' exceeds the rows", bridge.display_name),
                    );
                    continue;
                }
                let row = s.bridge_first_row + bridge_index;
                bridge_index += 1;
                self.items.push(XlItem::text(
                    s.name,
                    a1(s.bridge_name_col, row),
                    bridge.display_name.clone(),
                ));
                self.items
                    .push(XlItem::number(s.name, a1(s.bridge_length_col, row), bridge.length));
                self.items
                    .push(XlItem::number(s.name, a1(s.bridge_psi_col, row), bridge.psi_value));
            }
        }
    }

    fn ventilation(&mut self, project: &Project, shape: &Shape) {
        let s = &shape.ventilation;
        for i in 0..s.space_row_count {
            let row = s.space_first_row + i;
            self.items.push(XlItem::blank(s.name, a1(s.space_name_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.space_quantity_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.space_area_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.space_height_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.space_supply_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.space_exhaust_col, row)));
        }
        for i in 0..s.unit_row_count {
            let row = s.unit_first_row + i;
            self.items.push(XlItem::blank(s.name, a1(s.unit_name_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.unit_heat_recovery_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.unit_moisture_recovery_col, row)));
            self.items
                .push(XlItem::blank(s.name, a1(s.unit_electric_efficiency_col, row)));
        }

        let Some(segment) = project.segments().first() else {
            return;
        };

        let mut space_index: u32 = 0;
        for zone in segment.building.zones() {
            for space in &zone.spaces {
                if space_index >= s.space_row_count {
                    self.warn(
                        s.name,
                        "space",
                        format!("space '{}' exceeds the rows", space.display_name),
                    );
                    continue;
                }
                let row = s.space_first_row + space_index;
                space_index += 1;
                self.items.push(XlItem::text(
                    s.name,
                    a1(s.space_name_col, row),
                    space.display_name.clone(),
                ));
                self.items.push(XlItem::number(
                    s.name,
                    a1(s.space_quantity_col, row),
                    space.quantity as f64,
                ));
                self.items.push(XlItem::number(
                    s.name,
                    a1(s.space_area_col, row),
                    space.weighted_floor_area,
                ));
                self.items
                    .push(XlItem::number(s.name, a1(s.space_height_col, row), space.clear_height));
                self.items.push(
                    XlItem::number(s.name, a1(s.space_supply_col, row), space.ventilation_supply)
                        .with_units(Unit::M3PerHour, s.airflow_unit),
                );
                self.items.push(
                    XlItem::number(s.name, a1(s.space_exhaust_col, row), space.ventilation_exhaust)
                        .with_units(Unit::M3PerHour, s.airflow_unit),
                );
            }
        }

        let mut unit_index: u32 = 0;
        for (key, device) in segment.mech_systems.devices.iter() {
            let MechanicalDevice::Ventilation(ventilator) = device else {
                continue;
            };
            if unit_index >= s.unit_row_count {
                self.warn(s.name, "ventilator", format!("ventilator '{key}' exceeds the rows"));
                continue;
            }
            let row = s.unit_first_row + unit_index;
            unit_index += 1;
            self.items.push(XlItem::text(
                s.name,
                a1(s.unit_name_col, row),
                ventilator.display_name.clone(),
            ));
            self.items.push(XlItem::number(
                s.name,
                a1(s.unit_heat_recovery_col, row),
                ventilator.sensible_recovery,
            ));
            self.items.push(XlItem::number(
                s.name,
                a1(s.unit_moisture_recovery_col, row),
                ventilator.latent_recovery,
            ));
            self.items.push(XlItem::number(
                s.name,
                a1(s.unit_electric_efficiency_col, row),
                ventilator.electric_efficiency,
            ));
        }
    }

    fn dhw(&mut self, project: &Project, shape: &Shape) {
        let s = &shape.dhw;
        self.items.push(XlItem::blank(s.name, s.tank_volume.to_owned()));
        self.items.push(XlItem::blank(s.name, s.tank_standby_losses.to_owned()));

        let Some(segment) = project.segments().first() else {
            return;
        };
        let mut tank_written = false;
        for (key, device) in segment.mech_systems.devices.iter() {
            match device {
                MechanicalDevice::WaterStorage(tank) => {
                    if tank_written {
                        self.warn(
                            s.name,
                            "tank",
                            format!("storage tank '{key}' exceeds the single tank slot"),
                        );
                        continue;
                    }
                    tank_written = true;
                    // volume cell takes liters
                    self.items.push(XlItem::number(
                        s.name,
                        s.tank_volume.to_owned(),
                        tank.volume * 1000.0,
                    ));
                    self.items.push(XlItem::number(
                        s.name,
                        s.tank_standby_losses.to_owned(),
                        tank.standby_losses,
                    ));
                }
                MechanicalDevice::Ventilation(_) => {}
                other => {
                    self.warn(
                        s.name,
                        "device",
                        format!(
                            "{:?} device '{}' has no slot in the supported layout",
                            other.device_type(),
                            key
                        ),
                    );
                }
            }
        }
    }

    fn electricity(&mut self, project: &Project, shape: &Shape) {
        let s = &shape.electricity;
        let rows = [
            s.dishwasher_row,
            s.clothes_washer_row,
            s.clothes_dryer_row,
            s.refrigerator_row,
            s.cooking_row,
            s.lighting_row,
            s.mel_row,
        ];
        for row in rows {
            self.items.push(XlItem::blank(s.name, a1(s.quantity_col, row)));
            self.items.push(XlItem::blank(s.name, a1(s.demand_col, row)));
        }

        let Some(segment) = project.segments().first() else {
            return;
        };
        for zone in segment.building.zones() {
            for device in zone.elec_equipment.devices() {
                let row = match device.device_type {
                    ElectricDeviceType::Dishwasher => s.dishwasher_row,
                    ElectricDeviceType::ClothesWasher => s.clothes_washer_row,
                    ElectricDeviceType::ClothesDryer => s.clothes_dryer_row,
                    ElectricDeviceType::Refrigerator => s.refrigerator_row,
                    ElectricDeviceType::Cooking => s.cooking_row,
                    ElectricDeviceType::Lighting => s.lighting_row,
                    ElectricDeviceType::Mel => s.mel_row,
                    ElectricDeviceType::Custom => {
                        self.warn(
                            s.name,
                            "appliance",
                            format!(
                                "custom appliance '{}' has no fixed row",
                                device.display_name
                            ),
                        );
                        continue;
                    }
                };
                self.items.push(XlItem::number(
                    s.name,
                    a1(s.quantity_col, row),
                    device.quantity as f64,
                ));
                self.items.push(XlItem::number(
                    s.name,
                    a1(s.demand_col, row),
                    device.energy_demand,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phx_model::common::ErrorCode;
    use phx_model::constructions::{Assembly, Layer, Material, WindowType};
    use phx_model::elec::ElectricDevice;
    use phx_model::project::BuildingSegment;
    use phx_model::building::Zone;
    use phx_model::spaces::Space;
    use super::xl::CellBook;

    fn seeded_book() -> CellBook {
        let mut book = CellBook::new();
        book.set_cell("Data", "B2", "9.6a EN");
        book
    }

    fn sample_project() -> Project {
        let mut project = Project::new("Main St");
        project.project_data.building.name = "Main St Residence".to_owned();
        project
            .add_material(
                "brick",
                Material {
                    display_name: "brick".to_owned(),
                    conductivity: 0.6,
                    density: 1800.0,
                    heat_capacity: 900.0,
                    ..Default::default()
                },
            )
            .unwrap();
        project
            .add_assembly_type(
                "brick_wall",
                Assembly {
                    display_name: "brick_wall".to_owned(),
                    layers: vec![Layer::new(0.3, "brick")],
                    ..Default::default()
                },
            )
            .unwrap();
        project
            .add_window_type(
                "triple",
                WindowType {
                    display_name: "triple".to_owned(),
                    u_value_glass: 0.7,
                    ..Default::default()
                },
            )
            .unwrap();

        let mut segment = BuildingSegment::default();
        let mut zone = Zone::default();
        zone.display_name = "main".to_owned();
        zone.add_space(Space {
            display_name: "kitchen".to_owned(),
            quantity: 1,
            floor_area: 14.0,
            weighted_floor_area: 14.0,
            clear_height: 2.5,
            ventilation_supply: 30.0,
            ventilation_exhaust: 45.0,
            ..Default::default()
        });
        zone.elec_equipment
            .add_device(ElectricDevice {
                display_name: "fridge".to_owned(),
                device_type: ElectricDeviceType::Refrigerator,
                quantity: 1,
                energy_demand: 120.0,
                in_conditioned_space: true,
            })
            .unwrap();
        segment.building.add_zone(zone);
        project.add_segment(segment);
        project
    }

    #[test]
    fn wrong_version_is_fatal_before_any_write() {
        let mut book = CellBook::new();
        book.set_cell("Data", "B2", "10.3 EN");
        let err = project_to_phpp(&sample_project(), &mut book).unwrap_err();
        assert_eq!(err.code, ErrorCode::WrongDocumentVersion);
        assert!(book.writes.is_empty());
    }

    #[test]
    fn missing_version_cell_is_fatal() {
        let mut book = CellBook::new();
        let err = project_to_phpp(&sample_project(), &mut book).unwrap_err();
        assert_eq!(err.code, ErrorCode::DocumentUnavailable);
        assert!(book.writes.is_empty());
    }

    #[test]
    fn export_writes_verification_and_catalog_cells() {
        let mut book = seeded_book();
        project_to_phpp(&sample_project(), &mut book).unwrap();
        assert_eq!(book.cell("Verification", "K5"), Some("Main St Residence"));
        assert_eq!(book.cell("U-Values", "M8"), Some("brick_wall"));
        assert_eq!(book.cell("U-Values", "L11"), Some("brick"));
        assert_eq!(book.cell("U-Values", "S11"), Some("300"));
        assert_eq!(book.cell("Components", "ID9"), Some("triple"));
        assert_eq!(book.cell("Addnl vent", "E56"), Some("kitchen"));
        assert_eq!(book.cell("Electricity", "M20"), Some("120"));
    }

    #[test]
    fn export_blanks_unused_rows() {
        let mut book = seeded_book();
        book.set_cell("Areas", "L42", "stale surface");
        project_to_phpp(&sample_project(), &mut book).unwrap();
        assert_eq!(book.cell("Areas", "L42"), Some(""));
    }

    #[test]
    fn write_list_is_identical_across_exports() {
        let project = sample_project();
        let (first, _) = build_write_list(&project, &shape::V9_EN);
        let (second, _) = build_write_list(&project, &shape::V9_EN);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn custom_appliance_produces_warning_not_error() {
        let mut project = sample_project();
        project.segments_mut()[0].building.zones_mut()[0]
            .elec_equipment
            .add_device(ElectricDevice {
                display_name: "aquarium".to_owned(),
                device_type: ElectricDeviceType::Custom,
                quantity: 1,
                energy_demand: 50.0,
                in_conditioned_space: true,
            })
            .unwrap();
        let mut book = seeded_book();
        let warnings = project_to_phpp(&project, &mut book).unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.field == "appliance" && w.details.contains("aquarium")));
    }
}
