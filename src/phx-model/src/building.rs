// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Zones and the building that contains them.

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::components::{ComponentOpaque, ThermalBridge};
use crate::elec::ElectricDeviceCollection;
use crate::geometry::Polygon;
use crate::spaces::Space;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ZoneType {
    Simulated,
    Attached,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecificHeatCapacity {
    Lightweight,
    Mixed,
    Massive,
}

impl SpecificHeatCapacity {
    /// Wh/K per m2 of floor area, the convention the calculators use.
    pub fn value(&self) -> f64 {
        match self {
            SpecificHeatCapacity::Lightweight => 60.0,
            SpecificHeatCapacity::Mixed => 132.0,
            SpecificHeatCapacity::Massive => 204.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Zone {
    pub display_name: String,
    pub zone_type: ZoneType,
    /// m3
    pub volume_gross: f64,
    /// m3
    pub volume_net: f64,
    /// m2
    pub weighted_net_floor_area: f64,
    /// m
    pub clearance_height: f64,
    pub specific_heat_capacity: SpecificHeatCapacity,
    pub res_occupant_quantity: f64,
    pub res_number_bedrooms: u32,
    pub res_number_dwellings: u32,
    pub spaces: Vec<Space>,
    pub thermal_bridges: Vec<ThermalBridge>,
    pub elec_equipment: ElectricDeviceCollection,
}

impl Default for Zone {
    fn default() -> Self {
        Zone {
            display_name: String::new(),
            zone_type: ZoneType::Simulated,
            volume_gross: 0.0,
            volume_net: 0.0,
            weighted_net_floor_area: 0.0,
            clearance_height: 2.5,
            specific_heat_capacity: SpecificHeatCapacity::Lightweight,
            res_occupant_quantity: 0.0,
            res_number_bedrooms: 0,
            res_number_dwellings: 0,
            spaces: Vec::new(),
            thermal_bridges: Vec::new(),
            elec_equipment: ElectricDeviceCollection::default(),
        }
    }
}

impl Zone {
    pub fn add_space(&mut self, space: Space) {
        self.spaces.push(space);
    }

    pub fn add_thermal_bridge(&mut self, tb: ThermalBridge) {
        self.thermal_bridges.push(tb);
    }

    pub fn spaces_with_ventilation(&self) -> impl Iterator<Item = &Space> {
        self.spaces.iter().filter(|s| s.has_ventilation_airflow())
    }
}

/// A building: a set of zones plus the opaque components that bound them.
/// Apertures are reached only through their host components.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Building {
    components: Vec<ComponentOpaque>,
    zones: Vec<Zone>,
}

impl Building {
    pub fn add_component(&mut self, component: ComponentOpaque) -> Result<()> {
        // a component may attach to at most one zone, and that zone must
        // already exist (bottom-up construction)
        if let crate::components::ExposureInterior::Zone(idx) = component.exposure_interior {
            if idx >= self.zones.len() {
                return Err(Error::new(
                    ErrorKind::Model,
                    ErrorCode::AlreadyAttached,
                    Some(format!(
                        "component '{}' attaches to zone {idx} but only {} zones exist",
                        component.display_name,
                        self.zones.len()
                    )),
                ));
            }
        }
        self.components.push(component);
        Ok(())
    }

    pub fn add_zone(&mut self, zone: Zone) {
        self.zones.push(zone);
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zones_mut(&mut self) -> &mut [Zone] {
        &mut self.zones
    }

    /// All opaque components in insertion order (shades included).
    pub fn components(&self) -> &[ComponentOpaque] {
        &self.components
    }

    pub fn opaque_components(&self) -> impl Iterator<Item = &ComponentOpaque> {
        self.components.iter().filter(|c| !c.is_shade())
    }

    pub fn shading_components(&self) -> impl Iterator<Item = &ComponentOpaque> {
        self.components.iter().filter(|c| c.is_shade())
    }

    pub fn above_grade_wall_components(&self) -> impl Iterator<Item = &ComponentOpaque> {
        self.components.iter().filter(|c| c.is_above_grade_wall())
    }

    pub fn roof_components(&self) -> impl Iterator<Item = &ComponentOpaque> {
        self.components.iter().filter(|c| c.is_roof())
    }

    /// All polygons of all components, apertures included, in component
    /// order. This is the emission order the geometry sections use.
    pub fn polygons(&self) -> Vec<&Polygon> {
        let mut out = Vec::new();
        for c in &self.components {
            out.extend(c.polygons.iter());
            for a in c.apertures() {
                out.extend(a.polygons.iter());
            }
        }
        out
    }

    pub fn all_spaces(&self) -> impl Iterator<Item = &Space> {
        self.zones.iter().flat_map(|z| z.spaces.iter())
    }

    pub fn weighted_net_floor_area(&self) -> f64 {
        self.zones.iter().map(|z| z.weighted_net_floor_area).sum()
    }

    pub fn net_volume(&self) -> f64 {
        self.zones.iter().map(|z| z.volume_net).sum()
    }

    pub fn total_gross_wall_area(&self) -> f64 {
        self.above_grade_wall_components()
            .map(|c| c.gross_area())
            .sum()
    }

    pub fn total_aperture_area(&self) -> f64 {
        self.opaque_components().map(|c| c.aperture_area()).sum()
    }

    /// Collapse components with identical grouping attributes (face type,
    /// exposures, assembly reference) into single components. Emission
    /// order of the surviving components follows first appearance, so the
    /// result is stable across runs.
    pub fn merge_components_by_group(&mut self) {
        let mut merged: Vec<ComponentOpaque> = Vec::new();
        for component in self.components.drain(..) {
            match merged
                .iter_mut()
                .find(|m| m.group_key() == component.group_key())
            {
                Some(host) => host.absorb(component),
                None => merged.push(component),
            }
        }
        self.components = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ExposureExterior, ExposureInterior, FaceType};
    use crate::geometry::Vertex;

    fn wall(name: &str, assembly: &str, zone: usize) -> ComponentOpaque {
        let mut c = ComponentOpaque::new(
            name,
            FaceType::Wall,
            ExposureExterior::Exterior,
            ExposureInterior::Zone(zone),
            Some(assembly),
        );
        c.add_polygon(
            Polygon::new(vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 1.0),
                Vertex::new(0.0, 0.0, 1.0),
            ])
            .unwrap(),
        );
        c
    }

    #[test]
    fn component_must_attach_to_existing_zone() {
        let mut building = Building::default();
        let err = building.add_component(wall("w1", "ext_wall", 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyAttached);

        building.add_zone(Zone::default());
        building.add_component(wall("w1", "ext_wall", 0)).unwrap();
    }

    #[test]
    fn merge_groups_by_assembly() {
        let mut building = Building::default();
        building.add_zone(Zone::default());
        building.add_component(wall("w1", "ext_wall", 0)).unwrap();
        building.add_component(wall("w2", "ext_wall", 0)).unwrap();
        building.add_component(wall("w3", "other", 0)).unwrap();

        building.merge_components_by_group();
        assert_eq!(building.components().len(), 2);
        // first-appearance order survives
        assert_eq!(building.components()[0].display_name, "w1");
        assert_eq!(building.components()[0].polygons.len(), 2);
        assert_eq!(building.components()[1].display_name, "w3");
    }

    #[test]
    fn polygons_walk_components_in_order() {
        let mut building = Building::default();
        building.add_zone(Zone::default());
        building.add_component(wall("w1", "a", 0)).unwrap();
        building.add_component(wall("w2", "b", 0)).unwrap();
        assert_eq!(building.polygons().len(), 2);
    }
}
