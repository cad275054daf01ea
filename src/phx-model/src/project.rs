// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The Project root: catalogs plus the ordered building segments.
//!
//! A Project is built exactly once by an importer, optionally validated,
//! then read (never mutated) by exporters, and discarded. It is never
//! persisted in a native form.

use std::collections::BTreeSet;

use crate::building::Building;
use crate::catalog::Catalog;
use crate::certification::{PhBuildingData, PhiCertification, PhiusCertification};
use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::constructions::{Assembly, Material, WindowType};
use crate::hvac::MechanicalSystems;
use crate::schedules::{OccupancyPattern, VentilationPattern};
use crate::site::Site;

/// Contact record for the people attached to a project.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Agent {
    pub name: String,
    pub street: String,
    pub city: String,
    pub post_code: String,
    pub telephone: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectData {
    pub customer: Agent,
    pub building: Agent,
    pub owner: Agent,
    pub designer: Agent,
    pub project_date: String,
    pub owner_is_client: bool,
    pub year_constructed: u32,
}

/// One certifiable portion of a project: a building with its own climate,
/// mechanical systems, and certification parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingSegment {
    pub name: String,
    pub remarks: String,
    pub building: Building,
    pub mech_systems: MechanicalSystems,
    pub ph_building: PhBuildingData,
    pub phius_cert: PhiusCertification,
    pub phi_cert: PhiCertification,
    pub site: Site,
}

impl Default for BuildingSegment {
    fn default() -> Self {
        BuildingSegment {
            name: "unnamed_segment".to_owned(),
            remarks: String::new(),
            building: Building::default(),
            mech_systems: MechanicalSystems::default(),
            ph_building: PhBuildingData::default(),
            phius_cert: PhiusCertification::default(),
            phi_cert: PhiCertification::default(),
            site: Site::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub name: String,
    pub project_data: ProjectData,
    pub materials: Catalog<Material>,
    pub assembly_types: Catalog<Assembly>,
    pub window_types: Catalog<WindowType>,
    pub ventilation_patterns: Catalog<VentilationPattern>,
    pub occupancy_patterns: Catalog<OccupancyPattern>,
    segments: Vec<BuildingSegment>,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            name: "unnamed_project".to_owned(),
            project_data: ProjectData::default(),
            materials: Catalog::new(),
            assembly_types: Catalog::new(),
            window_types: Catalog::new(),
            ventilation_patterns: Catalog::new(),
            occupancy_patterns: Catalog::new(),
            segments: Vec::new(),
        }
    }
}

impl Project {
    pub fn new(name: &str) -> Self {
        Project {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    pub fn add_material(&mut self, key: &str, material: Material) -> Result<()> {
        material.validate(key)?;
        self.materials.insert(key, material);
        Ok(())
    }

    pub fn add_assembly_type(&mut self, key: &str, assembly: Assembly) -> Result<()> {
        assembly.validate(key)?;
        for layer in &assembly.layers {
            self.materials.mark_referenced(&layer.material_key)?;
        }
        self.assembly_types.insert(key, assembly);
        Ok(())
    }

    pub fn add_window_type(&mut self, key: &str, window_type: WindowType) -> Result<()> {
        window_type.validate(key)?;
        self.window_types.insert(key, window_type);
        Ok(())
    }

    pub fn add_ventilation_pattern(&mut self, key: &str, pattern: VentilationPattern) -> Result<()> {
        pattern.validate(key)?;
        self.ventilation_patterns.insert(key, pattern);
        Ok(())
    }

    pub fn add_occupancy_pattern(&mut self, key: &str, pattern: OccupancyPattern) -> Result<()> {
        pattern.validate(key)?;
        self.occupancy_patterns.insert(key, pattern);
        Ok(())
    }

    pub fn add_segment(&mut self, segment: BuildingSegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[BuildingSegment] {
        &self.segments
    }

    pub fn segments_mut(&mut self) -> &mut [BuildingSegment] {
        &mut self.segments
    }

    /// Assembly keys actually referenced by components of `segment`, in
    /// catalog declaration order. Exporters use this to emit each shared
    /// definition exactly once.
    pub fn referenced_assembly_keys(&self, segment: &BuildingSegment) -> Vec<&str> {
        let used: BTreeSet<&str> = segment
            .building
            .components()
            .iter()
            .filter_map(|c| c.assembly_key.as_deref())
            .collect();
        self.assembly_types
            .keys()
            .filter(|k| used.contains(k))
            .collect()
    }

    pub fn referenced_window_type_keys(&self, segment: &BuildingSegment) -> Vec<&str> {
        let used: BTreeSet<&str> = segment
            .building
            .components()
            .iter()
            .flat_map(|c| c.apertures())
            .map(|a| a.window_type_key.as_str())
            .collect();
        self.window_types
            .keys()
            .filter(|k| used.contains(k))
            .collect()
    }

    /// Referential-integrity pass over the whole tree. Every key held by a
    /// tree node must resolve in the Project catalogs; a dangling
    /// reference is a fatal structural error naming the node and key.
    pub fn validate(&self) -> Result<()> {
        for segment in &self.segments {
            for component in segment.building.components() {
                if let Some(key) = component.assembly_key.as_deref() {
                    if !self.assembly_types.contains_key(key) {
                        return dangling(&component.display_name, "assembly", key);
                    }
                }
                for aperture in component.apertures() {
                    if !self.window_types.contains_key(&aperture.window_type_key) {
                        return dangling(
                            &aperture.display_name,
                            "window type",
                            &aperture.window_type_key,
                        );
                    }
                }
            }

            for zone in segment.building.zones() {
                for space in &zone.spaces {
                    if let Some(key) = space.ventilation_pattern_key.as_deref() {
                        if !self.ventilation_patterns.contains_key(key) {
                            return dangling(&space.display_name, "ventilation pattern", key);
                        }
                    }
                    if let Some(key) = space.occupancy_pattern_key.as_deref() {
                        if !self.occupancy_patterns.contains_key(key) {
                            return dangling(&space.display_name, "occupancy pattern", key);
                        }
                    }
                }
            }

            let missing = segment.mech_systems.dangling_device_keys();
            if let Some(key) = missing.first() {
                return dangling(&segment.name, "mechanical device", key);
            }
        }

        for (key, assembly) in self.assembly_types.iter() {
            for layer in &assembly.layers {
                if !self.materials.contains_key(&layer.material_key) {
                    return dangling(key, "material", &layer.material_key);
                }
            }
        }

        for key in self.assembly_types.keys() {
            let used = self
                .segments
                .iter()
                .any(|s| self.referenced_assembly_keys(s).contains(&key));
            if !used {
                log::warn!("assembly '{key}' is defined but never referenced");
            }
        }

        Ok(())
    }
}

fn dangling(node: &str, kind: &str, key: &str) -> Result<()> {
    Err(Error::new(
        ErrorKind::Model,
        ErrorCode::UnresolvedReference,
        Some(format!("'{node}' references {kind} '{key}' which is not in the project catalog")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::Zone;
    use crate::components::{ComponentOpaque, ExposureExterior, ExposureInterior, FaceType};
    use crate::constructions::Layer;
    use crate::geometry::{Polygon, Vertex};

    fn material() -> Material {
        Material {
            display_name: "concrete".to_owned(),
            conductivity: 1.8,
            density: 2400.0,
            heat_capacity: 880.0,
            ..Default::default()
        }
    }

    fn assembly() -> Assembly {
        Assembly {
            display_name: "ext wall".to_owned(),
            layers: vec![Layer::new(0.2, "concrete")],
            ..Default::default()
        }
    }

    fn test_wall(assembly_key: &str) -> ComponentOpaque {
        let mut c = ComponentOpaque::new(
            "wall",
            FaceType::Wall,
            ExposureExterior::Exterior,
            ExposureInterior::Zone(0),
            Some(assembly_key),
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
    fn assembly_layers_must_resolve_at_add_time() {
        let mut project = Project::new("test");
        let err = project.add_assembly_type("ext_wall", assembly()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnresolvedReference);

        project.add_material("concrete", material()).unwrap();
        project.add_assembly_type("ext_wall", assembly()).unwrap();
    }

    #[test]
    fn materials_freeze_once_an_assembly_references_them() {
        let mut project = Project::new("test");
        project.add_material("concrete", material()).unwrap();
        project.add_assembly_type("ext_wall", assembly()).unwrap();

        let err = project.materials.update("concrete", material()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogFrozen);
    }

    #[test]
    fn validate_finds_dangling_assembly() {
        let mut project = Project::new("test");
        let mut segment = BuildingSegment::default();
        segment.building.add_zone(Zone::default());
        segment.building.add_component(test_wall("missing_assembly")).unwrap();
        project.add_segment(segment);

        let err = project.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnresolvedReference);
        assert!(err.get_details().unwrap().contains("missing_assembly"));
    }

    #[test]
    fn validate_passes_for_resolved_tree() {
        let mut project = Project::new("test");
        project.add_material("concrete", material()).unwrap();
        project.add_assembly_type("ext_wall", assembly()).unwrap();

        let mut segment = BuildingSegment::default();
        segment.building.add_zone(Zone::default());
        segment.building.add_component(test_wall("ext_wall")).unwrap();
        project.add_segment(segment);

        project.validate().unwrap();
    }

    #[test]
    fn referenced_keys_follow_declaration_order() {
        let mut project = Project::new("test");
        project.add_material("concrete", material()).unwrap();
        project.add_assembly_type("b_wall", assembly()).unwrap();
        project.add_assembly_type("a_wall", assembly()).unwrap();
        project.add_assembly_type("unused", assembly()).unwrap();

        let mut segment = BuildingSegment::default();
        segment.building.add_zone(Zone::default());
        segment.building.add_component(test_wall("a_wall")).unwrap();
        segment.building.add_component(test_wall("b_wall")).unwrap();
        project.add_segment(segment);

        let segment = &project.segments()[0];
        // declaration order, not usage order; unused entries excluded
        assert_eq!(
            project.referenced_assembly_keys(segment),
            vec!["b_wall", "a_wall"]
        );
    }
}
