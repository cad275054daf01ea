// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Geometric building components: opaque faces (walls, roofs, floors) and
//! the apertures (windows, skylights) cut into them.
//!
//! An aperture is never standalone: it lives inside exactly one opaque
//! component, which is enforced by ownership (the only way to reach an
//! aperture is through its host). Components reference their construction
//! in the Project catalogs by key and own their polygons exclusively.

use crate::common::{Error, ErrorCode, ErrorKind, Result};
use crate::geometry::Polygon;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceType {
    Wall,
    RoofCeiling,
    Floor,
    AirBoundary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceOpacity {
    Opaque,
    Transparent,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExposureExterior {
    Exterior,
    Ground,
    /// faces another zone or an adiabatic boundary
    Surface,
}

/// Interior attachment of a component. `Zone(n)` attaches to the nth zone
/// of the building (in zone order); `None` marks a shading surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExposureInterior {
    Zone(usize),
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentAperture {
    pub display_name: String,
    /// key into the Project window-type catalog
    pub window_type_key: String,
    pub polygons: Vec<Polygon>,
}

impl ComponentAperture {
    pub fn new(display_name: &str, window_type_key: &str, polygons: Vec<Polygon>) -> Result<Self> {
        if polygons.is_empty() {
            return Err(Error::new(
                ErrorKind::Model,
                ErrorCode::BadGeometry,
                Some(format!("aperture '{display_name}' has no polygons")),
            ));
        }
        Ok(ComponentAperture {
            display_name: display_name.to_owned(),
            window_type_key: window_type_key.to_owned(),
            polygons,
        })
    }

    pub fn area(&self) -> f64 {
        self.polygons.iter().map(|p| p.area()).sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentOpaque {
    pub display_name: String,
    pub face_type: FaceType,
    pub face_opacity: FaceOpacity,
    pub exposure_exterior: ExposureExterior,
    pub exposure_interior: ExposureInterior,
    /// key into the Project assembly catalog; shades carry no assembly
    pub assembly_key: Option<String>,
    pub polygons: Vec<Polygon>,
    apertures: Vec<ComponentAperture>,
}

impl ComponentOpaque {
    pub fn new(
        display_name: &str,
        face_type: FaceType,
        exposure_exterior: ExposureExterior,
        exposure_interior: ExposureInterior,
        assembly_key: Option<&str>,
    ) -> Self {
        ComponentOpaque {
            display_name: display_name.to_owned(),
            face_type,
            face_opacity: FaceOpacity::Opaque,
            exposure_exterior,
            exposure_interior,
            assembly_key: assembly_key.map(str::to_owned),
            polygons: Vec::new(),
            apertures: Vec::new(),
        }
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Attach an aperture. The host takes ownership: the window-in-wall
    /// relation is exactly one host per aperture.
    pub fn add_aperture(&mut self, aperture: ComponentAperture) {
        self.apertures.push(aperture);
    }

    pub fn apertures(&self) -> &[ComponentAperture] {
        &self.apertures
    }

    pub fn is_shade(&self) -> bool {
        self.exposure_interior == ExposureInterior::None
    }

    pub fn is_above_grade_wall(&self) -> bool {
        self.face_type == FaceType::Wall && self.exposure_exterior == ExposureExterior::Exterior
    }

    pub fn is_below_grade(&self) -> bool {
        self.exposure_exterior == ExposureExterior::Ground
    }

    pub fn is_roof(&self) -> bool {
        self.face_type == FaceType::RoofCeiling
    }

    pub fn is_floor(&self) -> bool {
        self.face_type == FaceType::Floor
    }

    /// Gross face area including aperture cut-outs, m2.
    pub fn gross_area(&self) -> f64 {
        self.polygons.iter().map(|p| p.area()).sum()
    }

    pub fn aperture_area(&self) -> f64 {
        self.apertures.iter().map(|a| a.area()).sum()
    }

    /// Opaque area net of apertures, m2.
    pub fn net_area(&self) -> f64 {
        (self.gross_area() - self.aperture_area()).max(0.0)
    }

    /// Grouping key: components with identical type, exposure, and assembly
    /// reference may be merged into one target-platform record.
    pub fn group_key(&self) -> String {
        format!(
            "{:?}-{:?}-{:?}-{:?}-{}",
            self.face_type,
            self.face_opacity,
            self.exposure_exterior,
            self.exposure_interior,
            self.assembly_key.as_deref().unwrap_or("-")
        )
    }

    /// Merge `other` into `self`: polygons and apertures are combined, all
    /// grouping attributes must already match (callers group by
    /// `group_key` first).
    pub fn absorb(&mut self, other: ComponentOpaque) {
        self.polygons.extend(other.polygons);
        self.apertures.extend(other.apertures);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ThermalBridgeType {
    AmbientAir,
    Perimeter,
    Underground,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThermalBridge {
    pub display_name: String,
    pub bridge_type: ThermalBridgeType,
    /// W/mK
    pub psi_value: f64,
    /// m
    pub length: f64,
}

impl ThermalBridge {
    pub fn heat_loss_coefficient(&self) -> f64 {
        self.psi_value * self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vertex;
    use float_cmp::approx_eq;

    fn wall_polygon(width: f64, height: f64) -> Polygon {
        Polygon::new(vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(width, 0.0, 0.0),
            Vertex::new(width, 0.0, height),
            Vertex::new(0.0, 0.0, height),
        ])
        .unwrap()
    }

    #[test]
    fn net_area_subtracts_apertures() {
        let mut wall = ComponentOpaque::new(
            "south wall",
            FaceType::Wall,
            ExposureExterior::Exterior,
            ExposureInterior::Zone(0),
            Some("ext_wall"),
        );
        wall.add_polygon(wall_polygon(4.0, 2.5));
        let window =
            ComponentAperture::new("win 1", "double_low_e", vec![wall_polygon(1.0, 1.2)]).unwrap();
        wall.add_aperture(window);

        assert!(approx_eq!(f64, wall.gross_area(), 10.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, wall.net_area(), 10.0 - 1.2, epsilon = 1e-9));
        assert!(wall.is_above_grade_wall());
        assert!(!wall.is_shade());
    }

    #[test]
    fn aperture_needs_geometry() {
        let err = ComponentAperture::new("empty", "wt", vec![]).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadGeometry);
    }

    #[test]
    fn group_key_distinguishes_assembly() {
        let a = ComponentOpaque::new(
            "w1",
            FaceType::Wall,
            ExposureExterior::Exterior,
            ExposureInterior::Zone(0),
            Some("ext_wall"),
        );
        let mut b = a.clone();
        assert_eq!(a.group_key(), b.group_key());
        b.assembly_key = Some("other_wall".to_owned());
        assert_ne!(a.group_key(), b.group_key());
    }

    #[test]
    fn absorb_combines_geometry() {
        let mut a = ComponentOpaque::new(
            "w1",
            FaceType::Wall,
            ExposureExterior::Exterior,
            ExposureInterior::Zone(0),
            Some("ext_wall"),
        );
        a.add_polygon(wall_polygon(2.0, 2.5));
        let mut b = a.clone();
        b.add_polygon(wall_polygon(3.0, 2.5));
        a.absorb(b);
        assert_eq!(a.polygons.len(), 3);
    }

    #[test]
    fn thermal_bridge_coefficient() {
        let tb = ThermalBridge {
            display_name: "slab edge".to_owned(),
            bridge_type: ThermalBridgeType::Perimeter,
            psi_value: 0.05,
            length: 40.0,
        };
        assert!(approx_eq!(f64, tb.heat_loss_coefficient(), 2.0, epsilon = 1e-12));
    }
}
