// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Opaque and transparent construction catalog entities.
//!
//! Assemblies reference materials by key; the material entities themselves
//! live in the Project's material catalog, shared by every layer that names
//! them.

use crate::common::{Error, ErrorCode, ErrorKind, Result};

/// An opaque material: the scalar physical properties the calculation
/// platforms need. All values are canonical SI.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub display_name: String,
    /// W/mK
    pub conductivity: f64,
    /// kg/m3
    pub density: f64,
    /// fraction 0..=1
    pub porosity: f64,
    /// J/kgK
    pub heat_capacity: f64,
    /// vapor resistance factor (dimensionless mu-value)
    pub water_vapor_resistance: f64,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            display_name: String::new(),
            conductivity: 0.0,
            density: 0.0,
            porosity: 0.95,
            heat_capacity: 0.0,
            water_vapor_resistance: 1.0,
        }
    }
}

impl Material {
    pub fn validate(&self, key: &str) -> Result<()> {
        if !(self.conductivity > 0.0) {
            return Err(bad_value(key, "conductivity", self.conductivity));
        }
        if self.density < 0.0 {
            return Err(bad_value(key, "density", self.density));
        }
        if !(0.0..=1.0).contains(&self.porosity) {
            return Err(bad_value(key, "porosity", self.porosity));
        }
        if self.heat_capacity < 0.0 {
            return Err(bad_value(key, "heat_capacity", self.heat_capacity));
        }
        Ok(())
    }
}

fn bad_value(key: &str, field: &str, value: f64) -> Error {
    Error::new(
        ErrorKind::Model,
        ErrorCode::BadPhysicalValue,
        Some(format!("'{key}': {field} = {value} is not physically plausible")),
    )
}

/// One layer of an opaque assembly: a thickness of a single material,
/// referenced by its catalog key.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// m
    pub thickness: f64,
    pub material_key: String,
}

impl Layer {
    pub fn new(thickness: f64, material_key: &str) -> Self {
        Layer {
            thickness,
            material_key: material_key.to_owned(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayerOrder {
    OutsideToInside,
    InsideToOutside,
}

/// A layered opaque construction (wall/roof/floor build-up). Layers are
/// ordered outside-in; each references a material in the Project catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Assembly {
    pub display_name: String,
    pub layer_order: LayerOrder,
    pub layers: Vec<Layer>,
}

impl Default for Assembly {
    fn default() -> Self {
        Assembly {
            display_name: String::new(),
            layer_order: LayerOrder::OutsideToInside,
            layers: Vec::new(),
        }
    }
}

impl Assembly {
    pub fn validate(&self, key: &str) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::new(
                ErrorKind::Model,
                ErrorCode::MissingRequiredField,
                Some(format!("assembly '{key}' has no layers")),
            ));
        }
        for layer in &self.layers {
            if !(layer.thickness > 0.0) {
                return Err(bad_value(key, "layer thickness", layer.thickness));
            }
        }
        Ok(())
    }

    /// Overall thickness in m.
    pub fn thickness(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness).sum()
    }

    /// Thermal resistance of the layer stack in m2K/W, given resolved
    /// conductivities per layer (same order as `layers`). Surface film
    /// resistances are the platform's business, not ours.
    pub fn r_value(&self, conductivities: &[f64]) -> f64 {
        self.layers
            .iter()
            .zip(conductivities)
            .map(|(l, k)| l.thickness / k)
            .sum()
    }
}

/// A window construction: frame and glazing performance values, one entry
/// per aperture type. Frame values are uniform across the four edges here;
/// WUFI takes them per-edge and the exporter fans them out.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowType {
    pub display_name: String,
    /// W/m2K
    pub u_value_glass: f64,
    /// W/m2K
    pub u_value_frame: f64,
    /// m
    pub frame_width: f64,
    /// solar heat gain coefficient, fraction 0..=1
    pub glass_g_value: f64,
    /// psi-value of the glazing edge bond, W/mK
    pub psi_glazing: f64,
    /// psi-value of the frame installation, W/mK
    pub psi_install: f64,
}

impl Default for WindowType {
    fn default() -> Self {
        WindowType {
            display_name: String::new(),
            u_value_glass: 1.0,
            u_value_frame: 1.0,
            frame_width: 0.1,
            glass_g_value: 0.4,
            psi_glazing: 0.0,
            psi_install: 0.0,
        }
    }
}

impl WindowType {
    pub fn validate(&self, key: &str) -> Result<()> {
        if !(self.u_value_glass > 0.0) {
            return Err(bad_value(key, "u_value_glass", self.u_value_glass));
        }
        if !(self.u_value_frame > 0.0) {
            return Err(bad_value(key, "u_value_frame", self.u_value_frame));
        }
        if !(self.frame_width > 0.0) {
            return Err(bad_value(key, "frame_width", self.frame_width));
        }
        if !(0.0..=1.0).contains(&self.glass_g_value) {
            return Err(bad_value(key, "glass_g_value", self.glass_g_value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn material_plausibility() {
        let mut mat = Material {
            display_name: "concrete".to_owned(),
            conductivity: 1.8,
            density: 2400.0,
            heat_capacity: 880.0,
            ..Default::default()
        };
        mat.validate("concrete").unwrap();

        mat.conductivity = 0.0;
        let err = mat.validate("concrete").unwrap_err();
        assert_eq!(err.code, ErrorCode::BadPhysicalValue);

        mat.conductivity = 1.8;
        mat.porosity = 1.5;
        assert!(mat.validate("concrete").is_err());
    }

    #[test]
    fn assembly_requires_positive_layers() {
        let mut assembly = Assembly {
            display_name: "ext wall".to_owned(),
            ..Default::default()
        };
        let err = assembly.validate("ext_wall").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);

        assembly.layers.push(Layer::new(0.2, "concrete"));
        assembly.layers.push(Layer::new(0.1, "eps"));
        assembly.validate("ext_wall").unwrap();
        assert!(approx_eq!(f64, assembly.thickness(), 0.3, epsilon = 1e-12));

        assembly.layers[1].thickness = -0.1;
        assert!(assembly.validate("ext_wall").is_err());
    }

    #[test]
    fn assembly_r_value() {
        let assembly = Assembly {
            display_name: "ext wall".to_owned(),
            layer_order: LayerOrder::OutsideToInside,
            layers: vec![Layer::new(0.2, "concrete"), Layer::new(0.1, "eps")],
        };
        let r = assembly.r_value(&[1.8, 0.04]);
        assert!(approx_eq!(f64, r, 0.2 / 1.8 + 0.1 / 0.04, epsilon = 1e-12));
    }

    #[test]
    fn window_type_plausibility() {
        let mut window = WindowType::default();
        window.validate("win").unwrap();
        window.glass_g_value = 1.2;
        assert!(window.validate("win").is_err());
    }
}
