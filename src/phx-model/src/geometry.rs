// Copyright 2024 The PHX-rs Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Geometry primitives: vertices and planar polygons.
//!
//! A `Polygon` is immutable once built: the constructor derives the unit
//! normal and area from the vertex loop and nothing may reorder or move the
//! vertices afterwards. Components own their polygons exclusively.

use crate::common::{Error, ErrorCode, ErrorKind, Result};

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vertex { x, y, z }
    }

    pub fn is_equivalent(&self, other: &Vertex) -> bool {
        const TOLERANCE: f64 = 0.001;
        (self.x - other.x).abs() < TOLERANCE
            && (self.y - other.y).abs() < TOLERANCE
            && (self.z - other.z).abs() < TOLERANCE
    }

}

#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    normal: Vertex,
    area: f64,
}

impl Polygon {
    /// Build a polygon from an ordered vertex loop. At least 3 vertices are
    /// required and the loop must not be degenerate (zero area).
    pub fn new(vertices: Vec<Vertex>) -> Result<Polygon> {
        if vertices.len() < 3 {
            return Err(Error::new(
                ErrorKind::Model,
                ErrorCode::BadGeometry,
                Some(format!("polygon needs >= 3 vertices, got {}", vertices.len())),
            ));
        }

        // Newell's method: robust for any planar loop, and the magnitude of
        // the resulting vector is twice the enclosed area.
        let mut n = Vertex::default();
        for (i, a) in vertices.iter().enumerate() {
            let b = &vertices[(i + 1) % vertices.len()];
            n.x += (a.y - b.y) * (a.z + b.z);
            n.y += (a.z - b.z) * (a.x + b.x);
            n.z += (a.x - b.x) * (a.y + b.y);
        }
        let len = (n.x * n.x + n.y * n.y + n.z * n.z).sqrt();
        if len <= f64::EPSILON {
            return Err(Error::new(
                ErrorKind::Model,
                ErrorCode::BadGeometry,
                Some("degenerate polygon: vertices are collinear".to_owned()),
            ));
        }

        Ok(Polygon {
            vertices,
            normal: Vertex::new(n.x / len, n.y / len, n.z / len),
            area: len / 2.0,
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn normal(&self) -> Vertex {
        self.normal
    }

    /// Planar area in m2.
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn centroid(&self) -> Vertex {
        let n = self.vertices.len() as f64;
        let mut c = Vertex::default();
        for v in &self.vertices {
            c.x += v.x;
            c.y += v.y;
            c.z += v.z;
        }
        Vertex::new(c.x / n, c.y / n, c.z / n)
    }

    /// Angle between the surface normal and vertical, in degrees.
    /// 0 = face pointing straight up, 90 = vertical wall, 180 = floor.
    pub fn angle_from_horizontal(&self) -> f64 {
        self.normal.z.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Compass bearing of the surface normal projected onto the ground
    /// plane, in degrees clockwise from north (+Y). A horizontal face
    /// (roof/floor) has no meaningful bearing and reports 0.
    pub fn cardinal_orientation_angle(&self) -> f64 {
        let (x, y) = (self.normal.x, self.normal.y);
        if x.abs() < 1e-9 && y.abs() < 1e-9 {
            return 0.0;
        }
        let angle = x.atan2(y).to_degrees();
        if angle < 0.0 { angle + 360.0 } else { angle }
    }

    pub fn is_horizontal(&self) -> bool {
        let a = self.angle_from_horizontal();
        !(45.0..=135.0).contains(&a)
    }
}

/// The collected geometry of a project: all vertices and polygons of every
/// component, in component order. Targets that keep geometry in a single
/// flat section (WUFI's Graphics_3D) consume this instead of re-walking
/// the tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graphics3D {
    pub polygons: Vec<Polygon>,
}

impl Graphics3D {
    pub fn add_polygons<'a>(&mut self, polygons: impl IntoIterator<Item = &'a Polygon>) {
        self.polygons.extend(polygons.into_iter().cloned());
    }

    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(|p| p.vertices().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn unit_square_at_z(z: f64) -> Polygon {
        Polygon::new(vec![
            Vertex::new(0.0, 0.0, z),
            Vertex::new(1.0, 0.0, z),
            Vertex::new(1.0, 1.0, z),
            Vertex::new(0.0, 1.0, z),
        ])
        .unwrap()
    }

    #[test]
    fn area_and_normal_of_unit_square() {
        let poly = unit_square_at_z(0.0);
        assert!(approx_eq!(f64, poly.area(), 1.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, poly.normal().z, 1.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, poly.angle_from_horizontal(), 0.0, epsilon = 1e-9));
        assert!(poly.is_horizontal());
    }

    #[test]
    fn south_facing_wall_orientation() {
        // wall in the XZ plane, normal pointing -Y (south)
        let poly = Polygon::new(vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(3.0, 0.0, 0.0),
            Vertex::new(3.0, 0.0, 2.5),
            Vertex::new(0.0, 0.0, 2.5),
        ])
        .unwrap();
        assert!(approx_eq!(f64, poly.area(), 7.5, epsilon = 1e-9));
        assert!(approx_eq!(f64, poly.angle_from_horizontal(), 90.0, epsilon = 1e-9));
        assert!(approx_eq!(
            f64,
            poly.cardinal_orientation_angle(),
            180.0,
            epsilon = 1e-9
        ));
        assert!(!poly.is_horizontal());
    }

    #[test]
    fn too_few_vertices_is_an_error() {
        let err = Polygon::new(vec![Vertex::new(0.0, 0.0, 0.0), Vertex::new(1.0, 0.0, 0.0)])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadGeometry);
    }

    #[test]
    fn collinear_vertices_are_an_error() {
        let err = Polygon::new(vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(2.0, 0.0, 0.0),
        ])
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::BadGeometry);
    }

    #[test]
    fn vertex_equivalence_uses_tolerance() {
        let a = Vertex::new(0.0, 0.0, 0.0);
        let b = Vertex::new(0.0005, 0.0, 0.0);
        let c = Vertex::new(0.01, 0.0, 0.0);
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&c));
    }
}
