//! Geometry buffers handed to the renderer.

use std::f64::consts::PI;

use cgviz_core::{BoundingBox, Color, DMat4, DVec3};

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    pub vertices: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().copied())
    }

    /// Transform all vertices by a matrix.
    pub fn transform(&mut self, matrix: DMat4) {
        let normal_matrix = matrix.inverse().transpose();

        for v in &mut self.vertices {
            *v = matrix.transform_point3(*v);
        }

        for n in &mut self.normals {
            *n = normal_matrix.transform_vector3(*n).normalize_or_zero();
        }
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Vertices as a flat `[x, y, z, ...]` buffer.
    pub fn flat_vertices(&self) -> Vec<f32> {
        flatten(&self.vertices)
    }

    /// Normals as a flat `[x, y, z, ...]` buffer.
    pub fn flat_normals(&self) -> Vec<f32> {
        flatten(&self.normals)
    }
}

/// Geometry data for one renderer buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Geometry {
    Triangles(Mesh),
    /// Connected line strip.
    Polyline { points: Vec<DVec3> },
    /// Unconnected points with a color per point.
    Points { positions: Vec<DVec3>, colors: Vec<Color> },
}

impl Geometry {
    /// Local bounding box of the data.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Geometry::Triangles(mesh) => mesh.bounding_box(),
            Geometry::Polyline { points } => BoundingBox::from_points(points.iter().copied()),
            Geometry::Points { positions, .. } => BoundingBox::from_points(positions.iter().copied()),
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Triangles(mesh) => mesh.vertex_count(),
            Geometry::Polyline { points } => points.len(),
            Geometry::Points { positions, .. } => positions.len(),
        }
    }

    /// Vertex positions as a flat `[x, y, z, ...]` buffer.
    pub fn flat_positions(&self) -> Vec<f32> {
        match self {
            Geometry::Triangles(mesh) => mesh.flat_vertices(),
            Geometry::Polyline { points } => flatten(points),
            Geometry::Points { positions, .. } => flatten(positions),
        }
    }

    /// Per-vertex colors as a flat `[r, g, b, ...]` buffer, empty unless points.
    pub fn flat_colors(&self) -> Vec<f32> {
        match self {
            Geometry::Points { colors, .. } => colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect(),
            _ => Vec::new(),
        }
    }
}

fn flatten(points: &[DVec3]) -> Vec<f32> {
    points
        .iter()
        .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
        .collect()
}

/// A truncated cone centered at the origin, extending along the Y axis.
///
/// `radius_top` and `radius_bottom` may differ; a zero radius collapses
/// that cap to a point.
pub fn cylinder(radius_top: f64, radius_bottom: f64, height: f64, segments: u32) -> Mesh {
    let half_height = height / 2.0;
    let segments = segments.max(3);
    let slope = (radius_bottom - radius_top) / height.max(f64::EPSILON);

    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    for i in 0..=segments {
        let angle = (i as f64 / segments as f64) * 2.0 * PI;
        let (sin, cos) = angle.sin_cos();
        let normal = DVec3::new(cos, slope, sin).normalize();

        vertices.push(DVec3::new(cos * radius_bottom, -half_height, sin * radius_bottom));
        normals.push(normal);

        vertices.push(DVec3::new(cos * radius_top, half_height, sin * radius_top));
        normals.push(normal);
    }

    for i in 0..segments {
        let base = i * 2;
        indices.extend_from_slice(&[base, base + 2, base + 1, base + 1, base + 2, base + 3]);
    }

    let mut cap = |radius: f64, y: f64, up: bool| {
        if radius <= 0.0 {
            return;
        }
        let normal = if up { DVec3::Y } else { DVec3::NEG_Y };
        let center = vertices.len() as u32;
        vertices.push(DVec3::new(0.0, y, 0.0));
        normals.push(normal);
        for i in 0..=segments {
            let angle = (i as f64 / segments as f64) * 2.0 * PI;
            let (sin, cos) = angle.sin_cos();
            vertices.push(DVec3::new(cos * radius, y, sin * radius));
            normals.push(normal);
        }
        for i in 0..segments {
            let rim = center + 1 + i;
            if up {
                indices.extend_from_slice(&[center, rim, rim + 1]);
            } else {
                indices.extend_from_slice(&[center, rim + 1, rim]);
            }
        }
    };

    cap(radius_top, half_height, true);
    cap(radius_bottom, -half_height, false);

    Mesh { vertices, normals, indices }
}

/// A rectangle in the XY plane centered at the origin, facing +Z.
pub fn plane(width: f64, height: f64) -> Mesh {
    let hw = width / 2.0;
    let hh = height / 2.0;
    Mesh {
        vertices: vec![
            DVec3::new(-hw, -hh, 0.0),
            DVec3::new(hw, -hh, 0.0),
            DVec3::new(hw, hh, 0.0),
            DVec3::new(-hw, hh, 0.0),
        ],
        normals: vec![DVec3::Z; 4],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}
