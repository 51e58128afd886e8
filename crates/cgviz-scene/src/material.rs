//! Material descriptions for the renderer.

use cgviz_core::Color;

/// Shading model of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Shading {
    /// Lit, with specular highlights.
    Phong { shininess: f32 },
    /// Unlit, flat color.
    Basic,
    /// Line strips.
    Line,
    /// Point sprites of a fixed size.
    Points { size: f32 },
}

/// Surface description.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub name: Option<String>,
    /// Base color.
    pub color: Color,
    pub shading: Shading,
    /// Use per-vertex colors instead of `color`.
    pub vertex_colors: bool,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            color: Color::rgb(0.8, 0.8, 0.8),
            shading: Shading::Phong { shininess: 30.0 },
            vertex_colors: false,
            double_sided: false,
        }
    }
}

impl Material {
    pub fn phong(color: Color, shininess: f32) -> Self {
        Self {
            color,
            shading: Shading::Phong { shininess },
            ..Default::default()
        }
    }

    pub fn basic(color: Color) -> Self {
        Self {
            color,
            shading: Shading::Basic,
            ..Default::default()
        }
    }

    pub fn line(color: Color) -> Self {
        Self {
            color,
            shading: Shading::Line,
            ..Default::default()
        }
    }

    /// Point sprites colored per vertex.
    pub fn points(size: f32) -> Self {
        Self {
            color: Color::WHITE,
            shading: Shading::Points { size },
            vertex_colors: true,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}
