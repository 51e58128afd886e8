//! Reusable point-of-view meshes.
//!
//! Points of view are drawn as cone-like cylinders. Every pov of a category
//! shares one geometry and one material, created once per viewer.

use std::f64::consts::FRAC_PI_2;

use cgviz_core::{
    BoundingBox, Color, DMat4, DVec3, GeometryId, MaterialId, PovCategory, PovRecord, SceneError,
};

use crate::entity::release_resource;
use crate::geometry::{cylinder, Geometry};
use crate::material::Material;
use crate::renderer::SceneRenderer;

/// Shape and color of one pov template.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PovTemplateConfig {
    pub radius_top: f64,
    pub radius_bottom: f64,
    pub height: f64,
    pub radial_segments: u32,
    pub color: Color,
    pub shininess: f32,
}

impl PovTemplateConfig {
    pub fn transmitter() -> Self {
        Self {
            radius_top: 0.4,
            radius_bottom: 2.0,
            height: 24.0,
            radial_segments: 32,
            color: Color::from_u32(0xEE0000),
            shininess: 100.0,
        }
    }

    pub fn receiver() -> Self {
        Self {
            height: 16.0,
            color: Color::from_u32(0x0000EE),
            ..Self::transmitter()
        }
    }

    /// Vertical offset that puts the base of the cylinder at the pov position.
    pub fn dy(&self) -> f64 {
        self.height / 2.0
    }
}

impl Default for PovTemplateConfig {
    fn default() -> Self {
        Self::transmitter()
    }
}

/// Shared renderer resources of one pov category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PovTemplate {
    pub geometry: GeometryId,
    pub material: MaterialId,
    /// Local bounds of the cylinder.
    pub bounds: Option<BoundingBox>,
    pub dy: f64,
}

/// The transmitter and receiver templates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PovTemplates {
    pub transmitter: PovTemplate,
    pub receiver: PovTemplate,
}

impl PovTemplates {
    /// Upload both templates. Nothing stays allocated on failure.
    pub fn create<R: SceneRenderer + ?Sized>(
        renderer: &mut R,
        transmitter: &PovTemplateConfig,
        receiver: &PovTemplateConfig,
    ) -> Result<Self, SceneError> {
        let transmitter = create_template(renderer, transmitter, "tx_pov")?;
        let receiver = match create_template(renderer, receiver, "rx_pov") {
            Ok(template) => template,
            Err(err) => {
                release_template(renderer, &transmitter);
                return Err(err);
            }
        };
        Ok(Self { transmitter, receiver })
    }

    pub fn get(&self, category: PovCategory) -> &PovTemplate {
        match category {
            PovCategory::Transmitter => &self.transmitter,
            PovCategory::Receiver => &self.receiver,
        }
    }

    /// Release both templates.
    pub fn release<R: SceneRenderer + ?Sized>(self, renderer: &mut R) {
        release_template(renderer, &self.transmitter);
        release_template(renderer, &self.receiver);
    }
}

fn create_template<R: SceneRenderer + ?Sized>(
    renderer: &mut R,
    config: &PovTemplateConfig,
    name: &str,
) -> Result<PovTemplate, SceneError> {
    let mesh = cylinder(
        config.radius_top,
        config.radius_bottom,
        config.height,
        config.radial_segments,
    );
    let bounds = mesh.bounding_box();
    let geometry = renderer.create_geometry(&Geometry::Triangles(mesh))?;
    let material = Material::phong(config.color, config.shininess).with_name(name);
    let material = match renderer.create_material(&material) {
        Ok(material) => material,
        Err(err) => {
            release_resource(renderer, geometry.into());
            return Err(err);
        }
    };
    Ok(PovTemplate {
        geometry,
        material,
        bounds,
        dy: config.dy(),
    })
}

fn release_template<R: SceneRenderer + ?Sized>(renderer: &mut R, template: &PovTemplate) {
    release_resource(renderer, template.geometry.into());
    release_resource(renderer, template.material.into());
}

/// Local transform of a pov mesh.
///
/// `T(position) * Ry(-elevation) * Rz(azimuth - pi/2) * T(0, dy, 0)`: the
/// cylinder is lifted by `dy` so it rotates about its base, rotated about Y
/// first, then about Z, then moved to the pov position. The rotation order
/// is known to be off for combined azimuth and elevation; it is kept as is.
pub fn pov_transform(pov: &PovRecord, dy: f64) -> DMat4 {
    DMat4::from_translation(pov.position)
        * DMat4::from_rotation_y(-pov.elevation)
        * DMat4::from_rotation_z(pov.azimuth - FRAC_PI_2)
        * DMat4::from_translation(DVec3::new(0.0, dy, 0.0))
}
