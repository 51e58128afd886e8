//! Renderer adapter forwarding to a JavaScript scene object.
//!
//! The page supplies an object that owns the actual three-dimensional scene
//! and hands out integer handles for nodes, geometries and materials.
//!
//! ```js
//! const scene = {
//!   rootNode: () => 0,
//!   createContainer: (name) => id,
//!   createGeometry: (kind, positions, normals, indices, colors) => id,
//!   createMaterial: (material) => id,
//!   createMesh: (name, geometry, material) => id,
//!   createPolyline: (name, geometry, material) => id,
//!   createPoints: (name, geometry, material) => id,
//!   setTransform: (node, matrix) => {},
//!   attachChild: (parent, child) => {},
//!   detachChild: (parent, child) => {},
//!   releaseNode: (node) => {},
//!   releaseGeometry: (geometry) => {},
//!   releaseMaterial: (material) => {},
//! };
//! ```
//!
//! Any method may throw; the exception becomes a renderer error.

use cgviz_core::{DMat4, GeometryId, MaterialId, NodeId, SceneError};
use cgviz_scene::{Geometry, Material, SceneRenderer};
use wasm_bindgen::prelude::*;

use crate::types::GeometryBuffers;

#[wasm_bindgen]
extern "C" {
    /// The scene object supplied by the page.
    pub type JsScene;

    #[wasm_bindgen(method, js_name = rootNode)]
    fn root_node(this: &JsScene) -> u32;

    #[wasm_bindgen(method, catch, js_name = createContainer)]
    fn create_container(this: &JsScene, name: &str) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = createGeometry)]
    fn create_geometry(
        this: &JsScene,
        kind: &str,
        positions: &[f32],
        normals: &[f32],
        indices: &[u32],
        colors: &[f32],
    ) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = createMaterial)]
    fn create_material(this: &JsScene, material: JsValue) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = createMesh)]
    fn create_mesh(this: &JsScene, name: &str, geometry: u32, material: u32) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = createPolyline)]
    fn create_polyline(this: &JsScene, name: &str, geometry: u32, material: u32) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = createPoints)]
    fn create_points(this: &JsScene, name: &str, geometry: u32, material: u32) -> Result<u32, JsValue>;

    /// `matrix` is column-major, 16 values.
    #[wasm_bindgen(method, catch, js_name = setTransform)]
    fn set_transform(this: &JsScene, node: u32, matrix: &[f64]) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = attachChild)]
    fn attach_child(this: &JsScene, parent: u32, child: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = detachChild)]
    fn detach_child(this: &JsScene, parent: u32, child: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = releaseNode)]
    fn release_node(this: &JsScene, node: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = releaseGeometry)]
    fn release_geometry(this: &JsScene, geometry: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = releaseMaterial)]
    fn release_material(this: &JsScene, material: u32) -> Result<(), JsValue>;
}

fn renderer_error(err: JsValue) -> SceneError {
    let reason = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", err));
    SceneError::Renderer { reason }
}

/// [`SceneRenderer`] over a [`JsScene`].
pub struct JsRenderer {
    scene: JsScene,
    root: NodeId,
}

impl JsRenderer {
    pub fn new(scene: JsScene) -> Self {
        let root = NodeId(scene.root_node());
        Self { scene, root }
    }
}

impl SceneRenderer for JsRenderer {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_container(&mut self, name: &str) -> Result<NodeId, SceneError> {
        self.scene
            .create_container(name)
            .map(NodeId)
            .map_err(renderer_error)
    }

    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, SceneError> {
        let buffers = GeometryBuffers::from(geometry);
        self.scene
            .create_geometry(
                buffers.kind,
                &buffers.positions,
                &buffers.normals,
                &buffers.indices,
                &buffers.colors,
            )
            .map(GeometryId)
            .map_err(renderer_error)
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, SceneError> {
        let value = serde_wasm_bindgen::to_value(material).map_err(|e| SceneError::Renderer {
            reason: format!("cannot convert material: {}", e),
        })?;
        self.scene
            .create_material(value)
            .map(MaterialId)
            .map_err(renderer_error)
    }

    fn create_mesh(&mut self, name: &str, geometry: GeometryId, material: MaterialId) -> Result<NodeId, SceneError> {
        self.scene
            .create_mesh(name, geometry.0, material.0)
            .map(NodeId)
            .map_err(renderer_error)
    }

    fn create_polyline(&mut self, name: &str, geometry: GeometryId, material: MaterialId) -> Result<NodeId, SceneError> {
        self.scene
            .create_polyline(name, geometry.0, material.0)
            .map(NodeId)
            .map_err(renderer_error)
    }

    fn create_points(&mut self, name: &str, geometry: GeometryId, material: MaterialId) -> Result<NodeId, SceneError> {
        self.scene
            .create_points(name, geometry.0, material.0)
            .map(NodeId)
            .map_err(renderer_error)
    }

    fn set_transform(&mut self, node: NodeId, transform: &DMat4) -> Result<(), SceneError> {
        self.scene
            .set_transform(node.0, &transform.to_cols_array())
            .map_err(renderer_error)
    }

    fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.scene
            .attach_child(parent.0, child.0)
            .map_err(renderer_error)
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.scene
            .detach_child(parent.0, child.0)
            .map_err(renderer_error)
    }

    fn release_node(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.scene.release_node(node.0).map_err(renderer_error)
    }

    fn release_geometry(&mut self, geometry: GeometryId) -> Result<(), SceneError> {
        self.scene.release_geometry(geometry.0).map_err(renderer_error)
    }

    fn release_material(&mut self, material: MaterialId) -> Result<(), SceneError> {
        self.scene.release_material(material.0).map_err(renderer_error)
    }
}
