//! Decoded source files.

use cgviz_core::{Color, DecodeError, TracePath};
use cgviz_model::{PovPlacement, RawKpis};
use cgviz_scene::Mesh;
use indexmap::IndexMap;

/// The content of one decoded source file.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFile {
    /// One or more points of view.
    Povs(Vec<PovEntry>),
    /// Paths of one or more transmitter/receiver pairs.
    Traces(Vec<TraceEntry>),
    Kpis(RawKpis),
    /// Universe geometry.
    Universe(ObjModel),
    /// Universe materials, by name.
    Materials(IndexMap<String, MtlMaterial>),
}

impl SourceFile {
    /// Short label for logs and load reports.
    pub fn label(&self) -> &'static str {
        match self {
            SourceFile::Povs(_) => "povs",
            SourceFile::Traces(_) => "traces",
            SourceFile::Kpis(_) => "kpis",
            SourceFile::Universe(_) => "universe",
            SourceFile::Materials(_) => "materials",
        }
    }
}

/// A point of view with its raw tag, e.g. `Rx22`.
#[derive(Debug, Clone, PartialEq)]
pub struct PovEntry {
    pub tag: String,
    pub placement: PovPlacement,
}

/// The paths between one transmitter and one receiver.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub tx: String,
    pub rx: String,
    pub paths: Vec<TracePath>,
}

/// Objects of an OBJ file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjModel {
    pub objects: Vec<ObjObject>,
}

impl ObjModel {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn object(&self, name: &str) -> Option<&ObjObject> {
        self.objects.iter().find(|o| o.name == name)
    }
}

/// One named object of an OBJ file.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjObject {
    pub name: String,
    pub mesh: Mesh,
    /// Name of the last `usemtl` material seen for the object.
    pub material: Option<String>,
}

/// Diffuse material read from an MTL file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MtlMaterial {
    pub diffuse: Color,
    pub shininess: f32,
}

impl Default for MtlMaterial {
    fn default() -> Self {
        Self {
            diffuse: Color::WHITE,
            shininess: 30.0,
        }
    }
}

/// File name without any directory part.
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// File name without directories and without its last extension.
pub fn file_stem(path: &str) -> &str {
    let name = base_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

pub(crate) fn json_error(file: &str, err: serde_json::Error) -> DecodeError {
    DecodeError::Json {
        file: file.to_string(),
        reason: err.to_string(),
    }
}

pub(crate) fn shape_error(file: &str, reason: impl Into<String>) -> DecodeError {
    DecodeError::Shape {
        file: file.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("dummy/qcmPov.Tx1.json"), "qcmPov.Tx1.json");
        assert_eq!(base_name("C:\\runs\\city.obj"), "city.obj");
        assert_eq!(base_name("city.obj"), "city.obj");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("scene/city.obj"), "city");
        assert_eq!(file_stem("qcmPov.Tx1.json"), "qcmPov.Tx1");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }
}
