//! Wavefront OBJ universe geometry.
//!
//! Only what the universe models use is read: `v` positions, `f` polygons
//! (fan-triangulated), `o`/`g` object boundaries and `usemtl`. Texture
//! coordinates, normals and smoothing groups are skipped; normals are
//! recomputed from the faces.

use cgviz_core::{DVec3, DecodeError, VizError};
use cgviz_scene::Mesh;
use indexmap::IndexMap;
use nom::{
    bytes::complete::{take_till, take_while},
    character::complete::{char, digit1, space0, space1},
    combinator::{map, map_res, opt, recognize, rest},
    multi::separated_list1,
    number::complete::double,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::registry::SourceReader;
use crate::source::{base_name, file_stem, ObjModel, ObjObject, SourceFile};

/// One statement of an OBJ file.
#[derive(Debug, Clone, PartialEq)]
enum Statement<'a> {
    Vertex(DVec3),
    /// 1-based vertex references; negative values count back from the last vertex.
    Face(Vec<i64>),
    Object(&'a str),
    UseMaterial(&'a str),
    Ignored,
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_till(|c: char| c.is_whitespace())(input)
}

fn vertex(input: &str) -> IResult<&str, Statement<'_>> {
    map(
        tuple((
            preceded(space1, double),
            preceded(space1, double),
            preceded(space1, double),
        )),
        |(x, y, z)| Statement::Vertex(DVec3::new(x, y, z)),
    )(input)
}

/// A face vertex reference: `i`, `i/t`, `i//n` or `i/t/n`.
fn face_vertex(input: &str) -> IResult<&str, i64> {
    terminated(
        map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| s.parse::<i64>()),
        take_while(|c: char| c == '/' || c == '-' || c.is_ascii_digit()),
    )(input)
}

fn face(input: &str) -> IResult<&str, Statement<'_>> {
    map(
        preceded(space1, separated_list1(space1, face_vertex)),
        Statement::Face,
    )(input)
}

fn name(input: &str) -> IResult<&str, &str> {
    map(preceded(space0, rest), str::trim)(input)
}

fn statement(input: &str) -> IResult<&str, Statement<'_>> {
    let (input, word) = keyword(input)?;
    match word {
        "v" => vertex(input),
        "f" => face(input),
        "o" | "g" => map(name, Statement::Object)(input),
        "usemtl" => map(name, Statement::UseMaterial)(input),
        _ => Ok(("", Statement::Ignored)),
    }
}

/// Faces collected for one object, referencing file-global vertices.
struct ObjectBuilder {
    material: Option<String>,
    /// Global vertex index to local vertex index.
    remap: IndexMap<usize, u32>,
    indices: Vec<u32>,
}

impl ObjectBuilder {
    fn new() -> Self {
        Self {
            material: None,
            remap: IndexMap::new(),
            indices: Vec::new(),
        }
    }

    fn local(&mut self, global: usize) -> u32 {
        let next = self.remap.len() as u32;
        *self.remap.entry(global).or_insert(next)
    }

    fn add_polygon(&mut self, polygon: &[usize]) {
        let first = self.local(polygon[0]);
        for window in polygon[1..].windows(2) {
            let b = self.local(window[0]);
            let c = self.local(window[1]);
            self.indices.extend_from_slice(&[first, b, c]);
        }
    }

    fn build(self, positions: &[DVec3]) -> Mesh {
        let vertices: Vec<DVec3> = self.remap.keys().map(|&g| positions[g]).collect();
        let mut normals = vec![DVec3::ZERO; vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let n = (vertices[b] - vertices[a]).cross(vertices[c] - vertices[a]);
            normals[a] += n;
            normals[b] += n;
            normals[c] += n;
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        Mesh {
            vertices,
            normals,
            indices: self.indices,
        }
    }
}

/// Parse OBJ text into one mesh per named object.
///
/// Faces that appear before any `o`/`g` statement belong to an object
/// named `default_name`. A repeated object name continues that object.
/// Objects without faces are dropped.
pub fn parse_obj(file: &str, content: &str, default_name: &str) -> Result<ObjModel, DecodeError> {
    let error = |line: usize, reason: String| DecodeError::Geometry {
        file: file.to_string(),
        line,
        reason,
    };

    let mut positions: Vec<DVec3> = Vec::new();
    let mut objects: IndexMap<String, ObjectBuilder> = IndexMap::new();
    let mut current = default_name.to_string();

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (_, parsed) = statement(line)
            .map_err(|e| error(line_no, format!("cannot parse {:?}: {}", line, e)))?;

        match parsed {
            Statement::Vertex(v) => positions.push(v),
            Statement::Face(refs) => {
                if refs.len() < 3 {
                    return Err(error(line_no, format!("face has {} vertices", refs.len())));
                }
                let polygon = refs
                    .iter()
                    .map(|&r| resolve_index(r, positions.len()))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| error(line_no, "vertex index out of range".to_string()))?;
                objects
                    .entry(current.clone())
                    .or_insert_with(ObjectBuilder::new)
                    .add_polygon(&polygon);
            }
            Statement::Object(name) => {
                if !name.is_empty() {
                    current = name.to_string();
                }
            }
            Statement::UseMaterial(material) => {
                objects
                    .entry(current.clone())
                    .or_insert_with(ObjectBuilder::new)
                    .material = Some(material.to_string());
            }
            Statement::Ignored => {}
        }
    }

    let objects = objects
        .into_iter()
        .filter(|(_, builder)| !builder.indices.is_empty())
        .map(|(name, builder)| ObjObject {
            name,
            material: builder.material.clone(),
            mesh: builder.build(&positions),
        })
        .collect();
    Ok(ObjModel { objects })
}

fn resolve_index(reference: i64, count: usize) -> Option<usize> {
    let index = if reference > 0 {
        reference - 1
    } else {
        count as i64 + reference
    };
    (reference != 0 && index >= 0 && (index as usize) < count).then_some(index as usize)
}

/// Reads `*.obj` universe models.
#[derive(Debug, Default)]
pub struct ObjReader;

impl ObjReader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for ObjReader {
    fn name(&self) -> &'static str {
        "obj"
    }

    fn can_read(&self, file_name: &str) -> bool {
        base_name(file_name).to_ascii_lowercase().ends_with(".obj")
    }

    fn read(&self, file_name: &str, content: &str) -> Result<SourceFile, VizError> {
        let model = parse_obj(base_name(file_name), content, file_stem(file_name))?;
        log::debug!("Decoded {} universe objects from {}", model.len(), file_name);
        Ok(SourceFile::Universe(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_FACE: &str = "
# two buildings
mtllib city.mtl
o Building_1
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
usemtl concrete
f 1 2 3 4
o Building_2
v 0 0 5
v 2 0 5
v 2 2 5
vn 0 0 1
f -3//1 -2//1 -1//1
";

    #[test]
    fn test_statement() {
        assert_eq!(
            statement("v 1.5 -2 3e1").unwrap().1,
            Statement::Vertex(DVec3::new(1.5, -2.0, 30.0))
        );
        assert_eq!(statement("f 1/1/1 2/2/2 3/3/3").unwrap().1, Statement::Face(vec![1, 2, 3]));
        assert_eq!(statement("g  Tower A ").unwrap().1, Statement::Object("Tower A"));
        assert_eq!(statement("vt 0.5 0.5").unwrap().1, Statement::Ignored);
        assert!(statement("v 1 2").is_err());
    }

    #[test]
    fn test_parse_objects() {
        let model = parse_obj("city.obj", CUBE_FACE, "city").unwrap();
        assert_eq!(model.len(), 2);

        let first = model.object("Building_1").unwrap();
        assert_eq!(first.material.as_deref(), Some("concrete"));
        assert_eq!(first.mesh.vertex_count(), 4);
        assert_eq!(first.mesh.triangle_count(), 2);
        assert_eq!(first.mesh.normals[0], DVec3::Z);

        let second = model.object("Building_2").unwrap();
        assert!(second.material.is_none());
        let bounds = second.mesh.bounding_box().unwrap();
        assert_eq!(bounds.max, DVec3::new(2.0, 2.0, 5.0));
    }

    #[test]
    fn test_default_object_name() {
        let model = parse_obj("terrain.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", "terrain")
            .unwrap();
        assert_eq!(model.objects[0].name, "terrain");
    }

    #[test]
    fn test_empty_objects_dropped() {
        let model = parse_obj("a.obj", "o Empty\nv 0 0 0\n", "a").unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_bad_index() {
        let err = parse_obj("a.obj", "v 0 0 0\nv 1 0 0\nf 1 2 3\n", "a").unwrap_err();
        assert_eq!(
            err,
            DecodeError::Geometry {
                file: "a.obj".into(),
                line: 3,
                reason: "vertex index out of range".into()
            }
        );
    }

    #[test]
    fn test_degenerate_face() {
        let err = parse_obj("a.obj", "v 0 0 0\nv 1 0 0\nf 1 2\n", "a").unwrap_err();
        assert!(matches!(err, DecodeError::Geometry { line: 3, .. }));
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(1, 3), Some(0));
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(0, 3), None);
        assert_eq!(resolve_index(4, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
    }
}
