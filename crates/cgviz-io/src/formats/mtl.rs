//! Wavefront MTL universe materials.

use cgviz_core::{Color, DecodeError, VizError};
use indexmap::IndexMap;
use nom::{
    character::complete::{space0, space1},
    combinator::{map, rest},
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};

use crate::registry::SourceReader;
use crate::source::{base_name, MtlMaterial, SourceFile};

fn rgb(input: &str) -> IResult<&str, Color> {
    map(
        tuple((
            preceded(space1, double),
            preceded(space1, double),
            preceded(space1, double),
        )),
        |(r, g, b)| Color::rgb(r as f32, g as f32, b as f32),
    )(input)
}

fn scalar(input: &str) -> IResult<&str, f64> {
    preceded(space1, double)(input)
}

fn name(input: &str) -> IResult<&str, &str> {
    map(preceded(space0, rest), str::trim)(input)
}

/// Parse MTL text into diffuse materials keyed by name.
///
/// `Kd` sets the diffuse color and `Ns` the shininess; every other
/// statement is skipped.
pub fn parse_mtl(file: &str, content: &str) -> Result<IndexMap<String, MtlMaterial>, DecodeError> {
    let error = |line: usize, reason: String| DecodeError::Geometry {
        file: file.to_string(),
        line,
        reason,
    };

    let mut materials: IndexMap<String, MtlMaterial> = IndexMap::new();
    let mut current: Option<String> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        let word = line.split_whitespace().next().unwrap_or_default();
        let args = &line[word.len()..];

        match word {
            "newmtl" => {
                let (_, material) = name(args)
                    .map_err(|e| error(line_no, format!("bad material name: {}", e)))?;
                materials.insert(material.to_string(), MtlMaterial::default());
                current = Some(material.to_string());
            }
            "Kd" | "Ns" => {
                let target = current
                    .as_ref()
                    .and_then(|c| materials.get_mut(c))
                    .ok_or_else(|| error(line_no, format!("{} before newmtl", word)))?;
                if word == "Kd" {
                    let (_, color) = rgb(args)
                        .map_err(|e| error(line_no, format!("bad diffuse color: {}", e)))?;
                    target.diffuse = color;
                } else {
                    let (_, shininess) = scalar(args)
                        .map_err(|e| error(line_no, format!("bad shininess: {}", e)))?;
                    target.shininess = shininess as f32;
                }
            }
            _ => {}
        }
    }

    Ok(materials)
}

/// Reads `*.mtl` material libraries.
#[derive(Debug, Default)]
pub struct MtlReader;

impl MtlReader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for MtlReader {
    fn name(&self) -> &'static str {
        "mtl"
    }

    fn can_read(&self, file_name: &str) -> bool {
        base_name(file_name).to_ascii_lowercase().ends_with(".mtl")
    }

    fn read(&self, file_name: &str, content: &str) -> Result<SourceFile, VizError> {
        Ok(SourceFile::Materials(parse_mtl(base_name(file_name), content)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mtl() {
        let content = "
# exported
newmtl concrete
Ns 10
Ka 0 0 0
Kd 0.5 0.25 1
newmtl glass
d 0.3
";
        let materials = parse_mtl("city.mtl", content).unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials["concrete"].diffuse, Color::rgb(0.5, 0.25, 1.0));
        assert_eq!(materials["concrete"].shininess, 10.0);
        assert_eq!(materials["glass"], MtlMaterial::default());
    }

    #[test]
    fn test_color_before_newmtl() {
        let err = parse_mtl("city.mtl", "Kd 1 1 1\n").unwrap_err();
        assert!(matches!(err, DecodeError::Geometry { line: 1, .. }));
    }

    #[test]
    fn test_bad_color() {
        let err = parse_mtl("city.mtl", "newmtl a\nKd 1 x 1\n").unwrap_err();
        assert!(matches!(err, DecodeError::Geometry { line: 2, .. }));
    }
}
