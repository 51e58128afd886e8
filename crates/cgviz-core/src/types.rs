//! Core value types for the visualizer data model.

use std::borrow::Borrow;
use std::fmt;

use glam::DVec3;

/// Identifier of one loaded scenario (one directory of simulation output).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ScenarioId(pub String);

impl ScenarioId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScenarioId {
    fn from(s: &str) -> Self {
        ScenarioId(s.to_string())
    }
}

impl From<String> for ScenarioId {
    fn from(s: String) -> Self {
        ScenarioId(s)
    }
}

impl Borrow<str> for ScenarioId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A color value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create from 8-bit RGB values.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Create from a packed `0xRRGGBB` value.
    pub fn from_u32(rgb: u32) -> Self {
        Self::from_rgb8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Create from hex string (e.g., "#FF5733" or "FF5733").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        let mut color = Self::from_rgb8(r, g, b);
        if hex.len() == 8 {
            color.a = u8::from_str_radix(hex.get(6..8)?, 16).ok()? as f32 / 255.0;
        }
        Some(color)
    }

    /// Convert to 8-bit RGBA tuple.
    pub fn to_rgba8(&self) -> (u8, u8, u8, u8) {
        (
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }

    /// Format as `#rrggbb`, dropping alpha.
    pub fn to_hex(&self) -> String {
        let (r, g, b, _) = self.to_rgba8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Linear interpolation in RGB space.
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        Color {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    // Common colors
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color {:?}", s)))
    }
}

/// A closed `[min, max]` interval of scalar values (e.g. received power).
///
/// The empty range is `{min: +inf, max: -inf}` so that folding values into
/// it needs no special first case.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True until at least one value has been included.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Widen the range to contain `value`. NaN values are ignored.
    pub fn include(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Widen the range to contain another range.
    pub fn merge(&mut self, other: &ValueRange) {
        if other.is_empty() {
            return;
        }
        self.include(other.min);
        self.include(other.max);
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn span(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max - self.min
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl FromIterator<f64> for ValueRange {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut range = ValueRange::EMPTY;
        for value in iter {
            range.include(value);
        }
        range
    }
}

/// Axis-aligned bounding box in the local space of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl BoundingBox {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut min = DVec3::splat(f64::INFINITY);
        let mut max = DVec3::splat(f64::NEG_INFINITY);
        let mut has_points = false;

        for p in points {
            min = min.min(p);
            max = max.max(p);
            has_points = true;
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Merge with another bounding box.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Shift the box by an offset.
    pub fn translate(&self, offset: DVec3) -> BoundingBox {
        BoundingBox {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Check if a point is inside the bounding box.
    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Spatial extent of a group of objects, used for framing and the ground plane.
///
/// `center` is not always the midpoint of `min`/`max`: universe bounds use
/// the mean of the per-object centers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialBounds {
    pub min: DVec3,
    pub max: DVec3,
    pub center: DVec3,
}

impl SpatialBounds {
    /// Bounds whose center is the midpoint of the box.
    pub fn from_box(bounds: &BoundingBox) -> Self {
        Self {
            min: bounds.min,
            max: bounds.max,
            center: bounds.center(),
        }
    }

    pub fn span(&self) -> DVec3 {
        self.max - self.min
    }
}

/// A transmitter or receiver location and orientation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PovRecord {
    /// Letters of the raw tag, e.g. `Rx` for `Rx22`.
    pub pov_type: String,
    /// Digits of the raw tag, e.g. `22` for `Rx22`.
    pub id: String,
    pub position: DVec3,
    /// Radians.
    pub azimuth: f64,
    /// Radians.
    pub elevation: f64,
}

/// One propagation path: a polyline plus the received power used for coloring.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TracePath {
    pub power: f64,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub zs: Vec<f64>,
}

impl TracePath {
    pub fn new(power: f64, xs: Vec<f64>, ys: Vec<f64>, zs: Vec<f64>) -> Self {
        Self { power, xs, ys, zs }
    }

    /// Number of vertices in the polyline.
    pub fn len(&self) -> usize {
        self.xs.len().min(self.ys.len()).min(self.zs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vertices of the polyline.
    pub fn points(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.xs
            .iter()
            .zip(&self.ys)
            .zip(&self.zs)
            .map(|((x, y), z)| DVec3::new(*x, *y, *z))
    }
}

/// The four fixed containers every scenario gets in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    Universe,
    Povs,
    Traces,
    Kpis,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Universe,
        Category::Povs,
        Category::Traces,
        Category::Kpis,
    ];

    /// Name of the container node in the scene graph.
    pub fn container_name(&self) -> &'static str {
        match self {
            Category::Universe => "Universe",
            Category::Povs => "PoVs",
            Category::Traces => "Traces",
            Category::Kpis => "Kpis",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.container_name())
    }
}

/// Which mesh template represents a point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PovCategory {
    Transmitter,
    Receiver,
}

/// Which value range a color lookup uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RangeScope {
    Scenario(ScenarioId),
    /// Folded over every loaded scenario.
    Overall,
}

impl RangeScope {
    /// `"overall"` selects the aggregated range, anything else names a scenario.
    pub fn parse(scope: &str) -> Self {
        if scope == "overall" {
            RangeScope::Overall
        } else {
            RangeScope::Scenario(ScenarioId::from(scope))
        }
    }
}
