//! Sequential and diverging color scales.

use std::fmt;
use std::str::FromStr;

use cgviz_core::{Color, ValueRange};

const SPECTRAL: [u32; 11] = [
    0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5,
    0x3288bd, 0x5e4fa2,
];

const RD_YL_GN: [u32; 11] = [
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a, 0x66bd63,
    0x1a9850, 0x006837,
];

const VIRIDIS: [u32; 10] = [
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];

/// Named color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorScheme {
    #[default]
    Spectral,
    RdYlGn,
    Viridis,
}

impl ColorScheme {
    fn stops(&self) -> &'static [u32] {
        match self {
            ColorScheme::Spectral => &SPECTRAL,
            ColorScheme::RdYlGn => &RD_YL_GN,
            ColorScheme::Viridis => &VIRIDIS,
        }
    }

    /// Sample the scheme at `t` in `[0, 1]`, clamped.
    pub fn sample(&self, t: f64) -> Color {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = (scaled - lower as f64) as f32;
        Color::from_u32(stops[lower]).lerp(&Color::from_u32(stops[lower + 1]), frac)
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorScheme::Spectral => "Spectral",
            ColorScheme::RdYlGn => "RdYlGn",
            ColorScheme::Viridis => "Viridis",
        };
        f.write_str(name)
    }
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spectral" => Ok(ColorScheme::Spectral),
            "rdylgn" => Ok(ColorScheme::RdYlGn),
            "viridis" => Ok(ColorScheme::Viridis),
            _ => Err(format!("unknown color scheme {:?}", s)),
        }
    }
}

/// A scheme bound to a value domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub scheme: ColorScheme,
    pub domain: ValueRange,
    /// Number of discrete steps, `None` for a continuous scale.
    pub classes: Option<usize>,
    pub reverse: bool,
}

impl ColorScale {
    /// Color of samples without a value.
    pub const MISSING: Color = Color::rgb(0.75, 0.75, 0.75);

    pub fn new(scheme: ColorScheme, domain: ValueRange) -> Self {
        Self {
            scheme,
            domain,
            classes: None,
            reverse: false,
        }
    }

    /// Quantize into `n` steps. Fewer than 2 steps keeps the scale continuous.
    pub fn quantized(mut self, n: usize) -> Self {
        self.classes = (n >= 2).then_some(n);
        self
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Position of `value` in the domain, in `[0, 1]`.
    ///
    /// An empty or zero-width domain maps everything to the middle.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.domain.span();
        if self.domain.is_empty() || span <= 0.0 || !span.is_finite() {
            return 0.5;
        }
        let mut t = ((value - self.domain.min) / span).clamp(0.0, 1.0);
        if let Some(n) = self.classes {
            let bin = ((t * n as f64).floor() as usize).min(n - 1);
            t = bin as f64 / (n - 1) as f64;
        }
        if self.reverse {
            t = 1.0 - t;
        }
        t
    }

    pub fn color(&self, value: f64) -> Color {
        self.scheme.sample(self.normalize(value))
    }

    /// Like [`ColorScale::color`], with [`ColorScale::MISSING`] for absent values.
    pub fn color_or_missing(&self, value: Option<f64>) -> Color {
        value.map_or(Self::MISSING, |v| self.color(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_endpoints() {
        assert_eq!(ColorScheme::Spectral.sample(0.0).to_hex(), "#9e0142");
        assert_eq!(ColorScheme::Spectral.sample(1.0).to_hex(), "#5e4fa2");
        assert_eq!(ColorScheme::Viridis.sample(1.0).to_hex(), "#fde725");
        assert_eq!(ColorScheme::Spectral.sample(0.5).to_hex(), "#ffffbf");
        assert_eq!(ColorScheme::RdYlGn.sample(-3.0).to_hex(), "#a50026");
    }

    #[test]
    fn test_scale_clamps_to_domain() {
        let scale = ColorScale::new(ColorScheme::Spectral, ValueRange::new(-100.0, 0.0));
        assert_eq!(scale.color(-500.0), scale.color(-100.0));
        assert_eq!(scale.color(20.0), scale.color(0.0));
        assert_eq!(scale.normalize(-50.0), 0.5);
    }

    #[test]
    fn test_scale_degenerate_domain() {
        let scale = ColorScale::new(ColorScheme::Spectral, ValueRange::new(3.5, 3.5));
        assert_eq!(scale.normalize(3.5), 0.5);
        let empty = ColorScale::new(ColorScheme::Spectral, ValueRange::EMPTY);
        assert_eq!(empty.normalize(1.0), 0.5);
    }

    #[test]
    fn test_scale_quantized() {
        let scale = ColorScale::new(ColorScheme::Viridis, ValueRange::new(0.0, 10.0)).quantized(3);
        assert_eq!(scale.normalize(0.0), 0.0);
        assert_eq!(scale.normalize(3.2), 0.0);
        assert_eq!(scale.normalize(3.4), 0.5);
        assert_eq!(scale.normalize(10.0), 1.0);
    }

    #[test]
    fn test_scale_reversed() {
        let scale = ColorScale::new(ColorScheme::RdYlGn, ValueRange::new(0.0, 1.0)).reversed(true);
        assert_eq!(scale.color(0.0).to_hex(), "#006837");
        assert_eq!(scale.color_or_missing(None), ColorScale::MISSING);
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!("viridis".parse::<ColorScheme>(), Ok(ColorScheme::Viridis));
        assert_eq!("RdYlGn".parse::<ColorScheme>(), Ok(ColorScheme::RdYlGn));
        assert!("jet".parse::<ColorScheme>().is_err());
    }
}
