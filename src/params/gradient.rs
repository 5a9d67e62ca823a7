use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Linear RGBA color, channels in [0,1]
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Unclamped per-channel linear interpolation
    pub fn lerp(a: Color, b: Color, t: f32) -> Color {
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b), quantize(self.a)]
    }

    fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

/// How colors between two keys are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMode {
    /// Linear interpolation between neighbouring keys
    #[default]
    Blend,
    /// Hard bands: the color of the first key at or after t
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientKey {
    pub time: f32,
    pub color: Color,
}

impl GradientKey {
    pub fn new(time: f32, color: Color) -> Self {
        Self { time, color }
    }
}

/// Height-to-color mapping used by the color raster and colored meshes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorGradient {
    keys: Vec<GradientKey>,
    #[serde(default)]
    mode: GradientMode,
}

impl Default for ColorGradient {
    /// Water, beach, grass, rock and snow bands
    fn default() -> Self {
        Self::new(
            vec![
                GradientKey::new(0.0, Color::rgb(0.10, 0.20, 0.55)),
                GradientKey::new(0.30, Color::rgb(0.20, 0.40, 0.80)),
                GradientKey::new(0.40, Color::rgb(0.85, 0.80, 0.55)),
                GradientKey::new(0.45, Color::rgb(0.35, 0.65, 0.20)),
                GradientKey::new(0.60, Color::rgb(0.20, 0.45, 0.15)),
                GradientKey::new(0.75, Color::rgb(0.45, 0.38, 0.32)),
                GradientKey::new(0.90, Color::rgb(0.95, 0.95, 0.95)),
            ],
            GradientMode::Blend,
        )
    }
}

impl ColorGradient {
    pub fn new(mut keys: Vec<GradientKey>, mode: GradientMode) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys, mode }
    }

    /// Two-key gradient from black at 0 to white at 1
    pub fn greyscale() -> Self {
        Self::new(
            vec![
                GradientKey::new(0.0, Color::BLACK),
                GradientKey::new(1.0, Color::WHITE),
            ],
            GradientMode::Blend,
        )
    }

    pub fn keys(&self) -> &[GradientKey] {
        &self.keys
    }

    pub fn mode(&self) -> GradientMode {
        self.mode
    }

    pub(crate) fn sort_keys(&mut self) {
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.keys.iter().all(|k| k.time.is_finite() && k.color.is_finite())
    }

    /// Color at `t`, clamped to [0,1]; NaN reads as 0. An empty gradient is white.
    pub fn evaluate(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::WHITE,
        };

        if t <= first.time {
            return first.color;
        }
        if t > last.time {
            return last.color;
        }

        // First key with time >= t; in 1..len here
        let next = self.keys.partition_point(|k| k.time < t);
        let k1 = &self.keys[next];

        match self.mode {
            GradientMode::Fixed => k1.color,
            GradientMode::Blend => {
                let k0 = &self.keys[next - 1];
                let dt = k1.time - k0.time;
                if dt <= f32::EPSILON {
                    return k1.color;
                }
                Color::lerp(k0.color, k1.color, (t - k0.time) / dt)
            }
        }
    }
}
